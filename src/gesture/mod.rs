mod snap;
mod tracker;

pub use snap::settle;
pub use tracker::{DragSession, DragSummary};
