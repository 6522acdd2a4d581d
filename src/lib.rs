pub mod animation;
pub mod gesture;
pub mod pager;

pub mod prelude {
    pub use crate::animation::{SpringConfig, SpringState};
    pub use crate::gesture::{DragSession, DragSummary};
    pub use crate::pager::{AdvanceResult, EventResponse, Frame, Pager, PointerEvent};
}
