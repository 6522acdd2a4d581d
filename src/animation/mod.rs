mod spring;

pub use spring::{SpringConfig, SpringState};
