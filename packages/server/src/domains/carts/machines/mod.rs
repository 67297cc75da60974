pub mod delta;

pub use delta::{detect_actions, DetectorPolicy, InferredAction};
