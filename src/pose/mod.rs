pub mod keypoint;
pub mod signals;

pub use keypoint::{FrameSample, Keypoint, KeypointIndex, Pose};
pub use signals::{find_angle, BodySignals};
