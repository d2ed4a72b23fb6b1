pub mod calibrate;
pub mod engine;
pub mod feedback;
pub mod fuse;
pub mod smooth;
pub mod voter;

pub use calibrate::{Baseline, CalibrationStep, Calibrator};
pub use engine::{CounterSnapshot, RepCounter};
pub use feedback::{CounterEvent, Feedback};
pub use fuse::fuse_ratio;
pub use smooth::RatioSmoother;
pub use voter::{RepPhase, Step, Vote, VoteThresholds, Voter};
