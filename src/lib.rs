pub mod config;
pub mod counter;
pub mod pose;
pub mod replay;
pub mod session;
pub mod synth;
