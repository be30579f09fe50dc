mod controller;

pub use controller::{
    ControlMode, ControllerConfig, ResolutionController, FALLBACK_FRAME_RATIO, RATE_OF_CHANGE,
};
