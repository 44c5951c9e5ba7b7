pub mod build_step;

pub use build_step::{step_fn, BuildStep, FnBuildStep};
