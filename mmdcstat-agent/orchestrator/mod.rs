pub mod app;
pub mod sampler;

pub use app::{init_logging, launch, run_cli};
pub use sampler::Sampler;
