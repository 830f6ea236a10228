// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod cli;
pub mod common;
pub mod config;
pub mod counters;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod prom;
pub mod report;

pub use config::{SamplerConfig, SamplingInterval};
pub use error::{MmdcError, Result};
pub use orchestrator::{launch, run_cli, Sampler};
pub use prom::MmdcMetricExporter;
