pub mod mmdc;
pub mod server;

pub use mmdc::MmdcMetricExporter;
pub use server::serve;
