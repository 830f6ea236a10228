pub mod calculator;
pub mod types;

pub use calculator::{busy_percent, bytes_per_access, scale_bytes, throughput};
pub use types::{ByteUnit, MmdcMetric};
