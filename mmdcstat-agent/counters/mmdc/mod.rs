pub mod monitor;

pub use monitor::{ChannelSample, CounterState, MmdcMonitor, MmdcStats};
