use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MmdcError {
    #[error("Cannot open {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to map MMDC registers at 0x{base:08x}: {source}")]
    MapError {
        base: u64,
        #[source]
        source: nix::Error,
    },

    #[error("No MMDC register window could be mapped")]
    NoChannels,

    #[error("overflow {channel}!")]
    CounterOverflow { channel: usize },

    #[error("Invalid interval {0}: must be 1-4 seconds")]
    InvalidInterval(i64),

    #[error("Invalid AXI filter: {0}")]
    InvalidFilter(#[from] mmdcstat_raw::RegisterError),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, MmdcError>;
