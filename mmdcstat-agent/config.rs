use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use mmdcstat_raw::current_arch::axi::{self, AxiFilter};
use mmdcstat_raw::current_arch::mmdc::MMDC_BASES;

use crate::common::physmem::DEFAULT_DEVICE;
use crate::error::{MmdcError, Result};
use crate::report::ReportMode;

/// Longest interval the 32-bit cycle counter survives at the DDR clock
pub const MAX_INTERVAL_SECS: u64 = 4;

/// Whole seconds between start and stop, 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingInterval(u64);

impl SamplingInterval {
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for SamplingInterval {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<i64> for SamplingInterval {
    type Error = MmdcError;

    /// Zero and negative values fall back to one second; anything above the
    /// counter limit is rejected.
    fn try_from(secs: i64) -> Result<Self> {
        if secs > MAX_INTERVAL_SECS as i64 {
            return Err(MmdcError::InvalidInterval(secs));
        }
        if secs <= 0 {
            return Ok(Self::default());
        }
        Ok(Self(secs as u64))
    }
}

/// Immutable run configuration, built once at startup
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub interval: SamplingInterval,
    pub mode: ReportMode,
    pub filter: AxiFilter,
    pub filter_name: Option<String>,
    pub device: PathBuf,
    /// Physical base of each MMDC block, indexed by channel
    pub channels: Vec<u64>,
    pub metrics_addr: Option<SocketAddr>,
}

impl SamplerConfig {
    pub fn new(interval: SamplingInterval, mode: ReportMode) -> Self {
        Self {
            interval,
            mode,
            filter: AxiFilter::UNFILTERED,
            filter_name: None,
            device: PathBuf::from(DEFAULT_DEVICE),
            channels: MMDC_BASES.to_vec(),
            metrics_addr: None,
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new(SamplingInterval::default(), ReportMode::default())
    }
}

/// Resolve a bus master name, telling the operator what happened.
///
/// Unknown names are not an error: profiling falls back to counting every
/// master and the valid names are listed.
pub fn select_filter<W: Write>(name: &str, out: &mut W) -> Result<AxiFilter> {
    match axi::find(name) {
        Some(master) => {
            writeln!(out, "filtering for AXI IDs from master '{}'", master.name)?;
            tracing::info!(
                "AXI filter {}: id=0x{:04x} mask=0x{:04x}",
                master.name,
                master.filter.id,
                master.filter.mask
            );
            Ok(master.filter)
        }
        None => {
            writeln!(out, "not filtering for AXI IDs. Possible AXI masters:")?;
            writeln!(out, "  {}", axi::names().collect::<Vec<_>>().join(" "))?;
            tracing::warn!("Unknown AXI master '{}', not filtering", name);
            Ok(AxiFilter::UNFILTERED)
        }
    }
}
