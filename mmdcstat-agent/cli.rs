use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;

use mmdcstat_raw::current_arch::axi;

use crate::common::physmem::DEFAULT_DEVICE;
use crate::config::{select_filter, SamplerConfig, SamplingInterval};
use crate::error::Result;
use crate::report::ReportMode;

fn filter_help() -> String {
    format!(
        "Possible AXI master filters:\n  {}",
        axi::names().collect::<Vec<_>>().join(" ")
    )
}

/// Parse a signed decimal integer, saturating at the `i64` bounds.
///
/// Returns `None` only when `arg` is not a run of digits, so an enormous
/// number is still an (out of range) interval rather than a filter name.
fn parse_seconds(arg: &str) -> Option<i64> {
    let arg = arg.trim();
    let digits = arg.strip_prefix(['+', '-']).unwrap_or(arg);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match arg.parse::<i64>() {
        Ok(secs) => Some(secs),
        Err(_) if arg.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

#[derive(Parser, Debug)]
#[command(name = "mmdcstat")]
#[command(about = "DRAM controller utilization for i.MX6 MMDC")]
#[command(override_usage = "mmdcstat [-h] [interval] [filter]")]
#[command(disable_help_flag = true, after_help = filter_help())]
pub struct Args {
    #[arg(long, action = ArgAction::Help, help = "Print help and the AXI master filters")]
    #[allow(dead_code)] // Handled by clap
    help: Option<bool>,

    #[arg(short = 'h', long, help = "Output in human readable format")]
    pub pretty: bool,

    #[arg(
        short,
        long,
        help = "Enable verbose logging (shows all MMDC register writes)"
    )]
    pub verbose: bool,

    #[arg(long, default_value = DEFAULT_DEVICE, help = "Physical memory device")]
    pub device: PathBuf,

    #[arg(long, help = "Serve Prometheus metrics on this address, e.g. 0.0.0.0:9100")]
    pub metrics_addr: Option<SocketAddr>,

    #[arg(
        value_name = "INTERVAL",
        allow_negative_numbers = true,
        help = "Sampling interval, 1-4 seconds (or a filter name)"
    )]
    pub interval: Option<String>,

    #[arg(value_name = "FILTER", help = "AXI master to count, default all")]
    pub filter: Option<String>,
}

impl Args {
    pub fn parse_from_args<I, T>(argv: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(argv)
    }

    /// Resolve positionals into a configuration.
    ///
    /// A sole positional that is not an integer names the filter. Filter
    /// diagnostics go to `out`. Fails only on an out-of-range interval, which
    /// is checked before anything is printed.
    pub fn into_config<W: Write>(self, out: &mut W) -> Result<SamplerConfig> {
        let (interval, filter_name) = match (self.interval, self.filter) {
            (Some(first), filter) => match parse_seconds(&first) {
                Some(secs) => (SamplingInterval::try_from(secs)?, filter),
                None if filter.is_none() => (SamplingInterval::default(), Some(first)),
                None => {
                    tracing::warn!("Ignoring non-numeric interval '{}'", first);
                    (SamplingInterval::default(), filter)
                }
            },
            (None, filter) => (SamplingInterval::default(), filter),
        };

        let mode = if self.pretty {
            ReportMode::Pretty
        } else {
            ReportMode::Raw
        };

        let mut config = SamplerConfig::new(interval, mode);
        config.device = self.device;
        config.metrics_addr = self.metrics_addr;

        if let Some(name) = filter_name {
            config.filter = select_filter(&name, out)?;
            config.filter_name = Some(name);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MmdcError;
    use mmdcstat_raw::current_arch::axi::AxiFilter;

    fn build(argv: &[&str]) -> (Result<SamplerConfig>, String) {
        let args = Args::parse_from_args(argv.iter().copied()).unwrap();
        let mut out = Vec::new();
        let config = args.into_config(&mut out);
        (config, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_defaults() {
        let (config, out) = build(&["mmdcstat"]);
        let config = config.unwrap();
        assert_eq!(config.interval.as_secs(), 1);
        assert_eq!(config.mode, ReportMode::Raw);
        assert_eq!(config.filter, AxiFilter::UNFILTERED);
        assert_eq!(config.device, PathBuf::from("/dev/mem"));
        assert!(config.metrics_addr.is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn test_pretty_interval_and_filter() {
        let (config, out) = build(&["mmdcstat", "-h", "3", "ipu2"]);
        let config = config.unwrap();
        assert_eq!(config.mode, ReportMode::Pretty);
        assert_eq!(config.interval.as_secs(), 3);
        assert_eq!(config.filter, axi::lookup("ipu2"));
        assert_eq!(config.filter_name.as_deref(), Some("ipu2"));
        assert_eq!(out, "filtering for AXI IDs from master 'ipu2'\n");
    }

    #[test]
    fn test_sole_name_is_filter() {
        let (config, _) = build(&["mmdcstat", "sata"]);
        let config = config.unwrap();
        assert_eq!(config.interval.as_secs(), 1);
        assert_eq!(config.filter, axi::lookup("sata"));
    }

    #[test]
    fn test_non_numeric_interval_with_filter() {
        let (config, _) = build(&["mmdcstat", "fast", "usb"]);
        let config = config.unwrap();
        assert_eq!(config.interval.as_secs(), 1);
        assert_eq!(config.filter, axi::lookup("usb"));
    }

    #[test]
    fn test_negative_and_zero_interval() {
        let (config, _) = build(&["mmdcstat", "-2"]);
        assert_eq!(config.unwrap().interval.as_secs(), 1);
        let (config, _) = build(&["mmdcstat", "0"]);
        assert_eq!(config.unwrap().interval.as_secs(), 1);
    }

    #[test]
    fn test_interval_too_long() {
        let (config, out) = build(&["mmdcstat", "5", "hdmi"]);
        assert!(matches!(config, Err(MmdcError::InvalidInterval(5))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_interval_beyond_i64_is_rejected() {
        let (config, out) = build(&["mmdcstat", "99999999999999999999"]);
        assert!(matches!(config, Err(MmdcError::InvalidInterval(i64::MAX))));
        assert!(out.is_empty());

        let (config, out) = build(&["mmdcstat", "+99999999999999999999", "usb"]);
        assert!(matches!(config, Err(MmdcError::InvalidInterval(i64::MAX))));
        assert!(out.is_empty());

        let (config, _) = build(&["mmdcstat", "-99999999999999999999"]);
        assert_eq!(config.unwrap().interval.as_secs(), 1);
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("3"), Some(3));
        assert_eq!(parse_seconds(" +2 "), Some(2));
        assert_eq!(parse_seconds("-7"), Some(-7));
        assert_eq!(parse_seconds("-"), None);
        assert_eq!(parse_seconds("0x2"), None);
        assert_eq!(parse_seconds("2s"), None);
        assert_eq!(parse_seconds("ipu1"), None);
    }

    #[test]
    fn test_unknown_filter_falls_back() {
        let (config, out) = build(&["mmdcstat", "2", "gpu9"]);
        let config = config.unwrap();
        assert_eq!(config.filter, AxiFilter::UNFILTERED);
        assert!(out.starts_with("not filtering for AXI IDs."));
    }

    #[test]
    fn test_help_lists_filters() {
        let err = Args::parse_from_args(["mmdcstat", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);

        let help = err.to_string();
        assert!(help.contains("gpu2d-b"));
        assert!(help.contains("human readable"));
    }

    #[test]
    fn test_options() {
        let args = Args::parse_from_args([
            "mmdcstat",
            "--device",
            "/tmp/mem",
            "--metrics-addr",
            "127.0.0.1:9100",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        let config = args.into_config(&mut Vec::new()).unwrap();
        assert_eq!(config.device, PathBuf::from("/tmp/mem"));
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
    }
}
