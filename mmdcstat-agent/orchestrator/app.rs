// Startup: parse arguments, map the MMDC blocks, and hand over to the sampler

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::cli::Args;
use crate::common::{PhysMem, PhysMemOpener};
use crate::config::SamplerConfig;
use crate::counters::mmdc::MmdcMonitor;
use crate::error::{MmdcError, Result};
use crate::orchestrator::Sampler;
use crate::prom::{self, MmdcMetricExporter};
use crate::report::channel_tag;

/// Install the stderr log subscriber. Later calls are ignored.
pub fn init_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Map every configured MMDC block and sample until cancelled.
///
/// A block that fails to map is left out with a warning; failing to open
/// the memory device or to map any block at all is fatal.
pub async fn launch<M, O>(
    config: &SamplerConfig,
    opener: &M,
    out: &mut O,
    cancel: &CancellationToken,
) -> Result<()>
where
    M: PhysMemOpener,
    O: Write,
{
    let mem = opener.open()?;

    let mut monitors = Vec::with_capacity(config.channels.len());
    for (channel, &base) in config.channels.iter().enumerate() {
        let window = match mem.map(base) {
            Ok(window) => Some(window),
            Err(e) => {
                tracing::warn!("{} unavailable, continuing without it: {}", channel_tag(channel), e);
                None
            }
        };
        monitors.push(MmdcMonitor::new(channel, window));
    }
    // The mappings stay valid once the device is closed
    drop(mem);

    if !monitors.iter().any(|m| m.is_mapped()) {
        return Err(MmdcError::NoChannels);
    }

    let mut sampler = Sampler::new(config.clone(), monitors)?;

    let server_cancel = cancel.child_token();
    let mut server = None;
    if let Some(addr) = config.metrics_addr {
        let channels: Vec<usize> = (0..config.channels.len()).collect();
        let exporter = Arc::new(MmdcMetricExporter::new(&channels)?);
        sampler = sampler.with_exporter(Arc::clone(&exporter));

        let token = server_cancel.clone();
        server = Some(tokio::spawn(async move {
            if let Err(e) = prom::serve(addr, exporter, token).await {
                tracing::error!("Metrics server failed: {}", e);
            }
        }));
    }

    let result = sampler.run(out, cancel).await;

    server_cancel.cancel();
    if let Some(handle) = server {
        let _ = handle.await;
    }

    result
}

/// Entry point behind `main`, returning the process exit code.
///
/// `make_opener` is only called once arguments are valid, so `--help` and
/// bad intervals never touch the memory device.
pub async fn run_cli<I, T, F, M, O>(
    argv: I,
    make_opener: F,
    out: &mut O,
    cancel: CancellationToken,
) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(&Path) -> M,
    M: PhysMemOpener,
    O: Write,
{
    let args = match Args::parse_from_args(argv) {
        Ok(args) => args,
        Err(e) => {
            if e.use_stderr() {
                eprint!("{e}");
            } else {
                let _ = write!(out, "{e}");
            }
            return e.exit_code();
        }
    };

    init_logging(args.verbose);

    let config = match args.into_config(out) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return 1;
        }
    };

    if let Err(e) = writeln!(out, "interval {} s", config.interval.as_secs()) {
        tracing::error!("Failed to write output: {}", e);
        return 1;
    }

    let opener = make_opener(&config.device);
    match launch(&config, &opener, out, &cancel).await {
        Ok(()) => {
            tracing::info!("Sampling stopped");
            0
        }
        Err(e) => {
            tracing::error!("{}", e);
            1
        }
    }
}
