// Sampling loop
// Starts every MMDC block, waits one interval, freezes them all, then reads

use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::common::RegisterWindow;
use crate::config::SamplerConfig;
use crate::counters::mmdc::{ChannelSample, MmdcMonitor};
use crate::error::Result;
use crate::prom::MmdcMetricExporter;
use crate::report::{channel_tag, render_line};

pub struct Sampler<W: RegisterWindow> {
    config: SamplerConfig,
    monitors: Vec<MmdcMonitor<W>>,
    exporter: Option<Arc<MmdcMetricExporter>>,
}

impl<W: RegisterWindow> Sampler<W> {
    /// Initialize every monitor with the configured filter
    pub fn new(config: SamplerConfig, mut monitors: Vec<MmdcMonitor<W>>) -> Result<Self> {
        for monitor in &mut monitors {
            monitor.initialize(config.filter)?;
        }

        Ok(Self {
            config,
            monitors,
            exporter: None,
        })
    }

    pub fn with_exporter(mut self, exporter: Arc<MmdcMetricExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn monitors(&self) -> &[MmdcMonitor<W>] {
        &self.monitors
    }

    /// Run one interval.
    ///
    /// Returns `None` if cancelled while waiting; the iteration is abandoned
    /// and the blocks are left running until they are unmapped.
    pub async fn sample_once(&mut self, cancel: &CancellationToken) -> Option<Vec<ChannelSample>> {
        for monitor in &mut self.monitors {
            monitor.start();
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Sampling cancelled, abandoning current interval");
                return None;
            }
            _ = tokio::time::sleep(self.config.interval.as_duration()) => {}
        }

        // Freeze all channels before reading any, to bound skew between them
        for monitor in &mut self.monitors {
            monitor.stop();
        }

        Some(self.monitors.iter_mut().map(|m| m.read()).collect())
    }

    fn report<O: Write>(&self, samples: &[ChannelSample], out: &mut O) -> Result<()> {
        for sample in samples {
            if let Some(overflow) = sample.overflow() {
                writeln!(out, "{overflow}")?;
            }
        }

        if let Some(line) = render_line(samples, self.config.mode) {
            writeln!(out, "{line}")?;
        }
        out.flush()?;

        if let Some(exporter) = &self.exporter {
            exporter.update(samples, self.config.interval.as_duration());
        }

        Ok(())
    }

    /// Sample until cancelled, writing one line per interval to `out`
    pub async fn run<O: Write>(&mut self, out: &mut O, cancel: &CancellationToken) -> Result<()> {
        let channels: Vec<_> = self
            .monitors
            .iter()
            .filter(|m| m.is_mapped())
            .map(|m| channel_tag(m.channel()))
            .collect();
        tracing::info!(
            "Sampling {} every {} s",
            channels.join(" "),
            self.config.interval.as_secs()
        );

        while !cancel.is_cancelled() {
            let Some(samples) = self.sample_once(cancel).await else {
                break;
            };
            self.report(&samples, out)?;
        }

        Ok(())
    }
}
