use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::counters::mmdc::ChannelSample;
use crate::error::Result;
use crate::metrics::mmdc::{busy_percent, throughput, MmdcMetric};
use crate::report::channel_tag;

/// Latest-sample gauges for each MMDC channel. Holds no history.
pub struct MmdcMetricExporter {
    registry: Arc<Registry>,
    channel_gauges: HashMap<MmdcMetric, HashMap<usize, Gauge>>,
    overflows: HashMap<usize, IntCounter>,
}

impl MmdcMetricExporter {
    pub fn new(channels: &[usize]) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let instance_label = std::env::var("INSTANCE_LABEL").unwrap_or_else(|_| "none".to_string());

        let mut channel_gauges = HashMap::new();
        for metric in MmdcMetric::all() {
            let opts =
                prometheus::Opts::new(metric.name(), format!("MMDC {} measurement", metric.name()));

            let mut channel_map = HashMap::new();
            for &channel in channels {
                let gauge = Gauge::with_opts(
                    opts.clone()
                        .const_label("channel", channel_tag(channel))
                        .const_label("instance", &instance_label),
                )?;
                registry.register(Box::new(gauge.clone()))?;
                channel_map.insert(channel, gauge);
            }
            channel_gauges.insert(metric, channel_map);
        }

        let mut overflows = HashMap::new();
        for &channel in channels {
            let counter = IntCounter::with_opts(
                prometheus::Opts::new(
                    "MMDCCycleOverflows",
                    "Sampling intervals in which the MMDC cycle counter wrapped",
                )
                .const_label("channel", channel_tag(channel))
                .const_label("instance", &instance_label),
            )?;
            registry.register(Box::new(counter.clone()))?;
            overflows.insert(channel, counter);
        }

        Ok(Self {
            registry,
            channel_gauges,
            overflows,
        })
    }

    fn set(&self, metric: MmdcMetric, channel: usize, value: f64) {
        if let Some(gauge) = self
            .channel_gauges
            .get(&metric)
            .and_then(|m| m.get(&channel))
        {
            gauge.set(value);
        }
    }

    /// Publish one iteration. Channels without cycles keep their last values.
    pub fn update(&self, samples: &[ChannelSample], interval: Duration) {
        for sample in samples {
            if sample.overflowed {
                if let Some(counter) = self.overflows.get(&sample.channel) {
                    counter.inc();
                }
            }

            let Some(busy) = busy_percent(&sample.stats) else {
                continue;
            };
            let stats = &sample.stats;
            let channel = sample.channel;

            self.set(MmdcMetric::BusyPercent, channel, busy);
            self.set(MmdcMetric::ReadAccesses, channel, stats.read_accesses as f64);
            self.set(MmdcMetric::WriteAccesses, channel, stats.write_accesses as f64);
            self.set(MmdcMetric::ReadBytes, channel, stats.read_bytes as f64);
            self.set(MmdcMetric::WriteBytes, channel, stats.write_bytes as f64);
            self.set(
                MmdcMetric::ReadBandwidth,
                channel,
                throughput(stats.read_bytes, interval),
            );
            self.set(
                MmdcMetric::WriteBandwidth,
                channel,
                throughput(stats.write_bytes, interval),
            );
        }
    }

    /// Text exposition of the registry
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
