// Text rendering of MMDC samples, one line per sampling iteration

use crate::counters::mmdc::{ChannelSample, MmdcStats};
use crate::metrics::mmdc::{busy_percent, bytes_per_access, scale_bytes};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Access and byte counts verbatim
    #[default]
    Raw,
    /// Scaled byte units and average bytes per access
    Pretty,
}

pub fn channel_tag(channel: usize) -> String {
    format!("MMDC{channel}")
}

pub fn render_channel(tag: &str, stats: &MmdcStats, mode: ReportMode) -> String {
    let Some(busy) = busy_percent(stats) else {
        return format!("{tag} no data");
    };

    match mode {
        ReportMode::Raw => format!(
            "{tag} {busy:.2}% busy {} reads ({} bytes) {} writes ({} bytes)",
            stats.read_accesses, stats.read_bytes, stats.write_accesses, stats.write_bytes
        ),
        ReportMode::Pretty => {
            let (read_count, read_unit) = scale_bytes(stats.read_bytes as u64);
            let (write_count, write_unit) = scale_bytes(stats.write_bytes as u64);
            format!(
                "{tag} {busy:.2}% busy {read_count} {} reads ({} B / access) {write_count} {} writes ({} B / access)",
                read_unit.name(),
                bytes_per_access(stats.read_bytes, stats.read_accesses),
                write_unit.name(),
                bytes_per_access(stats.write_bytes, stats.write_accesses),
            )
        }
    }
}

/// Render one iteration. The first channel is shown whenever it is mapped;
/// the others only when they counted cycles.
pub fn render_line(samples: &[ChannelSample], mode: ReportMode) -> Option<String> {
    let parts: Vec<String> = samples
        .iter()
        .filter(|s| s.has_data() || (s.channel == 0 && s.mapped))
        .map(|s| render_channel(&channel_tag(s.channel), &s.stats, mode))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\t"))
    }
}
