// MMDC metric calculations - derive utilization figures from raw counters

use std::time::Duration;

use crate::counters::mmdc::MmdcStats;
use crate::metrics::mmdc::ByteUnit;

/// Largest value shown before moving up a unit
const MAX_SCALED: u64 = 1023;

/// Share of cycles the DRAM bus was busy, in percent.
///
/// `None` when the block counted no cycles at all.
pub fn busy_percent(stats: &MmdcStats) -> Option<f64> {
    if stats.cycles == 0 {
        return None;
    }
    Some(100.0 * stats.busy_cycles as f64 / stats.cycles as f64)
}

/// Average transfer size, rounded up
pub fn bytes_per_access(bytes: u32, accesses: u32) -> u64 {
    if accesses == 0 {
        return 0;
    }
    (bytes as u64).div_ceil(accesses as u64)
}

/// Express a byte count in the largest unit that keeps it at or below 1023,
/// flooring at each step.
pub fn scale_bytes(bytes: u64) -> (u64, ByteUnit) {
    let mut count = bytes;
    let mut unit = ByteUnit::Bytes;

    while count > MAX_SCALED {
        let Some(next) = unit.next() else {
            break;
        };
        count /= 1024;
        unit = next;
    }

    (count, unit)
}

/// Throughput in bytes per second over a sampling interval
pub fn throughput(bytes: u32, interval: Duration) -> f64 {
    let seconds = interval.as_secs_f64();
    if seconds == 0.0 {
        return 0.0;
    }
    bytes as f64 / seconds
}
