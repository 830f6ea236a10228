// MMDC (Multi Mode DDR Controller) profiling
// Drives one MMDC profiling block through reset, start, freeze and readout

use mmdcstat_raw::current_arch::axi::AxiFilter;
use mmdcstat_raw::current_arch::mmdc::{madpcr0, regs, ProfilingControl, COUNTER_WIDTH_BITS};
use mmdcstat_raw::RegisterLayout;

use crate::common::RegisterWindow;
use crate::error::{MmdcError, Result};

/// One readout of the six statistics registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MmdcStats {
    pub cycles: u32,
    pub busy_cycles: u32,
    pub read_accesses: u32,
    pub write_accesses: u32,
    pub read_bytes: u32,
    pub write_bytes: u32,
}

impl MmdcStats {
    /// Build from raw values in MADPSR0..5 order
    pub fn from_registers(values: [u32; 6]) -> Self {
        let [cycles, busy_cycles, read_accesses, write_accesses, read_bytes, write_bytes] = values;
        Self {
            cycles,
            busy_cycles,
            read_accesses,
            write_accesses,
            read_bytes,
            write_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Unconfigured,
    Idle,
    Running,
    Frozen,
}

/// Result of reading one channel after an interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSample {
    pub channel: usize,
    pub mapped: bool,
    pub overflowed: bool,
    pub stats: MmdcStats,
}

impl ChannelSample {
    pub fn overflow(&self) -> Option<MmdcError> {
        self.overflowed.then_some(MmdcError::CounterOverflow {
            channel: self.channel,
        })
    }

    /// Whether the channel produced anything to report
    pub fn has_data(&self) -> bool {
        self.stats.cycles != 0
    }
}

/// Driver for a single MMDC profiling block.
///
/// A monitor built without a window (the mapping failed) stays `Idle`
/// forever and every operation on it is a no-op.
pub struct MmdcMonitor<W: RegisterWindow> {
    channel: usize,
    window: Option<W>,
    state: CounterState,
}

impl<W: RegisterWindow> MmdcMonitor<W> {
    pub fn new(channel: usize, window: Option<W>) -> Self {
        let state = if window.is_some() {
            CounterState::Unconfigured
        } else {
            CounterState::Idle
        };

        Self {
            channel,
            window,
            state,
        }
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn is_mapped(&self) -> bool {
        self.window.is_some()
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    /// Reset the block, enable profiling in the frozen state and program
    /// the AXI filter.
    pub fn initialize(&mut self, filter: AxiFilter) -> Result<()> {
        filter.validate()?;

        let Some(window) = self.window.as_mut() else {
            return Ok(());
        };

        // The reset pulse must come between disable and enable so that no
        // counts or stale overflow survive from a previous user.
        window.write32(regs::MADPCR0, ProfilingControl::DISABLED.to_register_value());
        window.write32(regs::MADPCR0, ProfilingControl::RESET.to_register_value());
        window.write32(regs::MADPCR0, ProfilingControl::ARMED.to_register_value());
        window.write32(regs::MADPCR1, filter.to_register_value());

        tracing::debug!(
            "MMDC{} at 0x{:08x} initialized with AXI filter id=0x{:04x} mask=0x{:04x}",
            self.channel,
            window.base(),
            filter.id,
            filter.mask
        );

        self.state = CounterState::Idle;
        Ok(())
    }

    /// Zero the counters and let them run. Also re-arms a frozen block.
    pub fn start(&mut self) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        if self.state == CounterState::Unconfigured {
            tracing::warn!("MMDC{} started before initialization, ignoring", self.channel);
            return;
        }

        // Assert reset, clear overflow flag
        let ctrl = window.read32(regs::MADPCR0);
        window.write32(regs::MADPCR0, ctrl | madpcr0::DBG_RST | madpcr0::CYC_OVF);
        let ctrl = window.read32(regs::MADPCR0);
        window.write32(regs::MADPCR0, ctrl & !(madpcr0::DBG_RST | madpcr0::PRF_FRZ));

        self.state = CounterState::Running;
    }

    /// Freeze the counters so the statistics registers can be read coherently.
    pub fn stop(&mut self) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        if self.state != CounterState::Running {
            return;
        }

        let ctrl = window.read32(regs::MADPCR0);
        window.write32(regs::MADPCR0, ctrl | madpcr0::PRF_FRZ);

        self.state = CounterState::Frozen;
    }

    /// Read the statistics registers, freezing first if still running.
    pub fn read(&mut self) -> ChannelSample {
        if self.state == CounterState::Running {
            self.stop();
        }

        let Some(window) = self.window.as_ref() else {
            return ChannelSample {
                channel: self.channel,
                ..ChannelSample::default()
            };
        };

        let ctrl = ProfilingControl::from_register_value(window.read32(regs::MADPCR0));
        if ctrl.overflow {
            tracing::warn!(
                "MMDC{} cycle counter wrapped past {} bits",
                self.channel,
                COUNTER_WIDTH_BITS
            );
        }

        let stats = MmdcStats::from_registers(regs::STATISTICS.map(|reg| window.read32(reg)));

        ChannelSample {
            channel: self.channel,
            mapped: true,
            overflowed: ctrl.overflow,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fake::{Access, FakeMmdc, FakeWindow};
    use mmdcstat_raw::current_arch::axi;

    const STATS: [u32; 6] = [528_000_000, 132_000_000, 1_000, 2_000, 64_000, 128_000];

    fn monitor() -> (MmdcMonitor<FakeWindow>, std::sync::Arc<parking_lot::Mutex<FakeMmdc>>) {
        let block = FakeMmdc::shared();
        let window = FakeWindow::new(0x021b_0000, std::sync::Arc::clone(&block));
        (MmdcMonitor::new(0, Some(window)), block)
    }

    #[test]
    fn test_initialize_write_order() {
        let (mut mon, block) = monitor();
        mon.initialize(axi::lookup("ipu1")).unwrap();

        let filter = axi::lookup("ipu1").to_register_value();
        assert_eq!(
            block.lock().writes(),
            &[
                (regs::MADPCR0, 0),
                (regs::MADPCR0, madpcr0::DBG_RST | madpcr0::CYC_OVF),
                (regs::MADPCR0, madpcr0::DBG_EN | madpcr0::PRF_FRZ),
                (regs::MADPCR1, filter),
            ]
        );
        assert_eq!(mon.state(), CounterState::Idle);
    }

    #[test]
    fn test_unfiltered_programs_zero() {
        let (mut mon, block) = monitor();
        mon.initialize(AxiFilter::UNFILTERED).unwrap();
        assert_eq!(block.lock().register(regs::MADPCR1), 0);
    }

    #[test]
    fn test_start_sequence() {
        let (mut mon, block) = monitor();
        mon.initialize(AxiFilter::UNFILTERED).unwrap();
        mon.start();

        let fake = block.lock();
        let writes = fake.writes();
        assert_eq!(
            &writes[4..],
            &[
                (
                    regs::MADPCR0,
                    madpcr0::DBG_EN | madpcr0::PRF_FRZ | madpcr0::DBG_RST | madpcr0::CYC_OVF
                ),
                (regs::MADPCR0, madpcr0::DBG_EN),
            ]
        );
        assert!(fake.is_running());
        assert_eq!(mon.state(), CounterState::Running);
    }

    #[test]
    fn test_cycle_returns_deposited_stats() {
        let (mut mon, block) = monitor();
        mon.initialize(AxiFilter::UNFILTERED).unwrap();

        mon.start();
        block.lock().deposit(STATS);
        mon.stop();
        assert_eq!(mon.state(), CounterState::Frozen);

        let freeze_at = block.lock().accesses().len() - 1;
        let sample = mon.read();

        // Freeze, then the overflow check, then each statistic exactly once
        let fake = block.lock();
        let after_freeze = &fake.accesses()[freeze_at..];
        assert_eq!(
            after_freeze[0],
            Access::Write(regs::MADPCR0, madpcr0::DBG_EN | madpcr0::PRF_FRZ)
        );
        let mut expected = vec![Access::Read(regs::MADPCR0)];
        expected.extend(regs::STATISTICS.map(Access::Read));
        assert_eq!(&after_freeze[1..], expected.as_slice());
        drop(fake);

        assert!(sample.mapped);
        assert!(!sample.overflowed);
        assert!(sample.overflow().is_none());
        assert_eq!(sample.stats, MmdcStats::from_registers(STATS));
        assert_eq!(sample.stats.busy_cycles, 132_000_000);
        assert_eq!(sample.stats.write_bytes, 128_000);
    }

    #[test]
    fn test_rearm_from_frozen_rezeroes() {
        let (mut mon, block) = monitor();
        mon.initialize(AxiFilter::UNFILTERED).unwrap();

        mon.start();
        block.lock().deposit(STATS);
        mon.stop();
        assert_eq!(mon.read().stats.cycles, STATS[0]);

        mon.start();
        assert_eq!(mon.state(), CounterState::Running);
        assert_eq!(block.lock().register(regs::MADPSR0), 0);

        block.lock().deposit([10, 5, 1, 1, 8, 8]);
        mon.stop();
        assert_eq!(mon.read().stats, MmdcStats::from_registers([10, 5, 1, 1, 8, 8]));
    }

    #[test]
    fn test_read_freezes_running_block() {
        let (mut mon, block) = monitor();
        mon.initialize(AxiFilter::UNFILTERED).unwrap();
        mon.start();
        block.lock().deposit(STATS);

        let sample = mon.read();
        assert_eq!(mon.state(), CounterState::Frozen);
        assert_eq!(sample.stats.cycles, STATS[0]);
        assert_ne!(block.lock().register(regs::MADPCR0) & madpcr0::PRF_FRZ, 0);
    }

    #[test]
    fn test_overflow_is_reported_and_cleared_on_restart() {
        let (mut mon, block) = monitor();
        mon.initialize(AxiFilter::UNFILTERED).unwrap();
        block.lock().set_overflow_on_freeze(true);

        mon.start();
        block.lock().deposit(STATS);
        mon.stop();
        let sample = mon.read();
        assert!(sample.overflowed);
        assert!(matches!(
            sample.overflow(),
            Some(MmdcError::CounterOverflow { channel: 0 })
        ));
        assert_eq!(sample.stats, MmdcStats::from_registers(STATS));

        block.lock().set_overflow_on_freeze(false);
        mon.start();
        mon.stop();
        assert!(!mon.read().overflowed);
    }

    #[test]
    fn test_start_before_initialize_is_ignored() {
        let (mut mon, block) = monitor();
        mon.start();
        assert_eq!(mon.state(), CounterState::Unconfigured);
        assert!(block.lock().writes().is_empty());
    }

    #[test]
    fn test_absent_window_is_noop() {
        let mut mon: MmdcMonitor<FakeWindow> = MmdcMonitor::new(1, None);
        assert!(!mon.is_mapped());
        assert_eq!(mon.state(), CounterState::Idle);

        mon.initialize(axi::lookup("hdmi")).unwrap();
        mon.start();
        mon.stop();
        let sample = mon.read();

        assert_eq!(mon.state(), CounterState::Idle);
        assert_eq!(mon.channel(), 1);
        assert_eq!(sample.channel, 1);
        assert!(!sample.mapped);
        assert!(!sample.has_data());
        assert_eq!(sample.stats, MmdcStats::default());
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let (mut mon, block) = monitor();
        let result = mon.initialize(AxiFilter::new(0x4000, 0x3FFF));
        assert!(matches!(result, Err(MmdcError::InvalidFilter(_))));
        assert!(block.lock().writes().is_empty());
        assert_eq!(mon.state(), CounterState::Unconfigured);
    }
}
