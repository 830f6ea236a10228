//! MMDC (Multi Mode DDR Controller) profiling register definitions for i.MX6
//!
//! Each MMDC port carries one profiling block: a control register, a filter
//! register and six 32-bit statistics registers. Counting is started and
//! frozen through the control register; the statistics registers are only
//! coherent with each other while the block is frozen.
//!
//! ## References
//!
//! - i.MX 6Dual/6Quad Applications Processor Reference Manual
//! - Section 44.12: MMDC Memory Map/Register Definition

use crate::register::RegisterLayout;

/// Number of MMDC profiling blocks on i.MX 6Dual/6Quad
pub const MMDC_CHANNEL_COUNT: usize = 2;

/// Physical base addresses of the MMDC register files, one per channel
pub const MMDC_BASES: [u64; MMDC_CHANNEL_COUNT] = [0x021b_0000, 0x021b_4000];

/// Size of the register window mapped for each MMDC
pub const MMDC_WINDOW_SIZE: usize = 4096;

/// Bit width of the profiling counters
pub const COUNTER_WIDTH_BITS: u32 = 32;

/// Register offsets relative to the MMDC base
pub mod regs {
    /// MMDC Core Debug and Profiling Control Register 0
    pub const MADPCR0: u32 = 0x0410;

    /// MMDC Core Debug and Profiling Control Register 1 (AXI ID filter)
    pub const MADPCR1: u32 = 0x0414;

    /// Total profiling cycles
    pub const MADPSR0: u32 = 0x0418;

    /// Busy cycles
    pub const MADPSR1: u32 = 0x041c;

    /// Total read accesses
    pub const MADPSR2: u32 = 0x0420;

    /// Total write accesses
    pub const MADPSR3: u32 = 0x0424;

    /// Total read bytes
    pub const MADPSR4: u32 = 0x0428;

    /// Total write bytes
    pub const MADPSR5: u32 = 0x042c;

    /// Statistics registers in snapshot order
    pub const STATISTICS: [u32; 6] = [MADPSR0, MADPSR1, MADPSR2, MADPSR3, MADPSR4, MADPSR5];
}

/// MADPCR0 bit definitions
pub mod madpcr0 {
    /// Debug and profiling enable
    pub const DBG_EN: u32 = 1 << 0;

    /// Profiling counters reset
    pub const DBG_RST: u32 = 1 << 1;

    /// Profiling freeze
    pub const PRF_FRZ: u32 = 1 << 2;

    /// Total cycle counter overflow, write 1 to clear
    pub const CYC_OVF: u32 = 1 << 3;
}

/// MADPCR0 layout
///
/// ## Register Format
///
/// | Bits | Field   | Description                                |
/// |------|---------|--------------------------------------------|
/// | 0    | DBG_EN  | Enable profiling                           |
/// | 1    | DBG_RST | Reset all statistics registers             |
/// | 2    | PRF_FRZ | Freeze statistics registers                |
/// | 3    | CYC_OVF | Cycle counter overflowed (write 1 to clear)|
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfilingControl {
    pub enable: bool,
    pub reset: bool,
    pub freeze: bool,
    pub overflow: bool,
}

impl ProfilingControl {
    /// Everything off. First write of the init sequence.
    pub const DISABLED: Self = Self {
        enable: false,
        reset: false,
        freeze: false,
        overflow: false,
    };

    /// Reset asserted with the overflow flag cleared.
    pub const RESET: Self = Self {
        enable: false,
        reset: true,
        freeze: false,
        overflow: true,
    };

    /// Profiling enabled and frozen, ready to be started.
    pub const ARMED: Self = Self {
        enable: true,
        reset: false,
        freeze: true,
        overflow: false,
    };
}

impl RegisterLayout for ProfilingControl {
    fn to_register_value(&self) -> u32 {
        let mut value = 0;
        if self.enable {
            value |= madpcr0::DBG_EN;
        }
        if self.reset {
            value |= madpcr0::DBG_RST;
        }
        if self.freeze {
            value |= madpcr0::PRF_FRZ;
        }
        if self.overflow {
            value |= madpcr0::CYC_OVF;
        }
        value
    }

    fn from_register_value(value: u32) -> Self {
        Self {
            enable: value & madpcr0::DBG_EN != 0,
            reset: value & madpcr0::DBG_RST != 0,
            freeze: value & madpcr0::PRF_FRZ != 0,
            overflow: value & madpcr0::CYC_OVF != 0,
        }
    }
}
