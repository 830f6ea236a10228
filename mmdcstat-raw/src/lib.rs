//! # mmdcstat-raw
//!
//! Register definitions for the i.MX6 MMDC (Multi Mode DDR Controller)
//! profiling counters.
//!
//! This crate provides typed layouts for the profiling control and filter
//! registers, the register map of one MMDC counter block, and the table of
//! AXI bus masters that the profiling filter can be restricted to.
//!
//! ## Features
//!
//! Select the target SoC via feature flags:
//! - `imx6q` (default) - i.MX 6Dual/6Quad register definitions
//!
//! ## Usage
//!
//! ```ignore
//! use mmdcstat_raw::current_arch::{axi, mmdc};
//! use mmdcstat_raw::RegisterLayout;
//!
//! let filter = axi::lookup("ipu1");
//! let value = filter.to_register_value();
//!
//! window.write32(mmdc::regs::MADPCR1, value);
//! ```

pub mod arch;
pub mod register;

// Re-export for convenience
pub use register::{RegisterError, RegisterLayout};

// Export current architecture based on feature flag
#[cfg(feature = "imx6q")]
pub use arch::imx6 as current_arch;
