//! SoC-specific register definitions
//!
//! The MMDC profiling block is shared across the i.MX6 family, but the AXI ID
//! assignment of bus masters differs per SoC. This module groups both by
//! SoC family.
//!
//! ## Supported SoCs
//!
//! - **i.MX 6Dual/6Quad** (`imx6q` feature)

#[cfg(feature = "imx6q")]
pub mod imx6;
