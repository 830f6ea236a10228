//! NXP i.MX 6Dual/6Quad register definitions
//!
//! ## Units
//!
//! - **MMDC** (Multi Mode DDR Controller) - two controller ports, each with
//!   its own profiling counter block
//! - **AXI** - bus master ID assignment used by the profiling filter
//!
//! ## References
//!
//! - i.MX 6Dual/6Quad Applications Processor Reference Manual, chapter 44 (MMDC)
//! - Table 43-8: i.MX 6Dual/6Quad AXI ID

pub mod axi;
pub mod mmdc;
