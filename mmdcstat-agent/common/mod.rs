pub mod physmem;

#[cfg(test)]
pub mod fake;

pub use physmem::{DevMem, DevMemOpener, MmioWindow, PhysMem, PhysMemOpener, RegisterWindow};
