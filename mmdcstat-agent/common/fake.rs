//! In-memory MMDC register file used in place of `/dev/mem` by tests

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mmdcstat_raw::current_arch::mmdc::{madpcr0, regs, MMDC_WINDOW_SIZE};

use crate::common::physmem::{PhysMem, PhysMemOpener, RegisterWindow};
use crate::error::{MmdcError, Result};

/// One register access, in the order the driver issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(u32),
    Write(u32, u32),
}

/// Emulates the profiling block of one MMDC: reset clears the statistics,
/// CYC_OVF is write-one-to-clear, and freezing a running block latches
/// whatever was deposited.
#[derive(Debug)]
pub struct FakeMmdc {
    regs: Vec<u32>,
    writes: Vec<(u32, u32)>,
    accesses: Vec<Access>,
    pending: [u32; 6],
    overflow_on_freeze: bool,
    overflow: bool,
    running: bool,
}

impl Default for FakeMmdc {
    fn default() -> Self {
        Self {
            regs: vec![0; MMDC_WINDOW_SIZE / 4],
            writes: Vec::new(),
            accesses: Vec::new(),
            pending: [0; 6],
            overflow_on_freeze: false,
            overflow: false,
            running: false,
        }
    }
}

impl FakeMmdc {
    pub fn shared() -> Arc<Mutex<FakeMmdc>> {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Statistics the next freeze will latch, in MADPSR0..5 order
    pub fn deposit(&mut self, stats: [u32; 6]) {
        self.pending = stats;
    }

    pub fn set_overflow_on_freeze(&mut self, overflow: bool) {
        self.overflow_on_freeze = overflow;
    }

    pub fn writes(&self) -> &[(u32, u32)] {
        &self.writes
    }

    /// Every read and write so far, interleaved
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn register(&self, offset: u32) -> u32 {
        self.regs[(offset / 4) as usize]
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn read(&mut self, offset: u32) -> u32 {
        self.accesses.push(Access::Read(offset));
        let value = self.register(offset);
        if offset == regs::MADPCR0 && self.overflow {
            value | madpcr0::CYC_OVF
        } else {
            value
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        self.writes.push((offset, value));
        self.accesses.push(Access::Write(offset, value));

        if offset != regs::MADPCR0 {
            self.regs[(offset / 4) as usize] = value;
            return;
        }

        if value & madpcr0::CYC_OVF != 0 {
            self.overflow = false;
        }
        if value & madpcr0::DBG_RST != 0 {
            for reg in regs::STATISTICS {
                self.regs[(reg / 4) as usize] = 0;
            }
        }

        let frozen = value & madpcr0::PRF_FRZ != 0;
        if self.running && frozen {
            for (reg, stat) in regs::STATISTICS.iter().zip(self.pending) {
                self.regs[(reg / 4) as usize] = stat;
            }
            if self.overflow_on_freeze {
                self.overflow = true;
            }
        }
        self.running = value & madpcr0::DBG_EN != 0 && value & madpcr0::DBG_RST == 0 && !frozen;

        self.regs[(regs::MADPCR0 / 4) as usize] = value & !madpcr0::CYC_OVF;
    }
}

pub struct FakeWindow {
    base: u64,
    state: Arc<Mutex<FakeMmdc>>,
}

impl FakeWindow {
    pub fn new(base: u64, state: Arc<Mutex<FakeMmdc>>) -> Self {
        Self { base, state }
    }
}

impl RegisterWindow for FakeWindow {
    fn base(&self) -> u64 {
        self.base
    }

    fn read32(&self, offset: u32) -> u32 {
        self.state.lock().read(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        self.state.lock().write(offset, value)
    }
}

/// Stand-in for `/dev/mem`: maps only the bases it was given blocks for
#[derive(Clone, Default)]
pub struct FakeMemory {
    blocks: HashMap<u64, Arc<Mutex<FakeMmdc>>>,
    opens: Arc<AtomicUsize>,
    unopenable: bool,
}

impl FakeMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unopenable() -> Self {
        Self {
            unopenable: true,
            ..Self::default()
        }
    }

    /// Back `base` with a fresh register file and return it
    pub fn add_block(&mut self, base: u64) -> Arc<Mutex<FakeMmdc>> {
        let block = FakeMmdc::shared();
        self.blocks.insert(base, Arc::clone(&block));
        block
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl PhysMemOpener for FakeMemory {
    type Mem = FakeMemory;

    fn open(&self) -> Result<FakeMemory> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.unopenable {
            return Err(MmdcError::ResourceUnavailable {
                path: PathBuf::from("/fake/mem"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        Ok(self.clone())
    }
}

impl PhysMem for FakeMemory {
    type Window = FakeWindow;

    fn map(&self, base: u64) -> Result<FakeWindow> {
        match self.blocks.get(&base) {
            Some(block) => Ok(FakeWindow::new(base, Arc::clone(block))),
            None => Err(MmdcError::MapError {
                base,
                source: nix::errno::Errno::ENOMEM,
            }),
        }
    }
}
