use nix::errno::Errno;
use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use mmdcstat_raw::current_arch::mmdc::MMDC_WINDOW_SIZE;

use crate::error::{MmdcError, Result};

pub const DEFAULT_DEVICE: &str = "/dev/mem";

/// Typed 32-bit access to one mapped register file.
///
/// Offsets are byte offsets from the window base and must be 4-byte aligned
/// and inside the window; anything else is a programming error and panics.
pub trait RegisterWindow {
    fn base(&self) -> u64;

    fn read32(&self, offset: u32) -> u32;

    fn write32(&mut self, offset: u32, value: u32);
}

/// An opened physical memory resource that register windows are mapped from
pub trait PhysMem {
    type Window: RegisterWindow;

    fn map(&self, base: u64) -> Result<Self::Window>;
}

/// Opens the privileged physical memory resource
pub trait PhysMemOpener {
    type Mem: PhysMem;

    fn open(&self) -> Result<Self::Mem>;
}

#[derive(Debug, Clone)]
pub struct DevMemOpener {
    path: PathBuf,
}

impl DevMemOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DevMemOpener {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

impl PhysMemOpener for DevMemOpener {
    type Mem = DevMem;

    fn open(&self) -> Result<DevMem> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&self.path)
            .map_err(|source| MmdcError::ResourceUnavailable {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Opened {}", self.path.display());

        Ok(DevMem { file })
    }
}

/// Open handle on `/dev/mem`. Only needed while mapping; mappings outlive it.
pub struct DevMem {
    file: File,
}

impl PhysMem for DevMem {
    type Window = MmioWindow;

    fn map(&self, base: u64) -> Result<MmioWindow> {
        let map_err = |source| MmdcError::MapError { base, source };

        let offset = libc::off_t::try_from(base).map_err(|_| map_err(Errno::EOVERFLOW))?;
        let length = NonZeroUsize::new(MMDC_WINDOW_SIZE).ok_or(map_err(Errno::EINVAL))?;

        // SAFETY: a fresh shared mapping of device memory; no existing Rust
        // object aliases it.
        let ptr = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                Some(&self.file),
                offset,
            )
        }
        .map_err(map_err)?;

        let ptr = NonNull::new(ptr.cast::<u32>()).ok_or(map_err(Errno::EFAULT))?;

        tracing::info!("Mapped MMDC registers at 0x{:08x}", base);

        Ok(MmioWindow {
            base,
            ptr,
            len: MMDC_WINDOW_SIZE,
        })
    }
}

/// A page of device registers mapped into the process. Unmapped on drop.
pub struct MmioWindow {
    base: u64,
    ptr: NonNull<u32>,
    len: usize,
}

impl MmioWindow {
    fn index(&self, offset: u32) -> usize {
        let offset = offset as usize;
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset 0x{offset:x} outside {}-byte window",
            self.len
        );
        offset / 4
    }
}

impl RegisterWindow for MmioWindow {
    fn base(&self) -> u64 {
        self.base
    }

    fn read32(&self, offset: u32) -> u32 {
        let index = self.index(offset);
        // SAFETY: index is within the mapping, which lives as long as self.
        unsafe { std::ptr::read_volatile(self.ptr.as_ptr().add(index)) }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        let index = self.index(offset);
        tracing::debug!(
            "MMDC write: 0x{:08x} = 0x{:08x}",
            self.base + offset as u64,
            value
        );
        // SAFETY: index is within the mapping, which lives as long as self.
        unsafe { std::ptr::write_volatile(self.ptr.as_ptr().add(index), value) }
    }
}

impl Drop for MmioWindow {
    fn drop(&mut self) {
        // SAFETY: ptr/len are exactly what mmap returned and nothing borrows
        // the window past this point.
        if let Err(e) = unsafe { munmap(self.ptr.as_ptr().cast(), self.len) } {
            tracing::warn!("Failed to unmap MMDC registers at 0x{:08x}: {}", self.base, e);
        } else {
            tracing::debug!("Unmapped MMDC registers at 0x{:08x}", self.base);
        }
    }
}
