//! Register block mapped from a physical-memory device.

use std::ffi::c_void;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::ptr::{self, NonNull};

use rustix::fs::{Mode, OFlags};
use rustix::mm::{MapFlags, ProtFlags};

use super::{BLOCK_SIZE, Register, RegisterBus};
use crate::config::{BaseAddress, MapConfig};
use crate::error::{Error, Result};
use crate::tracing::prelude::*;

/// The fan controller's registers, mapped into this process.
///
/// Owns both the device file and the mapping. The mapping covers the page (or
/// pages) containing the block and is released when the value is dropped.
pub struct RegisterFile {
    mapping: NonNull<c_void>,
    mapping_len: usize,
    /// Register 0, i.e. the configured base address inside the mapping.
    base: NonNull<u32>,
    base_address: BaseAddress,
    _device: OwnedFd,
}

impl RegisterFile {
    /// Map the register block described by `config`.
    pub fn open(config: &MapConfig) -> Result<Self> {
        Self::map(&config.device, config.base_address)
    }

    /// Map the register block at `base_address` through `device`.
    ///
    /// The device is opened synchronous so that `/dev/mem` hands out an
    /// uncached mapping.
    pub fn map(device: &Path, base_address: BaseAddress) -> Result<Self> {
        let page_size = rustix::param::page_size();
        let address = base_address.get();
        let page_address = address & !(page_size as u64 - 1);
        let page_offset = (address - page_address) as usize;
        let mapping_len = (page_offset + BLOCK_SIZE).div_ceil(page_size) * page_size;

        let fd = rustix::fs::open(
            device,
            OFlags::RDWR | OFlags::SYNC | OFlags::CLOEXEC,
            Mode::empty(),
        )
        .map_err(|e| Error::Open {
            path: device.to_path_buf(),
            source: e.into(),
        })?;

        // SAFETY: a fresh shared mapping chosen by the kernel; nothing else
        // in this process aliases it.
        let mapping = unsafe {
            rustix::mm::mmap(
                ptr::null_mut(),
                mapping_len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                page_address,
            )
        }
        .map_err(|e| Error::Map {
            address,
            source: e.into(),
        })?;

        let mapping = NonNull::new(mapping).ok_or_else(|| Error::Map {
            address,
            source: std::io::Error::other("mmap returned a null mapping"),
        })?;

        // SAFETY: page_offset + BLOCK_SIZE <= mapping_len by construction,
        // and the offset is 4-byte aligned because the base address is.
        let base = unsafe { mapping.byte_add(page_offset) }.cast::<u32>();

        debug!(
            device = %device.display(),
            base_address = %base_address,
            page_address = format_args!("{page_address:#x}"),
            mapping_len,
            "Mapped register block"
        );

        Ok(Self {
            mapping,
            mapping_len,
            base,
            base_address,
            _device: fd,
        })
    }

    fn cell(&self, register: Register) -> *mut u32 {
        // SAFETY: Register offsets are < REGISTER_COUNT, so the cell lies
        // inside the mapped block.
        unsafe { self.base.as_ptr().add(register.offset()) }
    }
}

impl RegisterBus for RegisterFile {
    fn read(&self, register: Register) -> u32 {
        // SAFETY: see `cell`; the mapping lives as long as `self`.
        unsafe { ptr::read_volatile(self.cell(register)) }
    }

    fn write(&mut self, register: Register, value: u32) -> Result<()> {
        register.ensure_writable()?;
        // SAFETY: see `cell`; the mapping lives as long as `self`.
        unsafe { ptr::write_volatile(self.cell(register), value) };
        Ok(())
    }

    fn address_of(&self, register: Register) -> u64 {
        self.base_address.register_address(register)
    }
}

impl Drop for RegisterFile {
    fn drop(&mut self) {
        // SAFETY: `mapping` and `mapping_len` are exactly what mmap returned
        // and no references into the mapping outlive `self`.
        if let Err(e) = unsafe { rustix::mm::munmap(self.mapping.as_ptr(), self.mapping_len) } {
            warn!(error = %e, "Failed to unmap register block");
        }
    }
}
