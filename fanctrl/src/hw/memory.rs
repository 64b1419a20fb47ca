//! In-memory register block for tests.

use std::cell::RefCell;

use super::{REGISTER_COUNT, Register, RegisterBus};
use crate::error::Result;

/// Sixteen plain words plus a log of every write, in order.
#[derive(Debug, Default)]
pub struct MemoryRegisters {
    cells: [u32; REGISTER_COUNT],
    writes: Vec<(Register, u32)>,
    reads: RefCell<Vec<Register>>,
}

impl MemoryRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a register as the hardware would, bypassing the access check.
    pub fn with(mut self, register: Register, value: u32) -> Self {
        self.cells[register.offset()] = value;
        self
    }

    pub fn set(&mut self, register: Register, value: u32) {
        self.cells[register.offset()] = value;
    }

    pub fn writes(&self) -> &[(Register, u32)] {
        &self.writes
    }

    pub fn reads(&self) -> Vec<Register> {
        self.reads.borrow().clone()
    }
}

impl RegisterBus for MemoryRegisters {
    fn read(&self, register: Register) -> u32 {
        self.reads.borrow_mut().push(register);
        self.cells[register.offset()]
    }

    fn write(&mut self, register: Register, value: u32) -> Result<()> {
        register.ensure_writable()?;
        self.cells[register.offset()] = value;
        self.writes.push((register, value));
        Ok(())
    }

    fn address_of(&self, register: Register) -> u64 {
        0xA000_0000 + register.byte_offset() as u64
    }
}
