//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from specific
//! memory implementations, and `FlatMemory`, the 256-byte RAM of the LS-8.
//!
//! ## Memory Map
//!
//! | Range | Use |
//! |-------|-----|
//! | `0x00..` | Program, loaded at [`LOAD_ADDRESS`] |
//! | `..0xF3` | Stack, grows downward from [`STACK_TOP`] |
//! | `0xF4-0xF7` | Reserved |
//! | `0xF8-0xFF` | Interrupt vector table (I0-I7) |
//!
//! Addresses are `u8`, so every access the CPU makes through the bus is in range
//! by construction. Bulk loads are range-checked by [`MemoryBus::load`].

use crate::ExecutionError;

/// Number of addressable bytes.
pub const MEMORY_SIZE: usize = 256;

/// Address programs are loaded at and execution starts from.
pub const LOAD_ADDRESS: u8 = 0x00;

/// Initial stack pointer value. The stack is empty when `R7 == STACK_TOP`.
pub const STACK_TOP: u8 = 0xF4;

/// First entry of the interrupt vector table. Interrupt `n` jumps to the
/// address stored at `INTERRUPT_VECTOR_BASE + n`.
pub const INTERRUPT_VECTOR_BASE: u8 = 0xF8;

/// Memory bus trait for CPU to read/write bytes.
///
/// # Examples
///
/// ```
/// use ls8::{MemoryBus, FlatMemory};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x42, 0x99);
/// assert_eq!(mem.read(0x42), 0x99);
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified address.
    fn read(&self, addr: u8) -> u8;

    /// Writes a byte to the specified address.
    fn write(&mut self, addr: u8, value: u8);

    /// Writes `bytes` contiguously starting at `start`.
    ///
    /// Fails without writing anything if the bytes would run past the last
    /// address; nothing is wrapped around to address 0.
    fn load(&mut self, start: u8, bytes: &[u8]) -> Result<(), ExecutionError> {
        if start as usize + bytes.len() > MEMORY_SIZE {
            return Err(ExecutionError::AddressOutOfBounds {
                start,
                len: bytes.len(),
            });
        }
        for (offset, &byte) in bytes.iter().enumerate() {
            self.write(start + offset as u8, byte);
        }
        Ok(())
    }
}

/// The LS-8's 256 bytes of RAM, zero-initialized.
///
/// # Examples
///
/// ```
/// use ls8::{FlatMemory, MemoryBus};
///
/// let mut memory = FlatMemory::new();
/// memory.load(0x00, &[0b1000_0010, 0x00, 0x08]).unwrap();
/// assert_eq!(memory.read(0x02), 0x08);
/// assert!(memory.load(0xFF, &[1, 2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatMemory {
    data: [u8; MEMORY_SIZE],
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: [0; MEMORY_SIZE],
        }
    }

    /// Borrows the whole address space.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, addr: u8) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u8, value: u8) {
        self.data[addr as usize] = value;
    }
}
