//! # Register File and Flags
//!
//! Eight general-purpose byte registers (R0-R7) and the comparison flags.
//! R7 doubles as the stack pointer.

use std::fmt;

use crate::memory::STACK_TOP;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Index of the stack pointer register (R7).
pub const SP: u8 = 7;

/// R0-R7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    /// All registers zero except R7, which holds [`STACK_TOP`].
    pub fn new() -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = STACK_TOP;
        Self { regs }
    }

    /// Returns the value of register `index`, or `None` if `index > 7`.
    pub fn get(&self, index: u8) -> Option<u8> {
        self.regs.get(index as usize).copied()
    }

    /// Mutable access to register `index`, or `None` if `index > 7`.
    pub fn get_mut(&mut self, index: u8) -> Option<&mut u8> {
        self.regs.get_mut(index as usize)
    }

    /// Sets register `index`. Returns `false` if the index is invalid.
    pub fn set(&mut self, index: u8, value: u8) -> bool {
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The stack pointer (R7).
    pub fn sp(&self) -> u8 {
        self.regs[SP as usize]
    }

    pub(crate) fn set_sp(&mut self, value: u8) {
        self.regs[SP as usize] = value;
    }

    /// All eight registers, R0 first.
    pub fn as_array(&self) -> [u8; REGISTER_COUNT] {
        self.regs
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparison flags set by CMP.
///
/// Packed as `0b00000LGE` when stored in memory by INT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Equal
    pub equal: bool,
    /// Greater-than
    pub greater: bool,
    /// Less-than
    pub less: bool,
}

impl Flags {
    const EQUAL: u8 = 0b0000_0001;
    const GREATER: u8 = 0b0000_0010;
    const LESS: u8 = 0b0000_0100;

    /// Packs the flags into a byte (`0b00000LGE`).
    ///
    /// # Examples
    ///
    /// ```
    /// use ls8::Flags;
    ///
    /// let flags = Flags { equal: false, greater: true, less: false };
    /// assert_eq!(flags.to_byte(), 0b0000_0010);
    /// assert_eq!(Flags::from_byte(0b0000_0010), flags);
    /// ```
    pub fn to_byte(self) -> u8 {
        let mut byte = 0;
        if self.equal {
            byte |= Self::EQUAL;
        }
        if self.greater {
            byte |= Self::GREATER;
        }
        if self.less {
            byte |= Self::LESS;
        }
        byte
    }

    /// Unpacks a flags byte. Bits above L are ignored.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            equal: byte & Self::EQUAL != 0,
            greater: byte & Self::GREATER != 0,
            less: byte & Self::LESS != 0,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            bit(self.less, 'L'),
            bit(self.greater, 'G'),
            bit(self.equal, 'E')
        )
    }
}
