//! Debug snapshots of CPU state.

use std::fmt;

use crate::registers::{Flags, REGISTER_COUNT};

/// PC, the three bytes at PC, every register and the flags, captured between
/// instructions.
///
/// Displays as `TRACE: PC | B0 B1 B2 | R0 R1 R2 R3 R4 R5 R6 R7`.
///
/// # Examples
///
/// ```
/// use ls8::{Flags, TraceSnapshot};
///
/// let snap = TraceSnapshot {
///     pc: 0x03,
///     bytes: [0x47, 0x00, 0x01],
///     registers: [8, 0, 0, 0, 0, 0, 0, 0xF4],
///     flags: Flags::default(),
/// };
/// assert_eq!(
///     snap.to_string(),
///     "TRACE: 03 | 47 00 01 | 08 00 00 00 00 00 00 F4"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSnapshot {
    pub pc: u8,
    pub bytes: [u8; 3],
    pub registers: [u8; REGISTER_COUNT],
    pub flags: Flags,
}

impl fmt::Display for TraceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc, self.bytes[0], self.bytes[1], self.bytes[2]
        )?;
        for value in self.registers {
            write!(f, " {:02X}", value)?;
        }
        Ok(())
    }
}
