//! LS-8 Disassembler Module
//!
//! Converts machine code back into assembly text, e.g. `82 00 08` → `LDI R0,8`.

pub mod formatter;

pub use formatter::{format_instruction, format_listing};

use crate::opcodes::Mnemonic;
use crate::Decoder;

/// A single disassembled instruction, or one byte of data the decoder could
/// not place in an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledLine {
    /// Memory address where this line starts
    pub address: u8,

    /// The first byte (the opcode, for instructions)
    pub opcode: u8,

    /// Decoded mnemonic; `None` for raw data emitted as `.byte`
    pub mnemonic: Option<Mnemonic>,

    /// Operand bytes (0-2)
    pub operand_bytes: Vec<u8>,
}

impl DisassembledLine {
    /// Size in bytes of this line.
    pub fn size_bytes(&self) -> usize {
        match self.mnemonic {
            Some(_) => 1 + self.operand_bytes.len(),
            None => 1,
        }
    }

    /// All bytes of this line, opcode first.
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode];
        bytes.extend_from_slice(&self.operand_bytes);
        bytes
    }

    fn data(address: u8, byte: u8) -> Self {
        Self {
            address,
            opcode: byte,
            mnemonic: None,
            operand_bytes: Vec::new(),
        }
    }
}

/// Disassemble a byte slice that starts at memory address `start`.
///
/// Unknown opcodes and instructions cut short by the end of `bytes` are emitted
/// one `.byte` line per byte, and decoding resumes after them.
///
/// # Examples
///
/// ```
/// use ls8::disassembler::{disassemble, format_instruction};
///
/// let lines = disassemble(&[0b1000_0010, 0, 8, 0b0000_0001], 0);
/// assert_eq!(format_instruction(&lines[0]), "LDI R0,8");
/// assert_eq!(format_instruction(&lines[1]), "HLT");
/// ```
pub fn disassemble(bytes: &[u8], start: u8) -> Vec<DisassembledLine> {
    disassemble_with(&Decoder::default(), bytes, start)
}

/// [`disassemble`] with an explicit decoder.
pub fn disassemble_with(decoder: &Decoder, bytes: &[u8], start: u8) -> Vec<DisassembledLine> {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let address = start.wrapping_add(offset as u8);
        let opcode = bytes[offset];

        match decoder.decode(opcode) {
            Ok(meta) if offset + meta.size_bytes() as usize <= bytes.len() => {
                let end = offset + meta.size_bytes() as usize;
                lines.push(DisassembledLine {
                    address,
                    opcode,
                    mnemonic: Some(meta.mnemonic),
                    operand_bytes: bytes[offset + 1..end].to_vec(),
                });
                offset = end;
            }
            _ => {
                lines.push(DisassembledLine::data(address, opcode));
                offset += 1;
            }
        }
    }

    lines
}
