//! # Instruction Decoder
//!
//! Classifies opcode bytes through an [`OpcodeTable`] and fetches the operand
//! bytes that follow them. The decoder holds a shared reference to the table,
//! so copies of it are free and never alias mutable state.

use std::ops::Range;

use thiserror::Error;

use crate::opcodes::{Mnemonic, OpcodeMetadata, OpcodeTable, OPCODE_TABLE};
use crate::{ExecutionError, MemoryBus};

/// The byte is not in the opcode table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown opcode {0:#010b}")]
pub struct UnknownOpcode(pub u8);

/// A fetched instruction: opcode metadata plus its operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode byte.
    pub address: u8,

    /// Opcode metadata from the table.
    pub metadata: OpcodeMetadata,

    /// Operand bytes; only the first `metadata.operand_count` are meaningful,
    /// the rest are zero.
    pub operands: [u8; 2],
}

impl Instruction {
    /// The instruction's mnemonic.
    pub fn mnemonic(&self) -> Mnemonic {
        self.metadata.mnemonic
    }

    /// First operand byte (register index for every instruction that has one).
    pub fn a(&self) -> u8 {
        self.operands[0]
    }

    /// Second operand byte (register index, or the immediate for LDI).
    pub fn b(&self) -> u8 {
        self.operands[1]
    }

    /// The meaningful operand bytes.
    pub fn operand_bytes(&self) -> &[u8] {
        &self.operands[..self.metadata.operand_count as usize]
    }
}

/// Opcode decoder backed by an immutable, shared opcode table.
///
/// # Examples
///
/// ```
/// use ls8::{Decoder, Mnemonic};
///
/// let decoder = Decoder::default();
/// let prn = decoder.decode(0b0100_0111).unwrap();
/// assert_eq!(prn.mnemonic, Mnemonic::Prn);
/// assert_eq!(prn.operand_count, 1);
/// assert!(decoder.decode(0xFF).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    table: &'static OpcodeTable,
}

impl Decoder {
    /// Creates a decoder over the given table.
    pub fn new(table: &'static OpcodeTable) -> Self {
        Self { table }
    }

    /// The table this decoder reads.
    pub fn table(&self) -> &'static OpcodeTable {
        self.table
    }

    /// Looks up an opcode byte.
    pub fn decode(&self, opcode: u8) -> Result<OpcodeMetadata, UnknownOpcode> {
        self.table.get(opcode).copied().ok_or(UnknownOpcode(opcode))
    }

    /// Fetches and decodes the instruction at `pc`.
    ///
    /// The opcode and each of its operand bytes must lie inside `program`
    /// (the executable extent of memory); operands the opcode does not take are
    /// never read.
    pub fn decode_at<M: MemoryBus>(
        &self,
        memory: &M,
        pc: u8,
        program: &Range<u16>,
    ) -> Result<Instruction, ExecutionError> {
        if !program.contains(&(pc as u16)) {
            return Err(ExecutionError::ProgramCounterOutOfBounds { address: pc as u16 });
        }

        let opcode = memory.read(pc);
        let metadata = self
            .decode(opcode)
            .map_err(|UnknownOpcode(opcode)| ExecutionError::UnknownOpcode {
                address: pc,
                opcode,
            })?;

        let mut operands = [0u8; 2];
        for (i, slot) in operands
            .iter_mut()
            .take(metadata.operand_count as usize)
            .enumerate()
        {
            let addr = pc as u16 + 1 + i as u16;
            if !program.contains(&addr) {
                return Err(ExecutionError::ProgramCounterOutOfBounds { address: addr });
            }
            *slot = memory.read(addr as u8);
        }

        Ok(Instruction {
            address: pc,
            metadata,
            operands,
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(&OPCODE_TABLE)
    }
}
