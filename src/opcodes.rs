//! # Opcode Metadata Table
//!
//! This module contains the LS-8 instruction set: 34 opcodes, each described by a
//! fixed-shape [`OpcodeMetadata`] record, and the 256-entry [`OpcodeTable`] that
//! the decoder indexes by opcode byte.
//!
//! Opcodes follow the `AABCDDDD` layout of the LS-8 hardware:
//!
//! | Bits | Meaning |
//! |------|---------|
//! | `AA` | Number of operand bytes (0-2) |
//! | `B`  | 1 for ALU operations |
//! | `C`  | 1 for instructions that set the PC directly |
//! | `DDDD` | Instruction identifier |
//!
//! The table is the single source of truth; the bit fields are only checked
//! against it in tests.

use std::fmt;

/// Every LS-8 instruction.
///
/// The execution engine dispatches on this enum with an exhaustive `match`, so
/// adding a variant without handling it is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Nop,
    Hlt,
    Ret,
    Iret,
    Call,
    Int,
    Jmp,
    Jeq,
    Jne,
    Jgt,
    Jlt,
    Jle,
    Jge,
    Push,
    Pop,
    Prn,
    Pra,
    Not,
    Dec,
    Inc,
    Ldi,
    Ld,
    St,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Cmp,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl Mnemonic {
    /// Upper-case assembly name, e.g. `"LDI"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Nop => "NOP",
            Mnemonic::Hlt => "HLT",
            Mnemonic::Ret => "RET",
            Mnemonic::Iret => "IRET",
            Mnemonic::Call => "CALL",
            Mnemonic::Int => "INT",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jeq => "JEQ",
            Mnemonic::Jne => "JNE",
            Mnemonic::Jgt => "JGT",
            Mnemonic::Jlt => "JLT",
            Mnemonic::Jle => "JLE",
            Mnemonic::Jge => "JGE",
            Mnemonic::Push => "PUSH",
            Mnemonic::Pop => "POP",
            Mnemonic::Prn => "PRN",
            Mnemonic::Pra => "PRA",
            Mnemonic::Not => "NOT",
            Mnemonic::Dec => "DEC",
            Mnemonic::Inc => "INC",
            Mnemonic::Ldi => "LDI",
            Mnemonic::Ld => "LD",
            Mnemonic::St => "ST",
            Mnemonic::Add => "ADD",
            Mnemonic::Sub => "SUB",
            Mnemonic::Mul => "MUL",
            Mnemonic::Div => "DIV",
            Mnemonic::Mod => "MOD",
            Mnemonic::Cmp => "CMP",
            Mnemonic::And => "AND",
            Mnemonic::Or => "OR",
            Mnemonic::Xor => "XOR",
            Mnemonic::Shl => "SHL",
            Mnemonic::Shr => "SHR",
        }
    }

    /// Returns true if the second operand byte is a literal value rather than a
    /// register index. Only LDI has an immediate operand.
    pub const fn has_immediate(self) -> bool {
        matches!(self, Mnemonic::Ldi)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad instruction class, used for reporting and by the disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Arithmetic, logic and compare (handled by the ALU)
    Alu,
    /// Register/memory transfers: LDI, LD, ST
    Transfer,
    /// PRN, PRA
    Output,
    /// PUSH, POP
    Stack,
    /// CALL, RET, JMP and the conditional jumps
    Control,
    /// INT, IRET
    Interrupt,
    /// NOP, HLT
    System,
}

/// Metadata for a single LS-8 opcode.
///
/// # Examples
///
/// ```
/// use ls8::{Category, Mnemonic, OPCODE_TABLE};
///
/// let ldi = OPCODE_TABLE.get(0b1000_0010).unwrap();
/// assert_eq!(ldi.mnemonic, Mnemonic::Ldi);
/// assert_eq!(ldi.operand_count, 2);
/// assert_eq!(ldi.category, Category::Transfer);
/// assert_eq!(ldi.size_bytes(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// The opcode byte.
    pub opcode: u8,

    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// Number of operand bytes following the opcode (0, 1 or 2).
    pub operand_count: u8,

    /// Instruction class.
    pub category: Category,
}

impl OpcodeMetadata {
    const fn new(opcode: u8, mnemonic: Mnemonic, operand_count: u8, category: Category) -> Self {
        Self {
            opcode,
            mnemonic,
            operand_count,
            category,
        }
    }

    /// Total instruction size in bytes (opcode + operands).
    pub const fn size_bytes(&self) -> u8 {
        1 + self.operand_count
    }

    /// Returns true if the instruction is executed by the ALU.
    pub const fn is_alu(&self) -> bool {
        matches!(self.category, Category::Alu)
    }

    /// Returns true if the instruction assigns the PC itself instead of falling
    /// through to the next instruction (conditional jumps may still fall through).
    pub const fn sets_pc(&self) -> bool {
        matches!(self.category, Category::Control | Category::Interrupt)
    }
}

/// The complete LS-8 instruction set, in opcode order.
pub const INSTRUCTION_SET: [OpcodeMetadata; 34] = [
    OpcodeMetadata::new(0b0000_0000, Mnemonic::Nop, 0, Category::System),
    OpcodeMetadata::new(0b0000_0001, Mnemonic::Hlt, 0, Category::System),
    OpcodeMetadata::new(0b0001_0001, Mnemonic::Ret, 0, Category::Control),
    OpcodeMetadata::new(0b0001_0011, Mnemonic::Iret, 0, Category::Interrupt),
    OpcodeMetadata::new(0b0100_0101, Mnemonic::Push, 1, Category::Stack),
    OpcodeMetadata::new(0b0100_0110, Mnemonic::Pop, 1, Category::Stack),
    OpcodeMetadata::new(0b0100_0111, Mnemonic::Prn, 1, Category::Output),
    OpcodeMetadata::new(0b0100_1000, Mnemonic::Pra, 1, Category::Output),
    OpcodeMetadata::new(0b0101_0000, Mnemonic::Call, 1, Category::Control),
    OpcodeMetadata::new(0b0101_0010, Mnemonic::Int, 1, Category::Interrupt),
    OpcodeMetadata::new(0b0101_0100, Mnemonic::Jmp, 1, Category::Control),
    OpcodeMetadata::new(0b0101_0101, Mnemonic::Jeq, 1, Category::Control),
    OpcodeMetadata::new(0b0101_0110, Mnemonic::Jne, 1, Category::Control),
    OpcodeMetadata::new(0b0101_0111, Mnemonic::Jgt, 1, Category::Control),
    OpcodeMetadata::new(0b0101_1000, Mnemonic::Jlt, 1, Category::Control),
    OpcodeMetadata::new(0b0101_1001, Mnemonic::Jle, 1, Category::Control),
    OpcodeMetadata::new(0b0101_1010, Mnemonic::Jge, 1, Category::Control),
    OpcodeMetadata::new(0b0110_0101, Mnemonic::Inc, 1, Category::Alu),
    OpcodeMetadata::new(0b0110_0110, Mnemonic::Dec, 1, Category::Alu),
    OpcodeMetadata::new(0b0110_1001, Mnemonic::Not, 1, Category::Alu),
    OpcodeMetadata::new(0b1000_0010, Mnemonic::Ldi, 2, Category::Transfer),
    OpcodeMetadata::new(0b1000_0011, Mnemonic::Ld, 2, Category::Transfer),
    OpcodeMetadata::new(0b1000_0100, Mnemonic::St, 2, Category::Transfer),
    OpcodeMetadata::new(0b1010_0000, Mnemonic::Add, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_0001, Mnemonic::Sub, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_0010, Mnemonic::Mul, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_0011, Mnemonic::Div, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_0100, Mnemonic::Mod, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_0111, Mnemonic::Cmp, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_1000, Mnemonic::And, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_1010, Mnemonic::Or, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_1011, Mnemonic::Xor, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_1100, Mnemonic::Shl, 2, Category::Alu),
    OpcodeMetadata::new(0b1010_1101, Mnemonic::Shr, 2, Category::Alu),
];

/// A 256-entry lookup table indexed by opcode byte.
///
/// Built once at compile time and never mutated; share it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeTable {
    entries: [Option<OpcodeMetadata>; 256],
}

impl OpcodeTable {
    /// Builds a table from a list of opcode records.
    ///
    /// Panics (at compile time when used in a `const`/`static`) if two records
    /// share an opcode byte.
    pub const fn new(set: &[OpcodeMetadata]) -> Self {
        let mut entries: [Option<OpcodeMetadata>; 256] = [None; 256];
        let mut i = 0;
        while i < set.len() {
            let slot = set[i].opcode as usize;
            if entries[slot].is_some() {
                panic!("duplicate opcode in instruction set");
            }
            entries[slot] = Some(set[i]);
            i += 1;
        }
        Self { entries }
    }

    /// Looks up the metadata for an opcode byte.
    pub fn get(&self, opcode: u8) -> Option<&OpcodeMetadata> {
        self.entries[opcode as usize].as_ref()
    }

    /// Iterates over all defined opcodes in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = &OpcodeMetadata> {
        self.entries.iter().filter_map(Option::as_ref)
    }

    /// Finds the record for a mnemonic.
    pub fn find(&self, mnemonic: Mnemonic) -> Option<&OpcodeMetadata> {
        self.iter().find(|m| m.mnemonic == mnemonic)
    }

    /// Number of defined opcodes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no opcodes are defined.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The LS-8 opcode table.
pub static OPCODE_TABLE: OpcodeTable = OpcodeTable::new(&INSTRUCTION_SET);
