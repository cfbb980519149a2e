//! # LS-8 Emulator Core
//!
//! An emulator for the LS-8, a minimal 8-bit computer with 256 bytes of memory,
//! eight byte registers and a 34-instruction ISA.
//!
//! ## Quick Start
//!
//! ```rust
//! use ls8::{loader, BufferedOutput, FlatMemory, CPU};
//!
//! let program = loader::parse_program(
//!     "10000010 # LDI R0,200
//!      00000000
//!      11001000
//!      10000010 # LDI R1,100
//!      00000001
//!      01100100
//!      10100000 # ADD R0,R1
//!      00000000
//!      00000001
//!      01000111 # PRN R0
//!      00000000
//!      00000001 # HLT",
//! )
//! .unwrap();
//!
//! let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
//! cpu.load_program(0, &program).unwrap();
//! cpu.run().unwrap();
//!
//! // 300 wraps to 44
//! assert_eq!(cpu.output().as_str(), "44\n");
//! ```
//!
//! ## Modules
//!
//! - `cpu` - CPU state and the fetch-decode-execute loop
//! - `decoder` - Opcode lookup and instruction fetch
//! - `opcodes` - The opcode metadata table
//! - `alu` - Arithmetic, logic and compare
//! - `memory` - MemoryBus trait, FlatMemory and the memory map
//! - `registers` - Register file and flags
//! - `output` - Sinks for PRN/PRA
//! - `loader` - `.ls8` program text parsing
//! - `disassembler` - Machine code to assembly text
//! - `trace` - Debug snapshots

pub mod alu;
pub mod cpu;
pub mod decoder;
pub mod disassembler;
pub mod loader;
pub mod memory;
pub mod opcodes;
pub mod output;
pub mod registers;
pub mod trace;

#[cfg(feature = "wasm")]
pub mod wasm;

use thiserror::Error;

// Re-export public API
pub use alu::AluOp;
pub use cpu::{CpuState, CPU, INTERRUPT_COUNT};
pub use decoder::{Decoder, Instruction, UnknownOpcode};
pub use loader::LoadError;
pub use memory::{
    FlatMemory, MemoryBus, INTERRUPT_VECTOR_BASE, LOAD_ADDRESS, MEMORY_SIZE, STACK_TOP,
};
pub use opcodes::{Category, Mnemonic, OpcodeMetadata, OpcodeTable, INSTRUCTION_SET, OPCODE_TABLE};
pub use output::{BufferedOutput, CallbackOutput, Output, StdoutOutput, WriterOutput};
pub use registers::{Flags, RegisterFile, REGISTER_COUNT, SP};
pub use trace::TraceSnapshot;

/// Errors that can occur during CPU execution.
///
/// Every variant is fatal: the CPU halts and the PC is left on the faulting
/// instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The byte at `address` is not in the opcode table.
    #[error("unknown opcode {opcode:#010b} at {address:#04X}")]
    UnknownOpcode { address: u8, opcode: u8 },

    /// The PC (or an operand fetch) left the loaded program.
    #[error("program counter out of bounds: {address:#05X}")]
    ProgramCounterOutOfBounds { address: u16 },

    #[error("{mnemonic} by zero")]
    DivisionByZero { mnemonic: Mnemonic },

    /// The ALU was asked to run a non-ALU instruction. Indicates the decoder and
    /// ALU disagree; unreachable from valid programs.
    #[error("unsupported ALU operation: {0}")]
    UnsupportedAluOperation(Mnemonic),

    /// PUSH, CALL or INT with no room left in the stack region.
    #[error("stack overflow (SP = {sp:#04X})")]
    StackOverflow { sp: u8 },

    /// POP, RET or IRET with nothing on the stack.
    #[error("stack underflow (SP = {sp:#04X})")]
    StackUnderflow { sp: u8 },

    /// An operand named a register above R7.
    #[error("invalid register R{index} in instruction at {address:#04X}")]
    InvalidRegister { address: u8, index: u8 },

    #[error("invalid interrupt number {0}")]
    InvalidInterrupt(u8),

    /// A bulk load would run past the end of memory.
    #[error("{len} bytes at {start:#04X} do not fit in memory")]
    AddressOutOfBounds { start: u8, len: usize },
}
