//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the LS-8 processor state and
//! the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: R0-R7, with R7 as the stack pointer
//! - **Program counter** (PC): 8-bit address of the next instruction
//! - **Flags**: E, G, L, written only by CMP
//! - **Program extent**: the loaded address range; fetching outside it is a fault
//! - **Interrupt state**: pending hardware requests and how many handlers are nested
//!
//! ## Execution Model
//!
//! - `step()`: Execute one instruction
//! - `run()`: Execute until HLT or a fault
//! - `run_for()`: Execute at most N instructions
//!
//! Each instruction handler returns a [`Next`] value describing where the PC goes.
//! `step()` is the only place the PC is assigned, so an instruction that jumps can
//! never also receive the default advance.

use std::ops::Range;

use crate::alu::{self, AluOp};
use crate::decoder::{Decoder, Instruction};
use crate::memory::{INTERRUPT_VECTOR_BASE, LOAD_ADDRESS, STACK_TOP};
use crate::opcodes::Mnemonic;
use crate::registers::{Flags, RegisterFile, REGISTER_COUNT};
use crate::trace::TraceSnapshot;
use crate::{ExecutionError, MemoryBus, Output};

/// Number of interrupt lines (I0-I7).
pub const INTERRUPT_COUNT: u8 = 8;

/// Bytes INT pushes: flags, return address, R0-R7.
const INTERRUPT_FRAME_SIZE: u16 = 2 + REGISTER_COUNT as u16;

/// Execution state. `Halted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Halted,
}

/// Where the PC goes after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    /// Fall through by `1 + operand_count`.
    Advance,
    /// Set the PC to this address.
    Jump(u8),
    /// Stop; the PC stays on the current instruction.
    Halt,
}

/// LS-8 CPU state and execution context.
///
/// Generic over the memory implementation (`MemoryBus`) and the output sink
/// (`Output`) used by PRN and PRA.
///
/// # Examples
///
/// ```
/// use ls8::{BufferedOutput, FlatMemory, CPU};
///
/// let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
/// cpu.load_program(0, &[
///     0b1000_0010, 0b0000_0000, 0b0000_1000, // LDI R0,8
///     0b0100_0111, 0b0000_0000,              // PRN R0
///     0b0000_0001,                           // HLT
/// ]).unwrap();
///
/// cpu.run().unwrap();
/// assert_eq!(cpu.output().as_str(), "8\n");
/// assert_eq!(cpu.pc(), 5);
/// assert!(cpu.is_halted());
/// ```
pub struct CPU<M: MemoryBus, O: Output> {
    /// R0-R7
    pub(crate) registers: RegisterFile,

    /// Program counter (address of next instruction)
    pub(crate) pc: u8,

    /// Comparison flags
    pub(crate) flags: Flags,

    pub(crate) state: CpuState,

    /// Loaded address range; instructions are only fetched from here
    pub(crate) program: Range<u16>,

    /// Bit n set = hardware interrupt n requested
    pub(crate) pending_interrupts: u8,

    /// Handlers entered and not yet left through IRET
    pub(crate) interrupt_depth: u8,

    /// Total instructions executed
    pub(crate) instructions: u64,

    decoder: Decoder,

    /// Memory bus implementation
    pub(crate) memory: M,

    output: O,
}

impl<M: MemoryBus, O: Output> CPU<M, O> {
    /// Creates a CPU using the standard LS-8 opcode table.
    ///
    /// The CPU starts in its power-on state: PC at [`LOAD_ADDRESS`], R0-R6 zero,
    /// R7 at [`STACK_TOP`], flags clear, and no program extent (so the first
    /// `step()` fails until a program is loaded).
    pub fn new(memory: M, output: O) -> Self {
        Self::with_decoder(memory, output, Decoder::default())
    }

    /// Creates a CPU with an explicitly supplied decoder.
    pub fn with_decoder(memory: M, output: O, decoder: Decoder) -> Self {
        Self {
            registers: RegisterFile::new(),
            pc: LOAD_ADDRESS,
            flags: Flags::default(),
            state: CpuState::Running,
            program: 0..0,
            pending_interrupts: 0,
            interrupt_depth: 0,
            instructions: 0,
            decoder,
            memory,
            output,
        }
    }

    /// Writes program bytes into memory starting at `start` and marks them as
    /// executable.
    ///
    /// The first load also moves the PC to `start`. Later loads widen the
    /// executable extent to cover both ranges.
    pub fn load_program(&mut self, start: u8, bytes: &[u8]) -> Result<(), ExecutionError> {
        self.memory.load(start, bytes)?;

        let loaded = start as u16..start as u16 + bytes.len() as u16;
        if self.program.is_empty() {
            self.program = loaded;
            self.pc = start;
        } else if !loaded.is_empty() {
            self.program = self.program.start.min(loaded.start)..self.program.end.max(loaded.end);
        }

        log::debug!(
            "loaded {} bytes at {:#04X}; program extent {:#04X}..{:#04X}",
            bytes.len(),
            start,
            self.program.start,
            self.program.end
        );
        Ok(())
    }

    /// Stores the handler address for interrupt `n` in the vector table.
    pub fn set_interrupt_vector(&mut self, n: u8, handler: u8) -> Result<(), ExecutionError> {
        if n >= INTERRUPT_COUNT {
            return Err(ExecutionError::InvalidInterrupt(n));
        }
        self.memory.write(INTERRUPT_VECTOR_BASE + n, handler);
        Ok(())
    }

    /// Raises hardware interrupt `n`. It is serviced before the next
    /// instruction once no other handler is active.
    pub fn request_interrupt(&mut self, n: u8) -> Result<(), ExecutionError> {
        if n >= INTERRUPT_COUNT {
            return Err(ExecutionError::InvalidInterrupt(n));
        }
        self.pending_interrupts |= 1 << n;
        Ok(())
    }

    /// Executes one instruction (or services one pending interrupt).
    ///
    /// Returns the state after the step. Once halted, further calls do nothing
    /// and return `Ok(CpuState::Halted)`.
    ///
    /// # Errors
    ///
    /// Any fault halts the CPU and is returned. The PC is left on the faulting
    /// instruction.
    pub fn step(&mut self) -> Result<CpuState, ExecutionError> {
        if self.state == CpuState::Halted {
            return Ok(CpuState::Halted);
        }

        match self.execute_step() {
            Ok(state) => Ok(state),
            Err(err) => {
                log::warn!("fault at {:#04X}: {}", self.pc, err);
                self.state = CpuState::Halted;
                Err(err)
            }
        }
    }

    /// Runs until HLT or a fault. Returns the number of instructions executed
    /// by this call.
    pub fn run(&mut self) -> Result<u64, ExecutionError> {
        let start = self.instructions;
        while self.step()? == CpuState::Running {}
        Ok(self.instructions - start)
    }

    /// Runs at most `max_instructions` instructions, stopping early on HLT.
    ///
    /// Returns the number executed. Use [`CPU::is_halted`] to tell whether the
    /// program finished or the budget ran out.
    pub fn run_for(&mut self, max_instructions: u64) -> Result<u64, ExecutionError> {
        let start = self.instructions;
        while self.state == CpuState::Running && self.instructions - start < max_instructions {
            self.step()?;
        }
        Ok(self.instructions - start)
    }

    /// Returns the CPU to its power-on register state. Memory and the program
    /// extent are kept; the PC goes back to the start of the program.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::new();
        self.pc = if self.program.is_empty() {
            LOAD_ADDRESS
        } else {
            self.program.start as u8
        };
        self.flags = Flags::default();
        self.state = CpuState::Running;
        self.pending_interrupts = 0;
        self.interrupt_depth = 0;
        self.instructions = 0;
    }

    /// Captures PC, the next three memory bytes and all registers.
    pub fn trace(&self) -> TraceSnapshot {
        TraceSnapshot {
            pc: self.pc,
            bytes: [
                self.memory.read(self.pc),
                self.memory.read(self.pc.wrapping_add(1)),
                self.memory.read(self.pc.wrapping_add(2)),
            ],
            registers: self.registers.as_array(),
            flags: self.flags,
        }
    }

    fn execute_step(&mut self) -> Result<CpuState, ExecutionError> {
        if let Some(n) = self.next_pending_interrupt() {
            self.pending_interrupts &= !(1 << n);
            log::debug!("servicing interrupt I{} at {:#04X}", n, self.pc);
            self.pc = self.enter_interrupt(n, self.pc)?;
            return Ok(self.state);
        }

        let instr = self
            .decoder
            .decode_at(&self.memory, self.pc, &self.program)?;
        log::trace!(
            "{:#04X}: {} {:02X?}",
            instr.address,
            instr.mnemonic(),
            instr.operand_bytes()
        );

        match self.execute(&instr)? {
            Next::Advance => {
                let next = self.pc as u16 + instr.metadata.size_bytes() as u16;
                self.pc = u8::try_from(next)
                    .map_err(|_| ExecutionError::ProgramCounterOutOfBounds { address: next })?;
            }
            Next::Jump(target) => self.pc = target,
            Next::Halt => {
                log::debug!("halted at {:#04X}", self.pc);
                self.state = CpuState::Halted;
            }
        }

        self.instructions += 1;
        Ok(self.state)
    }

    fn execute(&mut self, instr: &Instruction) -> Result<Next, ExecutionError> {
        match instr.mnemonic() {
            Mnemonic::Nop => Ok(Next::Advance),
            Mnemonic::Hlt => Ok(Next::Halt),

            Mnemonic::Add
            | Mnemonic::Sub
            | Mnemonic::Mul
            | Mnemonic::Div
            | Mnemonic::Mod
            | Mnemonic::And
            | Mnemonic::Or
            | Mnemonic::Xor
            | Mnemonic::Not
            | Mnemonic::Shl
            | Mnemonic::Shr
            | Mnemonic::Inc
            | Mnemonic::Dec
            | Mnemonic::Cmp => self.execute_alu(instr),

            Mnemonic::Ldi => {
                *self.reg_mut(instr, instr.a())? = instr.b();
                Ok(Next::Advance)
            }
            Mnemonic::Ld => {
                let value = self.memory.read(self.reg(instr, instr.b())?);
                *self.reg_mut(instr, instr.a())? = value;
                Ok(Next::Advance)
            }
            Mnemonic::St => {
                let addr = self.reg(instr, instr.a())?;
                let value = self.reg(instr, instr.b())?;
                self.memory.write(addr, value);
                Ok(Next::Advance)
            }

            Mnemonic::Prn => {
                let value = self.reg(instr, instr.a())?;
                self.output.print_number(value);
                Ok(Next::Advance)
            }
            Mnemonic::Pra => {
                let value = self.reg(instr, instr.a())?;
                self.output.print_char(value);
                Ok(Next::Advance)
            }

            Mnemonic::Push => {
                let value = self.reg(instr, instr.a())?;
                self.push(value)?;
                Ok(Next::Advance)
            }
            Mnemonic::Pop => {
                self.reg(instr, instr.a())?;
                let value = self.pop()?;
                *self.reg_mut(instr, instr.a())? = value;
                Ok(Next::Advance)
            }

            Mnemonic::Call => {
                let target = self.reg(instr, instr.a())?;
                let ret = Self::return_address(instr)?;
                self.push(ret)?;
                Ok(Next::Jump(target))
            }
            Mnemonic::Ret => Ok(Next::Jump(self.pop()?)),
            Mnemonic::Jmp => Ok(Next::Jump(self.reg(instr, instr.a())?)),
            Mnemonic::Jeq => self.branch(instr, self.flags.equal),
            Mnemonic::Jne => self.branch(instr, !self.flags.equal),
            Mnemonic::Jgt => self.branch(instr, self.flags.greater),
            Mnemonic::Jlt => self.branch(instr, self.flags.less),
            Mnemonic::Jge => self.branch(instr, self.flags.greater || self.flags.equal),
            Mnemonic::Jle => self.branch(instr, self.flags.less || self.flags.equal),

            Mnemonic::Int => {
                let n = self.reg(instr, instr.a())?;
                let ret = Self::return_address(instr)?;
                Ok(Next::Jump(self.enter_interrupt(n, ret)?))
            }
            Mnemonic::Iret => Ok(Next::Jump(self.exit_interrupt()?)),
        }
    }

    fn execute_alu(&mut self, instr: &Instruction) -> Result<Next, ExecutionError> {
        let op = AluOp::try_from(instr.mnemonic())?;
        let operand = if op.is_unary() {
            0
        } else {
            self.reg(instr, instr.b())?
        };

        let address = instr.address;
        let index = instr.a();
        let dest = self
            .registers
            .get_mut(index)
            .ok_or(ExecutionError::InvalidRegister { address, index })?;
        alu::apply(op, dest, operand, &mut self.flags)?;
        Ok(Next::Advance)
    }

    fn branch(&self, instr: &Instruction, taken: bool) -> Result<Next, ExecutionError> {
        let target = self.reg(instr, instr.a())?;
        Ok(if taken { Next::Jump(target) } else { Next::Advance })
    }

    /// Address of the instruction after `instr`.
    fn return_address(instr: &Instruction) -> Result<u8, ExecutionError> {
        let next = instr.address as u16 + instr.metadata.size_bytes() as u16;
        u8::try_from(next).map_err(|_| ExecutionError::ProgramCounterOutOfBounds { address: next })
    }

    fn reg(&self, instr: &Instruction, index: u8) -> Result<u8, ExecutionError> {
        self.registers
            .get(index)
            .ok_or(ExecutionError::InvalidRegister {
                address: instr.address,
                index,
            })
    }

    fn reg_mut(&mut self, instr: &Instruction, index: u8) -> Result<&mut u8, ExecutionError> {
        self.registers
            .get_mut(index)
            .ok_or(ExecutionError::InvalidRegister {
                address: instr.address,
                index,
            })
    }

    // ========== Stack ==========

    /// Lowest address the stack may occupy: the end of the loaded program,
    /// capped at the stack top.
    pub fn stack_limit(&self) -> u8 {
        self.program.end.min(STACK_TOP as u16) as u8
    }

    /// Free stack bytes below the stack pointer.
    fn stack_room(&self) -> u16 {
        let sp = self.registers.sp();
        if sp >= self.stack_limit() && sp <= STACK_TOP {
            (sp - self.stack_limit()) as u16
        } else {
            0
        }
    }

    /// Bytes currently on the stack.
    fn stack_depth(&self) -> u16 {
        let sp = self.registers.sp();
        if sp >= self.stack_limit() && sp <= STACK_TOP {
            (STACK_TOP - sp) as u16
        } else {
            0
        }
    }

    fn push(&mut self, value: u8) -> Result<(), ExecutionError> {
        let sp = self.registers.sp();
        if self.stack_room() == 0 {
            return Err(ExecutionError::StackOverflow { sp });
        }
        let sp = sp - 1;
        self.registers.set_sp(sp);
        self.memory.write(sp, value);
        Ok(())
    }

    fn pop(&mut self) -> Result<u8, ExecutionError> {
        let sp = self.registers.sp();
        if self.stack_depth() == 0 {
            return Err(ExecutionError::StackUnderflow { sp });
        }
        let value = self.memory.read(sp);
        self.registers.set_sp(sp + 1);
        Ok(value)
    }

    // ========== Interrupts ==========

    fn next_pending_interrupt(&self) -> Option<u8> {
        if self.interrupt_depth > 0 || self.pending_interrupts == 0 {
            None
        } else {
            Some(self.pending_interrupts.trailing_zeros() as u8)
        }
    }

    /// Pushes flags, `return_pc` and R0-R7, then returns the handler address
    /// for interrupt `n`.
    fn enter_interrupt(&mut self, n: u8, return_pc: u8) -> Result<u8, ExecutionError> {
        if n >= INTERRUPT_COUNT {
            return Err(ExecutionError::InvalidInterrupt(n));
        }
        if self.stack_room() < INTERRUPT_FRAME_SIZE {
            return Err(ExecutionError::StackOverflow {
                sp: self.registers.sp(),
            });
        }

        let saved = self.registers.as_array();
        self.push(self.flags.to_byte())?;
        self.push(return_pc)?;
        for value in saved {
            self.push(value)?;
        }

        self.interrupt_depth = self.interrupt_depth.saturating_add(1);
        Ok(self.memory.read(INTERRUPT_VECTOR_BASE + n))
    }

    /// Pops the frame pushed by `enter_interrupt` and returns the saved PC.
    ///
    /// The saved R7 is discarded: popping the full frame already restores the
    /// stack pointer to its pre-interrupt value.
    fn exit_interrupt(&mut self) -> Result<u8, ExecutionError> {
        if self.stack_depth() < INTERRUPT_FRAME_SIZE {
            return Err(ExecutionError::StackUnderflow {
                sp: self.registers.sp(),
            });
        }

        self.pop()?;
        for index in (0..REGISTER_COUNT as u8 - 1).rev() {
            let value = self.pop()?;
            self.registers.set(index, value);
        }
        let pc = self.pop()?;
        self.flags = Flags::from_byte(self.pop()?);

        self.interrupt_depth = self.interrupt_depth.saturating_sub(1);
        Ok(pc)
    }

    // ========== Getters ==========

    /// Returns the program counter value.
    pub fn pc(&self) -> u8 {
        self.pc
    }

    /// Returns the stack pointer (R7).
    pub fn sp(&self) -> u8 {
        self.registers.sp()
    }

    /// Returns register `index`, or `None` if `index > 7`.
    pub fn register(&self, index: u8) -> Option<u8> {
        self.registers.get(index)
    }

    /// Returns R0-R7.
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.registers.as_array()
    }

    /// Returns the comparison flags.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// True while an interrupt handler is running.
    pub fn in_interrupt(&self) -> bool {
        self.interrupt_depth > 0
    }

    /// Number of nested handlers currently running.
    pub fn interrupt_depth(&self) -> u8 {
        self.interrupt_depth
    }

    /// Bit mask of requested, not yet serviced hardware interrupts.
    pub fn pending_interrupts(&self) -> u8 {
        self.pending_interrupts
    }

    /// Total instructions executed since creation or the last reset.
    pub fn instructions_executed(&self) -> u64 {
        self.instructions
    }

    /// The executable address range.
    pub fn program_extent(&self) -> Range<u16> {
        self.program.clone()
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    // ========== Setters ==========

    /// Sets register `index`. Returns `false` if `index > 7`.
    pub fn set_register(&mut self, index: u8, value: u8) -> bool {
        self.registers.set(index, value)
    }

    pub fn set_pc(&mut self, pc: u8) {
        self.pc = pc;
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferedOutput, FlatMemory};

    fn cpu_with(program: &[u8]) -> CPU<FlatMemory, BufferedOutput> {
        let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
        cpu.load_program(0, program).unwrap();
        cpu
    }

    #[test]
    fn test_cpu_initialization() {
        let cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());

        assert_eq!(cpu.pc(), 0x00);
        assert_eq!(cpu.sp(), 0xF4);
        assert_eq!(cpu.registers(), [0, 0, 0, 0, 0, 0, 0, 0xF4]);
        assert_eq!(cpu.flags(), Flags::default());
        assert_eq!(cpu.state(), CpuState::Running);
        assert_eq!(cpu.instructions_executed(), 0);
        assert!(cpu.program_extent().is_empty());
    }

    #[test]
    fn test_step_without_program_faults() {
        let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
        assert_eq!(
            cpu.step(),
            Err(ExecutionError::ProgramCounterOutOfBounds { address: 0 })
        );
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_halted_cpu_stays_halted() {
        let mut cpu = cpu_with(&[0b0000_0001]);
        assert_eq!(cpu.step(), Ok(CpuState::Halted));
        assert_eq!(cpu.step(), Ok(CpuState::Halted));
        assert_eq!(cpu.instructions_executed(), 1);
        assert_eq!(cpu.pc(), 0);
    }

    #[test]
    fn test_load_widens_extent() {
        let mut cpu = cpu_with(&[0x00, 0x00]);
        cpu.load_program(0x10, &[0x01]).unwrap();
        assert_eq!(cpu.program_extent(), 0..0x11);
        assert_eq!(cpu.stack_limit(), 0x11);
        assert_eq!(cpu.pc(), 0);
    }

    #[test]
    fn test_stack_limit_capped_at_stack_top() {
        let mut cpu = cpu_with(&[0x01]);
        cpu.load_program(0xF8, &[0x00; 8]).unwrap();
        assert_eq!(cpu.stack_limit(), STACK_TOP);
    }

    #[test]
    fn test_reset_keeps_memory() {
        let mut cpu = cpu_with(&[0b1000_0010, 0x00, 0x09, 0b0000_0001]);
        cpu.run().unwrap();
        assert_eq!(cpu.register(0), Some(9));

        cpu.reset();
        assert_eq!(cpu.register(0), Some(0));
        assert_eq!(cpu.pc(), 0);
        assert!(!cpu.is_halted());
        assert_eq!(cpu.memory().read(2), 0x09);
    }

    #[test]
    fn test_trace_snapshot() {
        let cpu = cpu_with(&[0b1000_0010, 0x00, 0x08]);
        let snap = cpu.trace();
        assert_eq!(snap.pc, 0);
        assert_eq!(snap.bytes, [0x82, 0x00, 0x08]);
        assert_eq!(snap.registers[7], 0xF4);
    }
}
