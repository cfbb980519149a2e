//! Fuzz target for CPU execution.
//!
//! This target creates arbitrary register states and memory contents,
//! then runs a bounded number of steps to find panics and invariant breaks.

#![no_main]

use arbitrary::Arbitrary;
use ls8::{BufferedOutput, CpuState, FlatMemory, Flags, CPU, STACK_TOP};
use libfuzzer_sys::fuzz_target;

/// Arbitrary CPU initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    /// R0-R6 (R7 stays at the stack top)
    registers: [u8; 7],
    /// Flags byte (0b00000LGE)
    flags: u8,
    /// Interrupt requests to raise before running
    interrupts: u8,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    /// Program bytes loaded at address 0
    program: Vec<u8>,
    /// Interrupt vector table contents
    vectors: [u8; 8],
    /// Number of steps to run
    steps: u8,
}

fuzz_target!(|input: FuzzInput| {
    if input.program.is_empty() || input.program.len() > STACK_TOP as usize {
        return;
    }

    let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
    cpu.load_program(0, &input.program).unwrap();
    for (n, &handler) in input.vectors.iter().enumerate() {
        cpu.set_interrupt_vector(n as u8, handler).unwrap();
    }

    for (i, &value) in input.cpu_state.registers.iter().enumerate() {
        cpu.set_register(i as u8, value);
    }
    cpu.set_flags(Flags::from_byte(input.cpu_state.flags));
    for n in 0..8 {
        if input.cpu_state.interrupts & (1 << n) != 0 {
            cpu.request_interrupt(n).unwrap();
        }
    }

    for _ in 0..input.steps {
        let pc_before = cpu.pc();
        match cpu.step() {
            Ok(CpuState::Running) => {}
            Ok(CpuState::Halted) => break,
            Err(_) => {
                // Faults halt without moving the PC
                assert!(cpu.is_halted());
                assert_eq!(cpu.pc(), pc_before);
                break;
            }
        }
    }
});
