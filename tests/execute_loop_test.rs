//! Execution loop tests
//!
//! Verifies the fetch-decode-execute cycle, PC advancement, halting, and the
//! faults that terminate a run.

use ls8::{BufferedOutput, CpuState, ExecutionError, FlatMemory, Mnemonic, CPU};

const NOP: u8 = 0b0000_0000;
const HLT: u8 = 0b0000_0001;
const LDI: u8 = 0b1000_0010;
const PRN: u8 = 0b0100_0111;
const ADD: u8 = 0b1010_0000;
const DIV: u8 = 0b1010_0011;
const JMP: u8 = 0b0101_0100;

/// Helper function to create a CPU with `program` loaded at address 0
fn setup_cpu(program: &[u8]) -> CPU<FlatMemory, BufferedOutput> {
    let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
    cpu.load_program(0, program).unwrap();
    cpu
}

// ========== Reference Programs ==========

#[test]
fn test_print8() {
    let mut cpu = setup_cpu(&[
        LDI, 0b0000_0000, 0b0000_1000, // LDI R0,8
        PRN, 0b0000_0000, //              PRN R0
        HLT, //                           HLT
    ]);

    assert_eq!(cpu.run(), Ok(3));
    assert_eq!(cpu.output().as_str(), "8\n");
    assert_eq!(cpu.pc(), 5, "PC should rest on the HLT instruction");
    assert_eq!(cpu.state(), CpuState::Halted);
}

#[test]
fn test_add_wraps_to_eight_bits() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 200, // LDI R0,200
        LDI, 1, 100, // LDI R1,100
        ADD, 0, 1, //   ADD R0,R1
        PRN, 0, //      PRN R0
        HLT,
    ]);

    cpu.run().unwrap();
    assert_eq!(cpu.output().as_str(), "44\n");
    assert_eq!(cpu.register(1), Some(100));
}

#[test]
fn test_division_by_zero_stops_before_print() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 5, // LDI R0,5
        LDI, 1, 0, // LDI R1,0
        DIV, 0, 1, // DIV R0,R1
        PRN, 0, //    PRN R0
        HLT,
    ]);

    assert_eq!(
        cpu.run(),
        Err(ExecutionError::DivisionByZero {
            mnemonic: Mnemonic::Div
        })
    );
    assert_eq!(cpu.output().as_str(), "");
    assert_eq!(cpu.pc(), 6, "PC should stay on the faulting DIV");
    assert_eq!(cpu.register(0), Some(5));
    assert!(cpu.is_halted());
}

#[test]
fn test_running_off_the_end_faults() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 1, // LDI R0,1
        PRN, 0, //    PRN R0 (no HLT)
    ]);

    assert_eq!(
        cpu.run(),
        Err(ExecutionError::ProgramCounterOutOfBounds { address: 5 })
    );
    assert_eq!(cpu.output().as_str(), "1\n");
    assert_eq!(cpu.instructions_executed(), 2);
}

// ========== PC Advancement ==========

#[test]
fn test_step_advances_by_instruction_size() {
    let mut cpu = setup_cpu(&[NOP, PRN, 0, LDI, 0, 0, HLT]);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 1, "NOP advances by 1");
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 3, "one-operand instruction advances by 2");
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 6, "two-operand instruction advances by 3");
}

#[test]
fn test_jump_is_not_also_advanced() {
    let mut cpu = setup_cpu(&[
        LDI, 1, 7, // LDI R1,7
        JMP, 1, //    JMP R1
        HLT, HLT, // never reached
        HLT, //       address 7
    ]);

    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 7, "JMP should land exactly on its target");
}

#[test]
fn test_last_instruction_at_end_of_memory() {
    let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
    cpu.load_program(0xFE, &[NOP, NOP]).unwrap();
    assert_eq!(cpu.pc(), 0xFE);

    cpu.step().unwrap();
    assert_eq!(
        cpu.step(),
        Err(ExecutionError::ProgramCounterOutOfBounds { address: 0x100 })
    );
    assert_eq!(cpu.pc(), 0xFF);
}

// ========== Faults ==========

#[test]
fn test_unknown_opcode_reports_address() {
    let mut cpu = setup_cpu(&[NOP, 0b1111_1111, HLT]);

    cpu.step().unwrap();
    assert_eq!(
        cpu.step(),
        Err(ExecutionError::UnknownOpcode {
            address: 1,
            opcode: 0xFF
        })
    );
    assert!(cpu.is_halted());
}

#[test]
fn test_truncated_operand_faults() {
    let mut cpu = setup_cpu(&[LDI, 0]);
    assert_eq!(
        cpu.step(),
        Err(ExecutionError::ProgramCounterOutOfBounds { address: 2 })
    );
}

#[test]
fn test_invalid_register_operand() {
    let mut cpu = setup_cpu(&[LDI, 8, 1, HLT]);
    assert_eq!(
        cpu.step(),
        Err(ExecutionError::InvalidRegister {
            address: 0,
            index: 8
        })
    );
}

#[test]
fn test_jump_outside_program_faults() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 0x80, // LDI R0,0x80
        JMP, 0, //       JMP R0
    ]);

    assert_eq!(
        cpu.run(),
        Err(ExecutionError::ProgramCounterOutOfBounds { address: 0x80 })
    );
}

#[test]
fn test_halted_after_fault_stays_halted() {
    let mut cpu = setup_cpu(&[0b1111_1111]);
    assert!(cpu.step().is_err());
    assert_eq!(cpu.step(), Ok(CpuState::Halted));
    assert_eq!(cpu.run(), Ok(0));
}

// ========== Run Drivers ==========

#[test]
fn test_run_for_stops_at_budget() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 0, // LDI R0,0
        JMP, 0, //    JMP R0 (loop forever)
    ]);

    assert_eq!(cpu.run_for(10), Ok(10));
    assert!(!cpu.is_halted());
    assert_eq!(cpu.instructions_executed(), 10);
}

#[test]
fn test_run_for_stops_early_on_halt() {
    let mut cpu = setup_cpu(&[NOP, NOP, HLT]);
    assert_eq!(cpu.run_for(100), Ok(3));
    assert!(cpu.is_halted());
}
