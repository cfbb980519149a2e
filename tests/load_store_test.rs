//! Comprehensive tests for LDI, LD, ST, PRN and PRA.
//!
//! Tests cover:
//! - LDI loads an immediate value
//! - LD reads memory at the address held in a register
//! - ST writes a register value to the address held in a register
//! - PRN prints decimal with a newline; PRA prints a raw character
//! - Self-modifying code sees its own stores

use ls8::{BufferedOutput, FlatMemory, MemoryBus, CPU};

const HLT: u8 = 0b0000_0001;
const LDI: u8 = 0b1000_0010;
const LD: u8 = 0b1000_0011;
const ST: u8 = 0b1000_0100;
const PRN: u8 = 0b0100_0111;
const PRA: u8 = 0b0100_1000;

fn setup_cpu(program: &[u8]) -> CPU<FlatMemory, BufferedOutput> {
    let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
    cpu.load_program(0, program).unwrap();
    cpu
}

// ========== LDI ==========

#[test]
fn test_ldi_every_register() {
    let mut program = Vec::new();
    for r in 0..7u8 {
        program.extend_from_slice(&[LDI, r, 10 + r]);
    }
    program.push(HLT);

    let mut cpu = setup_cpu(&program);
    cpu.run().unwrap();
    assert_eq!(cpu.registers(), [10, 11, 12, 13, 14, 15, 16, 0xF4]);
}

#[test]
fn test_ldi_leaves_memory_and_flags() {
    let mut cpu = setup_cpu(&[LDI, 0, 0xFF, HLT]);
    cpu.run().unwrap();
    assert_eq!(cpu.register(0), Some(0xFF));
    assert_eq!(cpu.flags(), ls8::Flags::default());
    assert_eq!(cpu.memory().read(0xFF), 0);
}

// ========== LD / ST ==========

#[test]
fn test_ld_reads_through_register() {
    let mut cpu = setup_cpu(&[
        LDI, 1, 0x80, // LDI R1,0x80
        LD, 0, 1, //     LD R0,R1
        HLT,
    ]);
    cpu.memory_mut().write(0x80, 0x5A);

    cpu.run().unwrap();
    assert_eq!(cpu.register(0), Some(0x5A));
    assert_eq!(cpu.register(1), Some(0x80));
}

#[test]
fn test_st_writes_through_register() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 0x90, // LDI R0,0x90 (address)
        LDI, 1, 42, //   LDI R1,42 (value)
        ST, 0, 1, //     ST R0,R1
        HLT,
    ]);

    cpu.run().unwrap();
    assert_eq!(cpu.memory().read(0x90), 42);
}

#[test]
fn test_st_then_ld_round_trip() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 0xC0, // LDI R0,0xC0
        LDI, 1, 7, //    LDI R1,7
        ST, 0, 1, //     ST R0,R1
        LD, 2, 0, //     LD R2,R0
        PRN, 2, //       PRN R2
        HLT,
    ]);

    cpu.run().unwrap();
    assert_eq!(cpu.register(2), Some(7));
    assert_eq!(cpu.output().as_str(), "7\n");
}

#[test]
fn test_ld_can_read_own_code() {
    let mut cpu = setup_cpu(&[LDI, 1, 0, LD, 0, 1, HLT]);
    cpu.run().unwrap();
    assert_eq!(cpu.register(0), Some(LDI));
}

#[test]
fn test_self_modifying_store() {
    // ST overwrites the PRN operand at address 13 so R2 is printed instead of R0
    let mut cpu = setup_cpu(&[
        LDI, 0, 13, //  0: LDI R0,13
        LDI, 1, 2, //   3: LDI R1,2
        LDI, 2, 99, //  6: LDI R2,99
        ST, 0, 1, //    9: ST R0,R1
        PRN, 0, //     12: PRN R0 -> PRN R2
        HLT,
    ]);

    cpu.run().unwrap();
    assert_eq!(cpu.output().as_str(), "99\n");
}

// ========== PRN / PRA ==========

#[test]
fn test_prn_prints_unsigned_decimal() {
    let mut cpu = setup_cpu(&[
        LDI, 0, 0, PRN, 0, //
        LDI, 0, 255, PRN, 0, //
        LDI, 0, 0x80, PRN, 0, //
        HLT,
    ]);

    cpu.run().unwrap();
    assert_eq!(cpu.output().as_str(), "0\n255\n128\n");
}

#[test]
fn test_pra_prints_characters_without_newline() {
    let mut cpu = setup_cpu(&[
        LDI, 0, b'H', PRA, 0, //
        LDI, 0, b'i', PRA, 0, //
        LDI, 0, b'\n', PRA, 0, //
        HLT,
    ]);

    cpu.run().unwrap();
    assert_eq!(cpu.output().as_str(), "Hi\n");
}

#[test]
fn test_output_through_mutable_reference() {
    let mut out = BufferedOutput::new();
    {
        let mut cpu = CPU::new(FlatMemory::new(), &mut out);
        cpu.load_program(0, &[LDI, 3, 12, PRN, 3, HLT]).unwrap();
        cpu.run().unwrap();
    }
    assert_eq!(out.as_str(), "12\n");
}
