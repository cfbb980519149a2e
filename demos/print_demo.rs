//! Print demo
//!
//! Demonstrates loading and running an LS-8 program.
//!
//! This example shows:
//! - Parsing `.ls8` program text
//! - Loading it into memory
//! - Stepping the CPU while printing trace lines
//! - Inspecting state after HLT

use ls8::disassembler::{disassemble, format_listing};
use ls8::{loader, BufferedOutput, CpuState, FlatMemory, CPU};

const PROGRAM: &str = "
# Print the numbers 3, 2, 1 using a counted loop
10000010 # LDI R0,3
00000000
00000011
10000010 # LDI R1,0
00000001
00000000
10000010 # LDI R2,LOOP
00000010
00001001
01000111 # LOOP: PRN R0
00000000
01100110 # DEC R0
00000000
10100111 # CMP R0,R1
00000000
00000001
01010110 # JNE R2
00000010
00000001 # HLT
";

fn main() {
    println!("LS-8 Emulator - Print Demo");
    println!("==========================\n");

    let program = match loader::parse_program(PROGRAM) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to parse program: {}", e);
            return;
        }
    };

    println!("Listing:");
    print!("{}", format_listing(&disassemble(&program, 0)));
    println!();

    let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
    if let Err(e) = cpu.load_program(0, &program) {
        eprintln!("Failed to load program: {}", e);
        return;
    }

    loop {
        println!("{}", cpu.trace());
        match cpu.step() {
            Ok(CpuState::Running) => {}
            Ok(CpuState::Halted) => break,
            Err(e) => {
                eprintln!("Execution error: {}", e);
                return;
            }
        }
    }

    println!("\nOutput:");
    print!("{}", cpu.output().as_str());
    println!(
        "\nHalted at 0x{:02X} after {} instructions",
        cpu.pc(),
        cpu.instructions_executed()
    );
}
