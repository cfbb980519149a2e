//! Fuzz target for the disassembler.
//!
//! This target feeds arbitrary byte sequences to the disassembler
//! to find edge cases and crashes in instruction decoding.

#![no_main]

use arbitrary::Arbitrary;
use ls8::disassembler::{disassemble, format_instruction};
use libfuzzer_sys::fuzz_target;

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    start: u8,
}

fuzz_target!(|input: FuzzInput| {
    // Memory is only 256 bytes
    if input.bytes.len() > 256 {
        return;
    }

    let lines = disassemble(&input.bytes, input.start);

    let mut total_size: usize = 0;
    let mut expected_address = input.start;

    for line in &lines {
        assert_eq!(line.address, expected_address);
        assert!(line.size_bytes() >= 1 && line.size_bytes() <= 3);
        assert!(!format_instruction(line).is_empty());

        total_size += line.size_bytes();
        expected_address = expected_address.wrapping_add(line.size_bytes() as u8);
    }

    // Every input byte is covered exactly once
    assert_eq!(total_size, input.bytes.len());
});
