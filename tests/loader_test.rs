//! Program loader tests
//!
//! Parses `.ls8` text, loads it into a CPU and runs it.

use ls8::loader::{load_file, parse_program};
use ls8::{BufferedOutput, FlatMemory, LoadError, CPU};

const PRINT8: &str = "\
# print8.ls8
#
# Prints the number 8

10000010 # LDI R0,8
00000000
00001000
01000111 # PRN R0
00000000
00000001 # HLT
";

const MULT: &str = "\
10000010 # LDI R0,8
00000000
00001000
10000010 # LDI R1,9
00000001
00001001
10100010 # MUL R0,R1
00000000
00000001
01000111 # PRN R0
00000000
00000001 # HLT
";

fn run_source(source: &str) -> String {
    let program = parse_program(source).unwrap();
    let mut cpu = CPU::new(FlatMemory::new(), BufferedOutput::new());
    cpu.load_program(0, &program).unwrap();
    cpu.run().unwrap();
    cpu.output().as_str().to_string()
}

#[test]
fn test_print8_source() {
    assert_eq!(
        parse_program(PRINT8).unwrap(),
        vec![0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001]
    );
    assert_eq!(run_source(PRINT8), "8\n");
}

#[test]
fn test_mult_source() {
    assert_eq!(run_source(MULT), "72\n");
}

#[test]
fn test_empty_and_comment_only_source() {
    assert!(parse_program("").unwrap().is_empty());
    assert!(parse_program("# nothing\n\n   \n#00000001\n").unwrap().is_empty());
}

#[test]
fn test_crlf_and_indentation() {
    let bytes = parse_program("  00000001\r\n\t00000000 \r\n").unwrap();
    assert_eq!(bytes, vec![1, 0]);
}

#[test]
fn test_invalid_lines_report_line_number() {
    let cases = [
        ("00000001\n0000001\n", 2, "0000001"),
        ("000000010\n", 1, "000000010"),
        ("00000001\n\n0000000x # bad\n", 3, "0000000x"),
        ("LDI R0,8\n", 1, "LDI"),
    ];

    for (source, line, content) in cases {
        match parse_program(source) {
            Err(LoadError::InvalidLine { line: l, content: c }) => {
                assert_eq!(l, line, "{:?}", source);
                assert_eq!(c, content);
            }
            other => panic!("expected InvalidLine for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_program_larger_than_memory() {
    let source = "00000000\n".repeat(257);
    assert!(matches!(
        parse_program(&source),
        Err(LoadError::ProgramTooLarge { len: 257 })
    ));
    assert_eq!(parse_program(&"00000000\n".repeat(256)).unwrap().len(), 256);
}

#[test]
fn test_load_file_round_trip() {
    let path = std::env::temp_dir().join(format!("ls8-loader-{}.ls8", std::process::id()));
    std::fs::write(&path, PRINT8).unwrap();

    let bytes = load_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(bytes.len(), 6);
}

#[test]
fn test_load_missing_file() {
    let err = load_file("/nonexistent/dir/program.ls8").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    assert!(err.to_string().starts_with("I/O error"));
}
