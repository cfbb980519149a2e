//! # Program Loader
//!
//! Reads `.ls8` program text: one 8-digit binary byte per line, with `#`
//! comments and blank lines ignored.
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::path::Path;

use thiserror::Error;

use crate::memory::MEMORY_SIZE;

/// Errors that can occur while loading a program.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected an 8-digit binary byte, found {content:?}")]
    InvalidLine { line: usize, content: String },

    #[error("program is {len} bytes; memory holds {}", MEMORY_SIZE)]
    ProgramTooLarge { len: usize },
}

/// Parses `.ls8` text into program bytes.
///
/// Only the first whitespace-separated token of each line is read, so trailing
/// annotations without a `#` are tolerated.
///
/// # Examples
///
/// ```
/// use ls8::loader::parse_program;
///
/// let bytes = parse_program("10000010 # LDI R0,8\n00000000\n\n00001000\n").unwrap();
/// assert_eq!(bytes, vec![0b1000_0010, 0, 8]);
/// ```
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let code = raw.split('#').next().unwrap_or("").trim();
        let token = match code.split_whitespace().next() {
            Some(token) => token,
            None => continue,
        };

        let valid = token.len() == 8 && token.bytes().all(|b| b == b'0' || b == b'1');
        let byte = u8::from_str_radix(token, 2).ok().filter(|_| valid).ok_or_else(|| {
            LoadError::InvalidLine {
                line: index + 1,
                content: token.to_string(),
            }
        })?;
        bytes.push(byte);
    }

    if bytes.len() > MEMORY_SIZE {
        return Err(LoadError::ProgramTooLarge { len: bytes.len() });
    }

    log::debug!("parsed {} program bytes", bytes.len());
    Ok(bytes)
}

/// Reads and parses an `.ls8` file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let source = std::fs::read_to_string(path.as_ref())?;
    parse_program(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_only_lines_skipped() {
        let bytes = parse_program("# header\n   # indented\n00000001\n").unwrap();
        assert_eq!(bytes, vec![1]);
    }

    #[test]
    fn test_invalid_digit_reports_line() {
        let err = parse_program("00000001\n0000000x\n").unwrap_err();
        match err {
            LoadError::InvalidLine { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "0000000x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_width_rejected() {
        assert!(matches!(
            parse_program("101\n"),
            Err(LoadError::InvalidLine { line: 1, .. })
        ));
        assert!(matches!(
            parse_program("000000001\n"),
            Err(LoadError::InvalidLine { line: 1, .. })
        ));
    }

    #[test]
    fn test_too_large() {
        let source = "00000000\n".repeat(257);
        assert!(matches!(
            parse_program(&source),
            Err(LoadError::ProgramTooLarge { len: 257 })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_file("/nonexistent/program.ls8"),
            Err(LoadError::Io(_))
        ));
    }
}
