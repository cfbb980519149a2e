//! Output sinks for PRN and PRA.
//!
//! The CPU writes through the [`Output`] trait so the same program can print to
//! a terminal, into a test buffer, or to a JavaScript callback.

use std::io::Write;

/// Destination for the machine's print instructions.
pub trait Output {
    /// PRN: the value as an unsigned decimal integer followed by a newline.
    fn print_number(&mut self, value: u8);

    /// PRA: the single character whose code point is `value`, no terminator.
    fn print_char(&mut self, value: u8);
}

impl<O: Output + ?Sized> Output for &mut O {
    fn print_number(&mut self, value: u8) {
        (**self).print_number(value);
    }

    fn print_char(&mut self, value: u8) {
        (**self).print_char(value);
    }
}

/// Writes to any [`std::io::Write`], flushing after each character.
///
/// Write failures (a closed pipe, a full disk) do not stop the machine. The
/// first one is logged at `warn`, and all of them are counted in
/// [`WriterOutput::write_errors`].
#[derive(Debug)]
pub struct WriterOutput<W: Write> {
    writer: W,
    write_errors: u64,
}

/// [`WriterOutput`] on the process's standard output.
pub type StdoutOutput = WriterOutput<std::io::Stdout>;

impl StdoutOutput {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> WriterOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            write_errors: 0,
        }
    }

    /// Number of prints that failed to reach the writer.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn record(&mut self, result: std::io::Result<()>) {
        if let Err(err) = result {
            if self.write_errors == 0 {
                log::warn!("output write failed: {}", err);
            }
            self.write_errors += 1;
        }
    }
}

impl<W: Write> Output for WriterOutput<W> {
    fn print_number(&mut self, value: u8) {
        let result = writeln!(self.writer, "{}", value);
        self.record(result);
    }

    fn print_char(&mut self, value: u8) {
        let result = write!(self.writer, "{}", value as char).and_then(|_| self.writer.flush());
        self.record(result);
    }
}

/// Captures output in memory.
///
/// # Examples
///
/// ```
/// use ls8::{BufferedOutput, Output};
///
/// let mut out = BufferedOutput::new();
/// out.print_number(8);
/// out.print_char(b'A');
/// assert_eq!(out.as_str(), "8\nA");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferedOutput {
    text: String,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Takes the captured text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

impl Output for BufferedOutput {
    fn print_number(&mut self, value: u8) {
        self.text.push_str(&value.to_string());
        self.text.push('\n');
    }

    fn print_char(&mut self, value: u8) {
        self.text.push(value as char);
    }
}

/// Forwards each printed fragment to a closure.
pub struct CallbackOutput<F: FnMut(&str)> {
    on_output: F,
}

impl<F: FnMut(&str)> CallbackOutput<F> {
    pub fn new(on_output: F) -> Self {
        Self { on_output }
    }
}

impl<F: FnMut(&str)> Output for CallbackOutput<F> {
    fn print_number(&mut self, value: u8) {
        (self.on_output)(&format!("{}\n", value));
    }

    fn print_char(&mut self, value: u8) {
        let mut buf = [0u8; 4];
        (self.on_output)((value as char).encode_utf8(&mut buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_take() {
        let mut out = BufferedOutput::new();
        out.print_number(255);
        assert_eq!(out.take(), "255\n");
        assert_eq!(out.as_str(), "");
    }

    #[test]
    fn test_callback_output() {
        let mut seen = Vec::new();
        {
            let mut out = CallbackOutput::new(|s: &str| seen.push(s.to_string()));
            out.print_char(b'h');
            out.print_number(0);
        }
        assert_eq!(seen, vec!["h".to_string(), "0\n".to_string()]);
    }

    #[test]
    fn test_writer_output() {
        let mut out = WriterOutput::new(Vec::new());
        out.print_number(42);
        out.print_char(b'!');
        assert_eq!(out.write_errors(), 0);
        assert_eq!(out.into_inner(), b"42\n!".to_vec());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_output_counts_failed_writes() {
        let mut out = WriterOutput::new(ClosedPipe);
        out.print_number(1);
        out.print_char(b'x');
        out.print_number(2);
        assert_eq!(out.write_errors(), 3);
    }
}
