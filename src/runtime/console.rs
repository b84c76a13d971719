//! Console collaborators used by the `print`, `inputi` and `inputs` primitives

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};

/// Line-oriented console the evaluator writes output to and reads input from
pub trait Console {
    /// Writes one line of output
    fn output(&mut self, text: &str) -> Result<()>;

    /// Blocks until one line of input is available and returns it without its line ending
    fn get_input(&mut self) -> Result<String>;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn output(&mut self, text: &str) -> Result<()> {
        (**self).output(text)
    }

    fn get_input(&mut self) -> Result<String> {
        (**self).get_input()
    }
}

/// Console backed by the process's stdout and stdin
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    /// Creates a console over stdout/stdin
    pub fn new() -> Self {
        StdConsole
    }
}

impl Console for StdConsole {
    fn output(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()?;
        Ok(())
    }

    fn get_input(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(Error::InputExhausted);
        }
        Ok(strip_line_ending(line))
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// In-memory console: records output lines and serves queued input lines
#[derive(Debug, Clone, Default)]
pub struct BufferedConsole {
    outputs: Vec<String>,
    inputs: VecDeque<String>,
}

impl BufferedConsole {
    /// Creates a console with no queued input
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a console that will answer input requests with `inputs`, in order
    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferedConsole {
            outputs: Vec::new(),
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Queues one more input line
    pub fn push_input(&mut self, line: impl Into<String>) {
        self.inputs.push_back(line.into());
    }

    /// Output lines written so far
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Takes the recorded output lines, leaving the buffer empty
    pub fn take_outputs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outputs)
    }
}

impl Console for BufferedConsole {
    fn output(&mut self, text: &str) -> Result<()> {
        self.outputs.push(text.to_string());
        Ok(())
    }

    fn get_input(&mut self) -> Result<String> {
        self.inputs.pop_front().ok_or(Error::InputExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_console_round_trip() {
        let mut console = BufferedConsole::with_inputs(["42", "hello"]);
        console.output("prompt").unwrap();
        assert_eq!(console.get_input().unwrap(), "42");
        console.push_input("later");
        assert_eq!(console.get_input().unwrap(), "hello");
        assert_eq!(console.get_input().unwrap(), "later");
        assert_eq!(console.get_input(), Err(Error::InputExhausted));
        assert_eq!(console.outputs(), ["prompt".to_string()]);
        assert_eq!(console.take_outputs().len(), 1);
        assert!(console.outputs().is_empty());
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending("abc\n".to_string()), "abc");
        assert_eq!(strip_line_ending("abc\r\n".to_string()), "abc");
        assert_eq!(strip_line_ending("abc".to_string()), "abc");
    }
}
