//! Where `console.log` output goes.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for formatted `console.log` lines.
pub trait Console: Send {
    fn log(&mut self, line: &str);
}

/// Writes each line to standard output.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn log(&mut self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // A closed pipe is not the script's problem.
        let _ = writeln!(handle, "{line}");
    }
}

/// Collects lines in memory. Clones share the same buffer, so a caller can
/// keep one clone and hand the other to the interpreter.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lines(&self) -> Vec<String> {
        self.guard().clone()
    }

    /// Everything logged so far, one line per call.
    pub fn output(&self) -> String {
        self.guard().join("\n")
    }
}

impl Console for BufferConsole {
    fn log(&mut self, line: &str) {
        self.guard().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_clones_share_lines() {
        let buffer = BufferConsole::new();
        let mut sink: Box<dyn Console> = Box::new(buffer.clone());
        sink.log("first");
        sink.log("second");
        assert_eq!(buffer.lines(), vec!["first", "second"]);
        assert_eq!(buffer.output(), "first\nsecond");
    }
}
