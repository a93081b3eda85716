//! Host collaborators handed to the interpreter by the CLI.

use logo::OutputSink;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::output::ConsoleEntry;

/// Output sink for `show` and `print`: writes straight to stdout in text
/// mode, or records timestamped entries for JSON output.
#[derive(Clone)]
pub struct Console {
    capture: Option<Rc<RefCell<Vec<ConsoleEntry>>>>,
    started: Instant,
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            capture: None,
            started: Instant::now(),
        }
    }

    pub fn capturing() -> Self {
        Self {
            capture: Some(Rc::new(RefCell::new(Vec::new()))),
            started: Instant::now(),
        }
    }

    /// Entries recorded so far; empty when writing to stdout.
    pub fn entries(&self) -> Vec<ConsoleEntry> {
        self.capture
            .as_ref()
            .map(|entries| entries.borrow().clone())
            .unwrap_or_default()
    }
}

impl OutputSink for Console {
    fn write_line(&mut self, line: &str) {
        match &self.capture {
            Some(entries) => entries.borrow_mut().push(ConsoleEntry {
                timestamp_ms: self.started.elapsed().as_millis() as u64,
                message: line.to_string(),
            }),
            None => println!("{line}"),
        }
    }
}
