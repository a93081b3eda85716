//! CLI output formatting for text and JSON modes.

use logo::{LogoError, SimulatedTurtle, Turtle};
use serde::Serialize;

/// Output mode for CLI execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Program output on stdout, diagnostics on stderr (default)
    Text,
    /// Single JSON object after execution completes
    Json,
}

impl OutputMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputMode::Text),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }
}

/// A line written by `show` or `print`.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleEntry {
    pub timestamp_ms: u64,
    pub message: String,
}

/// Error location with 1-indexed line and column.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// Final turtle state reported with a script result.
#[derive(Debug, Clone, Serialize)]
pub struct TurtleSummary {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub pen_down: bool,
    pub segments: usize,
    pub elapsed_seconds: f64,
}

impl TurtleSummary {
    pub fn of(turtle: &SimulatedTurtle) -> Self {
        Self {
            x: turtle.x(),
            y: turtle.y(),
            heading: turtle.heading(),
            pen_down: turtle.is_pen_down(),
            segments: turtle.segments().len(),
            elapsed_seconds: turtle.elapsed(),
        }
    }
}

/// JSON output for script execution.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScriptOutput {
    #[serde(rename = "type")]
    pub output_type: &'static str,
    pub status: &'static str,
    pub duration_ms: u64,
    pub turtle: TurtleSummary,
    pub console: Vec<ConsoleEntry>,
}

/// JSON output for errors.
#[derive(Debug, Clone, Serialize)]
pub struct JsonErrorOutput {
    #[serde(rename = "type")]
    pub output_type: &'static str,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ErrorLocation>,
    /// Active procedures, innermost first
    pub stack: Vec<String>,
    pub console: Vec<ConsoleEntry>,
}

/// Format a LogoError as JSON error output.
pub fn format_error_json(error: &LogoError, console: Vec<ConsoleEntry>) -> JsonErrorOutput {
    match error {
        LogoError::Read(err) => JsonErrorOutput {
            output_type: "error",
            kind: "Read".to_string(),
            message: err.message.clone(),
            location: Some(ErrorLocation {
                line: err.line,
                column: err.column,
            }),
            stack: Vec::new(),
            console,
        },
        LogoError::Runtime(err) => JsonErrorOutput {
            output_type: "error",
            kind: format!("{:?}", err.kind),
            message: err.message.clone(),
            location: None,
            stack: err.stack.iter().rev().cloned().collect(),
            console,
        },
    }
}

/// Format script result as JSON.
pub fn format_script_json(
    turtle: &SimulatedTurtle,
    duration_ms: u64,
    console: Vec<ConsoleEntry>,
) -> serde_json::Result<String> {
    let output = JsonScriptOutput {
        output_type: "script",
        status: "complete",
        duration_ms,
        turtle: TurtleSummary::of(turtle),
        console,
    };
    serde_json::to_string(&output)
}
