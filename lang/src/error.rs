use crate::interp::RuntimeError;
use crate::reader::ReadError;
use std::fmt;

/// Unified error type for reading and running Logo programs
#[derive(Debug, Clone, PartialEq)]
pub enum LogoError {
    Read(ReadError),
    Runtime(RuntimeError),
}

impl From<ReadError> for LogoError {
    fn from(err: ReadError) -> Self {
        LogoError::Read(err)
    }
}

impl From<RuntimeError> for LogoError {
    fn from(err: RuntimeError) -> Self {
        LogoError::Runtime(err)
    }
}

impl fmt::Display for LogoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoError::Read(err) => write!(
                f,
                "Read error at line {}, column {}: {}",
                err.line, err.column, err.message
            ),
            LogoError::Runtime(err) => write!(f, "Runtime error: {err}"),
        }
    }
}

impl std::error::Error for LogoError {}

impl LogoError {
    /// Format error with source context
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            LogoError::Read(err) => format_read_error(err, source),
            LogoError::Runtime(err) => format_runtime_error(err),
        }
    }
}

fn format_read_error(err: &ReadError, source: &str) -> String {
    let mut output = format!(
        "\nRead error at line {}, column {}: {}\n\n",
        err.line, err.column, err.message
    );

    let lines: Vec<&str> = source.lines().collect();
    let error_line_idx = (err.line as usize).saturating_sub(1);
    let start = error_line_idx.saturating_sub(2);
    let end = (error_line_idx + 3).min(lines.len());

    for (idx, line_content) in lines.iter().enumerate().take(end).skip(start) {
        if idx == error_line_idx {
            output.push_str(&format!(" → {:4} | {}\n", idx + 1, line_content));
            output.push_str("        | ");
            output.push_str(&" ".repeat((err.column as usize).saturating_sub(1)));
            output.push_str("^\n");
        } else {
            output.push_str(&format!("   {:4} | {}\n", idx + 1, line_content));
        }
    }

    output
}

fn format_runtime_error(err: &RuntimeError) -> String {
    let mut output = format!("\nRuntime error: {}\n", err.message);

    if !err.stack.is_empty() {
        output.push_str("\nStack trace:\n");
        for (i, name) in err.stack.iter().rev().enumerate() {
            output.push_str(&format!("  {i} in {name}\n"));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    #[test]
    fn read_error_points_at_column() {
        let err = LogoError::from(ReadError {
            message: "Unexpected ']'".to_string(),
            line: 2,
            column: 4,
        });
        let formatted = err.format_with_source("fd 10\nrt ]\nfd 5");
        assert!(formatted.contains("Read error at line 2, column 4: Unexpected ']'"));
        assert!(formatted.contains(" →    2 | rt ]\n        |    ^\n"));
    }

    #[test]
    fn runtime_error_lists_innermost_procedure_first() {
        let mut err = RuntimeError::new(ErrorKind::DivideByZero, "Division by zero");
        err.stack = vec!["SQUARE".to_string(), "REPEAT".to_string()];
        let formatted = LogoError::from(err).format_with_source("");
        assert!(formatted.contains("  0 in REPEAT\n  1 in SQUARE\n"));
    }
}
