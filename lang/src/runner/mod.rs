//! Source-text entry points.

use crate::error::LogoError;
use crate::interp::{Interpreter, Value};
use crate::reader;

#[cfg(test)]
mod tests;

/// Reads `source` and runs it. Any instruction that outputs a value without
/// it being used is an error.
pub fn run_source(interp: &mut Interpreter, source: &str) -> Result<(), LogoError> {
    let tokens = reader::read(source)?;
    interp.run(tokens)?;
    Ok(())
}

/// Reads `source`, runs it and returns the value of its last instruction.
pub fn evaluate_source(interp: &mut Interpreter, source: &str) -> Result<Option<Value>, LogoError> {
    let tokens = reader::read(source)?;
    Ok(interp.run_for_result(tokens)?)
}
