//! Primitive procedures installed into every interpreter.

mod control;
mod data;
mod logic;
mod motion;

use im_rc::Vector;
use std::rc::Rc;

use super::procedure::{Native, Properties};
use super::runtime::{fault, ErrorKind, Interpreter, Outcome, Unwind};
use super::thunk::Thunk;
use super::value::Value;

pub(crate) fn register_all(interp: &mut Interpreter) {
    motion::register(interp);
    control::register(interp);
    data::register(interp);
    logic::register(interp);
}

// ============================================================================
// Registration helpers
// ============================================================================

pub(crate) fn eager<F>(interp: &mut Interpreter, names: &[&str], props: Properties, func: F)
where
    F: Fn(&mut Interpreter, Vec<Value>) -> Outcome + 'static,
{
    interp.define(names, props, Native::Eager(Rc::new(func)));
}

pub(crate) fn deferred<F>(interp: &mut Interpreter, names: &[&str], props: Properties, func: F)
where
    F: Fn(&mut Interpreter, &[Thunk]) -> Outcome + 'static,
{
    interp.define(names, props, Native::Deferred(Rc::new(func)));
}

// ============================================================================
// Input coercion
// ============================================================================

impl Interpreter {
    /// Name of the innermost procedure being run.
    pub(crate) fn current_procedure(&self) -> &str {
        self.call_stack.last().map_or("", |name| &**name)
    }

    pub(crate) fn doesnt_like(&self, kind: ErrorKind, value: &Value) -> Unwind {
        fault(
            kind,
            format!("{} doesn't like {} as input", self.current_procedure(), value),
        )
    }

    pub(crate) fn number_input(&self, value: &Value) -> Result<f64, Unwind> {
        value
            .as_number()
            .ok_or_else(|| self.doesnt_like(ErrorKind::NotANumber, value))
    }

    pub(crate) fn list_input(&self, value: &Value) -> Result<Vector<Value>, Unwind> {
        value
            .as_list()
            .cloned()
            .ok_or_else(|| self.doesnt_like(ErrorKind::NotAList, value))
    }

    /// A word input, with numbers rendered back to their word form.
    pub(crate) fn word_input(&self, value: &Value) -> Result<String, Unwind> {
        match value {
            Value::List(_) => Err(self.doesnt_like(ErrorKind::BadInput, value)),
            other => Ok(other.to_string()),
        }
    }

    pub(crate) fn truth_input(&self, value: &Value) -> Result<bool, Unwind> {
        value
            .truth()
            .ok_or_else(|| self.doesnt_like(ErrorKind::NotABoolean, value))
    }

    /// A two-number list such as the input of `setpos`.
    pub(crate) fn point_input(&self, value: &Value) -> Result<(f64, f64), Unwind> {
        let items = self.list_input(value)?;
        if items.len() != 2 {
            return Err(self.doesnt_like(ErrorKind::BadInput, value));
        }
        Ok((self.number_input(&items[0])?, self.number_input(&items[1])?))
    }
}
