use std::rc::Rc;

use super::cursor::Cursor;
use super::procedure::{Native, Procedure, ProcedureKind};
use super::runtime::{fault, ErrorKind, Interpreter, Outcome, RuntimeError, Unwind};
use super::thunk::Thunk;
use super::value::Value;

impl Interpreter {
    /// Resolves `name` and collects its inputs from `cursor`.
    ///
    /// A natural call takes exactly the procedure's default number of inputs;
    /// a parenthesized call takes everything up to the closing `)` and is
    /// checked against the procedure's bounds.
    pub(crate) fn dispatch(
        &mut self,
        name: &str,
        cursor: &mut Cursor,
        natural: bool,
    ) -> Result<Thunk, Unwind> {
        let procedure = self.procedures.get(name).cloned().ok_or_else(|| {
            fault(
                ErrorKind::UndefinedProcedure,
                format!("I don't know how to {name}"),
            )
        })?;

        if let ProcedureKind::Primitive(Native::Special(special)) = &procedure.kind {
            let special = special.clone();
            self.enter(&procedure.name)?;
            let result = special(self, cursor).map(|()| None);
            self.leave(result)?;
            return Ok(Thunk::Nothing);
        }

        let args = if natural {
            self.natural_inputs(&procedure, cursor)?
        } else {
            self.parenthesized_inputs(&procedure, cursor)?
        };

        Ok(Thunk::Call { procedure, args })
    }

    fn natural_inputs(
        &mut self,
        procedure: &Procedure,
        cursor: &mut Cursor,
    ) -> Result<Vec<Thunk>, Unwind> {
        let mut args = Vec::with_capacity(procedure.props.args);
        for _ in 0..procedure.props.args {
            if cursor.is_empty() || cursor.peek_is(&[")"]) {
                return Err(fault(
                    ErrorKind::Arity,
                    format!("Not enough inputs to {}", procedure.name),
                ));
            }
            args.push(self.expression(cursor)?);
        }
        Ok(args)
    }

    fn parenthesized_inputs(
        &mut self,
        procedure: &Procedure,
        cursor: &mut Cursor,
    ) -> Result<Vec<Thunk>, Unwind> {
        let mut args = Vec::new();
        loop {
            match cursor.peek() {
                None => {
                    return Err(fault(
                        ErrorKind::Syntax,
                        format!("Expected ')' after inputs to {}", procedure.name),
                    ));
                }
                Some(atom) if atom.is_word(")") => {
                    cursor.advance();
                    break;
                }
                Some(_) => args.push(self.expression(cursor)?),
            }
        }

        let props = &procedure.props;
        if args.len() < props.minimum {
            return Err(fault(
                ErrorKind::Arity,
                format!("Not enough inputs to {}", procedure.name),
            ));
        }
        if !props.accepts(args.len()) {
            return Err(fault(
                ErrorKind::Arity,
                format!("Too many inputs to {}", procedure.name),
            ));
        }
        Ok(args)
    }

    /// Invokes a resolved procedure, tracking it on the call stack.
    pub(crate) fn call(&mut self, procedure: &Rc<Procedure>, args: &[Thunk]) -> Outcome {
        self.enter(&procedure.name)?;
        let result = self.invoke(procedure, args);
        self.leave(result)
    }

    fn invoke(&mut self, procedure: &Procedure, args: &[Thunk]) -> Outcome {
        match &procedure.kind {
            ProcedureKind::Primitive(Native::Deferred(native)) => native(self, args),
            ProcedureKind::Primitive(Native::Eager(native)) => {
                let values = self.force_inputs(&procedure.name, args)?;
                native(self, values)
            }
            ProcedureKind::Primitive(Native::Special(_)) => Ok(None),
            ProcedureKind::UserDefined(user) => {
                let values = self.force_inputs(&procedure.name, args)?;
                self.invoke_user(user, values)
            }
        }
    }

    fn force_inputs(&mut self, name: &str, args: &[Thunk]) -> Result<Vec<Value>, Unwind> {
        args.iter().map(|arg| self.force_value(arg, name)).collect()
    }

    fn enter(&mut self, name: &Rc<str>) -> Result<(), Unwind> {
        self.check_abort()?;
        if self.call_stack.len() >= self.config.max_call_depth {
            let err = RuntimeError::new(
                ErrorKind::DepthExceeded,
                format!(
                    "Too many nested calls (limit {})",
                    self.config.max_call_depth
                ),
            );
            return Err(Unwind::Fault(err.with_stack(&self.call_stack)));
        }
        tracing::trace!(procedure = %name, depth = self.call_stack.len(), "dispatch");
        self.call_stack.push(name.clone());
        Ok(())
    }

    /// Pops the call stack, first recording it on a fault that has no
    /// backtrace yet.
    fn leave(&mut self, result: Outcome) -> Outcome {
        let result = match result {
            Err(Unwind::Fault(err)) => Err(Unwind::Fault(err.with_stack(&self.call_stack))),
            other => other,
        };
        self.call_stack.pop();
        result
    }
}
