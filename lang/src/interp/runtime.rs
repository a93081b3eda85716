use im_rc::Vector;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::builtins;
use super::cursor::Cursor;
use super::procedure::{Native, Procedure, ProcedureKind, Properties};
use super::scope::ScopeStack;
use super::symbols::SymbolTable;
use super::value::Value;
use crate::output::OutputSink;
use crate::turtle::Turtle;

/// Category of a runtime fault, so hosts can tell failures apart without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UndefinedProcedure,
    Arity,
    NotANumber,
    NotAList,
    NotABoolean,
    DivideByZero,
    BadInput,
    BadDefinition,
    RedefinePrimitive,
    UnboundVariable,
    UnexpectedResult,
    NoOutput,
    Syntax,
    NotImplemented,
    DepthExceeded,
    Aborted,
    OutsideProcedure,
}

/// Runtime fault with the procedure chain that was active when it happened
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Call stack at the innermost failing dispatch, outermost first
    pub stack: Vec<String>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Records `stack` unless an inner dispatch already did.
    pub(crate) fn with_stack(mut self, stack: &[Rc<str>]) -> Self {
        if self.stack.is_empty() {
            self.stack = stack.iter().map(|name| name.to_string()).collect();
        }
        self
    }

    /// The innermost procedure the fault is attributed to.
    pub fn procedure(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.procedure() {
            Some(name) => write!(f, "{} (in {})", self.message, name),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Anything that cuts evaluation short. Faults are errors proper; `Output`
/// and `Stop` are non-local exits caught by the enclosing user procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    Fault(RuntimeError),
    Output(Value),
    Stop,
}

impl Unwind {
    /// Converts an exit that escaped every procedure into a fault.
    pub fn into_error(self) -> RuntimeError {
        match self {
            Unwind::Fault(err) => err,
            Unwind::Output(_) => RuntimeError::new(
                ErrorKind::OutsideProcedure,
                "output can only be used inside a procedure",
            ),
            Unwind::Stop => RuntimeError::new(
                ErrorKind::OutsideProcedure,
                "stop can only be used inside a procedure",
            ),
        }
    }
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Fault(err)
    }
}

/// Result of running a procedure or an instruction: a value, or nothing.
pub type Outcome = Result<Option<Value>, Unwind>;

pub(crate) fn fault(kind: ErrorKind, message: impl Into<String>) -> Unwind {
    Unwind::Fault(RuntimeError::new(kind, message))
}

/// Host stack consumed by one nested dispatch, measured on unoptimised
/// builds and rounded up.
pub const STACK_BYTES_PER_CALL: usize = 16 * 1024;

/// Stack size of a thread spawned with `std::thread::spawn`.
pub const DEFAULT_THREAD_STACK: usize = 2 * 1024 * 1024;

/// Interpreter limits.
///
/// Every nested dispatch recurses on the host stack, so `max_call_depth`
/// must fit the stack of the thread that runs the interpreter. The default
/// fits a standard 2 MiB thread; hosts running on a bigger stack should use
/// [`Config::for_stack`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Deepest chain of nested dispatches before `DepthExceeded`
    pub max_call_depth: usize,
}

impl Config {
    /// Limits sized for a host thread with `stack_bytes` of stack.
    pub fn for_stack(stack_bytes: usize) -> Self {
        Self {
            max_call_depth: (stack_bytes / STACK_BYTES_PER_CALL).max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_stack(DEFAULT_THREAD_STACK)
    }
}

/// Host-side switch that stops a running program at the next loop
/// iteration or dispatch. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The Logo interpreter: procedure registry, scope stack, repetition
/// counter and diagnostic call stack, plus the turtle and output collaborators.
pub struct Interpreter {
    pub(crate) procedures: SymbolTable<Rc<Procedure>>,
    pub(crate) scopes: ScopeStack,
    pub(crate) repcount: i64,
    pub(crate) call_stack: Vec<Rc<str>>,
    pub(crate) turtle: Box<dyn Turtle>,
    pub(crate) output: Box<dyn OutputSink>,
    pub(crate) config: Config,
    abort: AbortHandle,
}

impl Interpreter {
    pub fn new(turtle: impl Turtle + 'static, output: impl OutputSink + 'static) -> Self {
        Self::with_config(turtle, output, Config::default())
    }

    pub fn with_config(
        turtle: impl Turtle + 'static,
        output: impl OutputSink + 'static,
        config: Config,
    ) -> Self {
        let mut interp = Self {
            procedures: SymbolTable::new(),
            scopes: ScopeStack::new(),
            repcount: 0,
            call_stack: Vec::new(),
            turtle: Box::new(turtle),
            output: Box::new(output),
            config,
            abort: AbortHandle::default(),
        };
        builtins::register_all(&mut interp);
        interp
    }

    /// Runs a program. A value left over by any instruction is a fault.
    pub fn run(&mut self, tokens: Vector<Value>) -> Result<(), RuntimeError> {
        self.execute(tokens, false)
            .map(|_| ())
            .map_err(Unwind::into_error)
    }

    /// Runs a program and returns the value of its last instruction.
    pub fn run_for_result(
        &mut self,
        tokens: Vector<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        self.execute(tokens, true).map_err(Unwind::into_error)
    }

    /// Evaluates instructions from `tokens` until none remain.
    ///
    /// With `return_result` unset, any instruction that produces a value is
    /// an `UnexpectedResult` fault.
    pub fn execute(&mut self, tokens: Vector<Value>, return_result: bool) -> Outcome {
        let mut cursor = Cursor::new(tokens);
        let mut last = None;

        while !cursor.is_empty() {
            let result = self.evaluate(&mut cursor)?;
            if let Some(value) = &result {
                if !return_result {
                    return Err(fault(
                        ErrorKind::UnexpectedResult,
                        format!("You don't say what to do with {value}"),
                    ));
                }
            }
            last = result;
        }

        Ok(last)
    }

    /// Registers a host primitive taking evaluated arguments.
    pub fn register_primitive<F>(&mut self, name: &str, props: Properties, func: F)
    where
        F: Fn(&mut Interpreter, Vec<Value>) -> Outcome + 'static,
    {
        self.define(&[name], props, Native::Eager(Rc::new(func)));
    }

    pub(crate) fn define(&mut self, names: &[&str], props: Properties, native: Native) {
        for name in names {
            let procedure = Procedure {
                name: Rc::from(name.to_uppercase()),
                kind: ProcedureKind::Primitive(native.clone()),
                props: props.clone(),
            };
            self.procedures.set(name, Rc::new(procedure));
        }
    }

    pub fn is_procedure(&self, name: &str) -> bool {
        self.procedures.has(name)
    }

    pub fn procedure(&self, name: &str) -> Option<Rc<Procedure>> {
        self.procedures.get(name).cloned()
    }

    /// Value of the variable `name` as seen from the innermost frame.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.scopes.get(name).cloned()
    }

    /// Assigns with global fallback and mirrors designated names into the
    /// turtle's I/O state.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.scopes.set(name, value.clone());
        if self.turtle.is_io_var(name) {
            tracing::debug!(variable = name, %value, "mirroring io variable");
            self.turtle.set_var(name, &value);
        }
    }

    pub fn repcount(&self) -> i64 {
        self.repcount
    }

    pub fn call_stack(&self) -> &[Rc<str>] {
        &self.call_stack
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn turtle(&self) -> &dyn Turtle {
        self.turtle.as_ref()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub(crate) fn check_abort(&self) -> Result<(), Unwind> {
        if self.abort.is_aborted() {
            return Err(fault(ErrorKind::Aborted, "Stopping..."));
        }
        Ok(())
    }

    pub(crate) fn write_line(&mut self, line: &str) {
        self.output.write_line(line);
    }
}
