use im_rc::Vector;
use std::fmt;
use std::rc::Rc;

use super::cursor::Cursor;
use super::runtime::{fault, ErrorKind, Interpreter, Outcome, RuntimeError, Unwind};
use super::thunk::{is_infix, Thunk};
use super::value::{is_number, Value};

pub type EagerFn = dyn Fn(&mut Interpreter, Vec<Value>) -> Outcome;
pub type DeferredFn = dyn Fn(&mut Interpreter, &[Thunk]) -> Outcome;
pub type SpecialFn = dyn Fn(&mut Interpreter, &mut Cursor) -> Result<(), Unwind>;

/// Native implementation of a primitive, tagged by how it takes its inputs.
#[derive(Clone)]
pub enum Native {
    /// Receives fully evaluated arguments
    Eager(Rc<EagerFn>),
    /// Receives unforced argument computations and decides when to force them
    Deferred(Rc<DeferredFn>),
    /// Receives the raw instruction cursor; no argument collection at all
    Special(Rc<SpecialFn>),
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Eager(_) => write!(f, "Eager(<fn>)"),
            Native::Deferred(_) => write!(f, "Deferred(<fn>)"),
            Native::Special(_) => write!(f, "Special(<fn>)"),
        }
    }
}

/// Arity of a procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties {
    /// Inputs consumed by an unparenthesized call
    pub args: usize,
    /// Fewest inputs a parenthesized call may supply
    pub minimum: usize,
    /// Most inputs a parenthesized call may supply; `None` is unbounded
    pub maximum: Option<usize>,
}

impl Properties {
    pub fn fixed(args: usize) -> Self {
        Self {
            args,
            minimum: args,
            maximum: Some(args),
        }
    }

    pub fn variadic(args: usize, minimum: usize) -> Self {
        Self {
            args,
            minimum,
            maximum: None,
        }
    }

    pub fn ranged(args: usize, minimum: usize, maximum: usize) -> Self {
        Self {
            args,
            minimum,
            maximum: Some(maximum),
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.minimum && self.maximum.map_or(true, |max| count <= max)
    }
}

/// A procedure written in Logo with `TO … END`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProcedure {
    pub inputs: Vec<Rc<str>>,
    /// Name and default-value expression of each optional input
    pub optional_inputs: Vec<(Rc<str>, Vector<Value>)>,
    pub rest: Option<Rc<str>>,
    /// Inputs an unparenthesized call supplies
    pub default: usize,
    pub body: Vector<Value>,
}

impl UserProcedure {
    pub fn properties(&self) -> Properties {
        Properties {
            args: self.default,
            minimum: self.inputs.len(),
            maximum: match self.rest {
                Some(_) => None,
                None => Some(self.inputs.len() + self.optional_inputs.len()),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProcedureKind {
    Primitive(Native),
    UserDefined(UserProcedure),
}

/// Registry entry: a callable plus its arity
#[derive(Debug, Clone)]
pub struct Procedure {
    pub name: Rc<str>,
    pub kind: ProcedureKind,
    pub props: Properties,
}

impl Procedure {
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, ProcedureKind::Primitive(_))
    }
}

fn bad_definition(message: impl Into<String>) -> RuntimeError {
    RuntimeError::new(ErrorKind::BadDefinition, message)
}

/// Parameter name of a `:name` word.
fn parameter(atom: &Value) -> Option<Rc<str>> {
    match atom {
        Value::Word(w) if w.len() > 1 && w.starts_with(':') => Some(Rc::from(&w[1..])),
        _ => None,
    }
}

fn is_valid_name(name: &str) -> bool {
    !is_number(name)
        && !is_infix(name)
        && !matches!(name, "(" | ")")
        && !name.starts_with([':', '"'])
}

/// Reads a procedure definition from the tokens following `TO`, up to and
/// including the closing `END`.
///
/// The header is: a name, `:required` inputs, `[:optional default…]` lists,
/// one `[:rest]` list, then an optional bare default arity.
pub fn parse_definition(cursor: &mut Cursor) -> Result<(Rc<str>, UserProcedure), RuntimeError> {
    let name = match cursor.advance() {
        Some(Value::Word(w)) if is_valid_name(&w) => w,
        Some(other) => {
            return Err(bad_definition(format!("TO doesn't like {other} as input")));
        }
        None => return Err(bad_definition("Not enough inputs to TO")),
    };

    let mut inputs = Vec::new();
    while let Some(input) = cursor.peek().and_then(parameter) {
        cursor.advance();
        inputs.push(input);
    }

    let mut optional_inputs = Vec::new();
    while let Some(Value::List(items)) = cursor.peek() {
        if items.len() < 2 {
            break;
        }
        let Some(input) = items.front().and_then(parameter) else {
            break;
        };
        let default = items.clone().split_off(1);
        cursor.advance();
        optional_inputs.push((input, default));
    }

    let mut rest = None;
    if let Some(Value::List(items)) = cursor.peek() {
        if items.len() == 1 {
            if let Some(input) = items.front().and_then(parameter) {
                cursor.advance();
                rest = Some(input);
            }
        }
    }

    let mut default = inputs.len();
    if let Some(Value::Word(w)) = cursor.peek() {
        if is_number(w) {
            let declared: f64 = w.parse().unwrap_or(f64::NAN);
            let max = inputs.len() + optional_inputs.len();
            let consistent = declared.fract() == 0.0
                && declared >= inputs.len() as f64
                && (rest.is_some() || declared <= max as f64);
            if !consistent {
                return Err(bad_definition(format!(
                    "Bad default number of inputs for {name}"
                )));
            }
            default = declared as usize;
            cursor.advance();
        }
    }

    let mut body = Vector::new();
    loop {
        match cursor.advance() {
            None => return Err(bad_definition(format!("Expected END in definition of {name}"))),
            Some(atom) if atom.is_keyword("end") => break,
            Some(atom) => body.push_back(atom),
        }
    }

    Ok((
        name,
        UserProcedure {
            inputs,
            optional_inputs,
            rest,
            default,
            body,
        },
    ))
}

impl Interpreter {
    /// The `TO` special form: reads a definition off the cursor and installs it.
    pub(crate) fn define_procedure(&mut self, cursor: &mut Cursor) -> Result<(), Unwind> {
        let (name, user) = parse_definition(cursor)?;
        self.install(&name, user)?;
        Ok(())
    }

    /// Installs a user procedure, replacing an earlier user definition.
    pub fn install(&mut self, name: &str, user: UserProcedure) -> Result<(), RuntimeError> {
        if let Some(existing) = self.procedures.get(name) {
            if existing.is_primitive() {
                return Err(RuntimeError::new(
                    ErrorKind::RedefinePrimitive,
                    format!("{} is a primitive", existing.name),
                ));
            }
        }

        tracing::debug!(
            procedure = name,
            inputs = user.inputs.len(),
            optional = user.optional_inputs.len(),
            rest = user.rest.is_some(),
            "defined procedure"
        );

        let procedure = Procedure {
            name: Rc::from(name.to_uppercase()),
            props: user.properties(),
            kind: ProcedureKind::UserDefined(user),
        };
        self.procedures.set(name, Rc::new(procedure));
        Ok(())
    }

    /// Runs a user procedure in a fresh innermost frame. The frame is popped
    /// however the body finishes; `output` and `stop` end the call normally.
    pub(crate) fn invoke_user(&mut self, user: &UserProcedure, args: Vec<Value>) -> Outcome {
        self.scopes.push();
        let result = self.bind_and_run(user, args);
        self.scopes.pop();

        match result {
            Ok(()) | Err(Unwind::Stop) => Ok(None),
            Err(Unwind::Output(value)) => Ok(Some(value)),
            Err(err) => Err(err),
        }
    }

    fn bind_and_run(&mut self, user: &UserProcedure, args: Vec<Value>) -> Result<(), Unwind> {
        let mut args = args.into_iter();

        for name in &user.inputs {
            if let Some(value) = args.next() {
                self.scopes.set_local(name, value);
            }
        }

        for (name, default) in &user.optional_inputs {
            let value = match args.next() {
                Some(value) => value,
                None => {
                    let mut cursor = Cursor::new(default.clone());
                    self.evaluate(&mut cursor)?.ok_or_else(|| {
                        fault(
                            ErrorKind::NoOutput,
                            format!("Default for :{name} didn't output a value"),
                        )
                    })?
                }
            };
            self.scopes.set_local(name, value);
        }

        if let Some(rest) = &user.rest {
            self.scopes.set_local(rest, Value::List(args.collect()));
        }

        self.execute(user.body.clone(), false)?;
        Ok(())
    }
}
