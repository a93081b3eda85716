use std::fmt;
use std::rc::Rc;

use super::procedure::Procedure;
use super::runtime::{fault, ErrorKind, Unwind};
use super::value::{equal, Value};

/// Infix operators, listed from loosest to tightest binding level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn from_word(word: &str) -> Option<Self> {
        let op = match word {
            "=" => BinaryOp::Eq,
            "<>" => BinaryOp::NotEq,
            "<" => BinaryOp::Less,
            ">" => BinaryOp::Greater,
            "<=" => BinaryOp::LessEq,
            ">=" => BinaryOp::GreaterEq,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "^" => BinaryOp::Pow,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }

    /// Folds two forced operands.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> Result<Value, Unwind> {
        let operands = || -> Result<(f64, f64), Unwind> {
            Ok((numeric_operand(self, lhs)?, numeric_operand(self, rhs)?))
        };

        let value = match self {
            BinaryOp::Eq => Value::boolean(equal(lhs, rhs)),
            BinaryOp::NotEq => Value::boolean(!equal(lhs, rhs)),
            BinaryOp::Less => operands().map(|(a, b)| Value::boolean(a < b))?,
            BinaryOp::Greater => operands().map(|(a, b)| Value::boolean(a > b))?,
            BinaryOp::LessEq => operands().map(|(a, b)| Value::boolean(a <= b))?,
            BinaryOp::GreaterEq => operands().map(|(a, b)| Value::boolean(a >= b))?,
            BinaryOp::Add => operands().map(|(a, b)| Value::number(a + b))?,
            BinaryOp::Sub => operands().map(|(a, b)| Value::number(a - b))?,
            BinaryOp::Mul => operands().map(|(a, b)| Value::number(a * b))?,
            BinaryOp::Pow => operands().map(|(a, b)| Value::number(a.powf(b)))?,
            BinaryOp::Div | BinaryOp::Mod => {
                let (a, b) = operands()?;
                if b == 0.0 {
                    return Err(fault(ErrorKind::DivideByZero, "Division by zero"));
                }
                match self {
                    BinaryOp::Div => Value::number(a / b),
                    // Floored: the result takes the sign of the divisor
                    _ => Value::number(a - b * (a / b).floor()),
                }
            }
        };

        Ok(value)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn numeric_operand(op: BinaryOp, value: &Value) -> Result<f64, Unwind> {
    value.as_number().ok_or_else(|| {
        fault(
            ErrorKind::NotANumber,
            format!("{op} doesn't like {value} as input"),
        )
    })
}

/// True for words the evaluator treats as infix operators.
pub fn is_infix(word: &str) -> bool {
    BinaryOp::from_word(word).is_some()
}

/// A suspended computation built by the evaluator and run by `force`.
///
/// Building a thunk consumes atoms from the cursor but has no other effect;
/// forcing it performs lookups, arithmetic and procedure calls, and may be
/// repeated.
#[derive(Debug, Clone)]
pub enum Thunk {
    Constant(Value),
    Variable(Rc<str>),
    Negate(Box<Thunk>),
    Binary {
        op: BinaryOp,
        lhs: Box<Thunk>,
        rhs: Box<Thunk>,
    },
    Call {
        procedure: Rc<Procedure>,
        args: Vec<Thunk>,
    },
    /// Produces no value (a definition already performed while parsing)
    Nothing,
}

impl Thunk {
    pub fn constant(value: impl Into<Value>) -> Self {
        Thunk::Constant(value.into())
    }
}
