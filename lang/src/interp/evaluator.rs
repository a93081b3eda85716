use im_rc::Vector;

use super::cursor::Cursor;
use super::runtime::{fault, ErrorKind, Interpreter, Outcome, Unwind};
use super::thunk::{BinaryOp, Thunk};
use super::value::{is_number, Value};

const RELATIONAL: &[BinaryOp] = &[
    BinaryOp::Eq,
    BinaryOp::NotEq,
    BinaryOp::Less,
    BinaryOp::Greater,
    BinaryOp::LessEq,
    BinaryOp::GreaterEq,
];
const ADDITIVE: &[BinaryOp] = &[BinaryOp::Add, BinaryOp::Sub];
const MULTIPLICATIVE: &[BinaryOp] = &[BinaryOp::Mul, BinaryOp::Div, BinaryOp::Mod];

type Level = fn(&mut Interpreter, &mut Cursor) -> Result<Thunk, Unwind>;

fn peek_operator(cursor: &Cursor, ops: &[BinaryOp]) -> Option<BinaryOp> {
    cursor
        .peek()
        .and_then(Value::as_word)
        .and_then(BinaryOp::from_word)
        .filter(|op| ops.contains(op))
}

impl Interpreter {
    /// Consumes one full expression from the front of `cursor` and runs it.
    pub fn evaluate(&mut self, cursor: &mut Cursor) -> Outcome {
        let thunk = self.expression(cursor)?;
        self.force(&thunk)
    }

    /// Consumes one full expression and returns it unforced.
    ///
    /// Only `TO` definitions take effect while parsing; everything else
    /// waits for `force`.
    pub(crate) fn expression(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        self.fold_level(cursor, RELATIONAL, Self::additive)
    }

    fn additive(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        self.fold_level(cursor, ADDITIVE, Self::multiplicative)
    }

    fn multiplicative(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        self.fold_level(cursor, MULTIPLICATIVE, Self::power)
    }

    /// Left-associative fold of one precedence level over the next tighter one.
    fn fold_level(
        &mut self,
        cursor: &mut Cursor,
        ops: &[BinaryOp],
        next: Level,
    ) -> Result<Thunk, Unwind> {
        let mut lhs = next(self, cursor)?;
        while let Some(op) = peek_operator(cursor, ops) {
            cursor.advance();
            let rhs = next(self, cursor)?;
            lhs = Thunk::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    // `^` recurses on its right operand, so `2 ^ 3 ^ 2` is `2 ^ 9`.
    fn power(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        let lhs = self.unary(cursor)?;
        if peek_operator(cursor, &[BinaryOp::Pow]).is_none() {
            return Ok(lhs);
        }
        cursor.advance();
        let rhs = self.power(cursor)?;
        Ok(Thunk::Binary {
            op: BinaryOp::Pow,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn unary(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        if cursor.peek_is(&["-"]) {
            cursor.advance();
            let operand = self.unary(cursor)?;
            return Ok(Thunk::Negate(Box::new(operand)));
        }
        self.final_expression(cursor)
    }

    fn final_expression(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        let word = match cursor.advance() {
            None => {
                return Err(fault(ErrorKind::Syntax, "Unexpected end of instructions"));
            }
            Some(Value::Word(word)) => word,
            Some(atom) => return Ok(Thunk::Constant(atom)),
        };

        if is_number(&word) {
            let n: f64 = word.parse().map_err(|_| {
                fault(ErrorKind::Syntax, format!("Malformed number {word}"))
            })?;
            return Ok(Thunk::Constant(Value::number(n)));
        }

        if let Some(literal) = word.strip_prefix('"') {
            return Ok(Thunk::Constant(Value::word(literal)));
        }

        if let Some(name) = word.strip_prefix(':') {
            return Ok(Thunk::Variable(name.into()));
        }

        match &*word {
            "(" => self.parenthesized(cursor),
            ")" => Err(fault(ErrorKind::Syntax, "Unexpected ')'")),
            name => self.dispatch(name, cursor, true),
        }
    }

    /// After `(`: a variable-arity call when a known procedure follows and is
    /// not itself the left operand of an infix operator; a grouped
    /// expression otherwise.
    fn parenthesized(&mut self, cursor: &mut Cursor) -> Result<Thunk, Unwind> {
        let call = match cursor.peek() {
            Some(Value::Word(name)) if self.is_procedure(name) => {
                let followed_by_infix = cursor
                    .peek_nth(1)
                    .and_then(Value::as_word)
                    .is_some_and(|w| BinaryOp::from_word(w).is_some());
                (!followed_by_infix).then(|| name.clone())
            }
            _ => None,
        };

        if let Some(name) = call {
            cursor.advance();
            return self.dispatch(&name, cursor, false);
        }

        let inner = self.expression(cursor)?;
        match cursor.advance() {
            Some(atom) if atom.is_word(")") => Ok(inner),
            _ => Err(fault(ErrorKind::Syntax, "Expected ')'")),
        }
    }

    /// Runs a suspended computation. May be called any number of times on the
    /// same thunk.
    pub fn force(&mut self, thunk: &Thunk) -> Outcome {
        match thunk {
            Thunk::Constant(value) => Ok(Some(value.clone())),
            Thunk::Variable(name) => match self.scopes.get(name) {
                Some(value) => Ok(Some(value.clone())),
                None => Err(fault(
                    ErrorKind::UnboundVariable,
                    format!("{name} has no value"),
                )),
            },
            Thunk::Negate(operand) => {
                let value = self.force_value(operand, "-")?;
                match value.as_number() {
                    Some(n) => Ok(Some(Value::number(-n))),
                    None => Err(fault(
                        ErrorKind::NotANumber,
                        format!("- doesn't like {value} as input"),
                    )),
                }
            }
            Thunk::Binary { op, lhs, rhs } => {
                let lhs = self.force_value(lhs, op.symbol())?;
                let rhs = self.force_value(rhs, op.symbol())?;
                op.apply(&lhs, &rhs).map(Some)
            }
            Thunk::Call { procedure, args } => self.call(procedure, args),
            Thunk::Nothing => Ok(None),
        }
    }

    /// Forces a thunk whose value `consumer` needs as an input.
    pub fn force_value(&mut self, thunk: &Thunk, consumer: &str) -> Result<Value, Unwind> {
        match self.force(thunk)? {
            Some(value) => Ok(value),
            None => {
                let producer = match thunk {
                    Thunk::Call { procedure, .. } => procedure.name.to_string(),
                    _ => "TO".to_string(),
                };
                Err(fault(
                    ErrorKind::NoOutput,
                    format!("{producer} didn't output to {consumer}"),
                ))
            }
        }
    }

    /// Forces a condition. A list is run as an expression first.
    pub fn condition(&mut self, thunk: &Thunk, consumer: &str) -> Result<bool, Unwind> {
        let value = self.force_value(thunk, consumer)?;
        self.truth_of(value, consumer)
    }

    pub(crate) fn truth_of(&mut self, value: Value, consumer: &str) -> Result<bool, Unwind> {
        let value = match value {
            Value::List(items) => self.evaluate_list(items, consumer)?,
            other => other,
        };
        value.truth().ok_or_else(|| {
            fault(
                ErrorKind::NotABoolean,
                format!("{consumer} doesn't like {value} as input"),
            )
        })
    }

    /// Runs `items` for its value, failing if it produces none.
    pub(crate) fn evaluate_list(
        &mut self,
        items: Vector<Value>,
        consumer: &str,
    ) -> Result<Value, Unwind> {
        let shown = Value::List(items.clone());
        self.execute(items, true)?.ok_or_else(|| {
            fault(
                ErrorKind::NoOutput,
                format!("{shown} didn't output to {consumer}"),
            )
        })
    }
}
