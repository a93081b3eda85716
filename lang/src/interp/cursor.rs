use im_rc::Vector;

use super::value::Value;

/// Front-consuming queue over an instruction list.
///
/// The evaluator reads atoms off the front as it descends; the list it was
/// built from is never aliased, so a procedure body or loop body can be
/// executed any number of times.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    tokens: Vector<Value>,
}

impl Cursor {
    pub fn new(tokens: Vector<Value>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.tokens.front()
    }

    /// The atom `n` positions ahead of the front.
    pub fn peek_nth(&self, n: usize) -> Option<&Value> {
        self.tokens.get(n)
    }

    /// True when the next atom is one of the words in `options`.
    pub fn peek_is(&self, options: &[&str]) -> bool {
        match self.peek() {
            Some(Value::Word(w)) => options.contains(&&**w),
            _ => false,
        }
    }

    pub fn advance(&mut self) -> Option<Value> {
        self.tokens.pop_front()
    }

    /// Takes everything that has not been consumed yet.
    pub fn take_rest(&mut self) -> Vector<Value> {
        std::mem::take(&mut self.tokens)
    }
}

impl From<Vector<Value>> for Cursor {
    fn from(tokens: Vector<Value>) -> Self {
        Self::new(tokens)
    }
}
