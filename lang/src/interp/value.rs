use im_rc::Vector;
use ordered_float::OrderedFloat;
use regex::Regex;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

/// Whole-word numeric literal, e.g. `42`, `-3.5`, `.5`, `1e-3`.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([0-9]*\.?[0-9]+([eE][\-+]?[0-9]+)?)$").expect("valid regex")
});

/// Runtime value. Every atom is either a word (number or string) or a list.
#[derive(Clone, Debug)]
pub enum Value {
    /// A word that has already been classified as a number
    Number(OrderedFloat<f64>),

    /// A word, case preserved. May still look numeric.
    Word(Rc<str>),

    /// Ordered sequence of atoms. Cloning shares elements, not the sequence.
    List(Vector<Value>),
}

/// The two classifications a value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Word,
    List,
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(OrderedFloat(n))
    }

    pub fn word(s: impl AsRef<str>) -> Self {
        Value::Word(Rc::from(s.as_ref()))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn boolean(b: bool) -> Self {
        Value::number(if b { 1.0 } else { 0.0 })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Number(_) | Value::Word(_) => Kind::Word,
            Value::List(_) => Kind::List,
        }
    }

    /// Numeric view of a word. Numeric-looking words are converted here, at
    /// the point of consumption.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.0),
            Value::Word(w) if is_number(w) => w.parse().ok(),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Value::Word(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vector<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Truth value of a condition: non-zero numbers and the word `true` are
    /// true, zero and `false` are false, anything else has no truth value.
    pub fn truth(&self) -> Option<bool> {
        if let Some(n) = self.as_number() {
            return Some(n != 0.0);
        }
        match self {
            Value::Word(w) if w.eq_ignore_ascii_case("true") => Some(true),
            Value::Word(w) if w.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// True when this is the word `keyword`, compared case-insensitively.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Value::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// True when this is exactly the word `text`.
    pub fn is_word(&self, text: &str) -> bool {
        matches!(self, Value::Word(w) if &**w == text)
    }

    /// Renders the value the way `print` does: a list loses its outer brackets.
    pub fn to_print_string(&self) -> String {
        match self {
            Value::List(items) => join(items),
            other => other.to_string(),
        }
    }
}

pub fn is_number(word: &str) -> bool {
    NUMBER.is_match(word)
}

/// Structural equality between atoms.
///
/// Words compare numerically when both sides look numeric and by exact
/// spelling otherwise; lists compare element by element.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| equal(x, y))
        }
        (Value::List(_), _) | (_, Value::List(_)) => false,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => a.to_string() == b.to_string(),
        },
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::word(s)
    }
}

impl From<Vector<Value>> for Value {
    fn from(items: Vector<Value>) -> Self {
        Value::List(items)
    }
}

fn join(items: &Vector<Value>) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.0.fract() == 0.0 && n.0.abs() < 1e15 {
                    write!(f, "{}", n.0 as i64)
                } else {
                    write!(f, "{}", n.0)
                }
            }
            Value::Word(w) => write!(f, "{w}"),
            Value::List(items) => write!(f, "[{}]", join(items)),
        }
    }
}
