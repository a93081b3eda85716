//! Turns program text into the word/list atom stream the interpreter runs.


use im_rc::Vector;
use std::fmt;
use std::str::Chars;

use crate::interp::Value;

pub struct Reader<'a> {
    chars: Chars<'a>,
    line: u32,
    column: u32,
    /// Whether the last character consumed was whitespace or an opening
    /// delimiter (also true at the start of input)
    at_boundary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.message, self.line, self.column)
    }
}

impl std::error::Error for ReadError {}

/// Reads a whole program.
pub fn read(source: &str) -> Result<Vector<Value>, ReadError> {
    Reader::new(source).read()
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | ';')
}

fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '%' | '^' | '=' | '<' | '>')
}

/// True for a word like `1e` or `2.5E`, where a following sign belongs to
/// the exponent.
fn awaits_exponent(text: &str) -> bool {
    let Some(mantissa) = text.strip_suffix(['e', 'E']) else {
        return false;
    };
    let mantissa = mantissa.strip_prefix('-').unwrap_or(mantissa);
    !mantissa.is_empty()
        && mantissa.chars().any(|c| c.is_ascii_digit())
        && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
        && mantissa.matches('.').count() <= 1
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),
            line: 1,
            column: 1,
            at_boundary: true,
        }
    }

    pub fn read(&mut self) -> Result<Vector<Value>, ReadError> {
        self.sequence(None)
    }

    /// Reads atoms until end of input, or until the `]` matching the `[`
    /// at `open`.
    fn sequence(&mut self, open: Option<(u32, u32)>) -> Result<Vector<Value>, ReadError> {
        let mut atoms = Vector::new();

        loop {
            self.skip_whitespace_and_comments();

            let Some(c) = self.peek() else {
                return match open {
                    Some((line, column)) => Err(ReadError {
                        message: "Unterminated list, expected ']'".to_string(),
                        line,
                        column,
                    }),
                    None => Ok(atoms),
                };
            };

            match c {
                '[' => {
                    let position = (self.line, self.column);
                    self.bump();
                    self.at_boundary = true;
                    let items = self.sequence(Some(position))?;
                    atoms.push_back(Value::List(items));
                }
                ']' => {
                    if open.is_none() {
                        return Err(self.error("Unexpected ']'"));
                    }
                    self.bump();
                    return Ok(atoms);
                }
                _ => atoms.push_back(Value::word(self.word()?)),
            }
        }
    }

    fn word(&mut self) -> Result<String, ReadError> {
        let boundary = self.at_boundary;
        self.at_boundary = false;

        let Some(c) = self.bump() else {
            return Err(self.error("Unexpected end of input"));
        };

        match c {
            '(' => {
                self.at_boundary = true;
                Ok("(".to_string())
            }
            ')' => Ok(")".to_string()),
            '<' if matches!(self.peek(), Some('=' | '>')) => {
                let mut op = String::from('<');
                op.extend(self.bump());
                Ok(op)
            }
            '>' if self.peek() == Some('=') => {
                self.bump();
                Ok(">=".to_string())
            }
            '-' if boundary && self.starts_number() => self.bare_word('-'),
            c if is_operator(c) => Ok(c.to_string()),
            '"' => {
                let mut text = String::from('"');
                while let Some(c) = self.peek() {
                    if is_delimiter(c) {
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                Ok(text)
            }
            c => self.bare_word(c),
        }
    }

    fn bare_word(&mut self, first: char) -> Result<String, ReadError> {
        let mut text = String::from(first);
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-') && awaits_exponent(&text);
            if is_delimiter(c) || (is_operator(c) && !exponent_sign) {
                break;
            }
            text.push(c);
            self.bump();
        }
        Ok(text)
    }

    /// After a `-`: does a numeric literal follow?
    fn starts_number(&self) -> bool {
        let mut chars = self.chars.clone();
        match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                self.at_boundary = true;
            } else if c == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn error(&self, message: &str) -> ReadError {
        ReadError {
            message: message.to_string(),
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}
