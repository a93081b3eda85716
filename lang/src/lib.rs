//! An embeddable Logo interpreter.
//!
//! Programs are read into word and list atoms by [`reader`] and run by an
//! [`Interpreter`], which drives a [`Turtle`] and writes text to an
//! [`OutputSink`].

pub mod error;
pub mod interp;
pub mod output;
pub mod reader;
pub mod runner;
pub mod turtle;

pub use error::LogoError;
pub use interp::{AbortHandle, Config, ErrorKind, Interpreter, RuntimeError, Value};
pub use output::{BufferedOutput, OutputSink, StdoutSink};
pub use reader::{read, ReadError};
pub use turtle::{SimulatedTurtle, Turtle};
