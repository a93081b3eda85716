//! Interpreter core: values, scopes, the expression evaluator, procedure
//! dispatch and the primitive library.

mod builtins;
pub mod cursor;
mod dispatch;
mod evaluator;
pub mod procedure;
pub mod runtime;
pub mod scope;
pub mod symbols;
pub mod thunk;
pub mod value;


pub use cursor::Cursor;
pub use procedure::{Native, Procedure, ProcedureKind, Properties, UserProcedure};
pub use runtime::{
    AbortHandle, Config, ErrorKind, Interpreter, Outcome, RuntimeError, Unwind,
    DEFAULT_THREAD_STACK, STACK_BYTES_PER_CALL,
};
pub use thunk::{BinaryOp, Thunk};
pub use value::{equal, Kind, Value};
