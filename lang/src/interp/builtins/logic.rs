use super::{deferred, eager};
use crate::interp::procedure::Properties;
use crate::interp::runtime::{Interpreter, Outcome};
use crate::interp::thunk::Thunk;
use crate::interp::value::Value;

pub(super) fn register(interp: &mut Interpreter) {
    eager(interp, &["true"], Properties::fixed(0), |_, _| {
        Ok(Some(Value::boolean(true)))
    });
    eager(interp, &["false"], Properties::fixed(0), |_, _| {
        Ok(Some(Value::boolean(false)))
    });
    eager(interp, &["not"], Properties::fixed(1), |interp, args| {
        let value = interp.truth_input(&args[0])?;
        Ok(Some(Value::boolean(!value)))
    });

    deferred(interp, &["and"], Properties::variadic(2, 0), |interp, args| {
        short_circuit(interp, args, false)
    });
    deferred(interp, &["or"], Properties::variadic(2, 0), |interp, args| {
        short_circuit(interp, args, true)
    });
    eager(interp, &["xor"], Properties::variadic(2, 0), builtin_xor);
}

/// Forces operands left to right until one equals `decisive`; with no
/// decisive operand the result is `!decisive`.
fn short_circuit(interp: &mut Interpreter, args: &[Thunk], decisive: bool) -> Outcome {
    let name = interp.current_procedure().to_string();
    for arg in args {
        if interp.condition(arg, &name)? == decisive {
            return Ok(Some(Value::boolean(decisive)));
        }
    }
    Ok(Some(Value::boolean(!decisive)))
}

fn builtin_xor(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let mut result = false;
    for arg in &args {
        result ^= interp.truth_input(arg)?;
    }
    Ok(Some(Value::boolean(result)))
}
