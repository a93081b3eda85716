use super::eager;
use crate::interp::procedure::Properties;
use crate::interp::runtime::{fault, ErrorKind, Interpreter, Outcome};
use crate::interp::value::Value;

pub(super) fn register(interp: &mut Interpreter) {
    eager(interp, &["make"], Properties::fixed(2), |interp, mut args| {
        let name = interp.word_input(&args[0])?;
        interp.set_variable(&name, args.remove(1));
        Ok(None)
    });
    eager(interp, &["local"], Properties::variadic(1, 1), builtin_local);
    eager(interp, &["localmake"], Properties::fixed(2), |interp, mut args| {
        let name = interp.word_input(&args[0])?;
        interp.scopes.declare_local(&name);
        interp.set_variable(&name, args.remove(1));
        Ok(None)
    });
    eager(interp, &["thing"], Properties::fixed(1), |interp, args| {
        let name = interp.word_input(&args[0])?;
        match interp.variable(&name) {
            Some(value) => Ok(Some(value)),
            None => Err(fault(
                ErrorKind::UnboundVariable,
                format!("{name} has no value"),
            )),
        }
    });

    eager(interp, &["show"], Properties::variadic(1, 0), |interp, args| {
        let line = join(args.iter().map(Value::to_string));
        interp.write_line(&line);
        Ok(None)
    });
    eager(interp, &["print"], Properties::variadic(1, 0), |interp, args| {
        let line = join(args.iter().map(Value::to_print_string));
        interp.write_line(&line);
        Ok(None)
    });
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

/// Declares each named variable (a word, or a list of words) in the
/// innermost frame.
fn builtin_local(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    for arg in &args {
        let names: Vec<Value> = match arg {
            Value::List(items) => items.iter().cloned().collect(),
            word => vec![word.clone()],
        };
        for name in &names {
            let name = interp.word_input(name)?;
            interp.scopes.declare_local(&name);
        }
    }
    Ok(None)
}
