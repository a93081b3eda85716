use im_rc::Vector;
use std::rc::Rc;

use super::{deferred, eager};
use crate::interp::cursor::Cursor;
use crate::interp::procedure::{Native, Properties};
use crate::interp::runtime::{fault, ErrorKind, Interpreter, Outcome, Unwind};
use crate::interp::thunk::Thunk;
use crate::interp::value::Value;

pub(super) fn register(interp: &mut Interpreter) {
    interp.define(
        &["to"],
        Properties::fixed(0),
        Native::Special(Rc::new(|interp: &mut Interpreter, cursor: &mut Cursor| {
            interp.define_procedure(cursor)
        })),
    );

    eager(interp, &["repeat"], Properties::fixed(2), builtin_repeat);
    eager(interp, &["forever"], Properties::fixed(1), builtin_forever);
    eager(interp, &["repcount", "#"], Properties::fixed(0), |interp, _| {
        Ok(Some(Value::number(interp.repcount as f64)))
    });

    eager(interp, &["if"], Properties::ranged(2, 2, 3), builtin_if);
    eager(interp, &["ifelse"], Properties::fixed(3), builtin_if);
    eager(interp, &["test"], Properties::fixed(1), builtin_test);
    eager(interp, &["iftrue", "ift"], Properties::fixed(1), |interp, args| {
        builtin_iftest(interp, &args[0], true)
    });
    eager(interp, &["iffalse", "iff"], Properties::fixed(1), |interp, args| {
        builtin_iftest(interp, &args[0], false)
    });

    deferred(interp, &["while"], Properties::fixed(2), |interp, args| {
        builtin_conditional_loop(interp, &args[0], &args[1], true, false)
    });
    deferred(interp, &["until"], Properties::fixed(2), |interp, args| {
        builtin_conditional_loop(interp, &args[0], &args[1], false, false)
    });
    deferred(interp, &["do.while"], Properties::fixed(2), |interp, args| {
        builtin_conditional_loop(interp, &args[1], &args[0], true, true)
    });
    deferred(interp, &["do.until"], Properties::fixed(2), |interp, args| {
        builtin_conditional_loop(interp, &args[1], &args[0], false, true)
    });

    eager(interp, &["for"], Properties::fixed(2), builtin_for);
    eager(interp, &["dotimes"], Properties::fixed(2), builtin_dotimes);

    eager(interp, &["case"], Properties::fixed(2), builtin_case);
    eager(interp, &["cond"], Properties::fixed(1), builtin_cond);

    eager(interp, &["run"], Properties::fixed(1), builtin_run);
    eager(interp, &["output", "op"], Properties::fixed(1), |_, mut args| {
        Err(Unwind::Output(args.remove(0)))
    });
    eager(interp, &["stop"], Properties::fixed(0), |_, _| Err(Unwind::Stop));
}

/// Runs `body` with the repetition counter saved and restored around it.
fn with_repcount<F>(interp: &mut Interpreter, body: F) -> Outcome
where
    F: FnOnce(&mut Interpreter) -> Outcome,
{
    let saved = interp.repcount;
    let result = body(interp);
    interp.repcount = saved;
    result
}

// ============================================================================
// Counted loops
// ============================================================================

fn builtin_repeat(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let count = interp.number_input(&args[0])?;
    let body = interp.list_input(&args[1])?;
    tracing::trace!(count, "repeat");

    with_repcount(interp, |interp| {
        let mut i: i64 = 1;
        while (i as f64) <= count {
            interp.check_abort()?;
            interp.repcount = i;
            interp.execute(body.clone(), false)?;
            i += 1;
        }
        Ok(None)
    })
}

fn builtin_forever(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let body = interp.list_input(&args[0])?;
    tracing::trace!("forever");

    with_repcount(interp, |interp| {
        let mut i: i64 = 1;
        loop {
            interp.check_abort()?;
            interp.repcount = i;
            interp.execute(body.clone(), false)?;
            i += 1;
        }
    })
}

fn sign(n: f64) -> i8 {
    if n > 0.0 {
        1
    } else if n < 0.0 {
        -1
    } else {
        0
    }
}

/// Name of a loop variable, written bare, quoted or with a colon.
fn loop_variable(
    interp: &Interpreter,
    header: &Value,
    atom: Option<&Value>,
) -> Result<String, Unwind> {
    match atom {
        Some(Value::Word(w)) => Ok(w.trim_start_matches([':', '"']).to_string()),
        _ => Err(interp.doesnt_like(ErrorKind::BadInput, header)),
    }
}

/// Binds `var` in the innermost frame to each value from `start` towards
/// `limit`, stopping once `current - limit` has the sign of `step`.
fn count_loop(
    interp: &mut Interpreter,
    var: &str,
    start: f64,
    limit: f64,
    step: f64,
    body: &Vector<Value>,
) -> Outcome {
    tracing::trace!(var, start, limit, step, "counting loop");
    let mut current = start;
    loop {
        interp.check_abort()?;
        if sign(current - limit) == sign(step) {
            return Ok(None);
        }
        interp.scopes.set_local(var, Value::number(current));
        interp.execute(body.clone(), false)?;
        current += step;
    }
}

fn builtin_for(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let header = interp.list_input(&args[0])?;
    let body = interp.list_input(&args[1])?;
    let var = loop_variable(interp, &args[0], header.front())?;

    let mut cursor = Cursor::new(header.clone().split_off(1));
    let mut bounds = Vec::new();
    while !cursor.is_empty() {
        let value = interp
            .evaluate(&mut cursor)?
            .ok_or_else(|| interp.doesnt_like(ErrorKind::BadInput, &args[0]))?;
        bounds.push(interp.number_input(&value)?);
    }

    let (start, limit, step) = match bounds[..] {
        [start, limit] => (start, limit, if limit < start { -1.0 } else { 1.0 }),
        [start, limit, step] => (start, limit, step),
        _ => return Err(interp.doesnt_like(ErrorKind::BadInput, &args[0])),
    };

    count_loop(interp, &var, start, limit, step, &body)
}

fn builtin_dotimes(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let header = interp.list_input(&args[0])?;
    let body = interp.list_input(&args[1])?;
    let var = loop_variable(interp, &args[0], header.front())?;

    if header.len() < 2 {
        return Err(interp.doesnt_like(ErrorKind::BadInput, &args[0]));
    }
    let mut cursor = Cursor::new(header.clone().split_off(1));
    let count = match interp.evaluate(&mut cursor)? {
        Some(value) if cursor.is_empty() => interp.number_input(&value)?,
        _ => return Err(interp.doesnt_like(ErrorKind::BadInput, &args[0])),
    };

    count_loop(interp, &var, 1.0, count, 1.0, &body)
}

// ============================================================================
// Conditional loops
// ============================================================================

/// Runs `body` while the condition equals `expect`; `body_first` checks the
/// condition only after each run. The condition is re-forced every time.
fn builtin_conditional_loop(
    interp: &mut Interpreter,
    condition: &Thunk,
    body: &Thunk,
    expect: bool,
    body_first: bool,
) -> Outcome {
    let name = interp.current_procedure().to_string();
    tracing::trace!(procedure = %name, "conditional loop");

    // Both inputs are forced afresh on every pass.
    let run_body = |interp: &mut Interpreter| -> Outcome {
        let instructions = interp.force_value(body, &name)?;
        let instructions = interp.list_input(&instructions)?;
        interp.execute(instructions, false)
    };

    if body_first {
        run_body(interp)?;
    }
    loop {
        interp.check_abort()?;
        if interp.condition(condition, &name)? != expect {
            return Ok(None);
        }
        run_body(interp)?;
    }
}

// ============================================================================
// Conditionals
// ============================================================================

fn builtin_if(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let name = interp.current_procedure().to_string();
    let mut args = args.into_iter();
    let (Some(test), Some(then)) = (args.next(), args.next()) else {
        return Err(fault(ErrorKind::Arity, format!("Not enough inputs to {name}")));
    };
    let otherwise = args.next();

    let branch = if interp.truth_of(test, &name)? {
        Some(then)
    } else {
        otherwise
    };

    match branch {
        Some(branch) => {
            let body = interp.list_input(&branch)?;
            interp.execute(body, true)
        }
        None => Ok(None),
    }
}

fn builtin_test(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let name = interp.current_procedure().to_string();
    let result = interp.truth_of(args[0].clone(), &name)?;
    interp.scopes.innermost_mut().test = Some(result);
    Ok(None)
}

fn builtin_iftest(interp: &mut Interpreter, body: &Value, when: bool) -> Outcome {
    let Some(result) = interp.scopes.innermost().test else {
        return Err(fault(
            ErrorKind::BadInput,
            format!("{} without TEST", interp.current_procedure()),
        ));
    };
    let body = interp.list_input(body)?;
    if result == when {
        interp.execute(body, true)
    } else {
        Ok(None)
    }
}

fn clause_parts(interp: &Interpreter, clause: &Value) -> Result<(Value, Vector<Value>), Unwind> {
    let mut items = interp.list_input(clause)?;
    match items.pop_front() {
        Some(head) => Ok((head, items)),
        None => Err(interp.doesnt_like(ErrorKind::BadInput, clause)),
    }
}

fn builtin_case(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let clauses = interp.list_input(&args[1])?;
    for clause in &clauses {
        let (keys, result) = clause_parts(interp, clause)?;
        let matched = match &keys {
            _ if keys.is_keyword("else") => true,
            Value::List(keys) => keys.iter().any(|key| key == &args[0]),
            key => key == &args[0],
        };
        if matched {
            return interp.execute(result, true);
        }
    }
    Ok(None)
}

fn builtin_cond(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let clauses = interp.list_input(&args[0])?;
    for clause in &clauses {
        let (test, result) = clause_parts(interp, clause)?;
        let matched = if test.is_keyword("else") {
            true
        } else {
            let value = match test {
                Value::List(items) => interp.evaluate_list(items, "COND")?,
                atom => {
                    let mut cursor = Cursor::new(Vector::unit(atom));
                    interp.evaluate(&mut cursor)?.ok_or_else(|| {
                        fault(ErrorKind::NoOutput, "COND clause test produced no value")
                    })?
                }
            };
            interp.truth_of(value, "COND")?
        };
        if matched {
            return interp.execute(result, true);
        }
    }
    Ok(None)
}

// ============================================================================
// Evaluation
// ============================================================================

fn builtin_run(interp: &mut Interpreter, args: Vec<Value>) -> Outcome {
    let instructions = match &args[0] {
        Value::List(items) => items.clone(),
        word => Vector::unit(word.clone()),
    };
    interp.execute(instructions, true)
}
