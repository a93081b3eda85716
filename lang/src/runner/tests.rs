use super::*;
use crate::interp::{Config, ErrorKind, Properties, RuntimeError, STACK_BYTES_PER_CALL};
use crate::output::BufferedOutput;
use crate::turtle::{SimulatedTurtle, Turtle};

struct Session {
    interp: Interpreter,
    output: BufferedOutput,
    turtle: SimulatedTurtle,
}

fn session() -> Session {
    session_with(SimulatedTurtle::new(), Config::default())
}

fn session_with(turtle: SimulatedTurtle, config: Config) -> Session {
    let output = BufferedOutput::new();
    let interp = Interpreter::with_config(turtle.clone(), output.clone(), config);
    Session {
        interp,
        output,
        turtle,
    }
}

impl Session {
    fn run(&mut self, source: &str) -> Vec<String> {
        if let Err(err) = run_source(&mut self.interp, source) {
            panic!("{source:?} failed: {err}");
        }
        self.output.take()
    }

    fn error(&mut self, source: &str) -> RuntimeError {
        match run_source(&mut self.interp, source) {
            Err(LogoError::Runtime(err)) => err,
            other => panic!("{source:?} should fail at runtime, got {other:?}"),
        }
    }
}

fn output(source: &str) -> Vec<String> {
    session().run(source)
}

fn eval(source: &str) -> Value {
    let mut s = session();
    match evaluate_source(&mut s.interp, source) {
        Ok(Some(value)) => value,
        other => panic!("{source:?} should output a value, got {other:?}"),
    }
}

fn error(source: &str) -> RuntimeError {
    session().error(source)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// Expressions

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(eval("3 + 4 * 2"), Value::number(11.0));
    assert_eq!(eval("(3 + 4) * 2"), Value::number(14.0));
}

#[test]
fn power_is_right_associative() {
    assert_eq!(eval("2 ^ 3 ^ 2"), Value::number(512.0));
    assert_eq!(eval("2 * 3 ^ 2"), Value::number(18.0));
}

#[test]
fn relational_binds_loosest() {
    assert_eq!(eval("1 + 2 = 3"), Value::number(1.0));
    assert_eq!(eval("2 * 3 < 5"), Value::number(0.0));
    assert_eq!(eval("4 <> 5"), Value::number(1.0));
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(eval("10 - 4 - 3"), Value::number(3.0));
    assert_eq!(eval("10 / 4"), Value::number(2.5));
}

#[test]
fn unary_minus_applies_to_expressions() {
    assert_eq!(eval("- (2 + 3)"), Value::number(-5.0));
    assert_eq!(eval("3 * - 2"), Value::number(-6.0));
}

#[test]
fn modulo_is_floored() {
    assert_eq!(eval("7 % 3"), Value::number(1.0));
    assert_eq!(eval("-7 % 3"), Value::number(2.0));
    assert_eq!(eval("7 % -3"), Value::number(-2.0));
}

#[test]
fn division_by_zero_is_a_fault() {
    assert_eq!(error("show 5 / 0").kind, ErrorKind::DivideByZero);
    assert_eq!(error("show 5 % 0").kind, ErrorKind::DivideByZero);
}

#[test]
fn arithmetic_on_words_is_a_fault() {
    let err = error(r#"show 1 + "a"#);
    assert_eq!(err.kind, ErrorKind::NotANumber);
    assert_eq!(err.message, "+ doesn't like a as input");
}

#[test]
fn structural_equality_respects_nesting() {
    assert_eq!(eval("[1 [2 3]] = [1 [2 3]]"), Value::number(1.0));
    assert_eq!(eval("[1 2] = [2 1]"), Value::number(0.0));
    assert_eq!(eval(r#""abc = "abc"#), Value::number(1.0));
    assert_eq!(eval(r#""abc = "ABC"#), Value::number(0.0));
    assert_eq!(eval(r#"5 = "5.0"#), Value::number(1.0));
    assert_eq!(eval("[1] = 1"), Value::number(0.0));
}

#[test]
fn parenthesized_call_takes_any_number_of_inputs() {
    assert_eq!(output("(show 1 2 3)"), vec!["1 2 3"]);
    assert_eq!(output("(show)"), vec![""]);
}

#[test]
fn parenthesis_before_infix_groups_an_expression() {
    let lines = output("to five\noutput 5\nend\nshow (five + 1)");
    assert_eq!(lines, vec!["6"]);
}

#[test]
fn show_keeps_brackets_and_print_strips_them() {
    assert_eq!(output("show [a [b c]]"), vec!["[a [b c]]"]);
    assert_eq!(output("print [a [b c]]"), vec!["a [b c]"]);
    assert_eq!(output("show 2.5 show 4 / 2"), vec!["2.5", "2"]);
}

#[test]
fn names_are_case_insensitive() {
    assert_eq!(output("SHOW 1 Show 2"), vec!["1", "2"]);
    assert_eq!(output("TO Greet\nshow \"hi\nEND\ngreet"), vec!["hi"]);
}

// Dispatch failures

#[test]
fn unused_value_is_unexpected() {
    let err = error("3 + 4");
    assert_eq!(err.kind, ErrorKind::UnexpectedResult);
    assert_eq!(err.message, "You don't say what to do with 7");
}

#[test]
fn unknown_procedure() {
    let err = error("frobnicate");
    assert_eq!(err.kind, ErrorKind::UndefinedProcedure);
    assert_eq!(err.message, "I don't know how to frobnicate");
}

#[test]
fn arity_is_enforced() {
    let err = error("fd");
    assert_eq!(err.kind, ErrorKind::Arity);
    assert_eq!(err.message, "Not enough inputs to FD");

    let err = error("(fd 1 2)");
    assert_eq!(err.kind, ErrorKind::Arity);
    assert_eq!(err.message, "Too many inputs to FD");

    assert_eq!(error("(setxy 1)").kind, ErrorKind::Arity);
}

#[test]
fn unbound_variable() {
    let err = error("show :nope");
    assert_eq!(err.kind, ErrorKind::UnboundVariable);
    assert_eq!(err.message, "nope has no value");
}

#[test]
fn operand_without_output() {
    let err = error("show fd 10");
    assert_eq!(err.kind, ErrorKind::NoOutput);
    assert_eq!(err.message, "FD didn't output to SHOW");
}

#[test]
fn stray_parentheses_are_syntax_errors() {
    assert_eq!(error("show (1 + 2").kind, ErrorKind::Syntax);
    assert_eq!(error(")").kind, ErrorKind::Syntax);
    assert_eq!(error("show )").kind, ErrorKind::Arity);
    assert_eq!(error("show 1 +").kind, ErrorKind::Syntax);
}

#[test]
fn fault_records_procedure_chain() {
    let err = error("to inner\nshow 1 / 0\nend\nto outer\ninner\nend\nouter");
    assert_eq!(err.kind, ErrorKind::DivideByZero);
    assert_eq!(err.stack, vec!["OUTER", "INNER", "SHOW"]);
    assert_eq!(err.procedure(), Some("SHOW"));
    assert_eq!(err.to_string(), "Division by zero (in SHOW)");
}

#[test]
fn call_stack_is_empty_after_a_fault() {
    let mut s = session();
    s.error("to boom\nshow 1 / 0\nend\nboom");
    assert!(s.interp.call_stack().is_empty());
    assert_eq!(s.interp.scope_depth(), 1);
}

// Procedures

#[test]
fn output_returns_from_a_procedure() {
    let lines = output("to sq :n\noutput :n * :n\nend\nshow sq 4");
    assert_eq!(lines, vec!["16"]);
}

#[test]
fn recursion_through_if() {
    let source = "to fact :n\nif :n < 2 [output 1]\noutput :n * fact :n - 1\nend\nshow fact 5";
    assert_eq!(output(source), vec!["120"]);
}

#[test]
fn stop_ends_a_procedure_without_output() {
    let lines = output("to early\nshow 1\nstop\nshow 2\nend\nearly");
    assert_eq!(lines, vec!["1"]);
}

#[test]
fn output_and_stop_outside_a_procedure() {
    assert_eq!(error("output 1").kind, ErrorKind::OutsideProcedure);
    assert_eq!(error("stop").kind, ErrorKind::OutsideProcedure);
}

#[test]
fn optional_and_rest_inputs_bind_by_position() {
    let definition = "to f :a [:b 10] [:c]\n(show :a :b :c)\nend\n";

    let lines = output(&format!("{definition}f 1"));
    assert_eq!(lines, vec!["1 10 []"]);

    let lines = output(&format!("{definition}(f 1 2 3 4)"));
    assert_eq!(lines, vec!["1 2 [3 4]"]);
}

#[test]
fn optional_default_sees_earlier_inputs() {
    let lines = output("to g :a [:b :a * 2]\noutput :b\nend\nshow g 5");
    assert_eq!(lines, vec!["10"]);
}

#[test]
fn declared_default_arity() {
    let lines = output("to h :a [:b 1] 2\noutput :a + :b\nend\nshow h 1 2");
    assert_eq!(lines, vec!["3"]);

    let err = error("to k :a 3\nend");
    assert_eq!(err.kind, ErrorKind::BadDefinition);
}

#[test]
fn parenthesized_user_call_checks_bounds() {
    let definition = "to pair :a [:b 0]\noutput :a + :b\nend\n";
    let err = error(&format!("{definition}show (pair)"));
    assert_eq!(err.kind, ErrorKind::Arity);
    let err = error(&format!("{definition}show (pair 1 2 3)"));
    assert_eq!(err.kind, ErrorKind::Arity);
}

#[test]
fn malformed_definitions() {
    assert_eq!(error("to 3\nend").kind, ErrorKind::BadDefinition);
    assert_eq!(error("to + :a\nend").kind, ErrorKind::BadDefinition);
    assert_eq!(error("to foo\nfd 10").kind, ErrorKind::BadDefinition);
    assert_eq!(error("to fd :x\nend").kind, ErrorKind::RedefinePrimitive);
}

#[test]
fn user_procedures_may_be_redefined() {
    let lines = output("to v\nshow 1\nend\nto v\nshow 2\nend\nv");
    assert_eq!(lines, vec!["2"]);
}

// Scopes

#[test]
fn make_falls_back_to_a_new_global() {
    let lines = output("make \"x 5\nto peek\nshow :x\nend\npeek");
    assert_eq!(lines, vec!["5"]);

    let mut s = session();
    let lines = s.run("to setit\nmake \"y 7\nend\nsetit\nshow :y");
    assert_eq!(lines, vec!["7"]);
    assert_eq!(s.interp.variable("y"), Some(Value::number(7.0)));
}

#[test]
fn local_shadows_for_the_duration_of_a_call() {
    let lines = output(
        "make \"z 1\nto shadow\nlocal \"z\nmake \"z 2\nshow :z\nend\nshadow\nshow :z",
    );
    assert_eq!(lines, vec!["2", "1"]);
}

#[test]
fn localmake_and_thing() {
    let lines = output("to f\nlocalmake \"q 3\nshow thing \"q\nend\nf");
    assert_eq!(lines, vec!["3"]);
    assert_eq!(error("show thing \"q").kind, ErrorKind::UnboundVariable);
}

#[test]
fn inputs_are_visible_to_called_procedures() {
    let lines = output("to outer :n\ninner\nend\nto inner\nshow :n\nend\nouter 9");
    assert_eq!(lines, vec!["9"]);
}

// Control flow

#[test]
fn repeat_runs_body_and_restores_repcount() {
    let mut s = session();
    let lines = s.run("repeat 5 [show \"hi]");
    assert_eq!(lines, vec!["hi"; 5]);
    assert_eq!(s.interp.repcount(), 0);
}

#[test]
fn repcount_counts_from_one() {
    assert_eq!(output("repeat 5 [if repcount = 3 [show repcount]]"), vec!["3"]);
    assert_eq!(output("repeat 3 [show #]"), vec!["1", "2", "3"]);
}

#[test]
fn nested_repeat_restores_outer_count() {
    let lines = output("repeat 2 [repeat 3 [] show repcount]");
    assert_eq!(lines, vec!["1", "2"]);
}

#[test]
fn for_loop_counts_inclusively() {
    assert_eq!(output("for [i 1 3] [show :i]"), vec!["1", "2", "3"]);
    assert_eq!(output("for [i 3 1] [show :i]"), vec!["3", "2", "1"]);
    assert_eq!(output("for [i 10 0 -5] [show :i]"), vec!["10", "5", "0"]);
    assert_eq!(output("for [:i 1 2 0.5] [show :i]"), vec!["1", "1.5", "2"]);
}

#[test]
fn for_variable_persists_at_top_level() {
    let mut s = session();
    s.run("for [i 1 3] []");
    assert_eq!(s.interp.variable("i"), Some(Value::number(3.0)));
}

#[test]
fn for_variable_is_local_inside_a_procedure() {
    let mut s = session();
    let lines = s.run("to count\nfor [i 1 3] [show :i]\nend\ncount");
    assert_eq!(lines, vec!["1", "2", "3"]);
    assert_eq!(s.interp.variable("i"), None);
}

#[test]
fn for_header_must_have_bounds() {
    assert_eq!(error("for [i 1] []").kind, ErrorKind::BadInput);
    assert_eq!(error("for [] []").kind, ErrorKind::BadInput);
}

#[test]
fn dotimes_counts_from_one() {
    assert_eq!(output("dotimes [j 3] [show :j]"), vec!["1", "2", "3"]);
    assert_eq!(output("dotimes [j 0] [show :j]"), Vec::<String>::new());
}

#[test]
fn while_reevaluates_its_condition() {
    let lines = output("make \"i 0\nwhile :i < 3 [make \"i :i + 1]\nshow :i");
    assert_eq!(lines, vec!["3"]);
    let lines = output("make \"i 0\nwhile [:i < 2] [make \"i :i + 1]\nshow :i");
    assert_eq!(lines, vec!["2"]);
}

#[test]
fn while_reevaluates_its_body() {
    let source = "to next.body\nmake \"calls :calls + 1\noutput [make \"i :i + 1]\nend\n\
                  make \"calls 0\nmake \"i 0\nwhile :i < 3 next.body\nshow :calls";
    assert_eq!(output(source), vec!["3"]);
}

#[test]
fn until_loops_while_condition_is_false() {
    let lines = output("make \"i 0\nuntil :i = 2 [make \"i :i + 1]\nshow :i");
    assert_eq!(lines, vec!["2"]);
}

#[test]
fn post_condition_loops_run_at_least_once() {
    let lines = output("make \"n 10\ndo.while [make \"n :n + 1] :n < 5\nshow :n");
    assert_eq!(lines, vec!["11"]);
    let lines = output("make \"n 0\ndo.until [make \"n :n + 1] :n >= 3\nshow :n");
    assert_eq!(lines, vec!["3"]);
}

#[test]
fn if_and_ifelse_output_their_branch() {
    assert_eq!(output("show ifelse 1 > 2 [\"a] [\"b]"), vec!["b"]);
    assert_eq!(output("if [1 < 2] [show \"yes]"), vec!["yes"]);
    assert_eq!(output("(if 0 [show 1] [show 2])"), vec!["2"]);
    assert_eq!(output("if 0 [show 1]"), Vec::<String>::new());
}

#[test]
fn non_boolean_condition() {
    let err = error("if \"maybe [show 1]");
    assert_eq!(err.kind, ErrorKind::NotABoolean);
}

#[test]
fn test_sets_flag_for_iftrue_and_iffalse() {
    let lines = output("test 1 = 1\niftrue [show \"yes]\niffalse [show \"no]");
    assert_eq!(lines, vec!["yes"]);
    let lines = output("test \"false\nift [show \"yes]\niff [show \"no]");
    assert_eq!(lines, vec!["no"]);
}

#[test]
fn iftrue_without_test_in_scope() {
    let err = error("test 1\nto t\niftrue [show 1]\nend\nt");
    assert_eq!(err.kind, ErrorKind::BadInput);
}

#[test]
fn case_matches_keys_structurally() {
    let clauses = r#"[[[1 2] "low] [[3 [4]] "high] [else "other]]"#;
    assert_eq!(output(&format!("show case 2 {clauses}")), vec!["low"]);
    assert_eq!(output(&format!("show case [4] {clauses}")), vec!["high"]);
    assert_eq!(output(&format!("show case 9 {clauses}")), vec!["other"]);
}

#[test]
fn case_without_match_outputs_nothing() {
    let err = error(r#"show case 9 [[[1] "one]]"#);
    assert_eq!(err.kind, ErrorKind::NoOutput);
    assert_eq!(err.message, "CASE didn't output to SHOW");
}

#[test]
fn cond_takes_first_true_clause() {
    let source = r#"make "x 5
show cond [[[:x < 3] "small] [[:x < 10] "medium] [else "large]]"#;
    assert_eq!(output(source), vec!["medium"]);
}

#[test]
fn run_outputs_last_value() {
    assert_eq!(output("show run [3 + 4]"), vec!["7"]);
    assert_eq!(output("run [show 1 show 2]"), vec!["1", "2"]);
}

// Logic

#[test]
fn and_or_short_circuit() {
    let side = "to side\nshow \"forced\noutput \"true\nend\n";
    assert_eq!(output(&format!("{side}show and \"false side")), vec!["0"]);
    assert_eq!(output(&format!("{side}show or \"true side")), vec!["1"]);
    assert_eq!(
        output(&format!("{side}show and \"true side")),
        vec!["forced", "1"]
    );
}

#[test]
fn variadic_logic() {
    assert_eq!(eval("(and)"), Value::number(1.0));
    assert_eq!(eval("(or)"), Value::number(0.0));
    assert_eq!(eval("(and 1 1 0)"), Value::number(0.0));
    assert_eq!(eval("xor 1 0"), Value::number(1.0));
    assert_eq!(eval("(xor 1 1 1)"), Value::number(1.0));
    assert_eq!(eval("not 0"), Value::number(1.0));
    assert_eq!(eval("not true"), Value::number(0.0));
}

// Turtle

#[test]
fn motion_drives_the_turtle() {
    let mut s = session();
    s.run("fd 100 rt 90 fd 50");
    assert!(close(s.turtle.x(), 50.0));
    assert!(close(s.turtle.y(), 100.0));
    assert!(close(s.turtle.heading(), 90.0));
    assert_eq!(s.turtle.segments().len(), 2);

    s.run("lt 180 bk 10 setxy 0 0 seth 45");
    assert!(close(s.turtle.x(), 0.0));
    assert!(close(s.turtle.heading(), 45.0));
}

#[test]
fn motion_queries() {
    let mut s = session();
    assert_eq!(s.run("setpos [3 4] show pos"), vec!["[3 4]"]);
    assert_eq!(s.run("setx 7 show xcor show ycor"), vec!["7", "4"]);
    assert_eq!(s.run("home show heading show towards [0 5]"), vec!["0", "0"]);
    assert_eq!(s.run("pu show pendownp pd show pendown?"), vec!["0", "1"]);
}

#[test]
fn point_lists_must_have_two_numbers() {
    assert_eq!(error("setpos [1 2 3]").kind, ErrorKind::BadInput);
    assert_eq!(error("show towards [1]").kind, ErrorKind::BadInput);
    assert_eq!(error("setpos 5").kind, ErrorKind::NotAList);
}

#[test]
fn button_state_comes_from_the_turtle() {
    let mut s = session_with(SimulatedTurtle::new().with_button(true), Config::default());
    assert_eq!(s.run("show buttonp show button?"), vec!["1", "1"]);
}

#[test]
fn realtime_wait_with_huge_duration_returns() {
    let mut s = session_with(SimulatedTurtle::new().realtime(true), Config::default());
    s.run("wait 1e30\nwait 10 ^ 400");
    assert!(s.turtle.elapsed() >= 1e30);
}

#[test]
fn wait_beep_and_color() {
    let mut s = session();
    s.run("wait 2 beep setpc \"red ht st");
    assert!(close(s.turtle.elapsed(), 2.3));
    assert_eq!(s.turtle.tones().len(), 1);
    assert_eq!(s.turtle.color(), Some(Value::word("red")));
}

#[test]
fn io_variables_mirror_into_the_turtle() {
    let mut s = session();
    s.run("make \"leftLED 1\nmake \"counter 2");
    assert_eq!(s.turtle.io_var("leftLED"), Some(Value::number(1.0)));
    assert_eq!(s.interp.variable("leftled"), Some(Value::number(1.0)));
    assert_eq!(s.turtle.io_var("counter"), None);
}

// Host integration

#[test]
fn host_primitives_are_callable() {
    let mut s = session();
    s.interp
        .register_primitive("double", Properties::fixed(1), |interp, args| {
            let n = interp.number_input(&args[0])?;
            Ok(Some(Value::number(n * 2.0)))
        });
    assert_eq!(s.run("show double 21"), vec!["42"]);
    assert_eq!(s.error("to double\nend").kind, ErrorKind::RedefinePrimitive);
}

#[test]
fn depth_limit_stops_runaway_recursion() {
    let config = Config { max_call_depth: 50 };
    let mut s = session_with(SimulatedTurtle::new(), config);
    let err = s.error("to spin\nspin\nend\nspin");
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
    assert_eq!(s.interp.scope_depth(), 1);
}

#[test]
fn default_depth_limit_fits_a_standard_thread() {
    let limit = Config::default().max_call_depth;
    let err = error("to spin :n\nspin :n + 1\nend\nspin 0");
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
    assert_eq!(err.stack.len(), limit);

    let err = error("to spin :n\nrepeat 1 [if 1 [spin :n + 1]]\nend\nspin 0");
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
}

#[test]
fn depth_limit_scales_with_stack_size() {
    assert_eq!(Config::for_stack(8 * STACK_BYTES_PER_CALL).max_call_depth, 8);
    assert_eq!(Config::for_stack(0).max_call_depth, 1);
    assert!(Config::default().max_call_depth >= 100);
}

#[test]
fn abort_handle_stops_forever() {
    let mut s = session();
    let handle = s.interp.abort_handle();
    s.interp
        .register_primitive("halt", Properties::fixed(0), move |_, _| {
            handle.abort();
            Ok(None)
        });
    let err = s.error("forever [fd 1 if repcount = 5 [halt]]");
    assert_eq!(err.kind, ErrorKind::Aborted);
    assert!(close(s.turtle.y(), 5.0));
    assert_eq!(s.interp.repcount(), 0);
}

#[test]
fn evaluate_source_outputs_last_value() {
    let mut s = session();
    let value = evaluate_source(&mut s.interp, "make \"a 2\n:a * 3");
    assert_eq!(value, Ok(Some(Value::number(6.0))));
}

#[test]
fn read_errors_surface_through_the_runner() {
    let mut s = session();
    match run_source(&mut s.interp, "repeat 2 [fd 1") {
        Err(LogoError::Read(err)) => assert_eq!(err.line, 1),
        other => panic!("expected read error, got {other:?}"),
    }
}
