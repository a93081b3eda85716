mod external;
mod output;

use logo::{runner, Config, Interpreter, LogoError, SimulatedTurtle};
use std::env;
use std::fs;
use std::io::Read;
use std::process;
use std::thread;
use std::time::Instant;

use external::Console;
use output::OutputMode;

/// Deep Logo recursion nests many Rust frames per call.
const INTERPRETER_STACK_BYTES: usize = 256 * 1024 * 1024;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse flags
    let mut eval_script: Option<String> = None;
    let mut script_path: Option<String> = None;
    let mut mode = OutputMode::Text;
    let mut realtime = env::var("LOGO_CLI_REALTIME").is_ok_and(|v| v == "1");
    let mut button = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-e" | "--eval" => {
                i += 1;
                if i < args.len() {
                    eval_script = Some(args[i].clone());
                } else {
                    eprintln!("Error: -e requires a script argument");
                    process::exit(1);
                }
            }
            "-o" | "--output" => {
                i += 1;
                match args.get(i).and_then(|name| OutputMode::parse(name)) {
                    Some(parsed) => mode = parsed,
                    None => {
                        eprintln!("Error: -o expects 'text' or 'json'");
                        process::exit(1);
                    }
                }
            }
            "--realtime" => realtime = true,
            "--button" => button = true,
            arg if !arg.starts_with('-') => {
                script_path = Some(arg.to_string());
            }
            unknown => {
                eprintln!("Unknown option: {}", unknown);
                process::exit(1);
            }
        }
        i += 1;
    }

    init_tracing();

    // Determine source: -e > file > stdin
    let source = if let Some(script) = eval_script {
        script
    } else if let Some(path) = script_path {
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                process::exit(1);
            }
        }
    } else if !atty::is(atty::Stream::Stdin) {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading from stdin: {}", e);
            process::exit(1);
        }
        source
    } else {
        print_help();
        process::exit(1);
    };

    let options = RunOptions {
        mode,
        realtime,
        button,
    };
    let worker = thread::Builder::new()
        .name("logo".to_string())
        .stack_size(INTERPRETER_STACK_BYTES)
        .spawn(move || run_script_from_source(&source, options));

    let result = match worker.map(|handle| handle.join()) {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(ExitCode::RuntimeError),
        Err(e) => {
            eprintln!("Error starting interpreter: {}", e);
            Err(ExitCode::RuntimeError)
        }
    };

    match result {
        Ok(()) => process::exit(0),
        Err(ExitCode::RuntimeError) => process::exit(2),
    }
}

enum ExitCode {
    RuntimeError,
}

#[derive(Clone, Copy)]
struct RunOptions {
    mode: OutputMode,
    realtime: bool,
    button: bool,
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, when it is set.
fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    if env::var("RUST_LOG").is_err() {
        return;
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::from_default_env())
        .init();
}

fn print_help() {
    println!("Logo CLI - turtle interpreter");
    println!();
    println!("USAGE:");
    println!("    logo-cli <SCRIPT>         Run a Logo program");
    println!("    logo-cli -e <CODE>        Evaluate inline program");
    println!("    logo-cli -h               Show this help");
    println!("    cat file | logo-cli       Read program from stdin");
    println!();
    println!("OPTIONS:");
    println!("    -e, --eval <CODE>         Evaluate inline program");
    println!("    -o, --output <MODE>       Output mode: text (default) or json");
    println!("        --realtime            Make wait and beep take real time");
    println!("        --button              Report the turtle button as pressed");
    println!();
    println!("ENVIRONMENT:");
    println!("    LOGO_CLI_REALTIME=1       Same as --realtime");
    println!("    RUST_LOG                  Tracing filter, e.g. logo=debug");
}

fn run_script_from_source(source: &str, options: RunOptions) -> Result<(), ExitCode> {
    let turtle = SimulatedTurtle::new()
        .realtime(options.realtime)
        .with_button(options.button);
    let console = match options.mode {
        OutputMode::Text => Console::stdout(),
        OutputMode::Json => Console::capturing(),
    };

    let config = Config::for_stack(INTERPRETER_STACK_BYTES);
    let mut interp = Interpreter::with_config(turtle.clone(), console.clone(), config);
    tracing::info!(bytes = source.len(), realtime = options.realtime, "run started");
    let started = Instant::now();
    let result = runner::run_source(&mut interp, source);
    let duration_ms = started.elapsed().as_millis() as u64;
    tracing::info!(duration_ms, ok = result.is_ok(), "run finished");

    match options.mode {
        OutputMode::Text => result.map_err(|e| {
            eprintln!("{}", e.format_with_source(source));
            ExitCode::RuntimeError
        }),
        OutputMode::Json => match result {
            Ok(()) => {
                match output::format_script_json(&turtle, duration_ms, console.entries()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error encoding output: {}", e);
                        return Err(ExitCode::RuntimeError);
                    }
                }
                Ok(())
            }
            Err(e) => {
                print_error_json(&e, &console);
                Err(ExitCode::RuntimeError)
            }
        },
    }
}

fn print_error_json(error: &LogoError, console: &Console) {
    let output = output::format_error_json(error, console.entries());
    match serde_json::to_string(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error encoding output: {}", e),
    }
}
