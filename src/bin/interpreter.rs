extern crate env_logger;
#[cfg(not(target_os = "emscripten"))]
extern crate rustyline;
extern crate yue;

use std::env::{args, var};
use std::fmt::Display;
use std::process;

use yue::reader::{read, Source};
use yue::vm::{default_context, Config, Context, DEFAULT_MEMORY};

fn main() {
    env_logger::init();

    let file = args().nth(1);
    let with_profiler = var("PROFILE").map(|s| !s.is_empty()).unwrap_or(false);
    let memory = var("YUE_MEMORY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MEMORY);

    let mut ctx = default_context(Config::with_memory(memory)).unwrap_or_else(|e| fatal(e));

    match file {
        Some(file) => run_file(&mut ctx, file),
        None => run_repl(&mut ctx),
    }

    if with_profiler {
        eprintln!("{}", ctx.stats());
    }
}

fn fatal<E: Display>(error: E) -> ! {
    eprintln!("ERROR: {}", error);
    process::exit(1);
}

fn run_file(ctx: &mut Context, file_path: String) {
    let source = std::fs::read(&file_path).unwrap_or_else(|e| {
        eprintln!("ERROR: failed to read file {}", file_path);
        fatal(e)
    });

    let depth = ctx.mark();
    let mut cursor = Source::new(&source);

    loop {
        ctx.release(depth);
        let program = read(ctx, &mut cursor).unwrap_or_else(|e| fatal(e));
        if ctx.is_nil(program) {
            break;
        }
        ctx.evaluate(program).unwrap_or_else(|e| fatal(e));
    }
    ctx.release(depth);
}

#[cfg(not(target_os = "emscripten"))]
fn run_repl(ctx: &mut Context) {
    use rustyline::error::ReadlineError;

    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(_) => continue,
        };

        rl.add_history_entry(line.as_str());

        let mut scope = ctx.scope();
        let program = match read(&mut scope, &mut Source::from_str(&line)) {
            Ok(program) => program,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        if scope.is_nil(program) {
            continue;
        }

        match scope.evaluate(program) {
            Ok(value) => println!("{}", scope.display(value)),
            Err(e) => println!("Error: {}", e),
        }
    }
}

#[cfg(target_os = "emscripten")]
fn run_repl(_: &mut Context) {
    fatal("provide an input file path");
}
