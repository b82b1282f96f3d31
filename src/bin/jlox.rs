//! Lox interpreter command-line.
//!
//! When called without argument it drops into an interactive
//! read-evaluate-print loop.  When called with one argument it runs the
//! corresponding file as a complete program.
//!
//! Exit codes follow sysexits.h: 64 for a usage error, 65 when the program
//! did not scan or parse (or the file could not be read), 70 when it failed
//! at runtime.

use std::env;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::process::ExitCode;

use anyhow::Context;

use jlox::interpreter::{Interpreter, LoxError};

const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let result = match args.as_slice() {
        [] => run_prompt(),
        [path] => run_file(path),
        _ => {
            eprintln!("Usage: jlox [script]");
            return ExitCode::from(EX_USAGE);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(EX_DATAERR)
        }
    }
}

fn run_file(path: &str) -> Result<ExitCode, anyhow::Error> {
    let source = fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;

    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);
    Ok(match interp.run(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            match e {
                LoxError::Syntax(_) => ExitCode::from(EX_DATAERR),
                LoxError::Runtime(_) => ExitCode::from(EX_SOFTWARE),
            }
        }
    })
}

fn run_prompt() -> Result<ExitCode, anyhow::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b"> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        // A bad line is reported and forgotten; the session carries on.
        if let Err(e) = interp.run(&input) {
            eprintln!("{}", e);
        }
    }

    Ok(ExitCode::SUCCESS)
}
