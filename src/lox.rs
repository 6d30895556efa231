use std::{
    env, fs,
    io::{self, Write},
    process::exit,
};

use tracing::debug;

use crate::{
    ast_printer::AstPrinter,
    diagnostics::Diagnostics,
    interpreter::{Interpreter, RuntimeError},
    parser::Parser,
    scanner::Scanner,
};

/// What a single pipeline run produced, threaded back to the caller
/// instead of living in process-wide flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ok,
    /// At least one lexical or syntactic diagnostic; interpretation was
    /// never started.
    StaticError,
    /// Interpretation started and aborted on a runtime error.
    RuntimeError,
}

/// The driver: wires source input through scanner, parser and interpreter,
/// prints diagnostics, and maps outcomes to process exit codes.
pub struct Lox {
    interpreter: Interpreter,
}

impl Lox {
    pub fn new() -> Lox {
        Lox {
            interpreter: Interpreter::new(),
        }
    }

    pub fn main(&mut self) {
        let args = Vec::from_iter(env::args().skip(1));

        match args.len() {
            0 => self.run_prompt(),
            1 => self.run_file(&args[0]),
            _ => {
                eprintln!("Usage: rlox [script]");
                exit(64);
            }
        }
    }

    fn run_prompt(&mut self) {
        let mut lines = io::stdin().lines();

        loop {
            print!("> ");
            if io::stdout().flush().is_err() {
                return;
            }

            match lines.next() {
                Some(Ok(line)) => {
                    // The outcome is dropped on purpose: one bad line must
                    // not block the lines after it.
                    self.run(&line);
                }
                Some(Err(_)) | None => {
                    return;
                }
            }
        }
    }

    fn run_file(&mut self, path: &str) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Could not read '{}': {}", path, err);
                exit(74);
            }
        };

        match self.run(&content) {
            RunOutcome::Ok => {}
            RunOutcome::StaticError => exit(65),
            RunOutcome::RuntimeError => exit(70),
        }
    }

    pub fn run(&mut self, source: &str) -> RunOutcome {
        let mut diagnostics = Diagnostics::new();

        let tokens = Scanner::new(&mut diagnostics, source).scan_tokens();
        debug!(tokens = tokens.len(), "scanned source");

        let statements = Parser::new(&mut diagnostics, tokens).parse();

        if diagnostics.had_error() {
            for diagnostic in diagnostics.iter() {
                eprintln!("{}", diagnostic);
            }
            return RunOutcome::StaticError;
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            for statement in &statements {
                debug!(ast = %AstPrinter.print_stmt(statement));
            }
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunOutcome::Ok,
            Err(err) => {
                report_runtime_error(&err);
                RunOutcome::RuntimeError
            }
        }
    }
}

impl Default for Lox {
    fn default() -> Self {
        Lox::new()
    }
}

fn report_runtime_error(err: &RuntimeError) {
    eprintln!("{}\n[line {}]", err, err.token.line);
}
