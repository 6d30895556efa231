use std::fmt;

use crate::token::{Token, TokenType};

/// A single static (lexical or syntactic) error, recorded during scanning
/// or parsing. Static errors never abort their pass; they accumulate here
/// and gate interpretation afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error{}: {}",
            self.line, self.location, self.message
        )
    }
}

/// Ordered collector for static diagnostics, threaded explicitly through
/// the scanner and parser instead of living in process-wide flags.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn scanner_error(&mut self, line: usize, message: &str) {
        self.report(line, String::new(), message);
    }

    pub fn parser_error(&mut self, token: &Token, message: &str) {
        let location = match token.token_type {
            TokenType::Eof => " at end".to_string(),
            _ => format!(" at '{}'", token.lexeme),
        };
        self.report(token.line, location, message);
    }

    fn report(&mut self, line: usize, location: String, message: &str) {
        self.diagnostics.push(Diagnostic {
            line,
            location,
            message: message.to_string(),
        });
    }

    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
