//! A tree-walking interpreter for the Lox scripting language.
//!
//! The pipeline is strictly sequential: source text is scanned into
//! tokens, parsed into an AST by recursive descent, and evaluated
//! against a chain of lexical scopes. Lexical and syntactic errors
//! accumulate in a [`diagnostics::Diagnostics`] collector and gate
//! interpretation; runtime errors are fail-fast.

pub mod ast;
pub mod ast_printer;
pub mod diagnostics;
pub mod environment;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod scanner;
pub mod token;
