//! CLI support for kriti-lang
//!
//! The `kriti` binary is a thin wrapper over these functions, which can also
//! be embedded in other tools.

mod check;
mod tokens;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use tokens::list_tokens;

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Lex error: {0}")]
    Lex(#[from] crate::LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No template provided. Pass it as an argument or use --file.")]
    NoTemplate,

    #[error("Template is empty")]
    EmptyTemplate,

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}
