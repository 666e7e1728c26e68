pub mod ast;
pub mod cli;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Node, Property, Token, TokenKind};
pub use evaluator::{EvalContext, EvalError, Evaluator};
pub use lexer::{LexError, Lexer, LexerMode, Position};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser, parse};
pub use value::Value;
