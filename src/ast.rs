//! # Kriti Template Language - Abstract Syntax Tree
//!
//! Kriti lays `{{ ... }}` directives over plain JSON. A template is a JSON
//! value in which any value position may instead hold a directive that
//! computes it from a data context.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - Tree nodes: JSON literals, directives and expressions
//! - **[operators]** - Binary operators of the expression grammar
//!
//! ## Quick Start
//!
//! ```text
//! {{ range i, x := $.results }}
//!   {
//!     "id": {{ i }},
//!     "email": {{ x.email }},
//!     "admin": {{ if x.admin }} true {{ else }} false {{ end }}
//!   }
//! {{ end }}
//! ```
//!
//! ## Core Concepts
//!
//! ### Directives
//!
//! - **Range** `{{ range i, x := <path> }} body {{ end }}` - repeat `body`
//!   for each element of an array, binding its index and value
//! - **If** `{{ if <expr> }} then {{ else }} otherwise {{ end }}` - pick one
//!   branch; the `else` branch is optional
//! - **Expression** `{{ <expr> }}` - any other directive computes a value
//!
//! ### Paths
//!
//! `$` is the data context. `$.a.b` walks object keys from it, and `x.a`
//! walks from a range binding `x`.
//!
//! ### Expressions
//!
//! Inside a directive, from lowest to highest precedence:
//!
//! | Level      | Operators                      | Associativity |
//! |------------|--------------------------------|---------------|
//! | coalesce   | `??`                           | left          |
//! | or         | `\|\|`                         | left          |
//! | and        | `&&`                           | left          |
//! | comparison | `==` `!=` `<` `>` `<=` `>=`    | none          |
//! | call       | `name arg arg ...`             | -             |
//!
//! Atoms are paths, literals and parenthesized expressions.
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{Node, Property};
pub use operators::BinOp;
pub use tokens::{Token, TokenKind};
