//! Token listing for debugging templates

use super::CliError;
use crate::{ast::TokenKind, lexer::tokenize};

/// Lists every token of `template`, one per line as `line:column Kind text`.
/// Fixed-form tokens and EOF are listed without text.
pub fn list_tokens(template: &str) -> Result<String, CliError> {
    let lines: Vec<String> = tokenize(template)?
        .into_iter()
        .map(|token| match token.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Illegal => {
                format!("{}:{} {:?} {}", token.line, token.column, token.kind, token.text)
            }
            _ => format!("{}:{} {:?}", token.line, token.column, token.kind),
        })
        .collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tokens() {
        let listing = list_tokens("{{ x }}\n[1]").unwrap();
        assert_eq!(
            listing,
            "1:1 TemplateStart\n1:4 Identifier x\n1:6 TemplateEnd\n2:1 LeftBracket\n2:2 Number 1\n2:3 RightBracket\n2:4 Eof"
        );
    }

    #[test]
    fn test_lex_error() {
        assert!(matches!(list_tokens("\"abc"), Err(CliError::Lex(_))));
    }
}
