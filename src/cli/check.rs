//! Parse and render templates against JSON input

use tracing::debug;

use super::CliError;
use crate::{Evaluator, Lexer, Parser, Value, to_json, to_json_pretty};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Template source text
    pub template: String,
    /// JSON input string, bound to `$`
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't render
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Template rendered; the JSON text of the result
    Success(String),
}

/// Execute a kriti check operation
///
/// Rendering uses an evaluator without host functions, so templates that
/// call functions fail with an undefined function error.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let lexer = Lexer::new(&options.template);
    let mut parser = Parser::new(lexer)?;
    let template = parser.parse()?.ok_or(CliError::EmptyTemplate)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;
    let data = Value::from(json_value);

    debug!(target: "kriti::cli", root = data.type_name(), "rendering template");

    let evaluator = Evaluator::new();
    let result = evaluator.eval(&template, &data)?;

    let json = if options.pretty {
        to_json_pretty(&result)
    } else {
        to_json(&result)
    };
    Ok(CheckResult::Success(json))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(template: &str, input: Option<&str>) -> CheckOptions {
        CheckOptions {
            template: template.to_string(),
            input: input.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_syntax_only() {
        let mut opts = options(r#"{"a": {{ $.a }}}"#, None);
        opts.syntax_only = true;
        assert_eq!(execute_check(&opts).unwrap(), CheckResult::SyntaxValid);
    }

    #[test]
    fn test_render() {
        let opts = options(
            r#"{{ range i, x := $.items }} {"n": {{ i }}, "v": {{ x.v }}} {{ end }}"#,
            Some(r#"{"items": [{"v": "a"}, {"v": "b"}]}"#),
        );
        assert_eq!(
            execute_check(&opts).unwrap(),
            CheckResult::Success(r#"[{"n":0,"v":"a"},{"n":1,"v":"b"}]"#.to_string())
        );
    }

    #[test]
    fn test_missing_input() {
        let opts = options("[1]", None);
        assert!(matches!(execute_check(&opts), Err(CliError::NoInput)));
    }

    #[test]
    fn test_empty_template() {
        let opts = options("   ", Some("{}"));
        assert!(matches!(execute_check(&opts), Err(CliError::EmptyTemplate)));
    }

    #[test]
    fn test_invalid_json_input() {
        let opts = options("[1]", Some("{nope"));
        assert!(matches!(execute_check(&opts), Err(CliError::Json(_))));
    }
}
