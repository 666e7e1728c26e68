use kriti_lang::{
    EvalError, Evaluator, Value, parse,
    output::{to_json, to_json_pretty},
};
use serde_json::json;

fn render_with(evaluator: &Evaluator, template: &str, data: serde_json::Value) -> Result<Value, EvalError> {
    let node = parse(template).unwrap().expect("template should not be empty");
    evaluator.eval(&node, &Value::from(data))
}

fn render(template: &str, data: serde_json::Value) -> Result<Value, EvalError> {
    render_with(&Evaluator::new(), template, data)
}

fn render_json(template: &str, data: serde_json::Value) -> String {
    to_json(&render(template, data).unwrap())
}

fn string_arg<'a>(args: &'a [Value], key: &str) -> Result<&'a str, EvalError> {
    args.first()
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .ok_or_else(|| EvalError::TypeError(format!("expected object with string `{}`", key)))
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_plain_json_renders_unchanged() {
    let template = r#"{"b": [1, 2.5, -3e2], "a": {"x": null, "y": true}, "s": "hi"}"#;
    assert_eq!(
        render_json(template, json!({})),
        r#"{"b":[1,2.5,-300],"a":{"x":null,"y":true},"s":"hi"}"#
    );
}

#[test]
fn test_duplicate_keys_survive_rendering() {
    assert_eq!(
        render_json(r#"{"a": 1, "a": {{ $.x }}}"#, json!({"x": 2})),
        r#"{"a":1,"a":2}"#
    );
}

#[test]
fn test_strings_are_decoded() {
    let out = render(r#"{"kéy": "a\nb \"q\" 😀 \/"}"#, json!({})).unwrap();
    assert_eq!(
        out,
        Value::Object(vec![(
            "kéy".to_string(),
            Value::String("a\nb \"q\" \u{1F600} /".to_string())
        )])
    );
    assert_eq!(to_json(&out), "{\"kéy\":\"a\\nb \\\"q\\\" \u{1F600} /\"}");
}

#[test]
fn test_lone_surrogate_is_error() {
    assert!(matches!(
        render(r#""\ud83d""#, json!({})),
        Err(EvalError::InvalidString(_))
    ));
    assert!(matches!(
        render(r#""\ud83dA""#, json!({})),
        Err(EvalError::InvalidString(_))
    ));
}

#[test]
fn test_pretty_output() {
    let out = render(r#"{"a": [1, {"b": null}], "c": {}}"#, json!({})).unwrap();
    assert_eq!(
        to_json_pretty(&out),
        "{\n  \"a\": [\n    1,\n    {\n      \"b\": null\n    }\n  ],\n  \"c\": {}\n}"
    );
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_root_path() {
    assert_eq!(
        render("{{ $.user.name }}", json!({"user": {"name": "Ada"}})).unwrap(),
        Value::String("Ada".into())
    );
    assert_eq!(render("{{ $ }}", json!([1])).unwrap(), Value::Array(vec![Value::Number(1.0)]));
}

#[test]
fn test_missing_key_is_access_error() {
    assert!(matches!(
        render("{{ $.user.age }}", json!({"user": {"name": "Ada"}})),
        Err(EvalError::AccessError(_))
    ));
}

#[test]
fn test_path_through_scalar_is_type_error() {
    assert!(matches!(
        render("{{ $.a.b }}", json!({"a": 1})),
        Err(EvalError::TypeError(_))
    ));
}

#[test]
fn test_unbound_variable() {
    assert_eq!(
        render("{{ x.name }}", json!({})),
        Err(EvalError::UndefinedVariable("x".into()))
    );
}

#[test]
fn test_keyword_named_keys() {
    let data = json!({"range": {"end": 1, "Null": 2}, "if": [true]});
    assert_eq!(
        render_json("[{{ $.range.end }}, {{ $.range.Null }}, {{ $.if }}]", data),
        "[1,2,[true]]"
    );
}

#[test]
fn test_input_numbers_keep_their_value() {
    let out = render("{{ $.n }}", json!({"n": 12.5})).unwrap();
    assert_eq!(out, Value::Number(12.5));
}

#[test]
fn test_enclosed_template() {
    assert_eq!(render_json("[({{ $.a }}), 2]", json!({"a": "one"})), r#"["one",2]"#);
}

// ============================================================================
// Range
// ============================================================================

#[test]
fn test_range_binds_index_and_value() {
    let template = r#"{{ range i, x := $.items }} {"n": {{ i }}, "v": {{ x }}} {{ end }}"#;
    assert_eq!(
        render_json(template, json!({"items": ["a", "b", "c"]})),
        r#"[{"n":0,"v":"a"},{"n":1,"v":"b"},{"n":2,"v":"c"}]"#
    );
}

#[test]
fn test_range_over_empty_array() {
    assert_eq!(
        render("{{ range i, x := $.items }} {{ x }} {{ end }}", json!({"items": []})).unwrap(),
        Value::Array(vec![])
    );
}

#[test]
fn test_range_over_non_array_is_type_error() {
    assert!(matches!(
        render("{{ range i, x := $.items }} {{ x }} {{ end }}", json!({"items": {"a": 1}})),
        Err(EvalError::TypeError(_))
    ));
}

#[test]
fn test_nested_range_shadows_outer_binding() {
    let template = "{{ range i, x := $.rows }} {{ range i, y := x }} [{{ i }}, {{ y }}] {{ end }} {{ end }}";
    assert_eq!(
        render_json(template, json!({"rows": [[10, 20], [30]]})),
        "[[[0,10],[1,20]],[[0,30]]]"
    );
}

#[test]
fn test_range_binding_does_not_leak() {
    let template = "[{{ range i, x := $.a }} 1 {{ end }}, {{ x }}]";
    assert_eq!(
        render(template, json!({"a": [1]})),
        Err(EvalError::UndefinedVariable("x".into()))
    );
}

// ============================================================================
// If
// ============================================================================

#[test]
fn test_if_else() {
    let template = r#"{{ range _, u := $.users }} {{ if u.admin }} {{ u.name }} {{ else }} "guest" {{ end }} {{ end }}"#;
    let data = json!({"users": [{"name": "ada", "admin": true}, {"name": "bob", "admin": false}]});
    assert_eq!(render_json(template, data), r#"["ada","guest"]"#);
}

#[test]
fn test_false_if_without_else_is_null() {
    assert_eq!(
        render("{{ if $.flag }} 1 {{ end }}", json!({"flag": false})).unwrap(),
        Value::Null
    );
    assert_eq!(
        render("{{ if true }} 1 {{ end }}", json!({})).unwrap(),
        Value::Number(1.0)
    );
}

#[test]
fn test_if_condition_must_be_boolean() {
    assert!(matches!(
        render("{{ if $.flag }} 1 {{ end }}", json!({"flag": "yes"})),
        Err(EvalError::TypeError(_))
    ));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_sample_template_with_functions() {
    let template = r#"{{ range i, x := $.results }}
        {
            "id": {{i}},
            "fullName": {{concatName x.name}},
            "profile": {
                "gender": {{getG x.gender}},
                "emailID": {{x.email}},
                "isSuperUser": {{isAdmin x.login}}
            }
        }
    {{ end }}"#;

    let data = json!({
        "results": [
            {
                "name": {"first": "Ada", "last": "Lovelace"},
                "gender": "female",
                "email": "ada@example.com",
                "login": {"username": "admin"}
            },
            {
                "name": {"first": "Alan", "last": "Turing"},
                "gender": "male",
                "email": "alan@example.com",
                "login": {"username": "alan"}
            }
        ]
    });

    let mut evaluator = Evaluator::new();
    evaluator
        .register("concatName", |args| {
            let first = string_arg(args, "first")?;
            let last = string_arg(args, "last")?;
            Ok(Value::String(format!("{} {}", first, last)))
        })
        .register("getG", |args| match args.first().and_then(Value::as_str) {
            Some("female") => Ok(Value::String("F".into())),
            Some("male") => Ok(Value::String("M".into())),
            _ => Ok(Value::Null),
        })
        .register("isAdmin", |args| {
            Ok(Value::Boolean(string_arg(args, "username")? == "admin"))
        });

    let out = render_with(&evaluator, template, data).unwrap();
    assert_eq!(
        to_json(&out),
        concat!(
            r#"[{"id":0,"fullName":"Ada Lovelace","profile":{"gender":"F","emailID":"ada@example.com","isSuperUser":true}},"#,
            r#"{"id":1,"fullName":"Alan Turing","profile":{"gender":"M","emailID":"alan@example.com","isSuperUser":false}}]"#
        )
    );
}

#[test]
fn test_function_receives_every_argument() {
    let mut evaluator = Evaluator::new();
    evaluator.register("args", |args| Ok(Value::Array(args.to_vec())));

    let out = render_with(&evaluator, r#"{{ args $.a "s" 1 null (true) }}"#, json!({"a": 7})).unwrap();
    assert_eq!(to_json(&out), r#"[7,"s",1,null,true]"#);
}

#[test]
fn test_nested_calls() {
    let mut evaluator = Evaluator::new();
    evaluator
        .register("upper", |args| {
            let s = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::String(s.to_uppercase()))
        })
        .register("twice", |args| {
            let s = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::String(s.repeat(2)))
        });

    let out = render_with(&evaluator, "{{ twice (upper $.s) }}", json!({"s": "ab"})).unwrap();
    assert_eq!(out, Value::String("ABAB".into()));
}

#[test]
fn test_later_registration_replaces_earlier() {
    let mut evaluator = Evaluator::new();
    evaluator.register("f", |_| Ok(Value::Number(1.0)));
    evaluator.register("f", |_| Ok(Value::Number(2.0)));

    assert_eq!(
        render_with(&evaluator, "{{ f $ }}", json!(null)).unwrap(),
        Value::Number(2.0)
    );
}

#[test]
fn test_undefined_function() {
    assert_eq!(
        render("{{ missing $.a }}", json!({"a": 1})),
        Err(EvalError::UndefinedFunction("missing".into()))
    );
}

#[test]
fn test_function_error_propagates() {
    let mut evaluator = Evaluator::new();
    evaluator.register("fail", |_| Err(EvalError::TypeError("nope".into())));

    assert_eq!(
        render_with(&evaluator, "[1, {{ fail 1 }}]", json!({})),
        Err(EvalError::TypeError("nope".into()))
    );
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_operators_are_unsupported() {
    for template in [
        "{{ $.a == 1 }}",
        "{{ $.a && $.b }}",
        "{{ $.a ?? 'x' }}",
        "{{ if $.a > 1 }} 1 {{ end }}",
    ] {
        assert!(
            matches!(render(template, json!({"a": 2, "b": true})), Err(EvalError::Unsupported(_))),
            "expected unsupported for {}",
            template
        );
    }
}
