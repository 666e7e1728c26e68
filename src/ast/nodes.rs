use crate::ast::BinOp;

/// Abstract Syntax Tree node of a parsed template.
///
/// Literal JSON structure and directives share one tree. Each node owns its
/// children, nothing points back up.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Literals
    /// String literal
    ///
    /// Holds the raw text between the quotes. Escapes have been validated by
    /// the lexer but are decoded only when the node is evaluated.
    ///
    /// # Example
    /// ```text
    /// "hello\nworld"
    /// ```
    String(String),

    /// Number literal
    ///
    /// # Example
    /// ```text
    /// -1.5e3
    /// ```
    Number(f64),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// Array literal, elements in source order
    ///
    /// # Example
    /// ```text
    /// [1, {{ x.name }}, null]
    /// ```
    Array(Vec<Node>),

    /// Object literal
    ///
    /// Properties keep their source order. Duplicate keys are kept as
    /// written.
    ///
    /// # Example
    /// ```text
    /// {"id": {{ i }}, "name": "fixed"}
    /// ```
    Object(Vec<Property>),

    // Directives
    /// Loop over an array from the data context
    ///
    /// `index_ident` and `value_ident` are plain names; the evaluator binds them for each
    /// iteration of `body`.
    ///
    /// # Example
    /// ```text
    /// {{ range i, x := $.results }} {"id": {{ i }}} {{ end }}
    /// ```
    Range {
        index_ident: String,
        value_ident: String,
        iterable: Box<Node>,
        body: Box<Node>,
    },

    /// Conditional
    ///
    /// # Example
    /// ```text
    /// {{ if x.active }} "yes" {{ else }} "no" {{ end }}
    /// ```
    If {
        condition: Box<Node>,
        then_body: Box<Node>,
        else_body: Option<Box<Node>>,
    },

    /// Reference into the data context
    ///
    /// Segments are in traversal order. A path rooted at the context starts
    /// with the segment `"$"`; otherwise the first segment names a range
    /// binding.
    ///
    /// # Examples
    /// ```text
    /// $                 // ["$"]
    /// $.results         // ["$", "results"]
    /// x.login.username  // ["x", "login", "username"]
    /// ```
    Path(Vec<String>),

    // Expressions
    /// Function application by juxtaposition
    ///
    /// # Example
    /// ```text
    /// {{ concatName x.name "!" }}
    /// ```
    Call { name: String, args: Vec<Node> },

    /// Binary operation (comparison, logical, null-coalescing)
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Whether this is a path rooted at `$`.
    pub fn is_rooted_path(&self) -> bool {
        matches!(self, Node::Path(segments) if segments.first().is_some_and(|s| s == "$"))
    }
}

/// A `"key": value` member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Node,
}

impl Property {
    pub fn new(key: impl Into<String>, value: Node) -> Self {
        Property {
            key: key.into(),
            value,
        }
    }
}
