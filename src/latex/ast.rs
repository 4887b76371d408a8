//! The LaTeX abstract syntax tree
//!
//! [`Node`] is a tagged union over every construct the parser can
//! produce. The serialized form is the unified-latex JSON node shape:
//! an internally tagged `"type"` field (`"root"`, `"string"`,
//! `"macro"`, ...) with camelCase attribute names, so dumps from this
//! crate are interchangeable with tooling written against that format.
//!
//! Invariants:
//!
//! - The tree owns its children exclusively; there is no sharing and
//!   no cycles.
//! - A node's span contains the spans of all its descendants.
//! - Sibling order is significant and preserved by traversal.
//!
//! Trees are built once by the parser, optionally rewritten through
//! [`visit`](super::visit), read by the printer or serializer, and then
//! dropped. Nothing is persisted.

use super::position::SourceSpan;
use serde::{Deserialize, Serialize};

/// An argument bound to a macro or environment.
///
/// `open_mark`/`close_mark` record the delimiters actually present in
/// the source (`{`/`}`, `[`/`]`, or empty for a bare single-token
/// argument such as the `2` in `\frac12`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub open_mark: String,
    pub close_mark: String,
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourceSpan>,
}

impl Argument {
    pub fn new(open_mark: &str, close_mark: &str, content: Vec<Node>) -> Self {
        Self {
            open_mark: open_mark.to_string(),
            close_mark: close_mark.to_string(),
            content,
            position: None,
        }
    }
}

/// A LaTeX AST node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// The document root.
    Root {
        content: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A run of literal text.
    String {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A whitespace run that stays within one line break.
    Whitespace {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A whitespace run containing a blank line, i.e. a paragraph
    /// break.
    Parbreak {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A `%` comment. `sameline` records whether source content
    /// precedes the comment on its line; the printer uses it to keep
    /// end-of-line comments attached.
    Comment {
        content: String,
        sameline: bool,
        #[serde(rename = "leadingWhitespace")]
        leading_whitespace: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A control sequence with its bound arguments. `content` is the
    /// macro name without the escape character.
    Macro {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Argument>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A `\begin{name}...\end{name}` block.
    Environment {
        env: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Argument>,
        content: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// An environment whose body is math (`equation`, `align`, ...).
    MathEnv {
        env: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Argument>,
        content: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// An environment whose body is captured raw (`verbatim`,
    /// `lstlisting`, ...).
    Verbatim {
        env: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// Display math (`$$...$$` or `\[...\]`).
    DisplayMath {
        content: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// Inline math (`$...$` or `\(...\)`).
    InlineMath {
        content: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// A brace group.
    Group {
        content: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
    /// `\verb|...|` style inline verbatim. `env` is `verb` or `verb*`;
    /// `escape` is the delimiter character used.
    Verb {
        env: String,
        escape: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourceSpan>,
    },
}

impl Node {
    /// The serialized tag of this node.
    pub fn node_type(&self) -> &'static str {
        match self {
            Node::Root { .. } => "root",
            Node::String { .. } => "string",
            Node::Whitespace { .. } => "whitespace",
            Node::Parbreak { .. } => "parbreak",
            Node::Comment { .. } => "comment",
            Node::Macro { .. } => "macro",
            Node::Environment { .. } => "environment",
            Node::MathEnv { .. } => "mathenv",
            Node::Verbatim { .. } => "verbatim",
            Node::DisplayMath { .. } => "displaymath",
            Node::InlineMath { .. } => "inlinemath",
            Node::Group { .. } => "group",
            Node::Verb { .. } => "verb",
        }
    }

    /// The source span of this node, if the parser recorded one.
    pub fn position(&self) -> Option<&SourceSpan> {
        match self {
            Node::Root { position, .. }
            | Node::String { position, .. }
            | Node::Whitespace { position }
            | Node::Parbreak { position }
            | Node::Comment { position, .. }
            | Node::Macro { position, .. }
            | Node::Environment { position, .. }
            | Node::MathEnv { position, .. }
            | Node::Verbatim { position, .. }
            | Node::DisplayMath { position, .. }
            | Node::InlineMath { position, .. }
            | Node::Group { position, .. }
            | Node::Verb { position, .. } => position.as_ref(),
        }
    }

    /// Child nodes, for the variants that have them.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root { content, .. }
            | Node::Environment { content, .. }
            | Node::MathEnv { content, .. }
            | Node::DisplayMath { content, .. }
            | Node::InlineMath { content, .. }
            | Node::Group { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Mutable child nodes, for the variants that have them.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root { content, .. }
            | Node::Environment { content, .. }
            | Node::MathEnv { content, .. }
            | Node::DisplayMath { content, .. }
            | Node::InlineMath { content, .. }
            | Node::Group { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Bound arguments, for macros and environments.
    pub fn args(&self) -> Option<&[Argument]> {
        match self {
            Node::Macro { args, .. }
            | Node::Environment { args, .. }
            | Node::MathEnv { args, .. } => Some(args),
            _ => None,
        }
    }

    /// Mutable bound arguments, for macros and environments.
    pub fn args_mut(&mut self) -> Option<&mut Vec<Argument>> {
        match self {
            Node::Macro { args, .. }
            | Node::Environment { args, .. }
            | Node::MathEnv { args, .. } => Some(args),
            _ => None,
        }
    }

    /// A text node with no recorded position.
    pub fn text(content: &str) -> Node {
        Node::String {
            content: content.to_string(),
            position: None,
        }
    }
}

/// Serialize a tree to pretty-printed JSON. Field order is
/// struct-declaration order, so output is deterministic for a given
/// tree.
pub fn to_json(root: &Node) -> serde_json::Result<String> {
    serde_json::to_string_pretty(root)
}

/// Serialize a tree to YAML, for human inspection.
pub fn to_yaml(root: &Node) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::Root {
            content: vec![
                Node::Macro {
                    content: "frac".to_string(),
                    args: vec![
                        Argument::new("{", "}", vec![Node::text("1")]),
                        Argument::new("{", "}", vec![Node::text("2")]),
                    ],
                    position: None,
                },
                Node::Whitespace { position: None },
                Node::text("x"),
            ],
            position: None,
        }
    }

    #[test]
    fn test_json_tags() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains(r#""type": "root""#));
        assert!(json.contains(r#""type": "macro""#));
        assert!(json.contains(r#""openMark": "{""#));
    }

    #[test]
    fn test_json_round_trip() {
        let root = sample();
        let json = to_json(&root).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);
    }

    #[test]
    fn test_empty_args_are_omitted() {
        let node = Node::Macro {
            content: "alpha".to_string(),
            args: vec![],
            position: None,
        };
        let json = to_json(&node).unwrap();
        assert!(json.contains(r#""content": "alpha""#));
        assert!(!json.contains("args"));
        assert!(!json.contains("position"));
    }

    #[test]
    fn test_children_access() {
        let mut root = sample();
        assert_eq!(root.children().unwrap().len(), 3);
        root.children_mut().unwrap().pop();
        assert_eq!(root.children().unwrap().len(), 2);
        assert!(Node::text("x").children().is_none());
    }
}
