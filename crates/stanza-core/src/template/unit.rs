//! Compiled template representation
//!
//! A [`CompiledUnit`] is what the compiler produces and what the artifact cache
//! persists. It is a plain serde tree executed by the interpreter in
//! [`super::exec`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Executable form of one merged template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub nodes: Vec<Node>,
}

impl CompiledUnit {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Node {
    /// Literal text copied to the output
    Text { text: String },

    /// `[[ expr | filter(args) ]]`
    Output {
        value: Operand,
        filters: Vec<FilterCall>,
        escape: bool,
    },

    /// `if / elseif / else / endif`
    If {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Node>>,
    },

    /// `for binding in iterable`
    For {
        binding: String,
        iterable: PathExpr,
        body: Vec<Node>,
    },

    /// `##name(args)##`
    Macro { name: String, args: Vec<Operand> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub condition: Expr,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Operand>,
}

/// A literal value or a reference into the variable environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Literal(Value),
    Path(PathExpr),
}

/// Dotted variable path, e.g. `user.friends.0.name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpr {
    pub segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse `a.b.2` into segments; numeric segments become indexes
    ///
    /// Returns `None` unless every segment is an identifier or an index.
    pub fn parse(text: &str) -> Option<Self> {
        let mut segments = Vec::new();
        for (i, part) in text.split('.').enumerate() {
            if part.is_empty() {
                return None;
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                // The root must be a name: `0.a` is not a path
                if i == 0 {
                    return None;
                }
                segments.push(Segment::Index(part.parse().ok()?));
            } else if is_identifier(part) {
                segments.push(Segment::Key(part.to_string()));
            } else {
                return None;
            }
        }
        Some(Self { segments })
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                Segment::Key(k) => write!(f, "{}", k)?,
                Segment::Index(n) => write!(f, "{}", n)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Condition expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Bare operand; in boolean position it means "is non-empty"
    Operand { operand: Operand },
    Not { inner: Box<Expr> },
    And { left: Box<Expr>, right: Box<Expr> },
    Or { left: Box<Expr>, right: Box<Expr> },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let path = PathExpr::parse("name").unwrap();
        assert_eq!(path.segments, vec![Segment::Key("name".into())]);
    }

    #[test]
    fn test_parse_dotted_path_with_index() {
        let path = PathExpr::parse("a.b.2").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Index(2)
            ]
        );
        assert_eq!(path.to_string(), "a.b.2");
    }

    #[test]
    fn test_parse_rejects_non_paths() {
        for text in ["", "a..b", ".a", "a.", "2", "2.a", "a-b", "a b", "'a'", "a(1)"] {
            assert!(PathExpr::parse(text).is_none(), "'{}' should not parse", text);
        }
    }

    #[test]
    fn test_unit_serializes_to_json() {
        let unit = CompiledUnit::new(vec![
            Node::Text {
                text: "Hello ".into(),
            },
            Node::Output {
                value: Operand::Path(PathExpr::parse("name").unwrap()),
                filters: vec![],
                escape: true,
            },
        ]);
        let json = serde_json::to_string(&unit).unwrap();
        assert!(json.contains("\"op\":\"text\""));
        assert!(json.contains("\"op\":\"output\""));
        let back: CompiledUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unit);
    }
}
