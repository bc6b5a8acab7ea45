//! Generic syntax tree produced by Ruby's Ripper.
//!
//! Ripper emits nested arrays. An array headed by a symbol is a tagged node
//! (`[:command, ...]`); anything else is a plain list (statement lists,
//! argument lists, `[line, col]` positions).

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Tagged { tag: String, children: Vec<Node> },
    List(Vec<Node>),
    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
}

impl Node {
    pub fn tagged(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Tagged {
            tag: tag.into(),
            children,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Tagged { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_tagged(&self, expected: &str) -> bool {
        self.tag() == Some(expected)
    }

    /// Children of a tagged node or the items of a plain list.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Tagged { children, .. } | Node::List(children) => children,
            _ => &[],
        }
    }

    /// Child at `index`, counting from the first element after the tag.
    /// A `nil` in that slot reads as absent.
    pub fn child(&self, index: usize) -> Option<&Node> {
        match self.children().get(index) {
            Some(Node::Nil) | None => None,
            Some(node) => Some(node),
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text of a scanner token such as `[:@ident, "name", [1, 2]]`.
    pub fn token_text(&self) -> Option<&str> {
        match self {
            Node::Tagged { tag, children } if tag.starts_with('@') => {
                children.first().and_then(Node::as_str)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_items(f: &mut fmt::Formatter<'_>, items: &[Node]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            Node::Tagged { tag, children } => {
                write!(f, "[:{}", tag)?;
                if !children.is_empty() {
                    f.write_str(", ")?;
                    write_items(f, children)?;
                }
                f.write_str("]")
            }
            Node::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            Node::Symbol(s) => write!(f, ":{}", s),
            Node::Str(s) => write!(f, "{:?}", s),
            Node::Int(n) => write!(f, "{}", n),
            Node::Float(n) => write!(f, "{}", n),
            Node::Bool(b) => write!(f, "{}", b),
            Node::Nil => f.write_str("nil"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::tagged(
            "@ident",
            vec![
                Node::Str(name.into()),
                Node::List(vec![Node::Int(1), Node::Int(0)]),
            ],
        )
    }

    #[test]
    fn test_token_text() {
        assert_eq!(ident("create_table").token_text(), Some("create_table"));
        assert_eq!(Node::tagged("var_ref", vec![ident("t")]).token_text(), None);
    }

    #[test]
    fn test_child_treats_nil_as_absent() {
        let node = Node::tagged("do_block", vec![Node::Nil, ident("x")]);
        assert!(node.child(0).is_none());
        assert!(node.child(1).is_some());
        assert!(node.child(2).is_none());
    }

    #[test]
    fn test_display() {
        let node = Node::tagged(
            "args_add_block",
            vec![Node::List(vec![Node::Symbol(".".into())]), Node::Bool(false)],
        );
        assert_eq!(node.to_string(), "[:args_add_block, [:.], false]");
    }
}
