//! Directive line parser.
//!
//! Turns normalized template text into a tree of [`Node`]s. Only the three
//! composition directives are understood; every other line is opaque text.
//!
//! Each non-blank line is classified in a fixed order:
//!
//! 1. `include <path>` at any indentation
//! 2. `extends <path>` at zero indentation only
//! 3. `block <name>`, `block append <name>`, `block prepend <name>`,
//!    `append <name>`, `prepend <name>`
//! 4. anything else is text
//!
//! Nesting comes from indentation: a line belongs to the innermost open block
//! whose own indentation is strictly smaller than the line's.

use regex::Regex;
use std::sync::LazyLock;

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*include\s+(\S+)").expect("include pattern is valid"));
static EXTENDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^extends\s+(\S+)").expect("extends pattern is valid"));
static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:block(?:\s+(append|prepend))?|(append|prepend))\s+(\S+)")
        .expect("block pattern is valid")
});

/// How a block override combines with the ancestor's block content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// Replace the ancestor's content
    #[default]
    Replace,
    /// Emit after the ancestor's content
    Append,
    /// Emit before the ancestor's content
    Prepend,
}

impl BlockMode {
    fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("append") => Self::Append,
            Some("prepend") => Self::Prepend,
            _ => Self::Replace,
        }
    }
}

/// What a line means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Opaque template text
    Text,
    /// `include <target>`
    Include {
        /// Target path as written
        target: String,
    },
    /// `extends <target>`
    Extends {
        /// Target path as written
        target: String,
    },
    /// A named block and the lines nested under it
    Block {
        /// Block name
        name: String,
        /// Override mode
        mode: BlockMode,
        /// Nested nodes in document order
        children: Vec<Node>,
    },
}

/// One logical line of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Nesting level in indent units
    pub indent: usize,
    /// The line without its whole indent levels
    pub statement: String,
    /// Directive classification
    pub kind: NodeKind,
}

impl Node {
    /// Plain text node, mostly useful in tests
    #[must_use]
    pub fn text(indent: usize, statement: impl Into<String>) -> Self {
        Self {
            indent,
            statement: statement.into(),
            kind: NodeKind::Text,
        }
    }
}

/// Parses normalized template text into a node tree
#[derive(Debug, Clone)]
pub struct DirectiveParser {
    indent_unit: usize,
    line_separator: String,
}

struct OpenBlock {
    indent: usize,
    statement: String,
    name: String,
    mode: BlockMode,
    children: Vec<Node>,
}

impl OpenBlock {
    fn into_node(self) -> Node {
        Node {
            indent: self.indent,
            statement: self.statement,
            kind: NodeKind::Block {
                name: self.name,
                mode: self.mode,
                children: self.children,
            },
        }
    }
}

impl DirectiveParser {
    /// Create a parser for text normalized to `indent_unit` spaces and `line_separator`
    #[must_use]
    pub fn new(indent_unit: usize, line_separator: impl Into<String>) -> Self {
        Self {
            indent_unit: indent_unit.max(1),
            line_separator: line_separator.into(),
        }
    }

    /// Parse text into its root-level nodes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pugdep::templating::parser::{DirectiveParser, NodeKind};
    ///
    /// let parser = DirectiveParser::new(2, "\n");
    /// let nodes = parser.parse("extends layout\nblock content\n  p hi");
    /// assert!(matches!(nodes[0].kind, NodeKind::Extends { .. }));
    /// assert!(matches!(&nodes[1].kind, NodeKind::Block { children, .. } if children.len() == 1));
    /// ```
    #[must_use]
    pub fn parse(&self, content: &str) -> Vec<Node> {
        let mut root = Vec::new();
        let mut open: Vec<OpenBlock> = Vec::new();

        for line in content.split(self.line_separator.as_str()) {
            if line.trim().is_empty() {
                continue;
            }
            let node = self.parse_line(line);

            while open.last().is_some_and(|block| block.indent >= node.indent) {
                if let Some(closed) = open.pop() {
                    attach(&mut root, &mut open, closed.into_node());
                }
            }

            match node.kind {
                NodeKind::Block {
                    name,
                    mode,
                    ..
                } => open.push(OpenBlock {
                    indent: node.indent,
                    statement: node.statement,
                    name,
                    mode,
                    children: Vec::new(),
                }),
                kind => attach(
                    &mut root,
                    &mut open,
                    Node {
                        kind,
                        ..node
                    },
                ),
            }
        }

        while let Some(closed) = open.pop() {
            attach(&mut root, &mut open, closed.into_node());
        }

        root
    }

    /// Classify a single line.
    #[must_use]
    pub fn parse_line(&self, line: &str) -> Node {
        let spaces = line.len() - line.trim_start_matches(' ').len();
        let indent = spaces / self.indent_unit;
        let statement = line[indent * self.indent_unit..].trim_end().to_string();

        let kind = if let Some(caps) = INCLUDE.captures(line) {
            NodeKind::Include {
                target: caps[1].to_string(),
            }
        } else if let Some(caps) = EXTENDS.captures(line) {
            NodeKind::Extends {
                target: caps[1].to_string(),
            }
        } else if let Some(caps) = BLOCK.captures(line) {
            let keyword = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            NodeKind::Block {
                name: caps[3].to_string(),
                mode: BlockMode::from_keyword(keyword),
                children: Vec::new(),
            }
        } else {
            NodeKind::Text
        };

        Node {
            indent,
            statement,
            kind,
        }
    }
}

fn attach(root: &mut Vec<Node>, open: &mut [OpenBlock], node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}
