//! Flattening of resolved lines into the final document.

use serde::{Deserialize, Serialize};

/// A leaf line produced by composition, ready to render
///
/// `indent` is in indent units and may go negative while block nesting is
/// being unwrapped. `text` may span several physical lines when it holds the
/// rendered content of an included template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// Indent in units relative to the document root
    pub indent: isize,
    /// Statement text without its whole indent levels
    pub text: String,
}

impl ResolvedLine {
    /// Create a resolved line
    #[must_use]
    pub fn new(indent: isize, text: impl Into<String>) -> Self {
        Self {
            indent,
            text: text.into(),
        }
    }

    /// Copy of this line moved by `delta` indent units
    #[must_use]
    pub fn shifted(&self, delta: isize) -> Self {
        Self {
            indent: self.indent + delta,
            text: self.text.clone(),
        }
    }
}

/// Render lines with `indent_unit` spaces per level, joined by `line_separator`.
///
/// # Examples
///
/// ```rust
/// use pugdep::templating::renderer::{ResolvedLine, render};
///
/// let lines = vec![ResolvedLine::new(0, "ul"), ResolvedLine::new(1, "li one")];
/// assert_eq!(render(&lines, 2, "\n"), "ul\n  li one");
/// ```
#[must_use]
pub fn render(lines: &[ResolvedLine], indent_unit: usize, line_separator: &str) -> String {
    let width = isize::try_from(indent_unit).unwrap_or(isize::MAX);
    lines
        .iter()
        .map(|line| indent_text(&line.text, line.indent.saturating_mul(width), line_separator))
        .collect::<Vec<_>>()
        .join(line_separator)
}

/// Shift every non-blank line of `text` by `columns` spaces.
///
/// Positive values pad; negative values remove up to that many leading spaces
/// from each line, and never more than the line has. Blank lines are dropped
/// whenever a shift is applied.
#[must_use]
pub fn indent_text(text: &str, columns: isize, line_separator: &str) -> String {
    if columns == 0 || text.is_empty() {
        return text.to_string();
    }

    let padding = " ".repeat(columns.unsigned_abs());
    text.split(line_separator)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if columns > 0 {
                format!("{padding}{line}")
            } else {
                let available = line.len() - line.trim_start_matches(' ').len();
                line[available.min(padding.len())..].to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(line_separator)
}
