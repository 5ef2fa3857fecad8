//! Source normalization applied when a template is loaded.
//!
//! Templates may be indented with tabs, two spaces, four spaces or anything
//! else, and may use any line ending. Everything downstream assumes one indent
//! unit of `indent_unit` spaces and one line separator, so both are rewritten
//! here. Normalizing already-normalized text returns it unchanged.

use std::borrow::Cow;

/// Detect the line separator of `content`.
///
/// `\r\n` is checked before `\r` and `\n`; content without any line break
/// reports `\n`.
#[must_use]
pub fn detect_line_separator(content: &str) -> &'static str {
    ["\r\n", "\r", "\n"].into_iter().find(|sep| content.contains(sep)).unwrap_or("\n")
}

/// Rewrite every line separator to `separator`.
#[must_use]
pub fn normalize_line_separators<'a>(content: &'a str, separator: &str) -> Cow<'a, str> {
    let detected = detect_line_separator(content);
    if detected == separator || !content.contains(detected) {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(content.split(detected).collect::<Vec<_>>().join(separator))
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// The leading whitespace of the first indented, non-blank line.
#[must_use]
pub fn detect_indent_unit<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .find(|ws| !ws.is_empty())
}

/// Rewrite indentation so one nesting level is `width` spaces.
///
/// The source unit is the first indented line's whitespace. Each line's
/// leading whitespace is converted level by level; whitespace left over after
/// the last whole level is kept as is.
#[must_use]
pub fn normalize_indentation<'a>(content: &'a str, width: usize, separator: &str) -> Cow<'a, str> {
    let Some(unit) = detect_indent_unit(content.split(separator)) else {
        return Cow::Borrowed(content);
    };
    if !unit.contains('\t') && unit.len() == width {
        return Cow::Borrowed(content);
    }

    tracing::trace!("Normalizing indent unit {:?} to {} spaces", unit, width);
    let target = " ".repeat(width);
    let lines: Vec<String> = content
        .split(separator)
        .map(|line| {
            let ws = leading_whitespace(line);
            let levels = ws.len() / unit.len();
            let consumed = levels * unit.len();
            // Only whole occurrences of the unit count as levels
            if ws.get(..consumed) != Some(unit.repeat(levels).as_str()) {
                return line.to_string();
            }
            format!("{}{}", target.repeat(levels), &line[consumed..])
        })
        .collect();
    Cow::Owned(lines.join(separator))
}

/// Full normalization: line separators first, then indentation.
#[must_use]
pub fn normalize(content: &str, width: usize, separator: &str) -> String {
    let separated = normalize_line_separators(content, separator);
    normalize_indentation(&separated, width, separator).into_owned()
}
