//! Attribute-based asset dependency extraction.
//!
//! Walks a template's token stream, picks out attribute values selected by
//! the configured patterns, resolves relative ones against the template's
//! directory, and rewrites them in the source to the absolute path. The
//! rewritten source is what gets parsed and rendered, so every dependency
//! reported for a template appears verbatim in the output.
//!
//! Values that are already absolute are left alone and not reported. So are
//! URLs with a scheme (`https://`, `data:`), which are not files.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::lexer::Token;
use crate::config::ValidatedConfig;
use crate::utils::fs::resolve_against;

/// Result of scanning one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Source with matched relative values replaced by absolute paths
    pub content: String,
    /// Absolute asset paths in first-seen order, without duplicates
    pub dependencies: Vec<PathBuf>,
}

/// Scan `tokens` of `source` for asset attributes.
///
/// # Examples
///
/// ```rust
/// use pugdep::config::ResolverConfig;
/// use pugdep::templating::extractor::extract_dependencies;
/// use pugdep::templating::lexer::{PugLexer, Tokenizer};
/// use std::path::{Path, PathBuf};
///
/// let config = ResolverConfig::default().validate().unwrap();
/// let source = "img(src='./a.png')";
/// let tokens = PugLexer.tokenize(source).unwrap();
///
/// let extraction = extract_dependencies(source, &tokens, Path::new("/proj/views"), &config);
/// assert_eq!(extraction.content, "img(src=/proj/views/a.png)");
/// assert_eq!(extraction.dependencies, vec![PathBuf::from("/proj/views/a.png")]);
/// ```
#[must_use]
pub fn extract_dependencies(
    source: &str,
    tokens: &[Token],
    dirname: &Path,
    config: &ValidatedConfig,
) -> Extraction {
    let mut content = source.to_string();
    let mut dependencies: Vec<PathBuf> = Vec::new();
    let mut current_tag: Option<&str> = None;
    // Same-line `name=value` occurrences still present in `content`
    let mut untouched: HashMap<(usize, &str, &str), usize> = HashMap::new();

    for token in tokens {
        let (name, raw_value, line) = match token {
            Token::Tag {
                name,
                ..
            } => {
                current_tag = Some(name.as_str());
                continue;
            }
            Token::Attribute {
                name,
                value: Some(value),
                line,
            } => (name.as_str(), value.trim(), *line),
            Token::Attribute {
                value: None,
                ..
            } => continue,
        };

        let key = (line, name, raw_value);
        let occurrence = untouched.get(&key).copied().unwrap_or(0);

        let value = strip_quotes(raw_value);
        if !config.matches_attribute(current_tag, name)
            || value.is_empty()
            || is_url(value)
            || Path::new(value).is_absolute()
        {
            *untouched.entry(key).or_insert(0) += 1;
            continue;
        }

        let absolute = resolve_against(dirname, Path::new(value));
        let absolute_str = absolute.to_string_lossy();

        match rewrite_value(&content, line, occurrence, name, raw_value, &absolute_str) {
            Some(rewritten) => content = rewritten,
            None => {
                tracing::warn!(
                    "Could not locate `{}={}` (line {}) to rewrite; not tracking it as a dependency",
                    name,
                    raw_value,
                    line
                );
                *untouched.entry(key).or_insert(0) += 1;
                continue;
            }
        }

        tracing::trace!("Found asset {} on line {}", absolute.display(), line);
        if !dependencies.contains(&absolute) {
            dependencies.push(absolute);
        }
    }

    Extraction {
        content,
        dependencies,
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['\'', '"', '`'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn is_url(value: &str) -> bool {
    if value.contains("://") {
        return true;
    }
    // `data:`, `mailto:` and friends; a single letter is a Windows drive
    value.split_once(':').is_some_and(|(scheme, _)| {
        scheme.len() > 1 && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+.-".contains(c))
    })
}

/// Byte range of 1-based `line`, counting `\n`, `\r\n` and `\r` as breaks.
fn line_bounds(content: &str, line: usize) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let mut start = 0;
    let mut current = 1;
    let mut i = 0;

    while i < bytes.len() {
        let width = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' | b'\n' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        if current == line {
            return Some((start, i));
        }
        current += 1;
        i += width;
        start = i;
    }

    (current == line).then_some((start, bytes.len()))
}

/// Replace the value of the `occurrence`-th (0-based) `attr=raw_value`
/// assignment that starts on `line` with the absolute path.
///
/// Assignments inside quoted strings are skipped, and the attribute name must
/// follow `(`, `,` or whitespace so `src` never matches inside `data-src`.
fn rewrite_value(
    content: &str,
    line: usize,
    occurrence: usize,
    attr: &str,
    raw_value: &str,
    absolute: &str,
) -> Option<String> {
    let (start, end) = line_bounds(content, line)?;
    let assignment = Regex::new(&format!(r"^{}\s*!?=\s*", regex::escape(attr))).ok()?;

    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let mut seen = 0;

    for (offset, c) in content[start..end].char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            prev = Some(c);
            continue;
        }
        if matches!(c, '\'' | '"' | '`') {
            quote = Some(c);
            prev = Some(c);
            continue;
        }

        let at_boundary = prev.is_none_or(|p| p == '(' || p == ',' || p.is_whitespace());
        prev = Some(c);
        if !at_boundary {
            continue;
        }

        let position = start + offset;
        let Some(found) = assignment.find(&content[position..]) else {
            continue;
        };
        let value_start = position + found.end();
        if !content[value_start..].starts_with(raw_value) {
            continue;
        }
        if seen < occurrence {
            seen += 1;
            continue;
        }

        let mut rewritten = String::with_capacity(content.len() + absolute.len());
        rewritten.push_str(&content[..value_start]);
        rewritten.push_str(absolute);
        rewritten.push_str(&content[value_start + raw_value.len()..]);
        return Some(rewritten);
    }

    None
}
