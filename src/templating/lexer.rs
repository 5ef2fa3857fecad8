//! Tag and attribute tokenizer.
//!
//! The resolver only needs two things from a tokenizer: the tags that open on
//! each line and the attributes attached to them. [`Tokenizer`] is that seam;
//! [`PugLexer`] is the built-in implementation for pug-style markup.
//!
//! # What `PugLexer` understands
//!
//! - Tag lines: `img`, `a.button#main`, `.card` (implicit `div`)
//! - Attribute lists: `img(src='a.png', alt="x" data-id=1)`, including lists
//!   that continue over several lines
//! - Block expansion: `li: a(href='/')`
//! - Text blocks that must not be read as tags: `p.`, `script.`, `//` comments,
//!   `-` code blocks, and `:filter` blocks
//! - Piped text, inline html, code and output lines, mixin calls and keyword
//!   lines, which produce no tokens
//!
//! # Errors
//!
//! - An attribute list that never closes
//! - A string literal that is not terminated on its line
//! - Indentation mixing tabs and spaces on one line

use thiserror::Error;

/// A token relevant to dependency extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A tag opens; implicit `div` tags are reported as `div`
    Tag {
        /// Tag name
        name: String,
        /// 1-based line
        line: usize,
    },
    /// An attribute of the most recently opened tag
    Attribute {
        /// Attribute name with any quotes removed
        name: String,
        /// Raw value expression (quotes kept), `None` for boolean attributes
        value: Option<String>,
        /// 1-based line the attribute starts on
        line: usize,
    },
}

/// Tokenizer failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line})")]
pub struct LexError {
    /// 1-based line of the offending construct
    pub line: usize,
    /// What went wrong
    pub message: String,
}

impl LexError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Produces tag/attribute tokens from template source.
///
/// Implementations are used both to validate a template before it is cached
/// and to scan it for asset attributes.
pub trait Tokenizer: Send + Sync {
    /// Tokenize a whole template.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] when the source is not valid markup.
    fn tokenize(&self, source: &str) -> Result<Vec<Token>, LexError>;
}

/// Built-in tokenizer for pug-style markup
#[derive(Debug, Default, Clone, Copy)]
pub struct PugLexer;

/// Lines starting with one of these words carry no tag
const KEYWORDS: &[&str] = &[
    "append", "block", "case", "default", "doctype", "each", "else", "extends", "for", "if",
    "include", "mixin", "prepend", "unless", "when", "while", "yield",
];

const OPERATOR_CHARS: &str = "+-*/%?:|&<>=!";

impl Tokenizer for PugLexer {
    fn tokenize(&self, source: &str) -> Result<Vec<Token>, LexError> {
        let source = source.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<&str> = source.split('\n').collect();
        let mut tokens = Vec::new();
        // Indentation of the line that opened a raw text block
        let mut text_block: Option<usize> = None;

        let mut i = 0;
        while i < lines.len() {
            let line_no = i + 1;
            let line = lines[i];
            i += 1;

            if line.trim().is_empty() {
                continue;
            }

            let indent_str = &line[..line.len() - line.trim_start().len()];
            let indent = indent_str.chars().count();

            if let Some(block_indent) = text_block {
                if indent > block_indent {
                    continue;
                }
                text_block = None;
            }

            if indent_str.contains(' ') && indent_str.contains('\t') {
                return Err(LexError::new(
                    line_no,
                    "Invalid indentation, you can use tabs or spaces but not both",
                ));
            }

            let rest = line.trim_start();
            match classify(rest) {
                LineKind::TextBlock => text_block = Some(indent),
                LineKind::NoTags => {}
                LineKind::Tag => {
                    let mut buffer = rest.to_string();
                    let mut consumed_lines = 0;
                    loop {
                        match lex_tag_line(&buffer, line_no, &mut tokens) {
                            Ok(opens_text_block) => {
                                if opens_text_block {
                                    text_block = Some(indent);
                                }
                                break;
                            }
                            Err(TagLineError::NeedMore(start_line)) => {
                                let next = i + consumed_lines;
                                if next >= lines.len() {
                                    return Err(LexError::new(
                                        start_line,
                                        "The end of the template was reached with no closing bracket found",
                                    ));
                                }
                                buffer.push('\n');
                                buffer.push_str(lines[next]);
                                consumed_lines += 1;
                            }
                            Err(TagLineError::Fatal(err)) => return Err(err),
                        }
                    }
                    i += consumed_lines;
                }
            }
        }

        Ok(tokens)
    }
}

enum LineKind {
    Tag,
    NoTags,
    TextBlock,
}

fn classify(rest: &str) -> LineKind {
    if rest.starts_with("//") || rest.starts_with(':') {
        return LineKind::TextBlock;
    }
    if rest == "-" {
        return LineKind::TextBlock;
    }
    if rest.starts_with(['|', '<', '-', '=', '+']) || rest.starts_with("!=") || rest.starts_with("#[")
    {
        return LineKind::NoTags;
    }
    if rest.starts_with(['.', '#']) {
        return LineKind::Tag;
    }

    let word: String =
        rest.chars().take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-')).collect();
    if word.is_empty() || !word.starts_with(|c: char| c.is_alphabetic()) {
        return LineKind::NoTags;
    }
    let after = &rest[word.len()..];
    let is_keyword = KEYWORDS.contains(&word.as_str())
        && (after.is_empty() || after.starts_with([' ', '\t', '(', ':']));
    if is_keyword {
        // `block`, `mixin` and friends never open a tag on their own line
        LineKind::NoTags
    } else {
        LineKind::Tag
    }
}

enum TagLineError {
    /// The attribute list opened on this line did not close before the end of input
    NeedMore(usize),
    Fatal(LexError),
}

/// Lex one tag line (possibly spanning several physical lines in `buffer`).
///
/// Returns whether the line ends with `.` and opens a text block.
fn lex_tag_line(
    buffer: &str,
    first_line: usize,
    tokens: &mut Vec<Token>,
) -> Result<bool, TagLineError> {
    // Tokens are only committed once the whole line lexes
    let mut line_tokens = Vec::new();
    let chars: Vec<char> = buffer.chars().collect();
    let mut pos = 0;

    loop {
        let name = if matches!(chars.get(pos), Some('.' | '#')) {
            "div".to_string()
        } else {
            let name = read_tag_name(&chars, &mut pos);
            if name.is_empty() {
                break;
            }
            name
        };
        line_tokens.push(Token::Tag {
            name,
            line: line_of(&chars, pos, first_line),
        });

        loop {
            match chars.get(pos) {
                Some('.' | '#') if chars.get(pos + 1).is_some_and(|c| is_name_char(*c)) => {
                    pos += 1;
                    while chars.get(pos).is_some_and(|c| is_name_char(*c)) {
                        pos += 1;
                    }
                }
                Some('(') => {
                    pos = lex_attributes(&chars, pos, first_line, &mut line_tokens)?;
                }
                Some('&') if chars[pos..].starts_with(&['&', 'a', 't', 't', 'r']) => {
                    // `&attributes(obj)` spreads an object; nothing to scan
                    while chars.get(pos).is_some_and(|c| *c != '(') {
                        pos += 1;
                    }
                    if chars.get(pos).is_some() {
                        pos = skip_balanced(&chars, pos, first_line)?;
                    }
                }
                _ => break,
            }
        }

        match chars.get(pos) {
            Some(':') if chars.get(pos + 1).is_some_and(|c| c.is_whitespace()) => {
                pos += 1;
                while chars.get(pos).is_some_and(|c| *c == ' ' || *c == '\t') {
                    pos += 1;
                }
            }
            Some('.') if chars[pos + 1..].iter().all(|c| c.is_whitespace()) => {
                tokens.extend(line_tokens);
                return Ok(true);
            }
            _ => break,
        }
    }

    tokens.extend(line_tokens);
    Ok(false)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn read_tag_name(chars: &[char], pos: &mut usize) -> String {
    if !chars.get(*pos).is_some_and(|c| c.is_alphabetic() || *c == '_') {
        return String::new();
    }
    let start = *pos;
    let mut end = start;
    while chars.get(end).is_some_and(|c| is_name_char(*c) || *c == ':') {
        end += 1;
    }
    // A tag name ends with a word character; `li:` is block expansion
    while end > start && matches!(chars[end - 1], ':' | '-') {
        end -= 1;
    }
    *pos = end;
    chars[start..end].iter().collect()
}

fn line_of(chars: &[char], pos: usize, first_line: usize) -> usize {
    first_line + chars[..pos.min(chars.len())].iter().filter(|c| **c == '\n').count()
}

/// Lex `( ... )` starting at `open`; returns the position after `)`.
fn lex_attributes(
    chars: &[char],
    open: usize,
    first_line: usize,
    tokens: &mut Vec<Token>,
) -> Result<usize, TagLineError> {
    let mut pos = open + 1;

    loop {
        while chars.get(pos).is_some_and(|c| c.is_whitespace() || *c == ',') {
            pos += 1;
        }
        let Some(&c) = chars.get(pos) else {
            return Err(TagLineError::NeedMore(line_of(chars, open, first_line)));
        };
        if c == ')' {
            return Ok(pos + 1);
        }

        let attr_line = line_of(chars, pos, first_line);
        let name = if matches!(c, '\'' | '"') {
            let end = skip_string(chars, pos, first_line)?;
            let name: String = chars[pos + 1..end - 1].iter().collect();
            pos = end;
            name
        } else {
            let start = pos;
            while chars
                .get(pos)
                .is_some_and(|c| !c.is_whitespace() && !matches!(c, '=' | '!' | ',' | ')' | '(' | '\'' | '"'))
            {
                pos += 1;
            }
            if pos == start {
                return Err(TagLineError::Fatal(LexError::new(
                    attr_line,
                    format!("Unexpected character '{c}' in attribute list"),
                )));
            }
            chars[start..pos].iter().collect()
        };

        let mut lookahead = pos;
        while chars.get(lookahead).is_some_and(|c| *c == ' ' || *c == '\t') {
            lookahead += 1;
        }
        let assignment = match chars.get(lookahead) {
            Some('=') => Some(lookahead + 1),
            Some('!') if chars.get(lookahead + 1) == Some(&'=') => Some(lookahead + 2),
            _ => None,
        };

        let value = match assignment {
            Some(after_eq) => {
                pos = after_eq;
                while chars.get(pos).is_some_and(|c| c.is_whitespace()) {
                    pos += 1;
                }
                let start = pos;
                pos = read_value(chars, pos, open, first_line)?;
                let raw: String = chars[start..pos].iter().collect();
                Some(raw.trim().to_string())
            }
            None => None,
        };

        tokens.push(Token::Attribute {
            name,
            value,
            line: attr_line,
        });
    }
}

/// Read an attribute value expression; returns the position after it.
fn read_value(
    chars: &[char],
    mut pos: usize,
    open: usize,
    first_line: usize,
) -> Result<usize, TagLineError> {
    let mut depth = 0usize;
    loop {
        let Some(&c) = chars.get(pos) else {
            return Err(TagLineError::NeedMore(line_of(chars, open, first_line)));
        };
        match c {
            '\'' | '"' | '`' => pos = skip_string(chars, pos, first_line)?,
            '(' | '[' | '{' => {
                depth += 1;
                pos += 1;
            }
            ')' | ']' | '}' if depth > 0 => {
                depth -= 1;
                pos += 1;
            }
            ')' | ',' if depth == 0 => return Ok(pos),
            c if c.is_whitespace() && depth == 0 => {
                let prev = chars[..pos].iter().rev().find(|c| !c.is_whitespace());
                let mut next = pos;
                while chars.get(next).is_some_and(|c| c.is_whitespace()) {
                    next += 1;
                }
                let continues = prev.is_some_and(|p| OPERATOR_CHARS.contains(*p))
                    || chars.get(next).is_some_and(|n| OPERATOR_CHARS.contains(*n) && *n != '!');
                if !continues {
                    return Ok(pos);
                }
                pos = next;
            }
            _ => pos += 1,
        }
    }
}

/// Skip a string literal starting at `pos`; returns the position after the closing quote.
fn skip_string(chars: &[char], pos: usize, first_line: usize) -> Result<usize, TagLineError> {
    let quote = chars[pos];
    let mut i = pos + 1;
    while let Some(&c) = chars.get(i) {
        match c {
            '\\' => i += 2,
            '\n' if quote != '`' => break,
            c if c == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    if quote == '`' && i >= chars.len() {
        return Err(TagLineError::NeedMore(line_of(chars, pos, first_line)));
    }
    Err(TagLineError::Fatal(LexError::new(
        line_of(chars, pos, first_line),
        "Unterminated string literal",
    )))
}

/// Skip a balanced `( ... )` group; returns the position after `)`.
fn skip_balanced(chars: &[char], open: usize, first_line: usize) -> Result<usize, TagLineError> {
    let mut depth = 0usize;
    let mut pos = open;
    while let Some(&c) = chars.get(pos) {
        match c {
            '\'' | '"' | '`' => {
                pos = skip_string(chars, pos, first_line)?;
                continue;
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos + 1);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    Err(TagLineError::NeedMore(line_of(chars, open, first_line)))
}
