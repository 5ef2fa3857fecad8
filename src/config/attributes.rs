//! Attribute pattern parsing.
//!
//! Patterns select which tag attributes carry asset paths. The part before the
//! first colon names the tag; an empty tag part matches every tag. Attribute
//! names may themselves contain colons (`svg:xlink:href`).

use crate::core::{PugdepError, Result};
use std::fmt;

/// A validated `tag:attr` or `:attr` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePattern {
    /// Tag the pattern is restricted to, `None` for any tag
    pub tag: Option<String>,
    /// Attribute name to match
    pub attribute: String,
}

impl AttributePattern {
    /// Parse a configured pattern string.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PugdepError::InvalidAttributePattern`] when the pattern has no
    /// colon or the attribute name after it is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pugdep::config::AttributePattern;
    ///
    /// let pattern = AttributePattern::parse("img:src").unwrap();
    /// assert_eq!(pattern.tag.as_deref(), Some("img"));
    /// assert!(pattern.matches(Some("img"), "src"));
    ///
    /// let any = AttributePattern::parse(":data-src").unwrap();
    /// assert!(any.matches(Some("div"), "data-src"));
    ///
    /// assert!(AttributePattern::parse("img:").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let Some((tag, attribute)) = trimmed.split_once(':') else {
            return Err(PugdepError::InvalidAttributePattern {
                pattern: raw.to_string(),
                reason: "expected `tag:attribute` or `:attribute`".to_string(),
            });
        };

        if attribute.is_empty() {
            return Err(PugdepError::InvalidAttributePattern {
                pattern: raw.to_string(),
                reason: "attribute name is empty".to_string(),
            });
        }

        Ok(Self {
            tag: (!tag.is_empty()).then(|| tag.to_string()),
            attribute: attribute.to_string(),
        })
    }

    /// Whether an attribute on `tag` (if any tag is open) matches this pattern.
    #[must_use]
    pub fn matches(&self, tag: Option<&str>, attribute: &str) -> bool {
        if self.attribute != attribute {
            return false;
        }
        match &self.tag {
            None => true,
            Some(expected) => tag == Some(expected.as_str()),
        }
    }
}

impl fmt::Display for AttributePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag.as_deref().unwrap_or(""), self.attribute)
    }
}
