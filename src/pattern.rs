//! Pluggable matching of tags and subfield identifiers.
//!
//! Lookup and removal by tag (or by subfield identifier) accept anything
//! implementing [`TextPattern`]: a compiled [`Regex`], a plain substring, or
//! a closure. The matched text is the tag decoded as ASCII, or the identifier
//! bytes following the subfield delimiter.
//!
//! ```
//! use iso2709::TextPattern;
//! use regex::Regex;
//!
//! let title_block = Regex::new("^2[0-4]").unwrap();
//! assert!(title_block.is_match_text("245"));
//! assert!("45".is_match_text("245"));
//! assert!((|tag: &str| tag.starts_with('6')).is_match_text("650"));
//! ```

use crate::error::{MarcError, Result};
use regex::Regex;

/// A predicate over decoded tag or identifier text.
pub trait TextPattern {
    /// Reject patterns that can never be meaningful, such as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] for an unusable pattern.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Whether `text` matches.
    fn is_match_text(&self, text: &str) -> bool;
}

impl TextPattern for Regex {
    fn validate(&self) -> Result<()> {
        if self.as_str().is_empty() {
            return Err(MarcError::InvalidArgument("empty pattern".to_string()));
        }
        Ok(())
    }

    fn is_match_text(&self, text: &str) -> bool {
        self.is_match(text)
    }
}

impl TextPattern for &str {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MarcError::InvalidArgument("empty pattern".to_string()));
        }
        Ok(())
    }

    fn is_match_text(&self, text: &str) -> bool {
        text.contains(*self)
    }
}

impl<F> TextPattern for F
where
    F: Fn(&str) -> bool,
{
    fn is_match_text(&self, text: &str) -> bool {
        self(text)
    }
}

/// Compile a regular expression for use as a [`TextPattern`].
///
/// # Errors
///
/// Returns [`MarcError::InvalidArgument`] if the expression is empty or does
/// not compile.
pub fn regex(expression: &str) -> Result<Regex> {
    if expression.is_empty() {
        return Err(MarcError::InvalidArgument("empty pattern".to_string()));
    }
    Regex::new(expression)
        .map_err(|e| MarcError::InvalidArgument(format!("invalid pattern '{expression}': {e}")))
}
