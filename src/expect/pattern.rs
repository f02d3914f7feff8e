use crate::error::Result;
use regex::Regex;

/// A pattern the output stream is searched for.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a regular expression. Use an inline `(?i)` for
    /// case-insensitive matching.
    pub fn regex(source: &str) -> Result<Self> {
        Ok(Self::try_from(source)?)
    }

    /// Match `text` verbatim.
    pub fn literal(text: &str) -> Result<Self> {
        Self::regex(&regex::escape(text))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Byte range of the first match in `haystack`.
    pub fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        self.regex.find(haystack).map(|m| (m.start(), m.end()))
    }
}

impl TryFrom<&str> for Pattern {
    type Error = regex::Error;

    fn try_from(source: &str) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }
}
