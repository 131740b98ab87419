//! Name filtering shared by files and archive entries.

use crate::error::NestcatError;
use regex::Regex;

/// A compiled name pattern with whole-string match semantics.
///
/// The same instance is applied to file names and to archive entry names, so a
/// pattern meant to read archives must admit both the archive's name and the
/// names of the members inside it.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: String,
    regex: Regex,
}

impl NameFilter {
    pub fn new(pattern: &str) -> Result<Self, NestcatError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            NestcatError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as configured, without the anchoring added for full matches.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        let matches = self.regex.is_match(name);
        tracing::trace!(
            "{}clude file name {}",
            if matches { "in" } else { "ex" },
            name
        );
        matches
    }
}
