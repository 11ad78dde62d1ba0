//! Search-key normalization for album and track titles.
//!
//! Two passes:
//! 1. Drop every character that is not alphanumeric or whitespace, then
//!    collapse whitespace runs.
//! 2. Strip noise tokens ("Remastered", "Deluxe Edition", ...) described by a
//!    [`NoiseRules`] table until no rule matches.
//!
//! The result is a fixed point of both passes, so `normalize` is idempotent
//! for any rule table.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default noise-token table. Patterns run against text that has already
/// lost its punctuation, so "(Remastered 2009)" arrives as "Remastered 2009".
static DEFAULT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "2009 Remaster", "Remastered", "Digital Remaster 2011", "Remastered Version"
        Regex::new(r"(?i)\s*\b(?:\d{1,4}\s+)?(?:digital\s+)?remaster(?:ed)?(?:\s+\d{1,4})?(?:\s+version)?$")
            .unwrap(),
        // "Explicit", "Explicit Version"
        Regex::new(r"(?i)\s*\bexplicit(?:\s+version)?$").unwrap(),
        // "Mono", "Stereo Mix", "Mono Version"
        Regex::new(r"(?i)\s*\b(?:mono|stereo)(?:\s+(?:version|mix))?$").unwrap(),
        // "Deluxe", "Super Deluxe Edition"
        Regex::new(r"(?i)\s*\b(?:super\s+)?deluxe(?:\s+edition)?$").unwrap(),
        // "Expanded Edition", "25th Anniversary Edition", "Collectors Edition"
        Regex::new(
            r"(?i)\s*\b(?:\d{1,3}(?:st|nd|rd|th)\s+)?(?:expanded|anniversary|special|collectors|limited)\s+edition$",
        )
        .unwrap(),
    ]
});

static DEFAULT_RULES: Lazy<NoiseRules> = Lazy::new(|| NoiseRules {
    patterns: DEFAULT_PATTERNS.clone(),
});

/// Replaceable table of noise-token patterns.
///
/// Every match of every pattern is removed, repeatedly, until the text
/// stops changing.
#[derive(Debug, Clone)]
pub struct NoiseRules {
    patterns: Vec<Regex>,
}

impl NoiseRules {
    /// Compile a table from pattern strings.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Append more patterns after the existing ones.
    pub fn extended<S: AsRef<str>>(mut self, extra: &[S]) -> Result<Self, regex::Error> {
        let extra = Self::from_patterns(extra)?;
        self.patterns.extend(extra.patterns);
        Ok(self)
    }

    /// A table that removes nothing (punctuation is still stripped).
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Number of patterns in the table.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Normalize `text` with this table.
    pub fn normalize(&self, text: &str) -> String {
        let filtered: String = text
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        let mut current = collapse_whitespace(&filtered);
        loop {
            let mut next = current.clone();
            for pattern in &self.patterns {
                next = pattern.replace_all(&next, "").into_owned();
            }
            let next = collapse_whitespace(&next);
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

impl Default for NoiseRules {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

/// Normalize with the default rule table.
pub fn normalize(text: &str) -> String {
    DEFAULT_RULES.normalize(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
