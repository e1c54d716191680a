use crate::domain::ports::Rule;
use crate::utils::error::{PatchError, Result};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occurrences {
    #[default]
    All,
    First,
}

impl Occurrences {
    /// Limit in the form `Regex::replacen` expects, 0 meaning unlimited.
    pub fn limit(self) -> usize {
        match self {
            Occurrences::All => 0,
            Occurrences::First => 1,
        }
    }
}

/// Pattern flags for a regex rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternFlags {
    pub dot_matches_newline: bool,
    pub case_insensitive: bool,
}

impl Default for PatternFlags {
    fn default() -> Self {
        Self {
            dot_matches_newline: true,
            case_insensitive: false,
        }
    }
}

pub fn compile_pattern(rule_name: &str, pattern: &str, flags: PatternFlags) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(flags.dot_matches_newline)
        .case_insensitive(flags.case_insensitive)
        .build()
        .map_err(|source| PatchError::InvalidPatternError {
            rule: rule_name.to_string(),
            source,
        })
}

/// Replaces regex matches with a replacement string; an empty replacement deletes.
#[derive(Debug, Clone)]
pub struct RegexRule {
    name: String,
    regex: Regex,
    replacement: String,
    occurrences: Occurrences,
    literal_replacement: bool,
}

impl RegexRule {
    pub fn new(name: impl Into<String>, regex: Regex, replacement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regex,
            replacement: replacement.into(),
            occurrences: Occurrences::All,
            literal_replacement: false,
        }
    }

    /// Compiles `pattern` with the default flags (`.` crosses newlines).
    pub fn from_pattern(
        name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let regex = compile_pattern(&name, pattern, PatternFlags::default())?;
        Ok(Self::new(name, regex, replacement))
    }

    pub fn with_occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    pub fn with_literal_replacement(mut self, literal: bool) -> Self {
        self.literal_replacement = literal;
        self
    }

    fn count_matches(&self, text: &str) -> usize {
        match self.occurrences {
            Occurrences::All => self.regex.find_iter(text).count(),
            Occurrences::First => usize::from(self.regex.is_match(text)),
        }
    }
}

impl Rule for RegexRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply<'a>(&self, text: &'a str) -> (Cow<'a, str>, usize) {
        let matches = self.count_matches(text);
        if matches == 0 {
            return (Cow::Borrowed(text), 0);
        }

        let limit = self.occurrences.limit();
        let replaced = if self.literal_replacement {
            self.regex
                .replacen(text, limit, NoExpand(self.replacement.as_str()))
        } else {
            self.regex.replacen(text, limit, self.replacement.as_str())
        };

        (replaced, matches)
    }
}
