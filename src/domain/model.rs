use serde::Serialize;
use std::path::{Path, PathBuf};

/// Full text of the target file while it is being patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    content: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }
}

/// How many matches a rule replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: String,
    pub matches: usize,
}

impl RuleOutcome {
    pub fn is_no_match(&self) -> bool {
        self.matches == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub target: PathBuf,
    pub outcomes: Vec<RuleOutcome>,
    pub bytes_before: usize,
    pub bytes_after: usize,
    pub changed: bool,
    pub written: bool,
    pub backup: Option<PathBuf>,
}

impl PatchReport {
    pub fn total_matches(&self) -> usize {
        self.outcomes.iter().map(|o| o.matches).sum()
    }

    pub fn unmatched_rules(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_no_match())
    }

    pub fn applied_rules(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_no_match()).count()
    }
}
