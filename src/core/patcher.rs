use crate::domain::model::{Document, RuleOutcome};
use crate::domain::ports::Rule;
use std::borrow::Cow;

/// Ordered list of rules. Order matters: each rule sees the output of the
/// rules before it.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: Rule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    pub fn with<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Applies one rule to the document in place.
pub fn apply_rule(document: &mut Document, rule: &dyn Rule) -> RuleOutcome {
    let (patched, matches) = match rule.apply(document.content()) {
        (Cow::Owned(patched), matches) => (Some(patched), matches),
        (Cow::Borrowed(_), matches) => (None, matches),
    };

    if let Some(patched) = patched {
        document.set_content(patched);
    }

    tracing::debug!(rule = rule.name(), matches, "Rule applied");

    RuleOutcome {
        rule: rule.name().to_string(),
        matches,
    }
}

/// Threads the document through every rule in order.
pub fn apply_all(document: &mut Document, rules: &RuleSet) -> Vec<RuleOutcome> {
    rules
        .iter()
        .fold(Vec::with_capacity(rules.len()), |mut outcomes, rule| {
            outcomes.push(apply_rule(document, rule));
            outcomes
        })
}
