use crate::core::patcher::{apply_all, RuleSet};
use crate::domain::model::PatchReport;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::diff::unified_diff;
use crate::utils::error::{PatchError, Result};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Fail when a rule matches nothing instead of warning.
    pub strict: bool,
    pub dry_run: bool,
    pub backup: bool,
    pub warn_on_no_match: bool,
    pub show_diff: bool,
    /// Send status lines and diffs to stderr, keeping stdout for a report.
    pub status_on_stderr: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            strict: false,
            dry_run: false,
            backup: false,
            warn_on_no_match: true,
            show_diff: false,
            status_on_stderr: false,
        }
    }
}

impl RunOptions {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            strict: config.strict(),
            backup: config.backup_enabled(),
            warn_on_no_match: config.warn_on_no_match(),
            ..Self::default()
        }
    }
}

pub struct PatchEngine<S: Storage> {
    storage: S,
    options: RunOptions,
}

impl<S: Storage> PatchEngine<S> {
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, RunOptions::default())
    }

    pub fn with_options(storage: S, options: RunOptions) -> Self {
        Self { storage, options }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    fn status(&self, line: fmt::Arguments<'_>) {
        if self.options.status_on_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_diff(&self, diff: &str) {
        if self.options.status_on_stderr {
            eprint!("{}", diff);
        } else {
            print!("{}", diff);
        }
    }

    /// Load, apply every rule in order, then write the result back once.
    ///
    /// Nothing touches the target until every rule has run, so any error
    /// before the final write leaves the file as it was.
    pub fn run(&self, target: &Path, rules: &RuleSet) -> Result<PatchReport> {
        self.status(format_args!("Loading {}...", target.display()));
        let mut document = self.storage.read_document(target)?;
        let original = document.content().to_string();

        self.status(format_args!("Applying {} rules...", rules.len()));
        let outcomes = apply_all(&mut document, rules);

        for outcome in &outcomes {
            if outcome.is_no_match() {
                if self.options.warn_on_no_match {
                    tracing::warn!(
                        rule = %outcome.rule,
                        "Rule matched nothing; the targeted content may be gone or have drifted"
                    );
                }
                self.status(format_args!("  - {}: no match", outcome.rule));
            } else {
                tracing::info!(rule = %outcome.rule, matches = outcome.matches, "Rule applied");
                self.status(format_args!(
                    "  - {}: {} match(es) replaced",
                    outcome.rule, outcome.matches
                ));
            }
        }

        if self.options.strict {
            if let Some(unmatched) = outcomes.iter().find(|o| o.is_no_match()) {
                return Err(PatchError::RuleNoMatchError {
                    rule: unmatched.rule.clone(),
                    path: target.to_path_buf(),
                });
            }
        }

        let changed = document.content() != original;
        if self.options.show_diff {
            self.print_diff(&unified_diff(target, &original, document.content()));
        }

        let mut report = PatchReport {
            target: target.to_path_buf(),
            bytes_before: original.len(),
            bytes_after: document.content().len(),
            outcomes,
            changed,
            written: false,
            backup: None,
        };

        if !changed {
            self.status(format_args!("No changes; {} left untouched", target.display()));
            return Ok(report);
        }

        if self.options.dry_run {
            self.status(format_args!(
                "Dry run: {} of {} rules would change {} (not written)",
                report.applied_rules(),
                report.outcomes.len(),
                target.display()
            ));
            return Ok(report);
        }

        if self.options.backup {
            let backup = self.storage.backup(target)?;
            self.status(format_args!("Backup saved to: {}", backup.display()));
            report.backup = Some(backup);
        }

        self.storage.write_document(&document)?;
        report.written = true;

        self.status(format_args!(
            "Patched {}: {} of {} rules applied, {} match(es) replaced, {} -> {} bytes",
            target.display(),
            report.applied_rules(),
            report.outcomes.len(),
            report.total_matches(),
            report.bytes_before,
            report.bytes_after
        ));

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStorage;
    use crate::core::regex_rule::RegexRule;

    const PAGE: &str = "a\n<b>drop</b>\nc\n";

    fn drop_rule() -> RegexRule {
        RegexRule::from_pattern("drop-b", r"<b>.*?</b>\n", "").unwrap()
    }

    fn missing_rule() -> RegexRule {
        RegexRule::from_pattern("drop-x", r"<x>.*?</x>\n", "").unwrap()
    }

    #[test]
    fn test_run_writes_patched_document() {
        let storage = MemoryStorage::new().with_file("page.tsx", PAGE);
        let engine = PatchEngine::new(storage);

        let report = engine
            .run(Path::new("page.tsx"), &RuleSet::new().with(drop_rule()))
            .unwrap();

        assert!(report.changed);
        assert!(report.written);
        assert_eq!(report.total_matches(), 1);
        assert_eq!(engine.storage().get("page.tsx").as_deref(), Some("a\nc\n"));
    }

    #[test]
    fn test_unchanged_document_is_not_written() {
        let storage = MemoryStorage::new().with_file("page.tsx", PAGE);
        let engine = PatchEngine::new(storage);

        let report = engine
            .run(Path::new("page.tsx"), &RuleSet::new().with(missing_rule()))
            .unwrap();

        assert!(!report.changed);
        assert!(!report.written);
        assert_eq!(engine.storage().writes(), 0);
    }

    #[test]
    fn test_strict_mode_fails_before_writing() {
        let storage = MemoryStorage::new().with_file("page.tsx", PAGE);
        let options = RunOptions {
            strict: true,
            ..RunOptions::default()
        };
        let engine = PatchEngine::with_options(storage, options);
        let rules = RuleSet::new().with(drop_rule()).with(missing_rule());

        let err = engine.run(Path::new("page.tsx"), &rules).unwrap_err();

        assert!(matches!(err, PatchError::RuleNoMatchError { ref rule, .. } if rule == "drop-x"));
        assert_eq!(engine.storage().writes(), 0);
        assert_eq!(engine.storage().get("page.tsx").as_deref(), Some(PAGE));
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let storage = MemoryStorage::new().with_file("page.tsx", PAGE);
        let options = RunOptions {
            dry_run: true,
            show_diff: true,
            ..RunOptions::default()
        };
        let engine = PatchEngine::with_options(storage, options);

        let report = engine
            .run(Path::new("page.tsx"), &RuleSet::new().with(drop_rule()))
            .unwrap();

        assert!(report.changed);
        assert!(!report.written);
        assert_eq!(engine.storage().writes(), 0);
    }

    #[test]
    fn test_backup_precedes_write() {
        let storage = MemoryStorage::new().with_file("page.tsx", PAGE);
        let options = RunOptions {
            backup: true,
            ..RunOptions::default()
        };
        let engine = PatchEngine::with_options(storage, options);

        let report = engine
            .run(Path::new("page.tsx"), &RuleSet::new().with(drop_rule()))
            .unwrap();

        let backup = report.backup.expect("backup path");
        assert_eq!(engine.storage().get(&backup).as_deref(), Some(PAGE));
        assert_eq!(engine.storage().get("page.tsx").as_deref(), Some("a\nc\n"));
    }

    #[test]
    fn test_missing_target() {
        let engine = PatchEngine::new(MemoryStorage::new());
        let err = engine
            .run(Path::new("gone.tsx"), &RuleSet::new().with(drop_rule()))
            .unwrap_err();
        assert!(matches!(err, PatchError::IoError { .. }));
    }
}
