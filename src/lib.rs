pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::adapters::{LocalStorage, MemoryStorage};
pub use crate::config::PatchConfig;
pub use crate::core::{
    block_rule::BlockRule,
    engine::{PatchEngine, RunOptions},
    patcher::{apply_all, apply_rule, RuleSet},
    regex_rule::{Occurrences, RegexRule},
};
pub use crate::domain::model::{Document, PatchReport, RuleOutcome};
pub use crate::utils::error::{PatchError, Result};
