pub mod block_rule;
pub mod engine;
pub mod patcher;
pub mod regex_rule;

pub use crate::domain::model::{Document, PatchReport, RuleOutcome};
pub use crate::domain::ports::{ConfigProvider, Rule, Storage};
pub use crate::utils::error::Result;
