use crate::domain::model::Document;
use crate::utils::error::Result;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// One transformation over the document text.
///
/// `apply` returns the rewritten text together with the number of spans it
/// replaced. Zero matches must hand back the input unchanged.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    fn apply<'a>(&self, text: &'a str) -> (Cow<'a, str>, usize);
}

pub trait Storage {
    fn read_document(&self, path: &Path) -> Result<Document>;
    fn write_document(&self, document: &Document) -> Result<()>;
    /// Copies the current on-disk file aside, returning where it went.
    fn backup(&self, path: &Path) -> Result<PathBuf>;
}

pub trait ConfigProvider {
    fn target_path(&self) -> &Path;
    fn strict(&self) -> bool;
    fn backup_enabled(&self) -> bool;
    fn warn_on_no_match(&self) -> bool;
}
