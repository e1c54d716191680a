use crate::domain::model::Document;
use crate::domain::ports::Storage;
use crate::utils::error::{PatchError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Reads and writes UTF-8 files on the local filesystem.
///
/// Writes go to a temporary file next to the target which is then renamed
/// over it, so a failed write leaves the original file intact.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl Storage for LocalStorage {
    fn read_document(&self, path: &Path) -> Result<Document> {
        let bytes = fs::read(path).map_err(|source| PatchError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        let content = String::from_utf8(bytes).map_err(|_| PatchError::EncodingError {
            path: path.to_path_buf(),
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded document");
        Ok(Document::new(path, content))
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        let requested = document.path();
        let write_error = |source: std::io::Error| PatchError::WriteError {
            path: requested.to_path_buf(),
            source,
        };

        // 目標若是符號連結，寫入連結所指向的實際檔案
        let path = fs::canonicalize(requested).unwrap_or_else(|_| requested.to_path_buf());

        let mut temp = NamedTempFile::new_in(parent_dir(&path)).map_err(write_error)?;
        temp.write_all(document.content().as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;

        // 保留原檔權限
        if let Ok(metadata) = fs::metadata(&path) {
            fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_error)?;
        }

        temp.persist(&path).map_err(|e| write_error(e.error))?;

        tracing::debug!(
            path = %requested.display(),
            resolved = %path.display(),
            bytes = document.content().len(),
            "Saved document"
        );
        Ok(())
    }

    fn backup(&self, path: &Path) -> Result<PathBuf> {
        let backup_error = |source: std::io::Error| PatchError::BackupError {
            path: path.to_path_buf(),
            source,
        };

        fs::metadata(path).map_err(backup_error)?;

        let timestamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let stem = format!("{}.{}", file_name, timestamp);

        let backup_path = reserve_backup_path(parent_dir(path), &stem).map_err(backup_error)?;
        if let Err(source) = fs::copy(path, &backup_path) {
            let _ = fs::remove_file(&backup_path);
            return Err(backup_error(source));
        }

        tracing::info!(backup = %backup_path.display(), "Backed up original file");
        Ok(backup_path)
    }
}

/// Claims the first free `{stem}.bak`, `{stem}-1.bak`, ... so an earlier
/// backup taken within the same second is never overwritten.
fn reserve_backup_path(dir: &Path, stem: &str) -> std::io::Result<PathBuf> {
    let mut attempt = 0u32;
    loop {
        let candidate = match attempt {
            0 => dir.join(format!("{}.bak", stem)),
            n => dir.join(format!("{}-{}.bak", stem, n)),
        };
        match fs::OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// In-memory storage keyed by path, for dry runs against fixtures and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    writes: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Number of completed `write_document` calls.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn read_document(&self, path: &Path) -> Result<Document> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let bytes = files.get(path).cloned().ok_or_else(|| PatchError::IoError {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })?;

        let content = String::from_utf8(bytes).map_err(|_| PatchError::EncodingError {
            path: path.to_path_buf(),
        })?;
        Ok(Document::new(path, content))
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        self.insert(document.path(), document.content().as_bytes().to_vec());
        *self.writes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn backup(&self, path: &Path) -> Result<PathBuf> {
        let content = {
            let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
            files.get(path).cloned()
        };
        let content = content.ok_or_else(|| PatchError::BackupError {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })?;

        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let backup_path = (0..)
            .map(|n: u32| {
                let mut name = path.as_os_str().to_owned();
                match n {
                    0 => name.push(".bak"),
                    n => name.push(format!("-{}.bak", n)),
                }
                PathBuf::from(name)
            })
            .find(|candidate| !files.contains_key(candidate))
            .unwrap_or_else(|| path.with_extension("bak"));
        files.insert(backup_path.clone(), content);
        Ok(backup_path)
    }
}
