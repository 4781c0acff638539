//! Shared persistence utilities: atomic file writes, staged multi-file
//! commits, JSON load/save.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("unnamed"));
    name.push(suffix);
    path.with_file_name(name)
}

/// Sibling temporary path used while a write is in flight.
fn tmp_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

/// Sibling holding the previous contents of a target during a staged commit.
fn backup_path(path: &Path) -> PathBuf {
    sibling(path, ".bak")
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Atomically write JSON data to a file.
///
/// Serializes `data` to pretty-printed JSON, writes to a `.tmp` sibling file,
/// then renames onto the target path. Creates parent directories if they
/// don't exist.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    atomic_write(path, json.as_bytes())
}

/// Atomically write raw bytes to a file.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    ensure_parent(path)?;
    let tmp = tmp_path(path);
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// A set of files committed together.
///
/// Every entry is written to its temporary sibling first; only when all of
/// them are on disk are they renamed into place. Existing targets are moved
/// to a `.bak` sibling before being replaced. If any write or rename fails,
/// replaced targets are restored from their backups, targets that did not
/// exist before are removed, and all temporaries are deleted.
#[derive(Debug, Default)]
pub struct StagedWrite {
    entries: Vec<(PathBuf, Vec<u8>)>,
}

impl StagedWrite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes for `path`.
    pub fn add(&mut self, path: impl Into<PathBuf>, data: Vec<u8>) -> &mut Self {
        self.entries.push((path.into(), data));
        self
    }

    /// Queue pretty-printed JSON for `path`.
    pub fn add_json<T: serde::Serialize>(
        &mut self,
        path: impl Into<PathBuf>,
        data: &T,
    ) -> io::Result<&mut Self> {
        let json = serde_json::to_vec_pretty(data).map_err(io::Error::other)?;
        Ok(self.add(path, json))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every staged file, then rename all of them into place.
    pub fn commit(self) -> io::Result<Vec<PathBuf>> {
        let written = self.write_temporaries()?;

        let mut installed: Vec<Installed> = Vec::with_capacity(written.len());
        for ((path, _), tmp) in self.entries.iter().zip(&written) {
            match install(path, tmp) {
                Ok(step) => installed.push(step),
                Err(e) => {
                    roll_back(&installed);
                    for tmp in &written {
                        let _ = std::fs::remove_file(tmp);
                    }
                    return Err(e);
                }
            }
        }

        for backup in installed.iter().filter_map(|step| step.backup.as_ref()) {
            let _ = std::fs::remove_file(backup);
        }
        Ok(installed.into_iter().map(|step| step.target).collect())
    }

    fn write_temporaries(&self) -> io::Result<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(self.entries.len());
        for (path, data) in &self.entries {
            let tmp = tmp_path(path);
            let result = ensure_parent(path).and_then(|_| std::fs::write(&tmp, data));
            if let Err(e) = result {
                for leftover in written.iter().chain(std::iter::once(&tmp)) {
                    let _ = std::fs::remove_file(leftover);
                }
                return Err(e);
            }
            written.push(tmp);
        }
        Ok(written)
    }
}

/// A target renamed into place, with the backup of what it replaced.
struct Installed {
    target: PathBuf,
    backup: Option<PathBuf>,
}

fn install(path: &Path, tmp: &Path) -> io::Result<Installed> {
    let backup = if path.is_file() {
        let backup = backup_path(path);
        std::fs::rename(path, &backup)?;
        Some(backup)
    } else {
        None
    };
    if let Err(e) = std::fs::rename(tmp, path) {
        if let Some(backup) = &backup {
            let _ = std::fs::rename(backup, path);
        }
        return Err(e);
    }
    Ok(Installed {
        target: path.to_path_buf(),
        backup,
    })
}

fn roll_back(installed: &[Installed]) {
    for step in installed.iter().rev() {
        let restored = match &step.backup {
            Some(backup) => std::fs::rename(backup, &step.target),
            None => std::fs::remove_file(&step.target),
        };
        if let Err(e) = restored {
            tracing::warn!(
                path = %step.target.display(),
                error = %e,
                "Failed to roll back staged file"
            );
        }
    }
}

/// Append a single line to a file, creating it (and its parents) if needed.
pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Load and deserialize JSON from a file.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` on I/O errors or deserialization failures.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let value =
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}
