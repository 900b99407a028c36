//! Writing generated artifacts to disk.
//!
//! Files are staged in a scratch directory next to their destination and
//! moved into place only after every file was written. Files they replace
//! are parked in the scratch directory until the last move succeeded, so a
//! failed publish can put them back. The scratch directory is removed on
//! every exit path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TokenError;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generated file contents keyed by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// Scratch directory removed on drop.
struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    fn create(parent: &Path) -> Result<Self, TokenError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = parent.join(format!(
            ".design-tokens-staging-{}-{}-{}",
            std::process::id(),
            stamp,
            STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir(&path).map_err(|e| io_context(e, "create", &path))?;
        Ok(Self { path })
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

/// Destinations touched by an in-progress publish.
///
/// Unless committed, dropping it removes every published file and moves
/// the parked originals back. Must be dropped before its staging directory.
struct Publish {
    moved: Vec<(PathBuf, Option<PathBuf>)>,
    committed: bool,
}

impl Publish {
    fn new() -> Self {
        Self {
            moved: Vec::new(),
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Publish {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for (dest, parked) in self.moved.iter().rev() {
            let _ = fs::remove_file(dest);
            if let Some(parked) = parked {
                let _ = fs::rename(parked, dest);
            }
        }
    }
}

/// Writes `artifacts` into `out_dir`, creating it if needed.
///
/// Either every artifact is published or `out_dir` keeps its previous
/// contents.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<(), TokenError> {
    fs::create_dir_all(out_dir).map_err(|e| io_context(e, "create", out_dir))?;
    let staging = StagingDir::create(out_dir)?;

    for artifact in artifacts {
        let staged = staging.path.join(&artifact.file_name);
        fs::write(&staged, &artifact.contents).map_err(|e| io_context(e, "write", &staged))?;
    }

    let mut publish = Publish::new();
    for artifact in artifacts {
        let dest = out_dir.join(&artifact.file_name);
        let parked = park_existing(&staging, &artifact.file_name, &dest)?;
        publish.moved.push((dest.clone(), parked));
        fs::rename(staging.path.join(&artifact.file_name), &dest)
            .map_err(|e| io_context(e, "write", &dest))?;
        tracing::debug!(path = %dest.display(), "wrote artifact");
    }
    publish.commit();

    Ok(())
}

/// Moves a file already at `dest` into the staging directory.
fn park_existing(
    staging: &StagingDir,
    file_name: &str,
    dest: &Path,
) -> Result<Option<PathBuf>, TokenError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => Err(io_context(
            io::Error::new(io::ErrorKind::AlreadyExists, "a directory is in the way"),
            "write",
            dest,
        )),
        Ok(_) => {
            let parked = staging.path.join(format!(".previous-{file_name}"));
            fs::rename(dest, &parked).map_err(|e| io_context(e, "replace", dest))?;
            Ok(Some(parked))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_context(e, "write", dest)),
    }
}

fn io_context(err: io::Error, action: &str, path: &Path) -> TokenError {
    TokenError::Io(io::Error::new(
        err.kind(),
        format!("failed to {action} '{}': {err}", path.display()),
    ))
}
