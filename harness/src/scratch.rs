//! Scratch storage for transient lint input.
//!
//! A [`ScratchFile`] owns exactly one file in a [`ScratchDir`] and removes it
//! when dropped. Removal therefore happens on every exit path of the caller:
//! normal return, early `?` return, and panic unwinding.
//!
//! File names are 16 lowercase hex characters drawn from the OS CSPRNG plus
//! `.json`. Files are created with `create_new`, so two requests can never
//! share (or overwrite) a file even if names were to collide.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per scratch file name (hex-encoded to twice this length).
const NAME_ENTROPY_BYTES: usize = 8;

/// Scratch file failure.
#[derive(Debug, thiserror::Error)]
pub enum ScratchError {
    #[error("create scratch dir {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("OS random source unavailable: {detail}")]
    Entropy { detail: String },
    #[error("create scratch file {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write scratch file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An isolated directory for scratch files. Created on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create a uniquely named file holding `content`.
    ///
    /// If writing fails after the file was created, the returned error is
    /// produced only after the partial file has been removed.
    ///
    /// # Errors
    ///
    /// Returns [`ScratchError`] on directory creation, entropy, create or
    /// write failure.
    pub fn create_file(&self, content: &[u8]) -> Result<ScratchFile, ScratchError> {
        std::fs::create_dir_all(&self.root).map_err(|source| ScratchError::CreateDir {
            path: self.root.display().to_string(),
            source,
        })?;

        let token = random_token()?;
        let path = self.root.join(format!("{token}.json"));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| ScratchError::Create {
                path: path.display().to_string(),
                source,
            })?;

        // From here on the guard owns the path; any early return removes it.
        let guard = ScratchFile { path, token };
        write_all(file, content).map_err(|source| ScratchError::Write {
            path: guard.path.display().to_string(),
            source,
        })?;
        Ok(guard)
    }
}

fn random_token() -> Result<String, ScratchError> {
    let mut bytes = [0u8; NAME_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| ScratchError::Entropy {
            detail: e.to_string(),
        })?;
    Ok(hex::encode(bytes))
}

/// Write and flush; the handle is closed when `file` drops at return.
fn write_all(mut file: File, content: &[u8]) -> std::io::Result<()> {
    file.write_all(content)?;
    file.flush()
}

/// A scratch file removed on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    token: String,
}

impl ScratchFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The random hex part of the file name; doubles as a request id in logs.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!(path = %self.path.display(), "scratch file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove scratch file"
            ),
        }
    }
}
