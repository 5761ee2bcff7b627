//! Artifact persistence
//!
//! Fitted scalers and classifiers are stored as JSON envelopes:
//!
//! ```json
//! { "kind": "scaler", "format_version": 1, "created_at": "...", "payload": { ... } }
//! ```
//!
//! `serde_json` is built with `float_roundtrip`, so every parameter reloads
//! bit-for-bit and predictions from a reloaded pair match the originals
//! exactly.

use crate::error::{HeartwiseError, Result};
use crate::features::N_FEATURES;
use crate::preprocessing::StandardScaler;
use crate::training::LogisticRegression;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Current envelope format
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    kind: &'a str,
    format_version: u32,
    created_at: DateTime<Utc>,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    kind: String,
    format_version: u32,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    payload: T,
}

/// A fitted object that can be saved to bytes and loaded back
pub trait Artifact: Serialize + DeserializeOwned + Sized {
    /// Tag stored in the envelope and checked on load
    const KIND: &'static str;

    /// Reject payloads that deserialize but cannot be used
    fn check(&self) -> Result<()>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let envelope = EnvelopeRef {
            kind: Self::KIND,
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            payload: self,
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Envelope<Self> = serde_json::from_slice(bytes)?;
        if envelope.kind != Self::KIND {
            return Err(HeartwiseError::SerializationError(format!(
                "expected a `{}` artifact, found `{}`",
                Self::KIND,
                envelope.kind
            )));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(HeartwiseError::SerializationError(format!(
                "unsupported {} format version {} (expected {})",
                Self::KIND,
                envelope.format_version,
                FORMAT_VERSION
            )));
        }
        envelope.payload.check()?;
        Ok(envelope.payload)
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes()?)
    }

    fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        debug!(path = %path.display(), kind = Self::KIND, bytes = bytes.len(), "Loading artifact");
        Self::from_bytes(&bytes)
    }
}

impl Artifact for StandardScaler {
    const KIND: &'static str = "scaler";

    fn check(&self) -> Result<()> {
        self.check_integrity()
    }
}

impl Artifact for LogisticRegression {
    const KIND: &'static str = "classifier";

    fn check(&self) -> Result<()> {
        self.check_integrity(N_FEATURES)
    }
}

/// Write to a sibling `.tmp` file, then rename over the target
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic_all(&[(path, bytes)])
}

/// Replace several files as one unit.
///
/// Every `.tmp` sibling is written before any target is touched. If a write
/// or rename fails, targets already replaced get their previous contents back
/// (or are removed when they did not exist) and no `.tmp` file is left.
pub fn write_atomic_all(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());
    for &(path, bytes) in files {
        match stage(path, bytes) {
            Ok(tmp) => staged.push(tmp),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(files.len());
    for (i, (&(path, _), tmp)) in files.iter().zip(staged.iter()).enumerate() {
        match commit(path, tmp) {
            Ok(backup) => committed.push((path, backup)),
            Err(e) => {
                rollback(&committed);
                discard(&staged[i..]);
                return Err(e);
            }
        }
    }

    for backup in committed.into_iter().filter_map(|(_, b)| b) {
        if let Err(e) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), error = %e, "Could not remove backup");
        }
    }
    Ok(())
}

fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = sibling(path, "tmp");
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(tmp)
}

/// Move `tmp` over `path`, keeping any previous file as a `.bak` sibling
fn commit(path: &Path, tmp: &Path) -> Result<Option<PathBuf>> {
    let backup = if path.is_file() {
        let backup = sibling(path, "bak");
        fs::rename(path, &backup)?;
        Some(backup)
    } else {
        None
    };
    if let Err(e) = fs::rename(tmp, path) {
        if let Some(backup) = &backup {
            let _ = fs::rename(backup, path);
        }
        return Err(e.into());
    }
    Ok(backup)
}

fn rollback(committed: &[(&Path, Option<PathBuf>)]) {
    for (path, backup) in committed.iter().rev() {
        let restored = match backup {
            Some(backup) => fs::rename(backup, path),
            None => fs::remove_file(path),
        };
        if let Err(e) = restored {
            warn!(path = %path.display(), error = %e, "Could not roll back artifact");
        }
    }
}

fn discard(staged: &[PathBuf]) {
    for tmp in staged {
        let _ = fs::remove_file(tmp);
    }
}

fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}
