// Persistence helpers: JSON reads that fail loudly and writes that never leave a half-written file
// A pass stages every write in memory and commits them only once all fetches and derivations succeed

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Pretty JSON with a trailing newline, the format of every artifact
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Read a JSON document that must exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_slice(&content).map_err(|e| PipelineError::corrupt(path, e))
}

/// Read a JSON document that may be absent; present-but-malformed is still an error
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Write to a temporary sibling, then rename over the target
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    let tmp = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));
    {
        let mut f = fs::File::create(&tmp).map_err(|e| PipelineError::io(&tmp, e))?;
        f.write_all(bytes).map_err(|e| PipelineError::io(&tmp, e))?;
        f.sync_all().map_err(|e| PipelineError::io(&tmp, e))?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PipelineError::io(path, e));
    }
    Ok(())
}

/// Writes collected during a pass, committed together at the end
#[derive(Debug, Default)]
pub struct StagedWrites {
    pending: Vec<(PathBuf, Vec<u8>)>,
}

impl StagedWrites {
    pub fn new() -> Self {
        StagedWrites::default()
    }

    /// Stage raw bytes; staging the same path again replaces the earlier bytes
    /// but keeps the earlier position in the commit order.
    pub fn stage_bytes(&mut self, path: PathBuf, bytes: Vec<u8>) {
        if let Some(slot) = self.pending.iter_mut().find(|(p, _)| *p == path) {
            slot.1 = bytes;
        } else {
            self.pending.push((path, bytes));
        }
    }

    pub fn stage_json<T: Serialize>(&mut self, path: PathBuf, value: &T) -> Result<()> {
        let bytes = to_json_bytes(value)?;
        self.stage_bytes(path, bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Write everything in staging order; returns the paths written
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        debug!("committing {} staged writes", self.len());
        let mut written = Vec::with_capacity(self.pending.len());
        for (path, bytes) in self.pending {
            write_atomic(&path, &bytes)?;
            debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
