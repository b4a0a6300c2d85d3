//! Document store: whole-document persistence to a single JSON file
//!
//! The backing file is the single source of truth. Every operation loads the
//! full document and, for mutations, rewrites it whole. Nothing is cached
//! between calls.
//!
//! - Missing file: the default document is returned.
//! - Present but malformed file (bad JSON, invalid UTF-8, wrong shape, nesting
//!   deeper than [`MAX_DOCUMENT_DEPTH`]): the default document is returned and a
//!   warning is logged. A corrupt document resets rather than blocking the service.
//! - Any other read failure: `Error::Persistence`.
//!
//! Writes go to a sibling temp file which is then renamed over the target, so a
//! crash mid-write never leaves a half-written document behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::State;

/// Deepest bracket nesting `load()` accepts.
///
/// Component `data` sits five levels below the document root, and request
/// bodies are capped by serde_json's default limit of 127, so anything the API
/// stored stays well under this.
pub const MAX_DOCUMENT_DEPTH: usize = 256;

/// Store for the single persisted `State` document
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles so concurrent mutations cannot
    /// lose each other's updates
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Create a store backed by `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the document
    pub async fn load(&self) -> Result<State> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No document on disk, using default");
                return Ok(State::default());
            }
            Err(e) => return Err(e.into()),
        };

        match parse_document(&raw) {
            Some(state) => {
                debug!(
                    path = %self.path.display(),
                    tabs = state.tabs.len(),
                    "Loaded document"
                );
                Ok(state)
            }
            None => {
                warn!(
                    path = %self.path.display(),
                    "Document is malformed, falling back to default"
                );
                Ok(State::default())
            }
        }
    }

    /// Replace the persisted document with `state`
    pub async fn save(&self, state: &State) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), tabs = state.tabs.len(), "Saved document");
        Ok(())
    }

    /// Load without taking the write lock
    pub async fn snapshot(&self) -> Result<State> {
        self.load().await
    }

    /// Run one load/transform/save cycle under the store's write lock.
    ///
    /// The document is saved only if `f` succeeds; a failed transform leaves
    /// the backing file untouched.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut State) -> Result<T>,
    {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load().await?;
        let output = f(&mut state)?;
        self.save(&state).await?;

        Ok(output)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parse a document, checking the top-level shape before deserializing.
///
/// Returns `None` for anything that is not a valid `State`.
fn parse_document(raw: &[u8]) -> Option<State> {
    if exceeds_depth(raw, MAX_DOCUMENT_DEPTH) {
        return None;
    }

    // Depth is bounded above, so serde_json's own limit of 128 is lifted
    let mut deserializer = serde_json::Deserializer::from_slice(raw);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer).ok()?;
    deserializer.end().ok()?;

    let shape_ok = value.get("tabs").is_some_and(Value::is_array)
        && value.get("activeTabKey").is_some_and(Value::is_string);
    if !shape_ok {
        return None;
    }

    serde_json::from_value(value).ok()
}

/// Whether `[`/`{` nesting outside of string literals goes deeper than `limit`
fn exceeds_depth(raw: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in raw {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    false
}
