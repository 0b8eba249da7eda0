//! File-backed key-value store for CLI state (~/.paisa/state.json).
//!
//! One pretty-printed JSON object per file; each pipeline key holds its own
//! serialized blob. Flushed on every mutation, matching the
//! flush-on-mutation contract of the pipelines.

use anyhow::{Context, Result};
use paisa_core::KvStore;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub fn paisa_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".paisa"))
}

pub fn ensure_paisa_home() -> Result<PathBuf> {
    let dir = paisa_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn state_path() -> Result<PathBuf> {
    Ok(ensure_paisa_home()?.join("state.json"))
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: Map::new(),
            });
        }

        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let entries = serde_json::from_str::<Map<String, Value>>(&raw)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.flush()
    }
}
