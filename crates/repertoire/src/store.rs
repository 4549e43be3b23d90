//! Whole-collection storage backends.
//!
//! Backends only ever load or replace the full list of openings; the
//! repository computes the complete next state before calling `save_all`.

use std::fs;
use std::path::{Path, PathBuf};

use chess_core::Opening;

use crate::error::StoreError;

/// Default path of the collection file.
pub const DATA_FILE_PATH: &str = "data/chessopenings.json";

pub trait Storage {
    fn load_all(&self) -> Result<Vec<Opening>, StoreError>;

    /// Replace the stored collection with `openings`.
    fn save_all(&mut self, openings: &[Opening]) -> Result<(), StoreError>;
}

/// Collection kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for JsonFileStore {
    /// A missing or blank file is an empty collection.
    fn load_all(&self) -> Result<Vec<Opening>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut openings: Vec<Opening> = serde_json::from_str(&text)?;
        for opening in &mut openings {
            for line in &mut opening.lines {
                line.renumber();
            }
        }
        Ok(openings)
    }

    /// Writes a sibling temp file and renames it over the target.
    fn save_all(&mut self, openings: &[Opening]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        let json = serde_json::to_string_pretty(openings)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    openings: Vec<Opening>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_openings(openings: Vec<Opening>) -> Self {
        Self {
            openings,
            ..Self::default()
        }
    }

    /// Stored collection as of the last successful save.
    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Make every following save fail until reset.
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl Storage for MemoryStore {
    fn load_all(&self) -> Result<Vec<Opening>, StoreError> {
        Ok(self.openings.clone())
    }

    fn save_all(&mut self, openings: &[Opening]) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("save rejected".into()));
        }
        self.openings = openings.to_vec();
        self.saves += 1;
        Ok(())
    }
}
