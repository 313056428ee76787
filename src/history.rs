//! Recently recognized plates
//!
//! A small capped list persisted as a JSON array. The newest plate sits
//! at the front; recognizing a plate already in the list moves it back
//! to the front instead of duplicating it.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

/// Capped most-recent-first list of plate texts
#[derive(Debug, Clone)]
pub struct RecentPlates {
    plates: Vec<String>,
    cap: usize,
}

impl RecentPlates {
    pub fn new(cap: usize) -> Self {
        Self {
            plates: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Load the list from disk. A missing file is an empty list.
    pub fn load(path: &Path, cap: usize) -> Result<Self> {
        let mut history = Self::new(cap);
        if !path.exists() {
            debug!("No history file at {:?}, starting empty", path);
            return Ok(history);
        }

        let content = fs::read_to_string(path)?;
        history.plates = serde_json::from_str(&content)?;
        history.plates.truncate(history.cap);
        Ok(history)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.plates)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        debug!("Saved {} plates to {:?}", self.plates.len(), path);
        Ok(())
    }

    /// Put a plate at the front of the list.
    ///
    /// Entries are stored uppercased. A plate already present moves to
    /// the front; the list never grows past its cap.
    pub fn record(&mut self, plate: &str) {
        let plate = plate.to_uppercase();
        self.plates.retain(|p| p != &plate);
        self.plates.insert(0, plate);
        self.plates.truncate(self.cap);
    }

    pub fn clear(&mut self) {
        self.plates.clear();
    }

    pub fn plates(&self) -> &[String] {
        &self.plates
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }
}
