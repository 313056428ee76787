//! Plate grammar validation
//!
//! A plate is exactly two uppercase Latin letters, four digits, two
//! uppercase Latin letters. Anything else is rejected, including partial
//! matches inside longer strings.

use anyhow::Result;
use regex::Regex;

/// Full-string anchored plate pattern
const PLATE_PATTERN: &str = r"^[A-Z]{2}[0-9]{4}[A-Z]{2}$";

/// Compiled plate grammar
#[derive(Debug, Clone)]
pub struct PlateGrammar {
    pattern: Regex,
}

impl PlateGrammar {
    /// Compile the plate pattern.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(PLATE_PATTERN)?;
        Ok(Self { pattern })
    }

    /// True when `text` is a complete, well-formed plate.
    ///
    /// Expects already-normalized input; lowercase or confusable characters
    /// are not valid here.
    pub fn is_valid(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}
