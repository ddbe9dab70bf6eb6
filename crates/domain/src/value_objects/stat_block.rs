//! StatBlock - ability score storage for characters and NPCs
//!
//! Scores are keyed by the ability keys a ruleset declares ("DEX", "STR", ...).
//! Missing keys read as the baseline score so partially-filled sheets and
//! stat-less monsters still resolve actions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Baseline ability score assumed for missing keys.
pub const DEFAULT_SCORE: i32 = 10;

/// A character's ability scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
    scores: HashMap<String, i32>,
}

impl StatBlock {
    /// Create an empty stat block (all scores read as the baseline).
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a score, falling back to the baseline for missing keys.
    pub fn get(&self, key: &str) -> i32 {
        self.scores.get(key).copied().unwrap_or(DEFAULT_SCORE)
    }

    /// Get a score only if it was explicitly set.
    pub fn get_raw(&self, key: &str) -> Option<i32> {
        self.scores.get(key).copied()
    }

    /// Set a score.
    pub fn set(&mut self, key: impl Into<String>, score: i32) {
        self.scores.insert(key.into(), score);
    }

    /// Builder-style score assignment.
    pub fn with(mut self, key: impl Into<String>, score: i32) -> Self {
        self.set(key, score);
        self
    }

    /// Iterate over explicitly-set scores.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of explicitly-set scores.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no scores have been set.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_baseline() {
        let stats = StatBlock::new();
        assert_eq!(stats.get("DEX"), DEFAULT_SCORE);
        assert_eq!(stats.get_raw("DEX"), None);
    }

    #[test]
    fn set_and_get() {
        let stats = StatBlock::new().with("DEX", 16).with("STR", 8);
        assert_eq!(stats.get("DEX"), 16);
        assert_eq!(stats.get("STR"), 8);
        assert_eq!(stats.len(), 2);
    }
}
