use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_SENTENCES: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog.",
    "She sells seashells by the seashore.",
    "How much wood would a woodchuck chuck if a woodchuck could chuck wood?",
    "Peter Piper picked a peck of pickled peppers.",
    "A watched pot never boils.",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckData {
    pub schema_version: u32,
    pub sentences: Vec<String>,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for DeckData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sentences: DEFAULT_SENTENCES.iter().map(|s| s.to_string()).collect(),
            favorites: Vec::new(),
            current_index: 0,
            saved_at: None,
        }
    }
}

impl DeckData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

pub const EXPORT_VERSION: u32 = 1;

/// A standalone copy of the deck that can be moved between machines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub dictr_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub deck: DeckData,
}
