use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use serde::Serialize;

use crate::store::schema::{DeckData, EXPORT_VERSION, ExportData};

const DECK_FILE: &str = "sentences.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dictr")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load the deck. Returns None if the file exists but cannot be
    /// parsed or carries another schema version.
    pub fn load_deck(&self) -> Option<DeckData> {
        let path = self.file_path(DECK_FILE);
        if !path.exists() {
            // First run: seed sentences
            return Some(DeckData::default());
        }
        let content = fs::read_to_string(&path).ok()?;
        let data: DeckData = serde_json::from_str(&content).ok()?;
        if data.needs_reset() { None } else { Some(data) }
    }

    pub fn save_deck(&self, data: &DeckData) -> Result<()> {
        let mut stamped = data.clone();
        stamped.saved_at = Some(Utc::now());
        self.save(&self.file_path(DECK_FILE), &stamped)
    }

    pub fn export_deck(&self, data: &DeckData, path: &Path) -> Result<()> {
        let export = ExportData {
            dictr_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            deck: data.clone(),
        };
        self.save(path, &export)
    }

    /// Read an export file and replace the stored deck with it.
    pub fn import_deck(&self, path: &Path) -> Result<DeckData> {
        let content = fs::read_to_string(path)?;
        let export: ExportData = serde_json::from_str(&content)?;
        if export.dictr_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                export.dictr_export_version,
                EXPORT_VERSION
            );
        }
        if export.deck.needs_reset() {
            bail!("Unsupported deck schema version: {}", export.deck.schema_version);
        }
        self.save_deck(&export.deck)?;
        Ok(export.deck)
    }
}
