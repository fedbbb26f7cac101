use thiserror::Error;

use crate::store::schema::DeckData;

/// Where the practice screen gets its sentences from.
pub trait SentenceSource {
    fn current(&self) -> Option<&str>;
    fn advance(&mut self);
    fn sentences(&self) -> &[String];
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of strings")]
    NotAnArray,
    #[error("item {index} is not a string")]
    NotAString { index: usize },
    #[error("item {index} is empty")]
    EmptySentence { index: usize },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Parse a batch of sentences from a JSON array of strings.
///
/// All items are validated before anything is returned, so a bad batch
/// never partially applies.
pub fn parse_batch(json: &str) -> Result<Vec<String>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let items = value.as_array().ok_or(ImportError::NotAnArray)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let text = item.as_str().ok_or(ImportError::NotAString { index })?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ImportError::EmptySentence { index });
            }
            Ok(trimmed.to_string())
        })
        .collect()
}

/// Read a batch from `input`: inline JSON when it starts with `[`,
/// otherwise a path to a JSON file.
pub fn read_batch(input: &str) -> Result<Vec<String>, ImportError> {
    let input = input.trim();
    if input.starts_with('[') {
        return parse_batch(input);
    }
    let content = std::fs::read_to_string(input).map_err(|source| ImportError::Io {
        path: input.to_string(),
        source,
    })?;
    parse_batch(&content)
}

/// The user's sentence list, favorites and position.
#[derive(Clone, Debug, Default)]
pub struct SentenceDeck {
    sentences: Vec<String>,
    favorites: Vec<String>,
    current: usize,
}

impl SentenceDeck {
    pub fn new(sentences: Vec<String>) -> Self {
        Self {
            sentences,
            favorites: Vec::new(),
            current: 0,
        }
    }

    pub fn from_data(data: DeckData) -> Self {
        let mut deck = Self {
            sentences: data.sentences,
            favorites: data.favorites,
            current: data.current_index,
        };
        deck.clamp_current();
        deck
    }

    pub fn to_data(&self) -> DeckData {
        DeckData {
            sentences: self.sentences.clone(),
            favorites: self.favorites.clone(),
            current_index: self.current,
            ..DeckData::default()
        }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    /// Returns false for blank input.
    pub fn add(&mut self, sentence: &str) -> bool {
        let trimmed = sentence.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.sentences.push(trimmed.to_string());
        true
    }

    /// Replace the sentence at `index`. A favorite stays a favorite under
    /// its new text.
    pub fn update(&mut self, index: usize, sentence: &str) -> bool {
        let trimmed = sentence.trim();
        let Some(slot) = self.sentences.get_mut(index) else {
            return false;
        };
        if trimmed.is_empty() {
            return false;
        }
        let old = std::mem::replace(slot, trimmed.to_string());
        for fav in self.favorites.iter_mut().filter(|f| **f == old) {
            *fav = trimmed.to_string();
        }
        true
    }

    pub fn delete(&mut self, index: usize) -> Option<String> {
        if index >= self.sentences.len() {
            return None;
        }
        let removed = self.sentences.remove(index);
        self.clamp_current();
        Some(removed)
    }

    pub fn delete_all(&mut self) {
        self.sentences.clear();
        self.current = 0;
    }

    /// Keep only sentences marked as favorite.
    pub fn delete_all_except_favorites(&mut self) -> usize {
        let before = self.sentences.len();
        let favorites = &self.favorites;
        self.sentences.retain(|s| favorites.contains(s));
        self.clamp_current();
        before - self.sentences.len()
    }

    pub fn import(&mut self, batch: Vec<String>) -> usize {
        let count = batch.len();
        self.sentences.extend(batch);
        count
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.sentences.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn is_favorite(&self, sentence: &str) -> bool {
        self.favorites.iter().any(|f| f == sentence)
    }

    pub fn current_is_favorite(&self) -> bool {
        self.current().is_some_and(|s| self.is_favorite(s))
    }

    /// Returns the new favorite state of the current sentence.
    pub fn toggle_favorite(&mut self) -> bool {
        self.toggle_favorite_at(self.current).unwrap_or(false)
    }

    pub fn toggle_favorite_at(&mut self, index: usize) -> Option<bool> {
        let sentence = self.sentences.get(index)?.clone();
        if let Some(pos) = self.favorites.iter().position(|f| *f == sentence) {
            self.favorites.remove(pos);
            Some(false)
        } else {
            self.favorites.push(sentence);
            Some(true)
        }
    }

    /// Position through the list, 0.0 for an empty deck.
    pub fn progress(&self) -> f64 {
        if self.sentences.is_empty() {
            return 0.0;
        }
        (self.current + 1) as f64 / self.sentences.len() as f64
    }

    pub fn progress_text(&self) -> String {
        if self.sentences.is_empty() {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.current + 1, self.sentences.len())
    }

    fn clamp_current(&mut self) {
        self.current = self.current.min(self.sentences.len().saturating_sub(1));
    }
}

impl SentenceSource for SentenceDeck {
    fn current(&self) -> Option<&str> {
        self.sentences.get(self.current).map(String::as_str)
    }

    /// Wraps around to the first sentence. No-op on an empty deck.
    fn advance(&mut self) {
        if !self.sentences.is_empty() {
            self.current = (self.current + 1) % self.sentences.len();
        }
    }

    fn sentences(&self) -> &[String] {
        &self.sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(items: &[&str]) -> SentenceDeck {
        SentenceDeck::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_advance_wraps() {
        let mut d = deck(&["a", "b"]);
        assert_eq!(d.current(), Some("a"));
        d.advance();
        assert_eq!(d.current(), Some("b"));
        d.advance();
        assert_eq!(d.current(), Some("a"));
    }

    #[test]
    fn test_advance_on_empty_deck_is_noop() {
        let mut d = SentenceDeck::default();
        d.advance();
        assert_eq!(d.current(), None);
        assert_eq!(d.current_index(), 0);
    }

    #[test]
    fn test_add_trims_and_rejects_blank() {
        let mut d = SentenceDeck::default();
        assert!(d.add("  Hello there.  "));
        assert!(!d.add("   "));
        assert_eq!(d.sentences(), &["Hello there.".to_string()]);
    }

    #[test]
    fn test_update() {
        let mut d = deck(&["a", "b"]);
        assert!(d.update(1, " c "));
        assert_eq!(d.sentences()[1], "c");
        assert!(!d.update(1, ""));
        assert!(!d.update(5, "x"));
    }

    #[test]
    fn test_delete_clamps_current() {
        let mut d = deck(&["a", "b", "c"]);
        d.select(2);
        assert_eq!(d.delete(2), Some("c".to_string()));
        assert_eq!(d.current_index(), 1);
        assert_eq!(d.delete(9), None);
    }

    #[test]
    fn test_delete_last_sentence() {
        let mut d = deck(&["a"]);
        d.delete(0);
        assert!(d.is_empty());
        assert_eq!(d.current_index(), 0);
        assert_eq!(d.current(), None);
    }

    #[test]
    fn test_toggle_favorite() {
        let mut d = deck(&["a", "b"]);
        assert!(d.toggle_favorite());
        assert!(d.current_is_favorite());
        assert!(!d.toggle_favorite());
        assert!(d.favorites().is_empty());
    }

    #[test]
    fn test_update_keeps_favorite() {
        let mut d = deck(&["a", "b"]);
        d.toggle_favorite_at(1);
        assert!(d.update(1, "b2"));
        assert!(d.is_favorite("b2"));
        assert!(!d.is_favorite("b"));
        assert_eq!(d.toggle_favorite_at(7), None);
    }

    #[test]
    fn test_delete_all_except_favorites() {
        let mut d = deck(&["a", "b", "c"]);
        d.select(1);
        d.toggle_favorite();
        d.select(2);
        assert_eq!(d.delete_all_except_favorites(), 2);
        assert_eq!(d.sentences(), &["b".to_string()]);
        assert_eq!(d.current_index(), 0);
    }

    #[test]
    fn test_progress() {
        let mut d = deck(&["a", "b", "c", "d"]);
        assert!((d.progress() - 0.25).abs() < f64::EPSILON);
        d.select(3);
        assert_eq!(d.progress_text(), "4 / 4");
        assert_eq!(SentenceDeck::default().progress(), 0.0);
    }

    #[test]
    fn test_parse_batch_valid() {
        let batch = parse_batch(r#"[" one ", "two."]"#).unwrap();
        assert_eq!(batch, vec!["one".to_string(), "two.".to_string()]);
    }

    #[test]
    fn test_parse_batch_rejects_malformed() {
        assert!(matches!(parse_batch("not json"), Err(ImportError::Json(_))));
        assert!(matches!(parse_batch(r#"{"a": 1}"#), Err(ImportError::NotAnArray)));
        assert!(matches!(
            parse_batch(r#"["ok", 3]"#),
            Err(ImportError::NotAString { index: 1 })
        ));
        assert!(matches!(
            parse_batch(r#"["ok", "  "]"#),
            Err(ImportError::EmptySentence { index: 1 })
        ));
    }

    #[test]
    fn test_failed_import_leaves_deck_untouched() {
        let mut d = deck(&["a"]);
        if let Ok(batch) = parse_batch(r#"["b", null]"#) {
            d.import(batch);
        }
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_read_batch_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, r#"["from file"]"#).unwrap();
        let batch = read_batch(path.to_str().unwrap()).unwrap();
        assert_eq!(batch, vec!["from file".to_string()]);

        let missing = dir.path().join("missing.json");
        let err = read_batch(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }

    #[test]
    fn test_data_round_trip_clamps_index() {
        let data = DeckData {
            sentences: vec!["a".to_string()],
            favorites: vec![],
            current_index: 7,
            ..DeckData::default()
        };
        let d = SentenceDeck::from_data(data);
        assert_eq!(d.current_index(), 0);
        assert_eq!(d.to_data().sentences, vec!["a".to_string()]);
    }
}
