use std::time::Instant;

use crate::engine::normalize::sentences_match;
use crate::engine::template::{Cell, Template};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correctness {
    Empty,
    Correct,
    Incorrect,
}

/// What the renderer needs for one template position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellView {
    pub character: char,
    /// A blank in the template. Literals are shown but never typed into.
    pub fillable: bool,
    pub filled: bool,
    pub correctness: Correctness,
    pub is_active: bool,
}

/// One fill-in-the-blank exercise for a single sentence.
///
/// `slots` always has one entry per template cell. Typing fills the next
/// blank from the left, backspace clears the rightmost filled entry.
pub struct DictationState {
    sentence: String,
    chars: Vec<char>,
    template: Template,
    slots: Vec<Option<char>>,
    completed: bool,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub keystrokes: usize,
}

impl DictationState {
    pub fn new(sentence: &str) -> Self {
        let template = Template::build(sentence);
        let slots = vec![None; template.len()];
        Self {
            sentence: sentence.to_string(),
            chars: sentence.chars().collect(),
            template,
            slots,
            completed: false,
            started_at: None,
            finished_at: None,
            keystrokes: 0,
        }
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    /// Fill the first open position that accepts `ch`.
    ///
    /// Letters and digits go into blanks only. A space goes into the first
    /// open position that is either a blank or a literal space, so it lands
    /// on the word gap when the word before it is complete. Returns the
    /// filled index, or `None` when `ch` is not typeable or nothing is open.
    pub fn input_char(&mut self, ch: char) -> Option<usize> {
        if !is_typeable(ch) {
            return None;
        }

        let idx = self.template.cells().iter().enumerate().position(|(i, cell)| {
            self.slots[i].is_none()
                && match cell {
                    Cell::Blank => true,
                    Cell::Literal(' ') => ch == ' ',
                    Cell::Literal(_) => false,
                }
        })?;

        self.slots[idx] = Some(ch);
        Some(idx)
    }

    /// Clear the rightmost filled position, blank or literal.
    pub fn backspace(&mut self) -> Option<usize> {
        let idx = self.slots.iter().rposition(Option::is_some)?;
        self.slots[idx] = None;
        Some(idx)
    }

    /// The next blank the user is expected to type into.
    pub fn active_slot(&self) -> Option<usize> {
        self.template
            .cells()
            .iter()
            .zip(&self.slots)
            .position(|(cell, slot)| cell.is_blank() && slot.is_none())
    }

    /// Compare the typed character with the sentence character at `idx`,
    /// ignoring case only.
    pub fn classify(&self, idx: usize) -> Correctness {
        match (self.slots.get(idx).copied().flatten(), self.chars.get(idx)) {
            (None, _) => Correctness::Empty,
            (Some(typed), Some(&expected)) if chars_eq_ignore_case(typed, expected) => {
                Correctness::Correct
            }
            (Some(_), _) => Correctness::Incorrect,
        }
    }

    /// Everything typed so far, in position order.
    pub fn typed_text(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    /// Whether the typed text matches the sentence under normalization.
    pub fn matches_sentence(&self) -> bool {
        sentences_match(&self.sentence, &self.typed_text())
    }

    /// Latch completion. Returns true only the first time the typed text
    /// matches; the exercise stays completed afterwards.
    pub fn check_completion(&mut self) -> bool {
        if self.completed || !self.matches_sentence() {
            return false;
        }
        self.completed = true;
        self.finished_at = Some(Instant::now());
        true
    }

    /// An empty sentence has nothing to type and counts as done.
    pub fn is_complete(&self) -> bool {
        self.completed || self.template.is_empty()
    }

    pub fn cells(&self) -> Vec<CellView> {
        let active = self.active_slot();
        self.template
            .cells()
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let typed = self.slots[i];
                CellView {
                    character: typed.unwrap_or(cell.glyph()),
                    fillable: cell.is_blank(),
                    filled: typed.is_some(),
                    correctness: self.classify(i),
                    is_active: active == Some(i),
                }
            })
            .collect()
    }

    /// Fraction of blanks that hold a character.
    pub fn filled_ratio(&self) -> f64 {
        let blanks = self.template.blank_count();
        if blanks == 0 {
            return 0.0;
        }
        let filled = self
            .template
            .cells()
            .iter()
            .zip(&self.slots)
            .filter(|(cell, slot)| cell.is_blank() && slot.is_some())
            .count();
        filled as f64 / blanks as f64
    }

    pub fn mistakes(&self) -> usize {
        (0..self.slots.len())
            .filter(|&i| self.classify(i) == Correctness::Incorrect)
            .count()
    }

    pub fn elapsed_secs(&self) -> f64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start).as_secs_f64(),
            (Some(start), None) => start.elapsed().as_secs_f64(),
            _ => 0.0,
        }
    }
}

pub fn is_typeable(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == ' '
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(state: &mut DictationState, text: &str) {
        for ch in text.chars() {
            state.input_char(ch);
        }
    }

    #[test]
    fn test_new_exercise() {
        let state = DictationState::new("Hello world");
        assert_eq!(state.slots().len(), 11);
        assert!(state.slots().iter().all(Option::is_none));
        assert_eq!(state.active_slot(), Some(0));
        assert!(!state.is_complete());
    }

    #[test]
    fn test_letters_fill_left_to_right() {
        let mut state = DictationState::new("Hello world");
        assert_eq!(state.input_char('h'), Some(0));
        assert_eq!(state.input_char('e'), Some(1));
        assert_eq!(state.active_slot(), Some(2));
    }

    #[test]
    fn test_letters_skip_literal_positions() {
        let mut state = DictationState::new("Hello world");
        type_str(&mut state, "hello");
        // Index 5 is the space; the next letter goes to the second word.
        assert_eq!(state.input_char('w'), Some(6));
        assert_eq!(state.slots()[5], None);
    }

    #[test]
    fn test_space_fills_word_gap() {
        let mut state = DictationState::new("Hello world");
        type_str(&mut state, "hello");
        assert_eq!(state.input_char(' '), Some(5));
    }

    #[test]
    fn test_space_before_word_is_done_lands_in_blank() {
        let mut state = DictationState::new("Hello world");
        type_str(&mut state, "he");
        assert_eq!(state.input_char(' '), Some(2));
        assert_eq!(state.classify(2), Correctness::Incorrect);
    }

    #[test]
    fn test_space_skips_punctuation() {
        let mut state = DictationState::new("Hi, you");
        type_str(&mut state, "hi");
        assert_eq!(state.input_char(' '), Some(3));
        assert_eq!(state.slots()[2], None);
    }

    #[test]
    fn test_untypeable_characters_are_ignored() {
        let mut state = DictationState::new("a-b");
        assert_eq!(state.input_char('-'), None);
        assert_eq!(state.input_char('é'), None);
        assert!(state.slots().iter().all(Option::is_none));
    }

    #[test]
    fn test_input_when_full_is_noop() {
        let mut state = DictationState::new("ab");
        type_str(&mut state, "ab");
        assert_eq!(state.input_char('c'), None);
        assert_eq!(state.typed_text(), "ab");
        assert_eq!(state.active_slot(), None);
    }

    #[test]
    fn test_backspace_clears_last_filled() {
        let mut state = DictationState::new("ab cd");
        type_str(&mut state, "abc");
        assert_eq!(state.backspace(), Some(3));
        assert_eq!(state.backspace(), Some(1));
        assert_eq!(state.typed_text(), "a");
    }

    #[test]
    fn test_backspace_clears_typed_space() {
        let mut state = DictationState::new("ab cd");
        type_str(&mut state, "ab ");
        assert_eq!(state.backspace(), Some(2));
        assert_eq!(state.slots()[2], None);
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut state = DictationState::new("abc");
        assert_eq!(state.backspace(), None);
    }

    #[test]
    fn test_classify_case_insensitive() {
        let mut state = DictationState::new("hello");
        type_str(&mut state, "HELLO");
        for i in 0..5 {
            assert_eq!(state.classify(i), Correctness::Correct);
        }
    }

    #[test]
    fn test_classify_incorrect_and_empty() {
        let mut state = DictationState::new("Hello world");
        state.input_char('x');
        assert_eq!(state.classify(0), Correctness::Incorrect);
        assert_eq!(state.classify(1), Correctness::Empty);
        assert_eq!(state.classify(99), Correctness::Empty);
        assert_eq!(state.mistakes(), 1);
    }

    #[test]
    fn test_sequential_fill_leaves_no_gaps() {
        let sentence = "The quick, brown fox!";
        let mut state = DictationState::new(sentence);
        let blanks: Vec<usize> = state
            .template()
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_blank())
            .map(|(i, _)| i)
            .collect();

        for (n, ch) in "thequickbrownfox".chars().enumerate() {
            state.input_char(ch);
            let filled: Vec<usize> = blanks
                .iter()
                .copied()
                .filter(|&i| state.slots()[i].is_some())
                .collect();
            assert_eq!(filled, blanks[..=n].to_vec());
        }
    }

    #[test]
    fn test_completion_with_punctuation_untyped() {
        let mut state = DictationState::new("Hello, world!");
        type_str(&mut state, "Hello world");
        assert_eq!(state.typed_text(), "Hello world");
        assert!(state.check_completion());
        assert!(state.is_complete());
    }

    #[test]
    fn test_completion_fires_once() {
        let mut state = DictationState::new("hi");
        type_str(&mut state, "hi");
        assert!(state.check_completion());
        assert!(!state.check_completion());
    }

    #[test]
    fn test_partial_input_does_not_complete() {
        let mut state = DictationState::new("hello");
        for ch in "hell".chars() {
            state.input_char(ch);
            assert!(!state.check_completion());
        }
    }

    #[test]
    fn test_missing_space_does_not_complete() {
        let mut state = DictationState::new("Hello world");
        type_str(&mut state, "helloworld");
        assert!(!state.check_completion());
    }

    #[test]
    fn test_empty_sentence_is_complete_and_inert() {
        let mut state = DictationState::new("");
        assert!(state.is_complete());
        assert_eq!(state.input_char('a'), None);
        assert_eq!(state.backspace(), None);
        assert_eq!(state.active_slot(), None);
        assert!(state.cells().is_empty());
    }

    #[test]
    fn test_cells_display_model() {
        let mut state = DictationState::new("Hi, yo");
        type_str(&mut state, "hX");
        let cells = state.cells();
        assert_eq!(cells.len(), 6);

        assert_eq!(cells[0].character, 'h');
        assert_eq!(cells[0].correctness, Correctness::Correct);
        assert_eq!(cells[1].character, 'X');
        assert_eq!(cells[1].correctness, Correctness::Incorrect);

        assert_eq!(cells[2].character, ',');
        assert!(!cells[2].fillable);
        assert!(!cells[2].filled);
        assert!(!cells[2].is_active);

        // The space is open but literal, so the active marker skips it.
        assert!(!cells[3].is_active);
        assert_eq!(cells[4].character, '_');
        assert!(cells[4].fillable);
        assert!(cells[4].is_active);
        assert_eq!(cells.iter().filter(|c| c.is_active).count(), 1);
    }

    #[test]
    fn test_filled_ratio() {
        let mut state = DictationState::new("ab cd");
        assert_eq!(state.filled_ratio(), 0.0);
        type_str(&mut state, "ab");
        assert!((state.filled_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(DictationState::new("...").filled_ratio(), 0.0);
    }
}
