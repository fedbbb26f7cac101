use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line editor used for adding, editing and importing sentences.
#[derive(Clone, Debug)]
pub struct LineInput {
    chars: Vec<char>,
    /// Char index, 0 = before the first char.
    cursor: usize,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    /// (before cursor, char under cursor, after cursor). The middle part is
    /// `None` when the cursor sits past the end.
    pub fn render_parts(&self) -> (String, Option<char>, String) {
        let before: String = self.chars[..self.cursor].iter().collect();
        let at = self.chars.get(self.cursor).copied();
        let after: String = self
            .chars
            .get(self.cursor + 1..)
            .map(|rest| rest.iter().collect())
            .unwrap_or_default();
        (before, at, after)
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.chars.len(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.chars.remove(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.chars.len() {
                    self.chars.remove(self.cursor);
                }
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.chars.len(),
            KeyCode::Char('u') if ctrl => {
                self.chars.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                self.chars.insert(self.cursor, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    /// Unix word rubout: trailing whitespace, then the word before it.
    fn delete_word_back(&mut self) {
        let mut start = self.cursor;
        while start > 0 && self.chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.chars[start - 1].is_whitespace() {
            start -= 1;
        }
        self.chars.drain(start..self.cursor);
        self.cursor = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut LineInput, text: &str) {
        for ch in text.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = LineInput::new("wrld");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Right));
        type_str(&mut input, "o");
        assert_eq!(input.value(), "world");
        input.handle(key(KeyCode::Home));
        type_str(&mut input, "Hello ");
        assert_eq!(input.value(), "Hello world");
    }

    #[test]
    fn backspace_and_delete_at_edges() {
        let mut input = LineInput::new("ab");
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "ab");
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn non_ascii_is_edited_per_char() {
        let mut input = LineInput::new("café");
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "caf");
    }

    #[test]
    fn ctrl_w_deletes_previous_word() {
        let mut input = LineInput::new("foo bar  ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "foo ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn ctrl_u_clears_before_cursor() {
        let mut input = LineInput::new("hello world");
        for _ in 0..5 {
            input.handle(key(KeyCode::Left));
        }
        input.handle(ctrl('u'));
        assert_eq!(input.value(), "world");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn ctrl_a_and_ctrl_e_move_cursor() {
        let mut input = LineInput::new("test");
        input.handle(ctrl('a'));
        assert_eq!(input.cursor, 0);
        input.handle(ctrl('e'));
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn render_parts_follow_cursor() {
        let mut input = LineInput::new("abc");
        assert_eq!(input.render_parts(), ("abc".to_string(), None, String::new()));
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Left));
        assert_eq!(
            input.render_parts(),
            ("a".to_string(), Some('b'), "c".to_string())
        );
    }

    #[test]
    fn submit_and_cancel() {
        let mut input = LineInput::new("  ");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
    }
}
