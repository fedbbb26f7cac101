use std::time::Instant;

use crate::session::dictation::DictationState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing changed: the exercise is finished, the key is not typeable,
    /// or there is no open position for it.
    Rejected,
    Accepted { index: usize },
    /// The mutation at `index` made the typed text match the sentence.
    Completed { index: usize },
}

impl InputOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, InputOutcome::Rejected)
    }
}

pub fn process_char(dictation: &mut DictationState, ch: char) -> InputOutcome {
    if dictation.is_complete() {
        return InputOutcome::Rejected;
    }

    let Some(index) = dictation.input_char(ch) else {
        return InputOutcome::Rejected;
    };

    if dictation.started_at.is_none() {
        dictation.started_at = Some(Instant::now());
    }
    dictation.keystrokes += 1;

    settle(dictation, index)
}

pub fn process_backspace(dictation: &mut DictationState) -> InputOutcome {
    if dictation.is_complete() {
        return InputOutcome::Rejected;
    }

    match dictation.backspace() {
        Some(index) => settle(dictation, index),
        None => InputOutcome::Rejected,
    }
}

fn settle(dictation: &mut DictationState, index: usize) -> InputOutcome {
    if dictation.check_completion() {
        InputOutcome::Completed { index }
    } else {
        InputOutcome::Accepted { index }
    }
}
