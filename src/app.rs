use std::sync::mpsc::Sender;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::audio::Speaker;
use crate::config::Config;
use crate::engine::confetti::{BurstId, Confetti, Viewport};
use crate::event::{AppEvent, RepeatingTask, Timeout};
use crate::session::deck::{SentenceDeck, SentenceSource, read_batch};
use crate::session::dictation::DictationState;
use crate::session::input::{self, InputOutcome};
use crate::store::json_store::JsonStore;
use crate::ui::components::confetti_layer::viewport_for;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Practice,
    Sentences,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete(usize),
    DeleteAll,
    DeleteAllExceptFavorites,
}

impl ConfirmAction {
    pub fn prompt(self) -> String {
        match self {
            ConfirmAction::Delete(i) => format!("Delete sentence {}? [y/n]", i + 1),
            ConfirmAction::DeleteAll => "Delete ALL sentences? [y/n]".to_string(),
            ConfirmAction::DeleteAllExceptFavorites => {
                "Delete every sentence that is not a favorite? [y/n]".to_string()
            }
        }
    }
}

/// What the sentence manager is doing with the keyboard.
#[derive(Clone, Debug)]
pub enum EditMode {
    Browse,
    Adding(LineInput),
    Editing { index: usize, input: LineInput },
    Importing(LineInput),
    Confirm(ConfirmAction),
}

/// The two timers driving a live burst. Dropping them stops both.
struct BurstTasks {
    _frames: RepeatingTask,
    _expiry: Timeout,
}

pub struct App {
    pub screen: AppScreen,
    pub deck: SentenceDeck,
    pub dictation: DictationState,
    pub confetti: Confetti,
    pub theme: &'static Theme,
    pub config: Config,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    pub show_sidebar: bool,
    pub sidebar_selected: usize,
    pub list_selected: usize,
    pub edit_mode: EditMode,
    pub status: Option<String>,
    pub viewport: Viewport,
    pub completed_count: usize,
    speaker: Box<dyn Speaker>,
    rng: SmallRng,
    events: Option<Sender<AppEvent>>,
    burst_tasks: Option<BurstTasks>,
}

impl App {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        deck: SentenceDeck,
        store: Option<JsonStore>,
        speaker: Box<dyn Speaker>,
    ) -> Self {
        let confetti = Confetti::new(config.confetti_settings());
        let dictation = DictationState::new(deck.current().unwrap_or(""));
        let sidebar_selected = deck.current_index();

        Self {
            screen: AppScreen::Practice,
            deck,
            dictation,
            confetti,
            theme,
            config,
            store,
            should_quit: false,
            show_sidebar: false,
            sidebar_selected,
            list_selected: sidebar_selected,
            edit_mode: EditMode::Browse,
            status: None,
            viewport: viewport_for(80),
            completed_count: 0,
            speaker,
            rng: SmallRng::from_entropy(),
            events: None,
            burst_tasks: None,
        }
    }

    /// Connect the timers to the main loop. Without a sender bursts still
    /// run but must be driven by hand.
    pub fn attach_events(&mut self, tx: Sender<AppEvent>) {
        self.events = Some(tx);
    }

    pub fn resize(&mut self, cols: u16) {
        self.viewport = viewport_for(cols);
    }

    /// Build a fresh exercise for the deck's current sentence and speak it.
    pub fn load_sentence(&mut self) {
        let sentence = self.deck.current().unwrap_or("").to_string();
        self.dictation = DictationState::new(&sentence);
        self.sidebar_selected = self.deck.current_index();
        if sentence.is_empty() {
            self.speaker.stop();
            return;
        }
        tracing::info!(
            index = self.deck.current_index(),
            blanks = self.dictation.template().blank_count(),
            "sentence loaded"
        );
        self.speaker.speak(&sentence);
    }

    pub fn type_char(&mut self, ch: char) {
        match input::process_char(&mut self.dictation, ch) {
            InputOutcome::Rejected => {}
            InputOutcome::Accepted { .. } => self.speaker.play_keypress(),
            InputOutcome::Completed { .. } => {
                self.speaker.play_keypress();
                self.complete_sentence();
            }
        }
    }

    pub fn backspace(&mut self) {
        if let InputOutcome::Completed { .. } = input::process_backspace(&mut self.dictation) {
            self.complete_sentence();
        }
    }

    fn complete_sentence(&mut self) {
        self.completed_count += 1;
        tracing::info!(
            index = self.deck.current_index(),
            keystrokes = self.dictation.keystrokes,
            mistakes = self.dictation.mistakes(),
            secs = format!("{:.1}", self.dictation.elapsed_secs()),
            "sentence completed"
        );
        self.start_burst();
        self.deck.advance();
        self.persist();
        self.load_sentence();
    }

    pub fn skip(&mut self) {
        self.deck.advance();
        self.persist();
        self.load_sentence();
    }

    pub fn replay(&mut self) {
        if let Some(sentence) = self.deck.current() {
            self.speaker.replay(sentence);
        }
    }

    pub fn toggle_favorite(&mut self) {
        if self.deck.is_empty() {
            return;
        }
        let now = self.deck.toggle_favorite();
        self.status = Some(if now {
            "Added to favorites".to_string()
        } else {
            "Removed from favorites".to_string()
        });
        self.persist();
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
        self.sidebar_selected = self.deck.current_index();
    }

    pub fn sidebar_up(&mut self) {
        self.sidebar_selected = self.sidebar_selected.saturating_sub(1);
    }

    pub fn sidebar_down(&mut self) {
        if self.sidebar_selected + 1 < self.deck.len() {
            self.sidebar_selected += 1;
        }
    }

    /// Jump to a sentence and start it from scratch.
    pub fn select_sentence(&mut self, index: usize) {
        if self.deck.select(index) {
            self.persist();
            self.load_sentence();
        }
    }

    // --- Confetti ---

    fn start_burst(&mut self) {
        let id = self.confetti.activate(self.viewport, &mut self.rng);
        // Drops the previous burst's timers.
        self.burst_tasks = self.events.as_ref().map(|tx| {
            let settings = self.confetti.settings();
            let frame_tx = tx.clone();
            let expiry_tx = tx.clone();
            BurstTasks {
                _frames: RepeatingTask::spawn(settings.frame_interval, move || {
                    frame_tx.send(AppEvent::Frame(id)).is_ok()
                }),
                _expiry: Timeout::spawn(settings.duration, move || {
                    let _ = expiry_tx.send(AppEvent::BurstExpired(id));
                }),
            }
        });
    }

    pub fn on_frame(&mut self, id: BurstId) {
        if !self.confetti.frame(id) {
            tracing::trace!(?id, "stale frame ignored");
        }
    }

    pub fn on_burst_expired(&mut self, id: BurstId) {
        if self.confetti.expire(id) {
            self.burst_tasks = None;
        } else {
            tracing::debug!(?id, "stale burst expiry ignored");
        }
    }

    fn stop_burst(&mut self) {
        self.burst_tasks = None;
        self.confetti.cancel();
    }

    // --- Screens ---

    pub fn go_to_sentences(&mut self) {
        self.stop_burst();
        self.speaker.stop();
        self.screen = AppScreen::Sentences;
        self.list_selected = self.deck.current_index();
        self.edit_mode = EditMode::Browse;
        self.status = None;
    }

    pub fn go_to_practice(&mut self) {
        self.screen = AppScreen::Practice;
        self.edit_mode = EditMode::Browse;
        self.status = None;
        self.load_sentence();
    }

    pub fn quit(&mut self) {
        self.stop_burst();
        self.speaker.stop();
        self.should_quit = true;
    }

    // --- Sentence management ---

    pub fn list_up(&mut self) {
        self.list_selected = self.list_selected.saturating_sub(1);
    }

    pub fn list_down(&mut self) {
        if self.list_selected + 1 < self.deck.len() {
            self.list_selected += 1;
        }
    }

    pub fn begin_add(&mut self) {
        self.edit_mode = EditMode::Adding(LineInput::new(""));
    }

    pub fn begin_edit(&mut self) {
        if let Some(text) = self.deck.sentences().get(self.list_selected) {
            self.edit_mode = EditMode::Editing {
                index: self.list_selected,
                input: LineInput::new(text),
            };
        }
    }

    pub fn begin_import(&mut self) {
        self.edit_mode = EditMode::Importing(LineInput::new(""));
    }

    pub fn begin_confirm(&mut self, action: ConfirmAction) {
        let applicable = match action {
            ConfirmAction::Delete(i) => i < self.deck.len(),
            _ => !self.deck.is_empty(),
        };
        if applicable {
            self.edit_mode = EditMode::Confirm(action);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_mode = EditMode::Browse;
    }

    /// Apply whatever the current line input holds.
    pub fn submit_edit(&mut self) {
        let mode = std::mem::replace(&mut self.edit_mode, EditMode::Browse);
        match mode {
            EditMode::Adding(input) => self.add_sentence(&input.value()),
            EditMode::Editing { index, input } => self.update_sentence(index, &input.value()),
            EditMode::Importing(input) => self.import_sentences(&input.value()),
            other => self.edit_mode = other,
        }
    }

    pub fn confirm(&mut self) {
        let EditMode::Confirm(action) = self.edit_mode else {
            return;
        };
        self.edit_mode = EditMode::Browse;
        match action {
            ConfirmAction::Delete(index) => self.delete_sentence(index),
            ConfirmAction::DeleteAll => self.delete_all(),
            ConfirmAction::DeleteAllExceptFavorites => self.delete_all_except_favorites(),
        }
    }

    pub fn add_sentence(&mut self, text: &str) {
        if self.deck.add(text) {
            self.list_selected = self.deck.len() - 1;
            self.status = Some("Sentence added".to_string());
            self.persist();
        } else {
            self.status = Some("Sentence cannot be empty".to_string());
        }
    }

    pub fn update_sentence(&mut self, index: usize, text: &str) {
        if self.deck.update(index, text) {
            self.status = Some("Sentence updated".to_string());
            self.persist();
        } else {
            self.status = Some("Sentence cannot be empty".to_string());
        }
    }

    pub fn delete_sentence(&mut self, index: usize) {
        if self.deck.delete(index).is_some() {
            self.clamp_list_selection();
            self.status = Some("Sentence deleted".to_string());
            self.persist();
        }
    }

    pub fn delete_all(&mut self) {
        self.deck.delete_all();
        self.list_selected = 0;
        self.status = Some("All sentences deleted".to_string());
        self.persist();
    }

    pub fn delete_all_except_favorites(&mut self) {
        let removed = self.deck.delete_all_except_favorites();
        self.clamp_list_selection();
        self.status = Some(format!("Removed {removed} sentences, kept favorites"));
        self.persist();
    }

    /// Import a JSON array of strings, inline or from a file. A bad batch
    /// leaves the deck untouched.
    pub fn import_sentences(&mut self, input: &str) {
        match read_batch(input) {
            Ok(batch) => {
                let count = self.deck.import(batch);
                tracing::info!(count, "sentences imported");
                self.status = Some(format!("Imported {count} sentences"));
                self.persist();
            }
            Err(err) => {
                tracing::warn!(error = %err, "import rejected");
                self.status = Some(format!("Import failed: {err}"));
            }
        }
    }

    pub fn toggle_list_favorite(&mut self) {
        if let Some(now) = self.deck.toggle_favorite_at(self.list_selected) {
            self.status = Some(if now { "Favorited" } else { "Unfavorited" }.to_string());
            self.persist();
        }
    }

    pub fn practice_selected(&mut self) {
        if self.deck.select(self.list_selected) {
            self.persist();
        }
        self.go_to_practice();
    }

    fn clamp_list_selection(&mut self) {
        self.list_selected = self.list_selected.min(self.deck.len().saturating_sub(1));
    }

    fn persist(&mut self) {
        if let Some(ref store) = self.store {
            if let Err(err) = store.save_deck(&self.deck.to_data()) {
                tracing::warn!(error = %err, "failed to save sentences");
                self.status = Some(format!("Could not save: {err}"));
            }
        }
    }
}
