//! Speech and keypress feedback.
//!
//! Playback is fire-and-forget: nothing here blocks the input loop and no
//! failure is ever returned to the caller. Problems are logged and dropped.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use thiserror::Error;

use crate::config::Config;

/// Words per minute most synthesizers use at rate 1.0.
const BASE_WPM: f32 = 175.0;

pub trait Speaker {
    fn speak(&mut self, text: &str);
    fn stop(&mut self);
    fn play_keypress(&mut self);

    fn replay(&mut self, text: &str) {
        self.stop();
        self.speak(text);
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech program `{0}` not found")]
    ProgramNotFound(String),
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
}

/// Speaks by launching an external text-to-speech program per utterance.
pub struct CommandSpeaker {
    program: String,
    voice: String,
    rate: f32,
    keypress_sound: bool,
    child: Option<Child>,
    reported_missing: bool,
}

impl CommandSpeaker {
    pub fn new(program: &str, voice: &str, rate: f32, keypress_sound: bool) -> Self {
        Self {
            program: program.to_string(),
            voice: voice.to_string(),
            rate,
            keypress_sound,
            child: None,
            reported_missing: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.speech_command,
            &config.speech_voice,
            config.speech_rate,
            config.keypress_sound,
        )
    }

    fn spawn(&self, text: &str) -> Result<Child, SpeechError> {
        Command::new(&self.program)
            .args(speech_args(&self.program, &self.voice, self.rate, text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    SpeechError::ProgramNotFound(self.program.clone())
                } else {
                    SpeechError::Spawn {
                        program: self.program.clone(),
                        source,
                    }
                }
            })
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        // One utterance at a time
        self.stop();

        match self.spawn(text) {
            Ok(child) => self.child = Some(child),
            Err(err @ SpeechError::ProgramNotFound(_)) => {
                if !self.reported_missing {
                    tracing::warn!(error = %err, "speech unavailable");
                    self.reported_missing = true;
                }
            }
            Err(err) => tracing::warn!(error = %err, "speech failed"),
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn play_keypress(&mut self) {
        if !self.keypress_sound {
            return;
        }
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            tracing::debug!(error = %err, "keypress bell failed");
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Used with `--mute` and in tests.
#[derive(Debug, Default)]
pub struct SilentSpeaker {
    pub spoken: Vec<String>,
    pub keypresses: usize,
    pub stops: usize,
}

impl Speaker for SilentSpeaker {
    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn play_keypress(&mut self) {
        self.keypresses += 1;
    }
}

/// Command-line arguments for the known synthesizers. Anything else gets
/// the text as its only argument.
pub fn speech_args(program: &str, voice: &str, rate: f32, text: &str) -> Vec<String> {
    let name = Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program);
    let wpm = ((BASE_WPM * rate).round() as u32).max(1).to_string();

    match name {
        "espeak" | "espeak-ng" => vec![
            "-v".to_string(),
            voice.to_string(),
            "-s".to_string(),
            wpm,
            "--".to_string(),
            text.to_string(),
        ],
        "say" => vec!["-r".to_string(), wpm, "--".to_string(), text.to_string()],
        _ => vec![text.to_string()],
    }
}
