//! Audio output: pre-recorded clips and synthesized speech via external programs

use std::future::Future;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::state::{Notification, Preferences};

use super::phrases::phrase;

/// How a single notification will be voiced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// Play the configured clip; speak `text` if the clip cannot be played
    Clip {
        reference: String,
        text: String,
        voice: String,
    },
    Speech { text: String, voice: String },
}

impl Playback {
    /// Choose clip or speech for a notification, or nothing when speech is off
    pub fn plan(preferences: &Preferences, notification: &Notification) -> Option<Self> {
        if !preferences.speech_enabled {
            return None;
        }

        let text = phrase(preferences.language, &notification.label, notification.milestone);
        let voice = preferences.voice().to_string();

        match preferences.clip_for(notification.milestone) {
            Some(reference) => Some(Self::Clip {
                reference: reference.to_string(),
                text,
                voice,
            }),
            None => Some(Self::Speech { text, voice }),
        }
    }
}

/// Something that can make the board audible.
///
/// Both calls resolve once playback has finished, which is what keeps
/// announcements from overlapping.
pub trait AudioOutput: Send + Sync + 'static {
    fn play_clip(&self, reference: &str) -> impl Future<Output = Result<(), String>> + Send;

    fn speak(&self, text: &str, voice: &str) -> impl Future<Output = Result<(), String>> + Send;
}

/// Run a playback plan, falling back from clip to speech to silence
pub async fn deliver<A: AudioOutput>(audio: &A, playback: &Playback) {
    match playback {
        Playback::Clip { reference, text, voice } => {
            match audio.play_clip(reference).await {
                Ok(()) => return,
                Err(e) => warn!("Clip {} failed ({}), falling back to speech", reference, e),
            }
            if let Err(e) = audio.speak(text, voice).await {
                debug!("Speech unavailable: {}", e);
            }
        }
        Playback::Speech { text, voice } => {
            if let Err(e) = audio.speak(text, voice).await {
                debug!("Speech unavailable: {}", e);
            }
        }
    }
}

/// Audio output backed by a text-to-speech program (`espeak-ng`, `say`)
/// and an audio player (`paplay`, `afplay`).
///
/// Either program may be absent, in which case that capability is skipped.
#[derive(Debug, Clone, Default)]
pub struct SystemAudio {
    tts_program: Option<String>,
    player_program: Option<String>,
}

impl SystemAudio {
    pub fn new(tts_program: Option<String>, player_program: Option<String>) -> Self {
        Self {
            tts_program,
            player_program,
        }
    }

    /// Keep only the programs that can actually be started on this machine
    pub async fn detect(tts_program: Option<String>, player_program: Option<String>) -> Self {
        let tts_program = match tts_program {
            Some(program) => check_program_available(&program).await.then_some(program),
            None => None,
        };
        let player_program = match player_program {
            Some(program) => check_program_available(&program).await.then_some(program),
            None => None,
        };
        Self::new(tts_program, player_program)
    }

    pub fn can_speak(&self) -> bool {
        self.tts_program.is_some()
    }

    pub fn can_play_clips(&self) -> bool {
        self.player_program.is_some()
    }
}

impl AudioOutput for SystemAudio {
    async fn play_clip(&self, reference: &str) -> Result<(), String> {
        let program = self
            .player_program
            .as_deref()
            .ok_or_else(|| "no audio player configured".to_string())?;
        debug!("Playing clip {} with {}", reference, program);
        run(program, &[reference]).await
    }

    async fn speak(&self, text: &str, voice: &str) -> Result<(), String> {
        let program = self
            .tts_program
            .as_deref()
            .ok_or_else(|| "no speech program configured".to_string())?;
        debug!("Speaking with {} ({}): {}", program, voice, text);
        run(program, &["-v", voice, text]).await
    }
}

async fn run(program: &str, args: &[&str]) -> Result<(), String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", program, stderr.trim()));
    }

    Ok(())
}

/// Check whether a program can be started at all
pub async fn check_program_available(program: &str) -> bool {
    match Command::new(program).arg("--version").output().await {
        Ok(_) => {
            info!("{} is available", program);
            true
        }
        Err(e) => {
            warn!("{} is not available ({}), continuing without it", program, e);
            false
        }
    }
}
