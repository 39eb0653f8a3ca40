//! One-click timer presets for common store events

use serde::Serialize;

use crate::state::Timer;

/// A named shortcut for creating a timer
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub minutes: u64,
}

impl Preset {
    /// Build a fresh paused timer from this preset
    pub fn build(&self) -> Timer {
        Timer::new(self.label, Some(self.icon.to_string()), self.minutes * 60)
    }
}

pub const PRESETS: &[Preset] = &[
    Preset { key: "magic", label: "Magic: The Gathering", icon: "🧙", minutes: 50 },
    Preset { key: "pokemon", label: "Pokémon TCG", icon: "⚡", minutes: 50 },
    Preset { key: "yugioh", label: "Yu-Gi-Oh!", icon: "🐉", minutes: 40 },
    Preset { key: "one-piece", label: "One Piece Card Game", icon: "🏴‍☠️", minutes: 35 },
    Preset { key: "lorcana", label: "Disney Lorcana", icon: "✨", minutes: 50 },
    Preset { key: "flesh-and-blood", label: "Flesh and Blood", icon: "⚔️", minutes: 55 },
    Preset { key: "digimon", label: "Digimon Card Game", icon: "🦖", minutes: 35 },
    Preset { key: "board-game", label: "Board Game", icon: "🎲", minutes: 60 },
];

/// Look up a preset by its key
pub fn find_preset(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.key.eq_ignore_ascii_case(key.trim()))
}
