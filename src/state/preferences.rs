//! Board-wide preferences persisted next to the timers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Milestone;

/// The two announcement languages the board speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Some(Self::English),
            "zh" | "zh-tw" | "zh-hk" | "zh-cn" | "chinese" => Some(Self::Chinese),
            _ => None,
        }
    }

    /// Voice passed to the speech program when none is chosen
    pub fn default_voice(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Chinese => "cmn",
        }
    }
}

/// Milestone categories that can carry a pre-recorded clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipKind {
    FiveMinutes,
    TwoMinutes,
    Threshold,
    Finished,
}

impl ClipKind {
    pub fn for_milestone(milestone: Milestone) -> Self {
        match milestone {
            Milestone::Finished => Self::Finished,
            Milestone::Threshold(300) => Self::FiveMinutes,
            Milestone::Threshold(120) => Self::TwoMinutes,
            Milestone::Threshold(_) => Self::Threshold,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "fiveMinutes" | "five-minutes" | "5m" => Some(Self::FiveMinutes),
            "twoMinutes" | "two-minutes" | "2m" => Some(Self::TwoMinutes),
            "threshold" => Some(Self::Threshold),
            "finished" | "timesUp" => Some(Self::Finished),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Reference (path or URL) to the board background image
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default = "default_speech_enabled")]
    pub speech_enabled: bool,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub voice: Option<String>,
    /// Audio clip references keyed by milestone kind
    #[serde(default)]
    pub clips: BTreeMap<ClipKind, String>,
}

fn default_speech_enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            background: None,
            speech_enabled: default_speech_enabled(),
            language: Language::default(),
            voice: None,
            clips: BTreeMap::new(),
        }
    }
}

impl Preferences {
    pub fn clip_for(&self, milestone: Milestone) -> Option<&str> {
        self.clips
            .get(&ClipKind::for_milestone(milestone))
            .map(String::as_str)
    }

    pub fn voice(&self) -> &str {
        self.voice
            .as_deref()
            .filter(|voice| !voice.trim().is_empty())
            .unwrap_or_else(|| self.language.default_voice())
    }
}
