//! Repair of malformed or legacy-shaped persisted data
//!
//! Everything here works on untyped `serde_json::Value` so that no stored
//! shape can make loading fail.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::state::{
    ClipKind, Language, Preferences, Timer, TimerId, TimerStatus, DEFAULT_DURATION_SECS,
    DEFAULT_THRESHOLDS,
};

use super::BoardDocument;

const DEFAULT_LABEL: &str = "Timer";

/// Normalize a whole persisted document.
///
/// Accepts the current `{ timers, preferences }` layout as well as a bare
/// array of timers.
pub fn normalize_document(value: &Value) -> BoardDocument {
    let (timers, preferences) = match value {
        Value::Object(doc) => (doc.get("timers"), doc.get("preferences")),
        Value::Array(_) => (Some(value), None),
        _ => {
            warn!("Stored board is not an object, starting empty");
            (None, None)
        }
    };

    let timers = match timers {
        Some(Value::Array(records)) => normalize_timers(records),
        Some(other) => {
            warn!("Stored timers are not a list ({}), starting empty", type_name(other));
            Vec::new()
        }
        None => Vec::new(),
    };

    BoardDocument {
        timers,
        preferences: preferences.map(normalize_preferences).unwrap_or_default(),
        ..BoardDocument::default()
    }
}

/// Normalize a list of timer records, keeping ids unique
pub fn normalize_timers(records: &[Value]) -> Vec<Timer> {
    let mut seen = HashSet::new();
    let mut timers = Vec::with_capacity(records.len());

    for record in records {
        let Some(fields) = record.as_object() else {
            debug!("Skipping non-object timer record: {}", type_name(record));
            continue;
        };
        let mut timer = normalize_timer(fields);
        if !seen.insert(timer.id.clone()) {
            let fresh = TimerId::generate();
            debug!("Duplicate timer id {} replaced with {}", timer.id, fresh);
            timer.id = fresh;
            seen.insert(timer.id.clone());
        }
        timers.push(timer);
    }

    timers
}

/// Normalize a single timer record
pub fn normalize_timer(fields: &Map<String, Value>) -> Timer {
    let id = fields
        .get("id")
        .and_then(parse_id)
        .unwrap_or_else(TimerId::generate);

    let label = first(fields, &["label", "name"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(DEFAULT_LABEL)
        .to_string();

    let icon = fields
        .get("icon")
        .and_then(Value::as_str)
        .filter(|icon| !icon.trim().is_empty())
        .map(str::to_string);

    let duration_sec = first(fields, &["durationSec", "duration"])
        .and_then(parse_number)
        .filter(|secs| *secs >= 1.0)
        .map(|secs| secs.round() as u64)
        .unwrap_or(DEFAULT_DURATION_SECS);

    // Out-of-range values are clamped, never replaced by the default
    let remaining_sec = first(fields, &["remainingSec", "remaining"])
        .and_then(parse_number)
        .unwrap_or(duration_sec as f64)
        .clamp(0.0, duration_sec as f64);

    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(TimerStatus::parse)
        .or_else(|| match fields.get("running") {
            Some(Value::Bool(true)) => Some(TimerStatus::Running),
            _ => None,
        })
        .unwrap_or(TimerStatus::Paused);

    // Finished only stands when the countdown actually reached zero
    let status = match status {
        TimerStatus::Finished if remaining_sec > 0.0 => TimerStatus::Paused,
        TimerStatus::Running if remaining_sec == 0.0 => TimerStatus::Finished,
        other => other,
    };

    let announce_thresholds: BTreeSet<u64> = match fields.get("announceThresholds") {
        Some(Value::Array(entries)) => entries.iter().filter_map(parse_threshold).collect(),
        _ => DEFAULT_THRESHOLDS.into_iter().collect(),
    };

    let pinned = matches!(fields.get("pinned"), Some(Value::Bool(true)));

    Timer {
        id,
        label,
        icon,
        duration_sec,
        remaining_sec,
        status,
        announce_thresholds,
        pinned,
    }
}

/// Normalize stored preferences field by field, defaulting whatever is unusable
pub fn normalize_preferences(value: &Value) -> Preferences {
    let defaults = Preferences::default();
    let Some(fields) = value.as_object() else {
        return defaults;
    };

    let clips = match fields.get("clips") {
        Some(Value::Object(clips)) => clips
            .iter()
            .filter_map(|(kind, reference)| {
                let kind = ClipKind::parse(kind)?;
                let reference = reference.as_str().filter(|r| !r.trim().is_empty())?;
                Some((kind, reference.to_string()))
            })
            .collect(),
        _ => defaults.clips,
    };

    Preferences {
        background: non_empty_string(fields.get("background")),
        speech_enabled: fields
            .get("speechEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.speech_enabled),
        language: fields
            .get("language")
            .and_then(Value::as_str)
            .and_then(Language::parse)
            .unwrap_or(defaults.language),
        voice: non_empty_string(fields.get("voice")),
        clips,
    }
}

fn first<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| fields.get(*key))
}

fn parse_id(value: &Value) -> Option<TimerId> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(TimerId::from(id.trim())),
        Value::Number(id) => Some(TimerId::from(id.to_string())),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn parse_threshold(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
