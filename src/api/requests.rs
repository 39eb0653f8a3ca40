//! API request bodies
//!
//! Numeric fields arrive from free-form inputs, so they are accepted as JSON
//! numbers or numeric strings and sanitized rather than rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::state::{NewTimer, ViewMode, DEFAULT_DURATION_SECS};

#[derive(Debug, Deserialize)]
pub struct AddTimerRequest {
    pub preset: Option<String>,
    pub label: Option<String>,
    pub minutes: Option<Value>,
    pub icon: Option<String>,
}

impl AddTimerRequest {
    pub fn into_new_timer(self) -> NewTimer {
        match self.preset {
            Some(preset) => NewTimer::Preset(preset),
            None => NewTimer::Custom {
                label: self.label.unwrap_or_default(),
                minutes: match &self.minutes {
                    Some(value) => parse_minutes(value).unwrap_or(0.0),
                    None => (DEFAULT_DURATION_SECS / 60) as f64,
                },
                icon: self.icon,
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct NudgeRequest {
    pub minutes: Option<Value>,
}

impl NudgeRequest {
    /// Defaults to adding one minute
    pub fn minutes(&self) -> f64 {
        self.minutes.as_ref().and_then(parse_minutes).unwrap_or(1.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct DurationRequest {
    pub minutes: Value,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdsRequest {
    pub minutes: Value,
}

impl ThresholdsRequest {
    /// Comma-separated minute list, whether sent as a string or an array
    pub fn minute_list(&self) -> String {
        match &self.minutes {
            Value::String(list) => list.clone(),
            Value::Number(n) => n.to_string(),
            Value::Array(entries) => entries
                .iter()
                .map(|entry| match entry {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub pinned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    pub speech_enabled: Option<bool>,
    pub language: Option<String>,
    /// Empty string clears the voice choice
    pub voice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReferenceRequest {
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub mode: ViewMode,
}

/// Read a minute count from a number or numeric string
pub fn parse_minutes(value: &Value) -> Option<f64> {
    let minutes = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    minutes.is_finite().then_some(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minutes_from_numbers_and_strings() {
        assert_eq!(parse_minutes(&json!(5)), Some(5.0));
        assert_eq!(parse_minutes(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(parse_minutes(&json!("five")), None);
        assert_eq!(parse_minutes(&json!(null)), None);
    }

    #[test]
    fn custom_timer_defaults() {
        let request: AddTimerRequest = serde_json::from_value(json!({ "label": "Draft" })).unwrap();
        assert_eq!(
            request.into_new_timer(),
            NewTimer::Custom {
                label: "Draft".to_string(),
                minutes: 50.0,
                icon: None
            }
        );

        let request: AddTimerRequest =
            serde_json::from_value(json!({ "label": "Draft", "minutes": "abc" })).unwrap();
        match request.into_new_timer() {
            NewTimer::Custom { minutes, .. } => assert_eq!(minutes, 0.0),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn preset_wins_over_custom_fields() {
        let request: AddTimerRequest =
            serde_json::from_value(json!({ "preset": "magic", "label": "ignored" })).unwrap();
        assert_eq!(request.into_new_timer(), NewTimer::Preset("magic".to_string()));
    }

    #[test]
    fn threshold_list_shapes() {
        let as_list = |value| ThresholdsRequest { minutes: value }.minute_list();
        assert_eq!(as_list(json!("5, 2")), "5, 2");
        assert_eq!(as_list(json!([5, "2", 0.5])), "5,2,0.5");
        assert_eq!(as_list(json!(10)), "10");
        assert_eq!(as_list(json!(null)), "");
    }

    #[test]
    fn nudge_defaults_to_plus_one() {
        assert_eq!(NudgeRequest::default().minutes(), 1.0);
        let back: NudgeRequest = serde_json::from_value(json!({ "minutes": -1 })).unwrap();
        assert_eq!(back.minutes(), -1.0);
    }
}
