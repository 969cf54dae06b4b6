//! Structured guesses produced by an NLU provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the user seems to want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NluIntent {
    NewReservation,
    ModifyReservation,
    CancelReservation,
    ConfirmReservation,
    SmallTalk,
    #[serde(other)]
    Unknown,
}

impl NluIntent {
    /// Map a provider label to an intent. Unrecognized labels are `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "new_reservation" => NluIntent::NewReservation,
            "modify_reservation" => NluIntent::ModifyReservation,
            "cancel_reservation" => NluIntent::CancelReservation,
            "confirm_reservation" => NluIntent::ConfirmReservation,
            "small_talk" => NluIntent::SmallTalk,
            _ => NluIntent::Unknown,
        }
    }
}

/// Advisory extraction result. Every field is unvalidated provider output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluGuess {
    pub intent: NluIntent,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guests: Option<f64>,
    pub name: Option<String>,
    pub notes: String,
}

impl NluGuess {
    /// The guess returned whenever analysis is unavailable or fails.
    pub fn unknown(notes: impl Into<String>) -> Self {
        Self {
            intent: NluIntent::Unknown,
            date: None,
            time: None,
            guests: None,
            name: None,
            notes: notes.into(),
        }
    }

    /// True when at least one reservation field was extracted.
    pub fn has_fields(&self) -> bool {
        self.date.is_some() || self.time.is_some() || self.guests.is_some() || self.name.is_some()
    }
}

/// Loosely-typed provider output, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawGuess {
    intent: Option<String>,
    date: Option<String>,
    time: Option<String>,
    guests: Option<Value>,
    name: Option<String>,
    notes: Option<String>,
}

impl RawGuess {
    /// Normalize into a guess. Numeric-string guests are accepted.
    pub(crate) fn into_guess(self) -> NluGuess {
        let guests = match self.guests {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        NluGuess {
            intent: self
                .intent
                .as_deref()
                .map_or(NluIntent::Unknown, NluIntent::from_label),
            date: non_blank(self.date),
            time: non_blank(self.time),
            guests,
            name: non_blank(self.name),
            notes: self
                .notes
                .unwrap_or_else(|| "No notes provided".to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
