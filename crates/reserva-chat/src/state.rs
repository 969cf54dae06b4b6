//! Per-conversation dialogue state.
//!
//! The current step carries whatever data that step needs, so a step can
//! never be reached without its payload.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use reserva_core::types::{NewReservation, ReservationUpdate};
use reserva_core::validation;

/// One of the four editable reservation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationField {
    Date,
    Time,
    Guests,
    Name,
}

impl ReservationField {
    /// Case-insensitive parse of `date`, `time`, `guests` or `name`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "date" => Some(ReservationField::Date),
            "time" => Some(ReservationField::Time),
            "guests" => Some(ReservationField::Guests),
            "name" => Some(ReservationField::Name),
            _ => None,
        }
    }

    /// Validate `input` as a new value for this field.
    pub fn to_update(self, input: &str, today: NaiveDate) -> Option<ReservationUpdate> {
        let mut update = ReservationUpdate::default();
        match self {
            ReservationField::Date => update.date = Some(validation::parse_date(input, today)?),
            ReservationField::Time => update.time = Some(validation::parse_time(input)?),
            ReservationField::Guests => update.guests = Some(validation::parse_guests(input)?),
            ReservationField::Name => update.name = Some(validation::parse_name(input)?),
        }
        Some(update)
    }
}

impl fmt::Display for ReservationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationField::Date => write!(f, "date"),
            ReservationField::Time => write!(f, "time"),
            ReservationField::Guests => write!(f, "guests"),
            ReservationField::Name => write!(f, "name"),
        }
    }
}

/// Fields collected so far for a new reservation. Only validated values
/// are ever stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationDraft {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub guests: Option<u32>,
    pub name: Option<String>,
}

impl ReservationDraft {
    /// First missing field in collection order: date, time, guests, name.
    pub fn next_missing(&self) -> Option<ReservationField> {
        if self.date.is_none() {
            Some(ReservationField::Date)
        } else if self.time.is_none() {
            Some(ReservationField::Time)
        } else if self.guests.is_none() {
            Some(ReservationField::Guests)
        } else if self.name.is_none() {
            Some(ReservationField::Name)
        } else {
            None
        }
    }

    /// Validate `input` and store it in `field`. Returns false and leaves
    /// the draft untouched when the value is invalid.
    pub fn accept(&mut self, field: ReservationField, input: &str, today: NaiveDate) -> bool {
        match field {
            ReservationField::Date => store_parsed(&mut self.date, validation::parse_date(input, today)),
            ReservationField::Time => store_parsed(&mut self.time, validation::parse_time(input)),
            ReservationField::Guests => store_parsed(&mut self.guests, validation::parse_guests(input)),
            ReservationField::Name => store_parsed(&mut self.name, validation::parse_name(input)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none() && self.guests.is_none() && self.name.is_none()
    }

    /// The finished reservation, once all four fields are present.
    pub fn complete(&self) -> Option<NewReservation> {
        Some(NewReservation {
            name: self.name.clone()?,
            date: self.date?,
            time: self.time.clone()?,
            guests: self.guests?,
        })
    }

    /// Lines describing the fields collected so far.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        if let Some(date) = self.date {
            lines.push(format!("- Date: {}", date.format("%Y-%m-%d")));
        }
        if let Some(time) = &self.time {
            lines.push(format!("- Time: {}", time));
        }
        if let Some(guests) = self.guests {
            lines.push(format!("- Guests: {}", guests));
        }
        if let Some(name) = &self.name {
            lines.push(format!("- Name: {}", name));
        }
        lines.join("\n")
    }
}

fn store_parsed<T>(slot: &mut Option<T>, parsed: Option<T>) -> bool {
    match parsed {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

/// Where a conversation currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Idle,
    ChoosingAction,
    NewCollecting {
        draft: ReservationDraft,
    },
    NewConfirming {
        draft: NewReservation,
    },
    ModifyCollectingId,
    ModifyCollectingField {
        reservation_id: String,
    },
    ModifyCollectingValue {
        reservation_id: String,
        field: ReservationField,
    },
    CancelCollectingId,
    ConfirmCollectingId,
}

impl Step {
    /// Stable snake_case name used in logs and snapshots.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::ChoosingAction => "choosing_action",
            Step::NewCollecting { .. } => "new_collecting",
            Step::NewConfirming { .. } => "new_confirming",
            Step::ModifyCollectingId => "modify_collecting_id",
            Step::ModifyCollectingField { .. } => "modify_collecting_field",
            Step::ModifyCollectingValue { .. } => "modify_collecting_value",
            Step::CancelCollectingId => "cancel_collecting_id",
            Step::ConfirmCollectingId => "confirm_collecting_id",
        }
    }
}

/// The flow a conversation most recently entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LastAction {
    New,
    Modify,
    Cancel,
    Confirm,
}

/// Dialogue state for one conversation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub step: Step,
    pub last_action: Option<LastAction>,
    /// Last reservation created, modified, cancelled or looked up here.
    pub last_reservation_id: Option<String>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            step: Step::Idle,
            last_action: None,
            last_reservation_id: None,
        }
    }
}

impl ConversationState {
    /// Back to the main menu after a finished or abandoned flow.
    /// `last_reservation_id` survives.
    pub fn reset(&mut self) {
        self.step = Step::ChoosingAction;
        self.last_action = None;
    }

    /// Enter a flow.
    pub fn begin(&mut self, action: LastAction, step: Step) {
        self.last_action = Some(action);
        self.step = step;
    }
}

/// Read-only view of a conversation, as returned by the inspection API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    pub conversation_id: String,
    pub step: String,
    pub last_action: Option<LastAction>,
    pub last_reservation_id: Option<String>,
    /// Field being collected or edited, if any.
    pub pending_field: Option<ReservationField>,
}

impl ConversationSnapshot {
    pub fn new(conversation_id: &str, state: &ConversationState) -> Self {
        let pending_field = match &state.step {
            Step::NewCollecting { draft } => draft.next_missing(),
            Step::ModifyCollectingValue { field, .. } => Some(*field),
            _ => None,
        };
        Self {
            conversation_id: conversation_id.to_string(),
            step: state.step.label().to_string(),
            last_action: state.last_action,
            last_reservation_id: state.last_reservation_id.clone(),
            pending_field,
        }
    }
}
