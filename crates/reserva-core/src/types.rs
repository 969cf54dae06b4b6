//! Core domain types shared by every Reserva crate.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation;

// =============================================================================
// Enums
// =============================================================================

/// Reservation lifecycle status. Cancelling is a status flip, never a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Confirmed => write!(f, "Confirmed"),
            ReservationStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = ValidationError;

    /// Case-insensitive: `confirmed`, `Confirmed` and `CONFIRMED` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    /// Normalized 24-hour `HH:MM`.
    pub time: String,
    pub guests: u32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four validated fields needed to create a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub guests: u32,
}

impl NewReservation {
    /// Validate raw field values, reporting the first failing field in
    /// name, date, time, guests order.
    pub fn parse(
        name: &str,
        date: &str,
        time: &str,
        guests: f64,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let name = validation::parse_name(name).ok_or(ValidationError::InvalidName)?;
        let date = validation::parse_date(date, today).ok_or(ValidationError::InvalidDate)?;
        let time = validation::parse_time(time).ok_or(ValidationError::InvalidTime)?;
        if !validation::is_valid_guests(guests) {
            return Err(ValidationError::InvalidGuests);
        }
        Ok(Self {
            name,
            date,
            time,
            guests: guests as u32,
        })
    }

    pub fn summary(&self) -> String {
        summary_lines(&self.name, self.date, &self.time, self.guests)
    }
}

/// A partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationUpdate {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub guests: Option<u32>,
    pub status: Option<ReservationStatus>,
}

impl ReservationUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.guests.is_none()
            && self.status.is_none()
    }

    /// Merge into `reservation`. Does not touch `updated_at`.
    pub fn apply_to(self, reservation: &mut Reservation) {
        if let Some(name) = self.name {
            reservation.name = name;
        }
        if let Some(date) = self.date {
            reservation.date = date;
        }
        if let Some(time) = self.time {
            reservation.time = time;
        }
        if let Some(guests) = self.guests {
            reservation.guests = guests;
        }
        if let Some(status) = self.status {
            reservation.status = status;
        }
    }
}

/// One-line-per-field summary shown in chat replies.
pub fn summary_lines(name: &str, date: NaiveDate, time: &str, guests: u32) -> String {
    format!(
        "- Name: {}\n- Date: {}\n- Time: {}\n- Guests: {}",
        name,
        date.format("%Y-%m-%d"),
        time,
        guests
    )
}

impl Reservation {
    /// Field summary followed by the current status.
    pub fn summary(&self) -> String {
        format!(
            "{}\n- Status: {}",
            summary_lines(&self.name, self.date, &self.time, self.guests),
            self.status
        )
    }
}
