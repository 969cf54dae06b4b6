//! Reply texts sent back to the user.

use reserva_core::types::{NewReservation, Reservation};

use crate::state::{ReservationDraft, ReservationField};

const NEXT: &str = "What would you like to do next?";

pub fn menu() -> String {
    "Hello! I can help you with restaurant reservations.\n\
     What would you like to do?\n\
     1) New reservation\n\
     2) Modify reservation\n\
     3) Cancel reservation\n\
     4) Confirm (see details)\n\
     Please type something like 'new reservation', 'modify', 'cancel', or 'confirm'."
        .to_string()
}

pub fn not_understood() -> String {
    "I didn't quite get that. Please type: new, modify, cancel, or confirm.".to_string()
}

pub fn small_talk() -> String {
    "Happy to chat! I'm here to help with restaurant reservations.\n\
     You can type 'new reservation', 'modify', 'cancel', or 'confirm'."
        .to_string()
}

/// Question asking for a missing draft field.
pub fn ask_field(field: ReservationField) -> &'static str {
    match field {
        ReservationField::Date => "What date would you like? (YYYY-MM-DD)",
        ReservationField::Time => "What time would you like? (HH:MM, 24h format)",
        ReservationField::Guests => "How many guests?",
        ReservationField::Name => "Under what name should I make the reservation?",
    }
}

/// Reprompt after an invalid value for `field`.
pub fn invalid_field(field: ReservationField) -> String {
    let text = match field {
        ReservationField::Date => {
            "The date is invalid. Please enter a date as YYYY-MM-DD (today or later):"
        }
        ReservationField::Time => {
            "The time format is invalid. Please enter time as HH:MM in 24h format (or e.g. 7:30 pm):"
        }
        ReservationField::Guests => {
            "Guests must be a number between 1 and 20. Please enter the number of guests:"
        }
        ReservationField::Name => {
            "The name must be between 1 and 100 characters. Please enter the name for the reservation:"
        }
    };
    text.to_string()
}

/// Opening of the new-reservation flow, echoing anything already understood.
pub fn start_new(draft: &ReservationDraft, next: ReservationField) -> String {
    if draft.is_empty() {
        format!("Great! Let's make a new reservation.\n{}", ask_field(next))
    } else {
        format!(
            "Great! Let's make a new reservation. So far I have:\n{}\n{}",
            draft.describe(),
            ask_field(next)
        )
    }
}

pub fn confirm_new(draft: &NewReservation) -> String {
    format!(
        "Please confirm your reservation:\n{}\nReply 'yes' to confirm or 'no' to cancel.",
        draft.summary()
    )
}

pub fn yes_or_no() -> String {
    "Please reply with 'yes' or 'no'.".to_string()
}

pub fn created(reservation: &Reservation) -> String {
    format!(
        "Your reservation is confirmed!\nReservation ID: {}\n{}\n\n{}",
        reservation.id,
        reservation.summary(),
        NEXT
    )
}

pub fn discarded() -> String {
    "Okay, the reservation was not created. What would you like to do instead (new / modify / cancel / confirm)?"
        .to_string()
}

/// Ask for a reservation id, offering the last one this conversation used.
pub fn ask_id(purpose: &str, last_reservation_id: Option<&str>) -> String {
    match last_reservation_id {
        Some(id) => format!(
            "Please enter your reservation ID to {} (or type 'last' for {}):",
            purpose, id
        ),
        None => format!("Please enter your reservation ID to {}:", purpose),
    }
}

pub fn id_not_found() -> String {
    "I couldn't find a reservation with that ID. Please check and enter the correct reservation ID:"
        .to_string()
}

pub fn modify_cancelled() -> String {
    "That reservation has been cancelled and can no longer be modified. Please enter another reservation ID:"
        .to_string()
}

pub fn ask_modify_field(reservation: &Reservation) -> String {
    format!(
        "Found your reservation.\n{}\nWhat would you like to change? (date / time / guests / name)",
        reservation.summary()
    )
}

pub fn unknown_modify_field() -> String {
    "Please type which field you want to change: date, time, guests, or name.".to_string()
}

pub fn ask_new_value(field: ReservationField) -> String {
    let hint = match field {
        ReservationField::Date => " (YYYY-MM-DD)",
        ReservationField::Time => " (HH:MM, 24h format)",
        ReservationField::Guests => " (1-20)",
        ReservationField::Name => "",
    };
    format!("What is the new {}?{}", field, hint)
}

pub fn updated(reservation: &Reservation) -> String {
    format!(
        "Your reservation has been updated.\nReservation ID: {}\n{}\n\n{}",
        reservation.id,
        reservation.summary(),
        NEXT
    )
}

pub fn vanished() -> String {
    "I couldn't find that reservation anymore. Let's start over. What would you like to do?"
        .to_string()
}

pub fn cancelled(reservation: &Reservation) -> String {
    format!(
        "Your reservation has been cancelled.\nReservation ID: {}\n\n{}",
        reservation.id, NEXT
    )
}

pub fn details(reservation: &Reservation) -> String {
    format!(
        "Here are your reservation details:\nReservation ID: {}\n{}\n\n{}",
        reservation.id,
        reservation.summary(),
        NEXT
    )
}
