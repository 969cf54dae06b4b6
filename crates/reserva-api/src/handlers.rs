//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path parameters and JSON bodies via axum
//! extractors, calls the store or the conversation engine, and returns
//! JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use reserva_chat::ConversationSnapshot;
use reserva_core::error::ValidationError;
use reserva_core::types::{NewReservation, Reservation, ReservationStatus, ReservationUpdate};
use reserva_core::validation;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Party size as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GuestsInput {
    Number(f64),
    Text(String),
}

impl GuestsInput {
    fn is_blank(&self) -> bool {
        matches!(self, GuestsInput::Text(s) if s.trim().is_empty())
    }

    /// Numeric value; unparseable text yields NaN, which no validator accepts.
    fn value(&self) -> f64 {
        match self {
            GuestsInput::Number(n) => *n,
            GuestsInput::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

/// Request body for POST /api/reservations.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guests: Option<GuestsInput>,
}

/// Request body for PUT /api/reservations/{id}. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReservationRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guests: Option<GuestsInput>,
    pub status: Option<String>,
}

impl UpdateReservationRequest {
    /// Validate every present field in name, date, time, guests, status order.
    pub fn into_update(self, today: chrono::NaiveDate) -> Result<ReservationUpdate, ValidationError> {
        let mut update = ReservationUpdate::default();
        if let Some(name) = self.name {
            update.name = Some(validation::parse_name(&name).ok_or(ValidationError::InvalidName)?);
        }
        if let Some(date) = self.date {
            update.date =
                Some(validation::parse_date(&date, today).ok_or(ValidationError::InvalidDate)?);
        }
        if let Some(time) = self.time {
            update.time = Some(validation::parse_time(&time).ok_or(ValidationError::InvalidTime)?);
        }
        if let Some(guests) = self.guests {
            let n = guests.value();
            if !validation::is_valid_guests(n) {
                return Err(ValidationError::InvalidGuests);
            }
            update.guests = Some(n as u32);
        }
        if let Some(status) = self.status {
            update.status = Some(status.parse::<ReservationStatus>()?);
        }
        Ok(update)
    }
}

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub conversation_id: Option<String>,
    pub message: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
    pub version: String,
    pub uptime_secs: u64,
    pub reservations: usize,
    pub conversations: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub message: String,
    pub reservation: Reservation,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: String,
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResetResponse {
    pub message: String,
    pub conversation_id: String,
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness and basic counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "Reservation API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        reservations: state.store.len(),
        conversations: state.engine.conversation_count(),
    })
}

/// POST /api/reservations - create a confirmed reservation.
pub async fn create_reservation(
    State(state): State<AppState>,
    payload: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let Json(body) = payload.map_err(bad_json)?;

    let (Some(name), Some(date), Some(time), Some(guests)) = (
        present(body.name),
        present(body.date),
        present(body.time),
        body.guests.filter(|g| !g.is_blank()),
    ) else {
        return Err(ValidationError::MissingFields.into());
    };

    let input = NewReservation::parse(&name, &date, &time, guests.value(), validation::today())?;
    let reservation = state.store.create(input)?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/reservations - every reservation, oldest first.
pub async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(state.store.list()?))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reservation>, ApiError> {
    Ok(Json(state.store.get(&id)?))
}

/// PUT /api/reservations/{id} - partial update. Fields are validated
/// before the id is looked up.
pub async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateReservationRequest>, JsonRejection>,
) -> Result<Json<Reservation>, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;
    let update = body.into_update(validation::today())?;
    Ok(Json(state.store.update(&id, update)?))
}

/// DELETE /api/reservations/{id} - cancel; the record is kept.
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    let reservation = state.store.cancel(&id)?;
    Ok(Json(CancelResponse {
        message: "Reservation cancelled".to_string(),
        reservation,
    }))
}

/// POST /api/chat - one conversational turn.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_json)?;

    let message = body
        .message
        .ok_or_else(|| ApiError::BadRequest("Missing 'message' in request body".to_string()))?;
    let conversation_id = present(body.conversation_id)
        .unwrap_or_else(|| state.config.chat.default_conversation_id.clone());

    let reply = state.engine.handle_message(&conversation_id, &message).await?;
    Ok(Json(ChatResponse {
        conversation_id,
        reply,
    }))
}

/// GET /api/chat/{conversation_id} - current dialogue step.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationSnapshot>, ApiError> {
    state
        .engine
        .snapshot(&conversation_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))
}

/// DELETE /api/chat/{conversation_id} - forget a conversation.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationResetResponse>, ApiError> {
    if !state.engine.reset(&conversation_id) {
        return Err(ApiError::NotFound("Conversation not found".to_string()));
    }
    Ok(Json(ConversationResetResponse {
        message: "Conversation reset".to_string(),
        conversation_id,
    }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
