//! In-memory reservation store.
//!
//! One map guarded by one mutex. Writers are last-writer-wins; there is no
//! optimistic locking or versioning.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Datelike, Utc};
use rand::Rng;

use reserva_core::types::{NewReservation, Reservation, ReservationStatus, ReservationUpdate};

use crate::error::StoreError;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 8;

/// Keyed collection of reservations, owned by the process and shared via `Arc`.
pub struct ReservationStore {
    reservations: Mutex<HashMap<String, Reservation>>,
}

impl ReservationStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            reservations: Mutex::new(HashMap::new()),
        }
    }

    /// Create a confirmed reservation with a fresh id.
    pub fn create(&self, input: NewReservation) -> Result<Reservation, StoreError> {
        let mut reservations = self.lock()?;

        let mut id = generate_id();
        while reservations.contains_key(&id) {
            id = generate_id();
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: id.clone(),
            name: input.name,
            date: input.date,
            time: input.time,
            guests: input.guests,
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };
        reservations.insert(id, reservation.clone());

        tracing::info!(
            id = %reservation.id,
            date = %reservation.date,
            time = %reservation.time,
            guests = reservation.guests,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Get a reservation by id.
    pub fn get(&self, id: &str) -> Result<Reservation, StoreError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Merge `update` into the reservation and refresh `updated_at`.
    pub fn update(&self, id: &str, update: ReservationUpdate) -> Result<Reservation, StoreError> {
        let mut reservations = self.lock()?;
        let reservation = reservations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        update.apply_to(reservation);
        reservation.updated_at = Utc::now();

        tracing::info!(id = %id, "Reservation updated");
        Ok(reservation.clone())
    }

    /// Flip the status to `Cancelled` and refresh `updated_at`.
    ///
    /// Cancelling twice is allowed; the second call only moves `updated_at`.
    pub fn cancel(&self, id: &str) -> Result<Reservation, StoreError> {
        let mut reservations = self.lock()?;
        let reservation = reservations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        reservation.status = ReservationStatus::Cancelled;
        reservation.updated_at = Utc::now();

        tracing::info!(id = %id, "Reservation cancelled");
        Ok(reservation.clone())
    }

    /// All reservations, oldest first.
    pub fn list(&self) -> Result<Vec<Reservation>, StoreError> {
        let reservations = self.lock()?;
        let mut all: Vec<Reservation> = reservations.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    /// Number of stored reservations, cancelled ones included.
    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Reservation>>, StoreError> {
        self.reservations
            .lock()
            .map_err(|e| StoreError::Storage(format!("Lock poisoned: {}", e)))
    }
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `res_<year>_<8 base36 chars>`.
fn generate_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("res_{}_{}", Utc::now().year(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn input(name: &str) -> NewReservation {
        NewReservation {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            time: "18:30".to_string(),
            guests: 4,
        }
    }

    #[test]
    fn test_create_then_get() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();

        let found = store.get(&created.id).unwrap();
        assert_eq!(found, created);
        assert_eq!(found.status, ReservationStatus::Confirmed);
        assert_eq!(found.created_at, found.updated_at);
        assert_eq!(found.name, "Alex");
        assert_eq!(found.guests, 4);
    }

    #[test]
    fn test_id_format() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();
        let parts: Vec<&str> = created.id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "res");
        assert_eq!(parts[1], Utc::now().year().to_string());
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ids_are_unique() {
        let store = ReservationStore::new();
        let ids: HashSet<String> = (0..200)
            .map(|i| store.create(input(&format!("Guest {}", i))).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_get_not_found() {
        let store = ReservationStore::new();
        let result = store.get("res_2026_missing0");
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "res_2026_missing0"));
    }

    #[test]
    fn test_update_merges_fields() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();

        let updated = store
            .update(
                &created.id,
                ReservationUpdate {
                    time: Some("20:00".to_string()),
                    guests: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.time, "20:00");
        assert_eq!(updated.guests, 2);
        assert_eq!(updated.name, "Alex");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.get(&created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_not_found() {
        let store = ReservationStore::new();
        let result = store.update(
            "nope",
            ReservationUpdate {
                name: Some("X".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_empty_still_touches_updated_at() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();
        let updated = store.update(&created.id, ReservationUpdate::default()).unwrap();
        assert_eq!(updated.name, created.name);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_cancel_sets_cancelled() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();
        let cancelled = store.cancel(&created.id).unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert_eq!(store.get(&created.id).unwrap().status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_cancel_twice_stays_cancelled() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();
        let first = store.cancel(&created.id).unwrap();
        let second = store.cancel(&created.id).unwrap();
        assert_eq!(second.status, ReservationStatus::Cancelled);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn test_cancel_after_status_update() {
        let store = ReservationStore::new();
        let created = store.create(input("Alex")).unwrap();
        store
            .update(
                &created.id,
                ReservationUpdate {
                    status: Some(ReservationStatus::Cancelled),
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .update(
                &created.id,
                ReservationUpdate {
                    status: Some(ReservationStatus::Confirmed),
                    ..Default::default()
                },
            )
            .unwrap();
        let cancelled = store.cancel(&created.id).unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_cancel_not_found() {
        let store = ReservationStore::new();
        assert!(matches!(store.cancel("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_cancelled_reservations_stay_listed() {
        let store = ReservationStore::new();
        let a = store.create(input("A")).unwrap();
        store.create(input("B")).unwrap();
        store.cancel(&a.id).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_list_oldest_first() {
        let store = ReservationStore::new();
        for name in ["A", "B", "C"] {
            store.create(input(name)).unwrap();
        }
        let all = store.list().unwrap();
        for pair in all.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn test_default_impl() {
        let store = ReservationStore::default();
        assert!(store.list().unwrap().is_empty());
        assert!(store.is_empty());
    }
}
