//! Reserva storage crate - in-memory reservation records.
//!
//! Records live for the lifetime of the process. The store is constructed
//! once at startup and injected wherever it is needed.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::ReservationStore;
