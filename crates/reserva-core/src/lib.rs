pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::ReservaConfig;
pub use error::{ReservaError, Result, ValidationError};
pub use types::*;
