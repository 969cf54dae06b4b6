use thiserror::Error;

/// Top-level error type for Reserva infrastructure concerns.
///
/// Domain failures live in their own enums ([`ValidationError`] here, plus
/// the store, NLU and chat errors in their crates); this one covers
/// configuration, I/O and serialization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReservaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<toml::de::Error> for ReservaError {
    fn from(err: toml::de::Error) -> Self {
        ReservaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ReservaError {
    fn from(err: toml::ser::Error) -> Self {
        ReservaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ReservaError {
    fn from(err: serde_json::Error) -> Self {
        ReservaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Reserva operations.
pub type Result<T> = std::result::Result<T, ReservaError>;

/// A reservation field that failed validation.
///
/// Display strings are the messages returned to API callers, so they name
/// the expected format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: name, date, time, guests")]
    MissingFields,
    #[error("Name must be between 1 and 100 characters")]
    InvalidName,
    #[error("Invalid date format. Use YYYY-MM-DD (today or later)")]
    InvalidDate,
    #[error("Invalid time format. Use HH:MM 24h (or e.g. 7:30 pm)")]
    InvalidTime,
    #[error("Guests must be between 1 and 20")]
    InvalidGuests,
    #[error("Invalid status. Use 'confirmed' or 'cancelled'")]
    InvalidStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReservaError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = ReservaError::Server("bind failed".to_string());
        assert_eq!(err.to_string(), "Server error: bind failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReservaError = io_err.into();
        assert!(matches!(err, ReservaError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: ReservaError = err.unwrap_err().into();
        assert!(matches!(err, ReservaError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: ReservaError = err.unwrap_err().into();
        assert!(matches!(err, ReservaError::Serialization(_)));
    }

    #[test]
    fn test_validation_messages_name_the_field() {
        assert!(ValidationError::InvalidDate.to_string().contains("YYYY-MM-DD"));
        assert!(ValidationError::InvalidTime.to_string().contains("HH:MM"));
        assert!(ValidationError::InvalidGuests
            .to_string()
            .contains("between 1 and 20"));
        assert!(ValidationError::MissingFields.to_string().contains("guests"));
        assert!(ValidationError::InvalidStatus.to_string().contains("cancelled"));
    }
}
