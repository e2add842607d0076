//! Error types
//!
//! Validation failures are always shown to the user. Initialization failures
//! are logged and leave the affected wheel inert.

/// Filter or selection precondition violated
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No sinner is enabled in the filters
    #[error("Select at least one sinner")]
    NoSinnersEnabled,

    /// These enabled sinners have every persona disabled
    #[error("Select at least one persona for: {}", .0.join(", "))]
    SinnersWithoutPersonas(Vec<String>),

    /// A spin was requested on an empty collection
    #[error("Nothing to select")]
    NothingToSelect,

    /// A persona spin was requested before a sinner was chosen
    #[error("Select a sinner first")]
    NoSinnerSelected,
}

/// Required DOM element missing at startup
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("Missing element #{0}")]
    MissingElement(&'static str),
}

/// Static catalog could not be loaded
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate sinner id {0}")]
    DuplicateId(u32),
}

/// Personal ranking record rejected
#[derive(thiserror::Error, Debug)]
pub enum RankingError {
    /// The run has no recorded time yet
    #[error("Finish a timed run before saving")]
    ZeroTime,

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_personas_message_names_every_sinner() {
        let err = ValidationError::SinnersWithoutPersonas(vec!["Faust".into(), "Gregor".into()]);
        assert_eq!(err.to_string(), "Select at least one persona for: Faust, Gregor");
    }

    #[test]
    fn test_init_error_names_element() {
        let err = InitError::MissingElement("sinner-scroll");
        assert_eq!(err.to_string(), "Missing element #sinner-scroll");
    }
}
