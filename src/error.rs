use std::path::PathBuf;
use thiserror::Error;

// Error types for feed scanning and reporting
#[derive(Error, Debug)]
pub enum FareError {
    #[error("Feed parse error in {}: {reason}", path.display())]
    FeedParse { path: PathBuf, reason: String },

    #[error("Invalid {field} value {value:?}: {reason}")]
    FieldFormat {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No matching flights")]
    EmptySelection,

    #[error("Itinerary has no flight legs")]
    InvalidRouteRecord,

    #[error("Output error: {0}")]
    Output(String),
}

impl FareError {
    pub(crate) fn field_format(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        FareError::FieldFormat {
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error. Code 2 is left to clap for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            FareError::Output(_) => 1,
            FareError::FeedParse { .. } => 3,
            FareError::FieldFormat { .. } => 4,
            FareError::EmptySelection => 5,
            // Never escapes the scanner, which skips leg-less itineraries.
            FareError::InvalidRouteRecord => 4,
        }
    }
}

impl From<serde_json::Error> for FareError {
    fn from(e: serde_json::Error) -> Self {
        FareError::Output(e.to_string())
    }
}

impl From<std::io::Error> for FareError {
    fn from(e: std::io::Error) -> Self {
        FareError::Output(e.to_string())
    }
}
