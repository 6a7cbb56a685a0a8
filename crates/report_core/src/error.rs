use shared::{error::ErrorCategory, protocol::InvalidCoordinate};
use thiserror::Error;

pub const ALERT_EMPTY_ADDRESS: &str = "Please enter an address or coordinates.";
pub const ALERT_ADDRESS_NOT_FOUND: &str = "Address not found. Try a different query.";
pub const ALERT_GEOCODING_FAILED: &str = "Error finding address. See console for details.";
pub const ALERT_MISSING_CONTACT: &str = "Please fill name and email.";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding service unavailable")]
    Unavailable,
    #[error("invalid geocoder base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed geocoding response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
}

/// Failures surfaced by wizard operations. By the time one is returned the
/// user has already been alerted where an alert applies, and the visible step
/// is unchanged.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("mapping library not loaded")]
    MapUnavailable,
    #[error("address input is empty")]
    EmptyAddress,
    #[error("name and email are both required")]
    MissingContactDetails,
    #[error("no geocoding match for '{query}'")]
    AddressNotFound { query: String },
    #[error(transparent)]
    Geocoding(#[from] GeocodeError),
    #[error("step {index} is outside the {len}-step sequence")]
    StepOutOfRange { index: usize, len: usize },
}

impl WizardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MapUnavailable => ErrorCategory::MapUnavailable,
            Self::EmptyAddress | Self::MissingContactDetails | Self::StepOutOfRange { .. } => {
                ErrorCategory::Validation
            }
            Self::AddressNotFound { .. } => ErrorCategory::NotFound,
            Self::Geocoding(_) => ErrorCategory::Transport,
        }
    }

    /// Text shown to the user, if this failure is user-visible at all.
    pub fn alert_message(&self) -> Option<&'static str> {
        match self {
            Self::EmptyAddress => Some(ALERT_EMPTY_ADDRESS),
            Self::MissingContactDetails => Some(ALERT_MISSING_CONTACT),
            Self::AddressNotFound { .. } => Some(ALERT_ADDRESS_NOT_FOUND),
            Self::Geocoding(_) => Some(ALERT_GEOCODING_FAILED),
            Self::MapUnavailable | Self::StepOutOfRange { .. } => None,
        }
    }
}
