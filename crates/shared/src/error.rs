use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    MapUnavailable,
    Validation,
    NotFound,
    Transport,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("mapping library not loaded")]
    Unavailable,
    #[error("unknown marker {0}")]
    UnknownMarker(u64),
    #[error("invalid tile url template '{template}': {reason}")]
    InvalidTileTemplate { template: String, reason: String },
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unavailable => ErrorCategory::MapUnavailable,
            Self::UnknownMarker(_) | Self::InvalidTileTemplate { .. } => {
                ErrorCategory::Validation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_errors_fall_into_expected_categories() {
        assert_eq!(MapError::Unavailable.category(), ErrorCategory::MapUnavailable);
        assert_eq!(MapError::UnknownMarker(7).category(), ErrorCategory::Validation);
        let bad_template = MapError::InvalidTileTemplate {
            template: "https://tiles".into(),
            reason: "missing {z}".into(),
        };
        assert_eq!(bad_template.category(), ErrorCategory::Validation);
    }
}
