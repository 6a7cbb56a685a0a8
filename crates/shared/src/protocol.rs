//! Wire types for the Nominatim `/search?format=json` contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::LatLng;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeocodeQuery {
    pub format: String,
    pub q: String,
}

impl GeocodeQuery {
    pub fn json(q: impl Into<String>) -> Self {
        Self {
            format: "json".to_string(),
            q: q.into(),
        }
    }
}

/// Nominatim sends coordinates as strings; some mirrors send numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CoordinateText {
    Number(f64),
    Text(String),
}

impl CoordinateText {
    fn parse(&self, field: &'static str) -> Result<f64, InvalidCoordinate> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(raw) => raw.trim().parse::<f64>().map_err(|_| InvalidCoordinate {
                field,
                value: raw.clone(),
            })?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(InvalidCoordinate {
                field,
                value: value.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {field} '{value}' in geocoding result")]
pub struct InvalidCoordinate {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodePlace {
    pub lat: CoordinateText,
    pub lon: CoordinateText,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl GeocodePlace {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>, display_name: Option<&str>) -> Self {
        Self {
            lat: CoordinateText::Text(lat.into()),
            lon: CoordinateText::Text(lon.into()),
            display_name: display_name.map(str::to_string),
        }
    }

    pub fn position(&self) -> Result<LatLng, InvalidCoordinate> {
        Ok(LatLng::new(self.lat.parse("lat")?, self.lon.parse("lon")?))
    }

    /// Human-readable name, ignoring blank values.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_coordinates_from_nominatim_payload() {
        let places: Vec<GeocodePlace> = serde_json::from_str(
            r#"[{"place_id":1,"lat":"-41.29","lon":"174.78","display_name":"Wellington, NZ"}]"#,
        )
        .expect("decode");

        assert_eq!(places[0].position().expect("position"), LatLng::new(-41.29, 174.78));
        assert_eq!(places[0].label(), Some("Wellington, NZ"));
    }

    #[test]
    fn accepts_numeric_coordinates_and_missing_name() {
        let places: Vec<GeocodePlace> =
            serde_json::from_str(r#"[{"lat":51.5,"lon":-0.12}]"#).expect("decode");

        assert_eq!(places[0].position().expect("position"), LatLng::new(51.5, -0.12));
        assert_eq!(places[0].label(), None);
    }

    #[test]
    fn rejects_non_numeric_latitude() {
        let place = GeocodePlace::new("north", "174.78", None);
        let err = place.position().expect_err("should fail");
        assert_eq!(err.field, "lat");
        assert_eq!(err.value, "north");
    }
}
