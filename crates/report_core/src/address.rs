use std::sync::LazyLock;

use regex::Regex;
use shared::domain::LatLng;

static COORDINATE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?\d+(\.\d+)?)\s*,\s*([+-]?\d+(\.\d+)?)\s*$")
        .expect("coordinate pair pattern compiles")
});

#[derive(Debug, Clone, PartialEq)]
pub enum AddressQuery {
    /// Literal `"lat, lng"` input; resolved without a network lookup.
    Coordinates(LatLng),
    FreeText(String),
}

/// Classifies raw address input. Returns `None` when the trimmed input is empty.
pub fn classify(input: &str) -> Option<AddressQuery> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(match parse_coordinate_pair(trimmed) {
        Some(at) => AddressQuery::Coordinates(at),
        None => AddressQuery::FreeText(trimmed.to_string()),
    })
}

/// Accepts `number , number` where each number is an optionally signed
/// decimal with digits on both sides of any point.
pub fn parse_coordinate_pair(input: &str) -> Option<LatLng> {
    let captures = COORDINATE_PAIR.captures(input)?;
    let lat = captures.get(1)?.as_str().parse().ok()?;
    let lng = captures.get(3)?.as_str().parse().ok()?;
    Some(LatLng::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_input_is_rejected() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t"), None);
    }

    #[test]
    fn signed_decimal_pair_is_coordinates() {
        assert_eq!(
            classify("  -41.2865 ,  +174.7762 "),
            Some(AddressQuery::Coordinates(LatLng::new(-41.2865, 174.7762)))
        );
        assert_eq!(
            classify("10,20"),
            Some(AddressQuery::Coordinates(LatLng::new(10.0, 20.0)))
        );
    }

    #[test]
    fn coordinate_pair_parses_directly() {
        assert_eq!(
            parse_coordinate_pair("-0, 5"),
            Some(LatLng::new(-0.0, 5.0))
        );
        assert_eq!(parse_coordinate_pair("Cuba Street, Wellington"), None);
    }

    #[test]
    fn near_miss_patterns_are_free_text() {
        for input in [
            "-41., 174.7",
            ".5, 1",
            "1, 2, 3",
            "1e3, 4",
            "12 Cuba Street, Wellington",
            "--1, 2",
        ] {
            assert_eq!(
                classify(input),
                Some(AddressQuery::FreeText(input.trim().to_string())),
                "{input}"
            );
        }
    }
}
