use serde::{Deserialize, Serialize};
use shared::{
    domain::{LatLng, MarkerId, Viewport},
    error::MapError,
};
use tokio::sync::broadcast;

mod headless;
pub use headless::{HeadlessMapHandle, HeadlessMapProvider, HeadlessMapSnapshot, HeadlessMarker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayerOptions {
    pub max_zoom: u8,
    pub attribution: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Clicked(LatLng),
}

/// A live, pannable map view. Marker labels are shown as an open popup.
pub trait MapView: Send {
    fn set_view(&mut self, center: LatLng, zoom: u8);
    fn viewport(&self) -> Viewport;
    fn add_tile_layer(
        &mut self,
        url_template: &str,
        options: &TileLayerOptions,
    ) -> Result<(), MapError>;
    fn add_marker(&mut self, at: LatLng, label: &str) -> MarkerId;
    fn move_marker(&mut self, marker: MarkerId, at: LatLng, label: &str) -> Result<(), MapError>;
    /// Recompute the view size after its container changed visibility.
    fn invalidate_layout(&mut self);
    fn subscribe_events(&self) -> broadcast::Receiver<MapEvent>;
}

pub trait MapProvider: Send + Sync {
    fn is_available(&self) -> bool;
    fn create_view(&self, center: LatLng, zoom: u8) -> Result<Box<dyn MapView>, MapError>;
}

pub struct MissingMapProvider;

impl MapProvider for MissingMapProvider {
    fn is_available(&self) -> bool {
        false
    }

    fn create_view(&self, _center: LatLng, _zoom: u8) -> Result<Box<dyn MapView>, MapError> {
        Err(MapError::Unavailable)
    }
}

/// Checks that a slippy-map URL template carries the `{z}/{x}/{y}` placeholders.
pub fn validate_tile_template(url_template: &str) -> Result<(), MapError> {
    let missing: Vec<&str> = ["{z}", "{x}", "{y}"]
        .into_iter()
        .filter(|placeholder| !url_template.contains(placeholder))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MapError::InvalidTileTemplate {
            template: url_template.to_string(),
            reason: format!("missing {}", missing.join(", ")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_openstreetmap_template() {
        assert!(validate_tile_template("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png").is_ok());
    }

    #[test]
    fn rejects_template_without_coordinates() {
        let err = validate_tile_template("https://tiles.example/{z}.png").expect_err("invalid");
        assert!(err.to_string().contains("{x}, {y}"));
    }

    #[test]
    fn missing_provider_reports_unavailable() {
        let provider = MissingMapProvider;
        assert!(!provider.is_available());
        assert!(matches!(
            provider.create_view(LatLng::new(0.0, 0.0), 3),
            Err(MapError::Unavailable)
        ));
    }
}
