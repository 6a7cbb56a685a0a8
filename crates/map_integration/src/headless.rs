//! In-memory map used by terminal hosts and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{LatLng, MarkerId, Viewport},
    error::MapError,
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{validate_tile_template, MapEvent, MapProvider, MapView, TileLayerOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub id: MarkerId,
    pub position: LatLng,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessMapSnapshot {
    pub views_created: usize,
    pub viewport: Option<Viewport>,
    pub tile_layers: Vec<(String, TileLayerOptions)>,
    pub markers: Vec<HeadlessMarker>,
    pub layout_refreshes: usize,
}

struct Shared {
    state: Mutex<HeadlessMapSnapshot>,
    events: broadcast::Sender<MapEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HeadlessMapSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Inspection and input side of a [`HeadlessMapProvider`].
#[derive(Clone)]
pub struct HeadlessMapHandle {
    shared: Arc<Shared>,
}

impl HeadlessMapHandle {
    pub fn snapshot(&self) -> HeadlessMapSnapshot {
        self.shared.lock().clone()
    }

    /// Simulates a user click on the map surface.
    pub fn click(&self, at: LatLng) {
        let _ = self.shared.events.send(MapEvent::Clicked(at));
    }
}

#[derive(Clone)]
pub struct HeadlessMapProvider {
    shared: Arc<Shared>,
}

impl HeadlessMapProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(HeadlessMapSnapshot::default()),
                events,
            }),
        }
    }

    pub fn handle(&self) -> HeadlessMapHandle {
        HeadlessMapHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for HeadlessMapProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MapProvider for HeadlessMapProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn create_view(&self, center: LatLng, zoom: u8) -> Result<Box<dyn MapView>, MapError> {
        let mut state = self.shared.lock();
        state.views_created += 1;
        state.viewport = Some(Viewport { center, zoom });
        debug!(lat = center.lat, lng = center.lng, zoom, "headless map view created");
        Ok(Box::new(HeadlessMapView {
            shared: Arc::clone(&self.shared),
            next_marker: 1,
        }))
    }
}

struct HeadlessMapView {
    shared: Arc<Shared>,
    next_marker: u64,
}

impl MapView for HeadlessMapView {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.shared.lock().viewport = Some(Viewport { center, zoom });
    }

    fn viewport(&self) -> Viewport {
        self.shared.lock().viewport.unwrap_or(Viewport {
            center: LatLng::new(0.0, 0.0),
            zoom: 0,
        })
    }

    fn add_tile_layer(
        &mut self,
        url_template: &str,
        options: &TileLayerOptions,
    ) -> Result<(), MapError> {
        validate_tile_template(url_template)?;
        self.shared
            .lock()
            .tile_layers
            .push((url_template.to_string(), options.clone()));
        Ok(())
    }

    fn add_marker(&mut self, at: LatLng, label: &str) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.shared.lock().markers.push(HeadlessMarker {
            id,
            position: at,
            label: label.to_string(),
        });
        id
    }

    fn move_marker(&mut self, marker: MarkerId, at: LatLng, label: &str) -> Result<(), MapError> {
        let mut state = self.shared.lock();
        let entry = state
            .markers
            .iter_mut()
            .find(|m| m.id == marker)
            .ok_or(MapError::UnknownMarker(marker.0))?;
        entry.position = at;
        entry.label = label.to_string();
        Ok(())
    }

    fn invalidate_layout(&mut self) {
        self.shared.lock().layout_refreshes += 1;
    }

    fn subscribe_events(&self) -> broadcast::Receiver<MapEvent> {
        self.shared.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_view_markers_and_refreshes() {
        let provider = HeadlessMapProvider::new();
        let handle = provider.handle();
        let mut view = provider
            .create_view(LatLng::new(-41.2865, 174.7762), 13)
            .expect("view");

        let id = view.add_marker(LatLng::new(-41.2865, 174.7762), "Default Location");
        view.move_marker(id, LatLng::new(-41.3, 174.8), "moved")
            .expect("move");
        view.invalidate_layout();

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.views_created, 1);
        assert_eq!(snapshot.markers.len(), 1);
        assert_eq!(snapshot.markers[0].label, "moved");
        assert_eq!(snapshot.layout_refreshes, 1);
    }

    #[test]
    fn moving_unknown_marker_fails() {
        let provider = HeadlessMapProvider::new();
        let mut view = provider.create_view(LatLng::new(0.0, 0.0), 2).expect("view");
        assert!(matches!(
            view.move_marker(MarkerId(42), LatLng::new(1.0, 1.0), "x"),
            Err(MapError::UnknownMarker(42))
        ));
    }

    #[test]
    fn clicks_reach_view_subscribers() {
        let provider = HeadlessMapProvider::new();
        let view = provider.create_view(LatLng::new(0.0, 0.0), 2).expect("view");
        let mut events = view.subscribe_events();

        provider.handle().click(LatLng::new(1.5, 2.5));

        assert_eq!(
            events.try_recv().expect("event"),
            MapEvent::Clicked(LatLng::new(1.5, 2.5))
        );
    }
}
