use std::time::Duration;

use map_integration::{MapEvent, MapView};
use shared::domain::{LatLng, MarkerId, Viewport};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStage {
    Absent,
    /// View exists but its tile layer and default marker are not attached yet.
    Created,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAction {
    Create,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScheduledMapAction {
    pub action: MapAction,
    pub delay: Duration,
}

/// A created view plus the single marker the controller owns on it.
pub(crate) struct MapSession {
    pub view: Box<dyn MapView>,
    marker: Option<MarkerId>,
    events: broadcast::Receiver<MapEvent>,
}

impl MapSession {
    pub fn new(view: Box<dyn MapView>) -> Self {
        let events = view.subscribe_events();
        Self {
            view,
            marker: None,
            events,
        }
    }

    /// Moves the marker, adding it only when none exists yet.
    pub fn place_marker(&mut self, at: LatLng, label: &str) {
        if let Some(id) = self.marker {
            match self.view.move_marker(id, at, label) {
                Ok(()) => return,
                Err(err) => warn!(
                    marker = id.0,
                    error = %err,
                    category = ?err.category(),
                    "marker lost by map view; re-adding"
                ),
            }
        }
        self.marker = Some(self.view.add_marker(at, label));
    }

    pub fn set_viewport(&mut self, at: LatLng, zoom: u8, label: &str) -> Viewport {
        self.view.set_view(at, zoom);
        self.place_marker(at, label);
        self.view.viewport()
    }

    pub fn refresh_layout(&mut self) {
        self.view.invalidate_layout();
    }

    pub fn next_click(&mut self) -> Option<LatLng> {
        loop {
            match self.events.try_recv() {
                Ok(MapEvent::Clicked(at)) => return Some(at),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "map click intake lagged; older clicks dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Default)]
pub(crate) enum MapLifecycle {
    #[default]
    Absent,
    Created(MapSession),
    Active(MapSession),
}

impl MapLifecycle {
    pub fn stage(&self) -> MapStage {
        match self {
            Self::Absent => MapStage::Absent,
            Self::Created(_) => MapStage::Created,
            Self::Active(_) => MapStage::Active,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut MapSession> {
        match self {
            Self::Absent => None,
            Self::Created(session) | Self::Active(session) => Some(session),
        }
    }

    pub fn session(&self) -> Option<&MapSession> {
        match self {
            Self::Absent => None,
            Self::Created(session) | Self::Active(session) => Some(session),
        }
    }
}
