use std::sync::Arc;

use map_integration::MapProvider;
use shared::{
    domain::{LatLng, ReportRecord, SubmissionOutcome, Viewport},
    error::ErrorCategory,
};
use tracing::{debug, error, info, warn};

pub mod address;
pub mod config;
pub mod error;
pub mod geocoder;
mod map_session;
pub mod page;
pub mod reference;

use address::AddressQuery;
use config::WizardSettings;
use error::{GeocodeError, WizardError};
use geocoder::Geocoder;
use map_session::{MapLifecycle, MapSession, ScheduledMapAction};
pub use map_session::{MapAction, MapStage};
use page::PageDisplay;
use reference::generate_reference_code;

/// Per-session wizard state. Lives as long as its controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardSession {
    pub current_step: usize,
    /// Empty until an issue type is chosen.
    pub selected_issue_type: String,
    pub shares_contact_details: bool,
}

/// Drives the multi-step report form: step visibility, the lazily created
/// location map, address resolution and the two submission branches.
pub struct WizardController {
    settings: WizardSettings,
    session: WizardSession,
    page: Box<dyn PageDisplay>,
    maps: Arc<dyn MapProvider>,
    geocoder: Arc<dyn Geocoder>,
    map: MapLifecycle,
    pending_map_action: Option<ScheduledMapAction>,
}

impl WizardController {
    pub fn new(
        settings: WizardSettings,
        page: Box<dyn PageDisplay>,
        maps: Arc<dyn MapProvider>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let mut controller = Self {
            settings: settings.normalized(),
            session: WizardSession::default(),
            page,
            maps,
            geocoder,
            map: MapLifecycle::Absent,
            pending_map_action: None,
        };
        controller.display(0);
        controller
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub fn current_step(&self) -> usize {
        self.session.current_step
    }

    pub fn map_stage(&self) -> MapStage {
        self.map.stage()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.map.session().map(|session| session.view.viewport())
    }

    pub fn pending_map_action(&self) -> Option<MapAction> {
        self.pending_map_action.map(|scheduled| scheduled.action)
    }

    // ---- step navigation ----

    /// Moves one step forward. Returns `false` at the last step.
    pub fn advance(&mut self) -> bool {
        if self.session.current_step >= self.settings.layout.last_step() {
            return false;
        }
        self.session.current_step += 1;
        self.display(self.session.current_step);
        true
    }

    /// Moves one step back. Returns `false` at the first step.
    pub fn retreat(&mut self) -> bool {
        if self.session.current_step == 0 {
            return false;
        }
        self.session.current_step -= 1;
        self.display(self.session.current_step);
        true
    }

    pub fn jump_to(&mut self, step: usize) -> Result<(), WizardError> {
        let len = self.settings.layout.step_count;
        if step >= len {
            return Err(self.fail(WizardError::StepOutOfRange { index: step, len }));
        }
        self.session.current_step = step;
        self.display(step);
        Ok(())
    }

    pub fn select_issue_type(&mut self, issue_type: impl Into<String>) {
        self.session.selected_issue_type = issue_type.into();
        info!(issue_type = %self.session.selected_issue_type, "issue type selected");
        self.advance();
    }

    fn display(&mut self, index: usize) {
        self.page.show_step(index);
        debug!(step = index, "step shown");
        if index == self.settings.layout.location_step {
            self.schedule_map_action();
        }
    }

    // ---- map lifecycle ----

    fn schedule_map_action(&mut self) {
        let map = &self.settings.map;
        let scheduled = if self.map.stage() == MapStage::Active {
            ScheduledMapAction {
                action: MapAction::Refresh,
                delay: map.refresh_delay,
            }
        } else {
            ScheduledMapAction {
                action: MapAction::Create,
                delay: map.init_delay,
            }
        };
        debug!(action = ?scheduled.action, delay_ms = scheduled.delay.as_millis() as u64, "map action scheduled");
        self.pending_map_action = Some(scheduled);
    }

    /// Host signal that the location container is now laid out; runs the
    /// pending map action without waiting for its delay.
    pub fn container_visible(&mut self) {
        if let Some(scheduled) = self.pending_map_action.take() {
            self.run_map_action(scheduled.action);
        }
    }

    /// Waits out the pending action's delay, then runs it.
    pub async fn settle_map(&mut self) {
        if let Some(scheduled) = self.pending_map_action.take() {
            tokio::time::sleep(scheduled.delay).await;
            self.run_map_action(scheduled.action);
        }
    }

    fn run_map_action(&mut self, action: MapAction) {
        match action {
            MapAction::Create => self.initialize_map(),
            MapAction::Refresh => self.refresh_map_layout(),
        }
    }

    /// Creates the map on first use. Repeated calls only refresh the layout.
    pub fn initialize_map(&mut self) {
        if !self.maps.is_available() {
            error!("mapping library not loaded; map initialization skipped");
            return;
        }

        self.map = match std::mem::take(&mut self.map) {
            MapLifecycle::Active(mut session) => {
                session.refresh_layout();
                MapLifecycle::Active(session)
            }
            MapLifecycle::Created(session) => self.activate(session),
            MapLifecycle::Absent => {
                let map = &self.settings.map;
                match self.maps.create_view(map.default_center, map.default_zoom) {
                    Ok(view) => {
                        info!(
                            lat = map.default_center.lat,
                            lng = map.default_center.lng,
                            zoom = map.default_zoom,
                            "map view created"
                        );
                        self.activate(MapSession::new(view))
                    }
                    Err(err) => {
                        error!(
                            error = %err,
                            category = ?err.category(),
                            "failed to create map view"
                        );
                        MapLifecycle::Absent
                    }
                }
            }
        };
    }

    fn activate(&self, mut session: MapSession) -> MapLifecycle {
        let map = &self.settings.map;
        if let Err(err) = session.view.add_tile_layer(&map.tile_url, &map.tile_options) {
            error!(
                error = %err,
                category = ?err.category(),
                tile_url = %map.tile_url,
                "failed to attach tile layer"
            );
            return MapLifecycle::Created(session);
        }
        session.place_marker(map.default_center, &map.default_marker_label);
        MapLifecycle::Active(session)
    }

    pub fn refresh_map_layout(&mut self) {
        match self.map.session_mut() {
            Some(session) => session.refresh_layout(),
            None => debug!("no map view to refresh"),
        }
    }

    /// Makes sure a map exists before a resolved location is applied,
    /// bringing the location step into view if it has never been shown.
    /// On failure the previously visible step is restored.
    fn ensure_map(&mut self) -> Result<(), WizardError> {
        if self.map.stage() != MapStage::Absent {
            return Ok(());
        }
        if !self.maps.is_available() {
            return Err(self.fail(WizardError::MapUnavailable));
        }

        let previous = self.session.current_step;
        let location = self.settings.layout.location_step;
        self.session.current_step = location;
        self.display(location);
        self.container_visible();

        if self.map.stage() == MapStage::Absent {
            self.session.current_step = previous;
            self.display(previous);
            return Err(self.fail(WizardError::MapUnavailable));
        }
        Ok(())
    }

    pub fn set_viewport(
        &mut self,
        at: LatLng,
        zoom: u8,
        label: &str,
    ) -> Result<Viewport, WizardError> {
        let Some(session) = self.map.session_mut() else {
            return Err(self.fail(WizardError::MapUnavailable));
        };
        let viewport = session.set_viewport(at, zoom, label);
        info!(lat = at.lat, lng = at.lng, zoom, label, "viewport updated");
        Ok(viewport)
    }

    pub fn on_map_clicked(&mut self, at: LatLng) {
        let Some(session) = self.map.session_mut() else {
            warn!(lat = at.lat, lng = at.lng, "map click ignored; no map view");
            return;
        };
        let rounded = at.rounded_pair();
        session.place_marker(at, &format!("Selected: {rounded}"));
        self.page.set_address_input(&rounded);
        debug!(location = %rounded, "location picked on map");
    }

    /// Applies every click queued by the map view since the last call.
    pub fn pump_map_clicks(&mut self) -> usize {
        let mut applied = 0;
        while let Some(at) = self.map.session_mut().and_then(|session| session.next_click()) {
            self.on_map_clicked(at);
            applied += 1;
        }
        applied
    }

    // ---- address resolution ----

    pub async fn resolve_address(&mut self, input: &str) -> Result<Viewport, WizardError> {
        let Some(query) = address::classify(input) else {
            return Err(self.fail(WizardError::EmptyAddress));
        };
        let zoom = self.settings.map.located_zoom;

        match query {
            AddressQuery::Coordinates(at) => {
                debug!(lat = at.lat, lng = at.lng, "literal coordinates; skipping geocoder");
                self.ensure_map()?;
                self.set_viewport(at, zoom, &format!("Coordinates: {at}"))
            }
            AddressQuery::FreeText(text) => {
                let places = match self.geocoder.search(&text).await {
                    Ok(places) => places,
                    Err(err) => return Err(self.fail(err.into())),
                };
                let Some(first) = places.first() else {
                    return Err(self.fail(WizardError::AddressNotFound { query: text }));
                };
                let at = match first.position() {
                    Ok(at) => at,
                    Err(err) => return Err(self.fail(GeocodeError::from(err).into())),
                };
                let label = first.label().unwrap_or(&text).to_string();
                self.ensure_map()?;
                self.set_viewport(at, zoom, &label)
            }
        }
    }

    // ---- submission ----

    pub fn submit_anonymously(&mut self) -> SubmissionOutcome {
        self.session.shares_contact_details = false;
        self.show_confirmation();
        self.page.set_reference_visible(false);
        info!(issue_type = %self.session.selected_issue_type, "anonymous report submitted");
        SubmissionOutcome {
            record: self.record(None, None),
            reference: None,
        }
    }

    pub fn offer_to_share_details(&mut self) {
        self.session.shares_contact_details = true;
        self.page.set_contact_form_visible(true);
    }

    pub fn submit_report(
        &mut self,
        name: &str,
        email: &str,
    ) -> Result<SubmissionOutcome, WizardError> {
        if name.is_empty() || email.is_empty() {
            return Err(self.fail(WizardError::MissingContactDetails));
        }

        self.show_confirmation();
        let reference = if self.session.shares_contact_details {
            let code = generate_reference_code();
            self.page.set_reference_code(code.as_str());
            self.page.set_reference_visible(true);
            Some(code)
        } else {
            self.page.set_reference_visible(false);
            None
        };

        info!(
            issue_type = %self.session.selected_issue_type,
            shared = self.session.shares_contact_details,
            reference = reference.as_ref().map(|code| code.as_str()),
            "report submitted"
        );
        Ok(SubmissionOutcome {
            record: self.record(Some(name), Some(email)),
            reference,
        })
    }

    fn show_confirmation(&mut self) {
        let step = self.settings.layout.confirmation_step;
        self.session.current_step = step;
        self.display(step);
    }

    fn record(&self, name: Option<&str>, email: Option<&str>) -> ReportRecord {
        let issue_type = &self.session.selected_issue_type;
        ReportRecord {
            issue_type: (!issue_type.is_empty()).then(|| issue_type.clone()),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            is_anonymous: !self.session.shares_contact_details,
        }
    }

    fn fail(&mut self, err: WizardError) -> WizardError {
        match err.category() {
            ErrorCategory::Transport | ErrorCategory::MapUnavailable => {
                error!(error = %err, "wizard action failed");
            }
            ErrorCategory::Validation | ErrorCategory::NotFound => {
                warn!(error = %err, "wizard action rejected");
            }
        }
        if let Some(message) = err.alert_message() {
            self.page.alert(message);
        }
        err
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
