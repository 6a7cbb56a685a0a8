use std::{collections::HashMap, fs, path::Path, str::FromStr, time::Duration};

use anyhow::Context;
use map_integration::TileLayerOptions;
use shared::domain::LatLng;
use tracing::warn;

pub const SETTINGS_FILE: &str = "kiosk.toml";
const ENV_PREFIX: &str = "APP__";

const KEYS: &[&str] = &[
    "geocoder_url",
    "user_agent",
    "tile_url",
    "tile_attribution",
    "tile_max_zoom",
    "default_lat",
    "default_lon",
    "default_zoom",
    "located_zoom",
    "default_marker_label",
    "map_init_delay_ms",
    "map_refresh_delay_ms",
    "step_count",
    "location_step",
    "confirmation_step",
];

/// Positions of the steps the controller treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLayout {
    pub step_count: usize,
    pub location_step: usize,
    pub confirmation_step: usize,
}

impl StepLayout {
    pub fn is_valid(&self) -> bool {
        self.step_count > 0
            && self.location_step < self.step_count
            && self.confirmation_step < self.step_count
    }

    pub fn last_step(&self) -> usize {
        self.step_count.saturating_sub(1)
    }
}

impl Default for StepLayout {
    fn default() -> Self {
        // home, issue type, details, location, contact, confirmation
        Self {
            step_count: 6,
            location_step: 3,
            confirmation_step: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub default_center: LatLng,
    pub default_zoom: u8,
    pub located_zoom: u8,
    pub default_marker_label: String,
    pub tile_url: String,
    pub tile_options: TileLayerOptions,
    /// Wait before first creating the view so its container has become visible.
    pub init_delay: Duration,
    /// Wait before re-measuring an existing view on re-entry.
    pub refresh_delay: Duration,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: LatLng::new(-41.2865, 174.7762),
            default_zoom: 13,
            located_zoom: 16,
            default_marker_label: "Default Location".into(),
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            tile_options: TileLayerOptions {
                max_zoom: 19,
                attribution: "© OpenStreetMap".into(),
            },
            init_delay: Duration::from_millis(60),
            refresh_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardSettings {
    pub layout: StepLayout,
    pub map: MapSettings,
    pub geocoder_url: String,
    pub user_agent: String,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            layout: StepLayout::default(),
            map: MapSettings::default(),
            geocoder_url: "https://nominatim.openstreetmap.org/".into(),
            user_agent: concat!("citizen-report-kiosk/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl WizardSettings {
    pub(crate) fn normalized(mut self) -> Self {
        if !self.layout.is_valid() {
            warn!(
                step_count = self.layout.step_count,
                location_step = self.layout.location_step,
                confirmation_step = self.layout.confirmation_step,
                "invalid step layout; falling back to defaults"
            );
            self.layout = StepLayout::default();
        }
        self
    }
}

/// Defaults, then `kiosk.toml` in the working directory if present, then
/// `APP__*` environment variables.
pub fn load_settings() -> WizardSettings {
    let mut settings = WizardSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        match parse_file_values(&raw) {
            Ok(values) => apply_values(&mut settings, &values),
            Err(err) => warn!(file = SETTINGS_FILE, error = %err, "ignoring unreadable settings file"),
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.normalized()
}

/// Like [`load_settings`] but with an explicit file that must exist and parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<WizardSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let values = parse_file_values(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

    let mut settings = WizardSettings::default();
    apply_values(&mut settings, &values);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings.normalized())
}

pub fn apply_env_overrides(settings: &mut WizardSettings, lookup: impl Fn(&str) -> Option<String>) {
    for key in KEYS {
        let env_key = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        if let Some(value) = lookup(&env_key) {
            apply_value(settings, key, &value);
        }
    }
}

fn parse_file_values(raw: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table: toml::Table = toml::from_str(raw)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

fn apply_values(settings: &mut WizardSettings, values: &HashMap<String, String>) {
    for key in KEYS {
        if let Some(value) = values.get(*key) {
            apply_value(settings, key, value);
        }
    }
}

fn apply_value(settings: &mut WizardSettings, key: &str, value: &str) {
    let map = &mut settings.map;
    match key {
        "geocoder_url" => settings.geocoder_url = value.to_string(),
        "user_agent" => settings.user_agent = value.to_string(),
        "tile_url" => map.tile_url = value.to_string(),
        "tile_attribution" => map.tile_options.attribution = value.to_string(),
        "default_marker_label" => map.default_marker_label = value.to_string(),
        "tile_max_zoom" => set_parsed(&mut map.tile_options.max_zoom, key, value),
        "default_lat" => set_parsed(&mut map.default_center.lat, key, value),
        "default_lon" => set_parsed(&mut map.default_center.lng, key, value),
        "default_zoom" => set_parsed(&mut map.default_zoom, key, value),
        "located_zoom" => set_parsed(&mut map.located_zoom, key, value),
        "map_init_delay_ms" => set_millis(&mut map.init_delay, key, value),
        "map_refresh_delay_ms" => set_millis(&mut map.refresh_delay, key, value),
        "step_count" => set_parsed(&mut settings.layout.step_count, key, value),
        "location_step" => set_parsed(&mut settings.layout.location_step, key, value),
        "confirmation_step" => set_parsed(&mut settings.layout.confirmation_step, key, value),
        _ => {}
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(key, value, "ignoring unparseable setting"),
    }
}

fn set_millis(slot: &mut Duration, key: &str, value: &str) {
    let mut millis = slot.as_millis() as u64;
    set_parsed(&mut millis, key, value);
    *slot = Duration::from_millis(millis);
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
