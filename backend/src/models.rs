use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Device keys that every greenhouse starts with. They sort first in the
/// canonical display order and cannot be removed through the API.
pub const DEFAULT_DEVICE_KEYS: [&str; 5] =
    ["fan", "circulation_fan", "mist", "dehumidifier", "heater"];

const DEFAULT_DEVICE_LABELS: [&str; 5] =
    ["Exhaust Fan", "Circulation Fan", "Mist", "Dehumidifier", "Heater"];

/// Last-known telemetry snapshot. Written by the external telemetry source,
/// never by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    pub temp: f64,
    pub root_temp: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub vpd: f64,
    pub co2: f64,
    pub is_day: bool,
    pub wet_bulb_temp: f64,
}

impl Default for SensorData {
    fn default() -> Self {
        Self {
            temp: 25.0,
            root_temp: 22.0,
            humidity: 60.0,
            dew_point: 15.6,
            vpd: 1.17,
            co2: 400.0,
            is_day: true,
            wet_bulb_temp: 19.5,
        }
    }
}

/// Temperature / dry-wet bulb differential bounds for one part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_diff_min: f64,
    pub temp_diff_max: f64,
}

/// The saved threshold pair consulted by automatic control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpertSettings {
    pub day: Setpoint,
    pub night: Setpoint,
}

impl Default for ExpertSettings {
    fn default() -> Self {
        Self {
            day: Setpoint {
                temp_min: 18.0,
                temp_max: 23.0,
                temp_diff_min: 3.0,
                temp_diff_max: 5.0,
            },
            night: Setpoint {
                temp_min: 5.0,
                temp_max: 8.0,
                temp_diff_min: 3.0,
                temp_diff_max: 5.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMode {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoSubType {
    Stable,
    MlOptimization,
}

/// A pre-sunrise heating directive: bring the greenhouse to `target_temp`
/// starting `time_before_sunrise` hours (1-3) before sunrise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JojoGaonRule {
    pub id: String,
    pub time_before_sunrise: u8,
    pub target_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub active_mode: ActiveMode,
    /// Device key -> ON/OFF. Keys absent from the map are treated as OFF.
    pub manual_settings: BTreeMap<String, bool>,
    pub use_expert_settings: bool,
    pub auto_sub_type: AutoSubType,
    pub jojo_gaon_rules: Vec<JojoGaonRule>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            active_mode: ActiveMode::Manual,
            manual_settings: DEFAULT_DEVICE_KEYS
                .iter()
                .map(|key| (key.to_string(), false))
                .collect(),
            use_expert_settings: false,
            auto_sub_type: AutoSubType::Stable,
            jojo_gaon_rules: Vec::new(),
        }
    }
}

/// The root aggregate. One document per greenhouse in the entity store; every
/// mutation replaces the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Greenhouse {
    /// Assigned by the store on creation, immutable afterwards.
    #[serde(default)]
    pub id: String,
    /// Monotonic version token, incremented by the store on every update.
    /// Updates carrying a stale base version are rejected.
    #[serde(default)]
    pub version: i64,
    pub name: String,
    pub planting_date: NaiveDate,
    pub sensor_data: SensorData,
    pub control_state: ControlState,
    /// Device key -> human-readable label.
    pub devices: BTreeMap<String, String>,
    pub expert_settings: ExpertSettings,
    /// Candidate setpoint pair produced by the prediction adapter, not yet
    /// promoted to `expert_settings`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_settings: Option<ExpertSettings>,
}

impl Greenhouse {
    /// A fresh greenhouse with the hard-coded creation defaults. The store
    /// assigns `id` and `version` on creation.
    pub fn with_defaults(name: &str) -> Self {
        Self {
            id: String::new(),
            version: 0,
            name: name.to_string(),
            planting_date: Utc::now().date_naive(),
            sensor_data: SensorData::default(),
            control_state: ControlState::default(),
            devices: DEFAULT_DEVICE_KEYS
                .iter()
                .zip(DEFAULT_DEVICE_LABELS.iter())
                .map(|(key, label)| (key.to_string(), label.to_string()))
                .collect(),
            expert_settings: ExpertSettings::default(),
            predicted_settings: None,
        }
    }
}
