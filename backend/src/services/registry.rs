use std::cmp::Ordering;

use crate::models::{Greenhouse, DEFAULT_DEVICE_KEYS};
use crate::services::ControlError;

/// A device key is the stable identifier for an actuator, distinct from its
/// display label. Only ASCII letters, digits and underscores are allowed.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Register a new device and seed its manual switch to OFF.
pub fn add_device(
    greenhouse: &mut Greenhouse,
    key: &str,
    label: &str,
) -> Result<(), ControlError> {
    if !is_valid_key(key) {
        return Err(ControlError::InvalidKey(key.to_string()));
    }
    if greenhouse.devices.contains_key(key) {
        return Err(ControlError::DuplicateKey(key.to_string()));
    }

    greenhouse.devices.insert(key.to_string(), label.to_string());
    greenhouse
        .control_state
        .manual_settings
        .insert(key.to_string(), false);
    Ok(())
}

/// Remove a device and its manual switch together. `manual_settings` must
/// never hold a key absent from `devices`.
pub fn remove_device(greenhouse: &mut Greenhouse, key: &str) -> Result<(), ControlError> {
    if greenhouse.devices.remove(key).is_none() {
        return Err(ControlError::NotFound(key.to_string()));
    }
    greenhouse.control_state.manual_settings.remove(key);
    Ok(())
}

/// Flip a device's manual switch. Unknown keys are a silent no-op.
pub fn toggle_device(greenhouse: &mut Greenhouse, key: &str) {
    if !greenhouse.devices.contains_key(key) {
        return;
    }
    let entry = greenhouse
        .control_state
        .manual_settings
        .entry(key.to_string())
        .or_insert(false);
    *entry = !*entry;
}

/// Whether a device's manual switch is ON. Missing entries read as OFF.
pub fn is_on(greenhouse: &Greenhouse, key: &str) -> bool {
    greenhouse
        .control_state
        .manual_settings
        .get(key)
        .copied()
        .unwrap_or(false)
}

/// Canonical display order: default devices first in their fixed order, then
/// everything else lexicographically.
pub fn device_order(a: &str, b: &str) -> Ordering {
    let index_a = DEFAULT_DEVICE_KEYS.iter().position(|k| *k == a);
    let index_b = DEFAULT_DEVICE_KEYS.iter().position(|k| *k == b);
    match (index_a, index_b) {
        (Some(ia), Some(ib)) => ia.cmp(&ib),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// The device list in canonical display order as (key, label) pairs.
pub fn sorted_devices(greenhouse: &Greenhouse) -> Vec<(String, String)> {
    let mut devices: Vec<(String, String)> = greenhouse
        .devices
        .iter()
        .map(|(key, label)| (key.clone(), label.clone()))
        .collect();
    devices.sort_by(|(a, _), (b, _)| device_order(a, b));
    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_greenhouse() -> Greenhouse {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        greenhouse.devices.clear();
        greenhouse.control_state.manual_settings.clear();
        greenhouse
    }

    #[test]
    fn test_key_validation() {
        assert!(is_valid_key("fan2"));
        assert!(is_valid_key("side_curtain"));
        assert!(is_valid_key("A_1"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("fan 2"));
        assert!(!is_valid_key("측면커튼"));
        assert!(!is_valid_key("fan-2"));
    }

    #[test]
    fn test_add_then_remove_round_trips() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let devices_before = greenhouse.devices.clone();
        let settings_before = greenhouse.control_state.manual_settings.clone();

        add_device(&mut greenhouse, "side_curtain", "Side Curtain").unwrap();
        remove_device(&mut greenhouse, "side_curtain").unwrap();

        assert_eq!(greenhouse.devices, devices_before);
        assert_eq!(greenhouse.control_state.manual_settings, settings_before);
    }

    #[test]
    fn test_duplicate_key_leaves_state_unchanged() {
        let mut greenhouse = empty_greenhouse();
        add_device(&mut greenhouse, "fan", "Fan").unwrap();
        toggle_device(&mut greenhouse, "fan");
        let snapshot = greenhouse.clone();

        let err = add_device(&mut greenhouse, "fan", "Another Fan").unwrap_err();
        assert_eq!(err, ControlError::DuplicateKey("fan".to_string()));
        assert_eq!(greenhouse, snapshot);
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let mut greenhouse = empty_greenhouse();
        let err = add_device(&mut greenhouse, "bad key!", "Label").unwrap_err();
        assert_eq!(err, ControlError::InvalidKey("bad key!".to_string()));
        assert!(greenhouse.devices.is_empty());
        assert!(greenhouse.control_state.manual_settings.is_empty());
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut greenhouse = empty_greenhouse();
        add_device(&mut greenhouse, "heater", "Heater").unwrap();

        assert!(!is_on(&greenhouse, "heater"));
        toggle_device(&mut greenhouse, "heater");
        assert!(is_on(&greenhouse, "heater"));
        toggle_device(&mut greenhouse, "heater");
        assert!(!is_on(&greenhouse, "heater"));
    }

    #[test]
    fn test_toggle_unknown_key_is_a_no_op() {
        let mut greenhouse = empty_greenhouse();
        let snapshot = greenhouse.clone();
        toggle_device(&mut greenhouse, "ghost");
        assert_eq!(greenhouse, snapshot);
    }

    #[test]
    fn test_no_orphans_after_any_add_remove_sequence() {
        let mut greenhouse = empty_greenhouse();
        add_device(&mut greenhouse, "fan", "Fan").unwrap();
        add_device(&mut greenhouse, "mist", "Mist").unwrap();
        toggle_device(&mut greenhouse, "mist");
        remove_device(&mut greenhouse, "fan").unwrap();
        add_device(&mut greenhouse, "heater", "Heater").unwrap();
        remove_device(&mut greenhouse, "mist").unwrap();

        let device_keys: Vec<&String> = greenhouse.devices.keys().collect();
        let setting_keys: Vec<&String> =
            greenhouse.control_state.manual_settings.keys().collect();
        assert_eq!(device_keys, setting_keys);
    }

    #[test]
    fn test_remove_unknown_key_reports_not_found() {
        let mut greenhouse = empty_greenhouse();
        let err = remove_device(&mut greenhouse, "ghost").unwrap_err();
        assert_eq!(err, ControlError::NotFound("ghost".to_string()));
    }

    #[test]
    fn test_display_order_defaults_first_then_alphabetical() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        add_device(&mut greenhouse, "zz_curtain", "Curtain").unwrap();
        add_device(&mut greenhouse, "co2_valve", "CO2 Valve").unwrap();

        let keys: Vec<String> = sorted_devices(&greenhouse)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(
            keys,
            vec![
                "fan",
                "circulation_fan",
                "mist",
                "dehumidifier",
                "heater",
                "co2_valve",
                "zz_curtain"
            ]
        );
    }

    #[test]
    fn test_scenario_from_single_fan_registry() {
        // {fan: "Fan"} -> add heater -> toggle heater -> remove fan
        let mut greenhouse = empty_greenhouse();
        add_device(&mut greenhouse, "fan", "Fan").unwrap();

        add_device(&mut greenhouse, "heater", "Heater").unwrap();
        assert_eq!(greenhouse.devices.len(), 2);
        assert_eq!(
            greenhouse.control_state.manual_settings.get("heater"),
            Some(&false)
        );

        toggle_device(&mut greenhouse, "heater");
        assert!(is_on(&greenhouse, "heater"));

        remove_device(&mut greenhouse, "fan").unwrap();
        assert_eq!(greenhouse.devices.len(), 1);
        assert_eq!(greenhouse.devices.get("heater"), Some(&"Heater".to_string()));
        assert_eq!(
            greenhouse.control_state.manual_settings.get("heater"),
            Some(&true)
        );
        assert!(greenhouse.control_state.manual_settings.get("fan").is_none());
    }
}
