use chrono::Utc;
use serde::Deserialize;

use crate::models::{Greenhouse, JojoGaonRule};
use crate::services::ControlError;

pub const DEFAULT_TIME_BEFORE_SUNRISE: u8 = 2;
pub const DEFAULT_TARGET_TEMP: f64 = 15.0;

/// Partial update for a single rule. Absent fields are left untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePatch {
    pub time_before_sunrise: Option<u8>,
    pub target_temp: Option<f64>,
}

/// Append a rule with a fresh unique id and the default directive
/// (2 hours before sunrise, 15 degrees). Returns the new rule.
pub fn add_rule(greenhouse: &mut Greenhouse) -> JojoGaonRule {
    let rule = JojoGaonRule {
        id: next_rule_id(greenhouse),
        time_before_sunrise: DEFAULT_TIME_BEFORE_SUNRISE,
        target_temp: DEFAULT_TARGET_TEMP,
    };
    greenhouse.control_state.jojo_gaon_rules.push(rule.clone());
    rule
}

/// Replace the patched fields of the matching rule in place, preserving its
/// position in the sequence.
pub fn update_rule(
    greenhouse: &mut Greenhouse,
    id: &str,
    patch: &RulePatch,
) -> Result<(), ControlError> {
    if let Some(hours) = patch.time_before_sunrise {
        if !(1..=3).contains(&hours) {
            return Err(ControlError::OutOfRange {
                field: "time_before_sunrise",
                value: hours as f64,
            });
        }
    }
    if let Some(temp) = patch.target_temp {
        if !temp.is_finite() {
            return Err(ControlError::OutOfRange {
                field: "target_temp",
                value: temp,
            });
        }
    }

    let rule = greenhouse
        .control_state
        .jojo_gaon_rules
        .iter_mut()
        .find(|rule| rule.id == id)
        .ok_or_else(|| ControlError::NotFound(id.to_string()))?;

    if let Some(hours) = patch.time_before_sunrise {
        rule.time_before_sunrise = hours;
    }
    if let Some(temp) = patch.target_temp {
        rule.target_temp = temp;
    }
    Ok(())
}

/// Delete the matching rule. Absent ids are a no-op.
pub fn remove_rule(greenhouse: &mut Greenhouse, id: &str) {
    greenhouse
        .control_state
        .jojo_gaon_rules
        .retain(|rule| rule.id != id);
}

// Rule ids are timestamp-derived, bumped until unique within the greenhouse
// so that two adds in the same millisecond cannot collide.
fn next_rule_id(greenhouse: &Greenhouse) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let id = candidate.to_string();
        if greenhouse
            .control_state
            .jojo_gaon_rules
            .iter()
            .all(|rule| rule.id != id)
        {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_adds_produce_distinct_ids_with_defaults() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let first = add_rule(&mut greenhouse);
        let second = add_rule(&mut greenhouse);

        assert_eq!(greenhouse.control_state.jojo_gaon_rules.len(), 2);
        assert_ne!(first.id, second.id);
        for rule in &greenhouse.control_state.jojo_gaon_rules {
            assert_eq!(rule.time_before_sunrise, 2);
            assert_eq!(rule.target_temp, 15.0);
        }
    }

    #[test]
    fn test_update_changes_only_the_matching_rule() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let first = add_rule(&mut greenhouse);
        let second = add_rule(&mut greenhouse);

        let patch = RulePatch {
            time_before_sunrise: None,
            target_temp: Some(12.0),
        };
        update_rule(&mut greenhouse, &first.id, &patch).unwrap();

        let rules = &greenhouse.control_state.jojo_gaon_rules;
        assert_eq!(rules[0].target_temp, 12.0);
        assert_eq!(rules[0].time_before_sunrise, 2);
        assert_eq!(rules[1].target_temp, 15.0);

        remove_rule(&mut greenhouse, &second.id);
        let rules = &greenhouse.control_state.jojo_gaon_rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, first.id);
        assert_eq!(rules[0].target_temp, 12.0);
    }

    #[test]
    fn test_update_unknown_id_reports_not_found() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let patch = RulePatch {
            time_before_sunrise: Some(1),
            target_temp: None,
        };
        let err = update_rule(&mut greenhouse, "missing", &patch).unwrap_err();
        assert_eq!(err, ControlError::NotFound("missing".to_string()));
    }

    #[test]
    fn test_update_rejects_hours_outside_one_to_three() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let rule = add_rule(&mut greenhouse);

        let patch = RulePatch {
            time_before_sunrise: Some(4),
            target_temp: None,
        };
        let err = update_rule(&mut greenhouse, &rule.id, &patch).unwrap_err();
        assert!(matches!(
            err,
            ControlError::OutOfRange {
                field: "time_before_sunrise",
                ..
            }
        ));
        // The rule itself is untouched.
        assert_eq!(
            greenhouse.control_state.jojo_gaon_rules[0].time_before_sunrise,
            2
        );
    }

    #[test]
    fn test_remove_absent_id_is_a_no_op() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        add_rule(&mut greenhouse);
        remove_rule(&mut greenhouse, "missing");
        assert_eq!(greenhouse.control_state.jojo_gaon_rules.len(), 1);
    }

    #[test]
    fn test_overlapping_rules_are_both_retained() {
        // Two rules at the same hour are tolerated; insertion order is kept.
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let first = add_rule(&mut greenhouse);
        let second = add_rule(&mut greenhouse);

        let patch = RulePatch {
            time_before_sunrise: Some(3),
            target_temp: Some(10.0),
        };
        update_rule(&mut greenhouse, &first.id, &patch).unwrap();
        let patch = RulePatch {
            time_before_sunrise: Some(3),
            target_temp: Some(18.0),
        };
        update_rule(&mut greenhouse, &second.id, &patch).unwrap();

        let rules = &greenhouse.control_state.jojo_gaon_rules;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, first.id);
        assert_eq!(rules[1].id, second.id);
    }
}
