use crate::models::{ActiveMode, AutoSubType, ExpertSettings, Greenhouse};
use crate::services::validation::{validate_settings, SetpointBounds};
use crate::services::ControlError;

/// Switch between manual and automatic control. Always legal.
pub fn set_mode(greenhouse: &mut Greenhouse, mode: ActiveMode) {
    greenhouse.control_state.active_mode = mode;
}

pub fn set_auto_sub_type(greenhouse: &mut Greenhouse, sub_type: AutoSubType) {
    greenhouse.control_state.auto_sub_type = sub_type;
}

pub fn set_use_expert_settings(greenhouse: &mut Greenhouse, enabled: bool) {
    greenhouse.control_state.use_expert_settings = enabled;
}

/// Replace the saved expert thresholds after range validation. On failure the
/// prior value is kept.
pub fn save_expert_settings(
    greenhouse: &mut Greenhouse,
    settings: ExpertSettings,
    bounds: &SetpointBounds,
) -> Result<(), ControlError> {
    validate_settings(&settings, bounds)?;
    greenhouse.expert_settings = settings;
    Ok(())
}

/// Promote a fetched prediction: store the candidate, select the ML
/// optimization strategy and switch to automatic mode. All three fields move
/// together on the same aggregate copy so the store only ever sees the
/// compound transition as one update.
pub fn promote_prediction(
    greenhouse: &mut Greenhouse,
    prediction: ExpertSettings,
    bounds: &SetpointBounds,
) -> Result<(), ControlError> {
    validate_settings(&prediction, bounds)?;
    greenhouse.predicted_settings = Some(prediction);
    greenhouse.control_state.auto_sub_type = AutoSubType::MlOptimization;
    greenhouse.control_state.active_mode = ActiveMode::Auto;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Setpoint;

    fn prediction() -> ExpertSettings {
        ExpertSettings {
            day: Setpoint {
                temp_min: 20.0,
                temp_max: 26.0,
                temp_diff_min: 2.0,
                temp_diff_max: 4.0,
            },
            night: Setpoint {
                temp_min: 12.0,
                temp_max: 16.0,
                temp_diff_min: 2.0,
                temp_diff_max: 4.0,
            },
        }
    }

    #[test]
    fn test_set_mode_is_always_legal() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        set_mode(&mut greenhouse, ActiveMode::Auto);
        assert_eq!(greenhouse.control_state.active_mode, ActiveMode::Auto);
        set_mode(&mut greenhouse, ActiveMode::Manual);
        assert_eq!(greenhouse.control_state.active_mode, ActiveMode::Manual);
    }

    #[test]
    fn test_promotion_applies_all_three_fields() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        assert_eq!(greenhouse.control_state.active_mode, ActiveMode::Manual);
        assert_eq!(greenhouse.control_state.auto_sub_type, AutoSubType::Stable);

        promote_prediction(&mut greenhouse, prediction(), &SetpointBounds::default()).unwrap();

        assert_eq!(greenhouse.predicted_settings, Some(prediction()));
        assert_eq!(
            greenhouse.control_state.auto_sub_type,
            AutoSubType::MlOptimization
        );
        assert_eq!(greenhouse.control_state.active_mode, ActiveMode::Auto);
    }

    #[test]
    fn test_rejected_promotion_applies_nothing() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let snapshot = greenhouse.clone();

        let mut bad = prediction();
        bad.night.temp_min = 30.0; // inverted against temp_max 16.0

        let err =
            promote_prediction(&mut greenhouse, bad, &SetpointBounds::default()).unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { .. }));
        assert_eq!(greenhouse, snapshot);
    }

    #[test]
    fn test_save_expert_settings_keeps_prior_value_on_failure() {
        let mut greenhouse = Greenhouse::with_defaults("Test");
        let prior = greenhouse.expert_settings;

        let mut bad = prediction();
        bad.day.temp_max = 60.0;
        assert!(save_expert_settings(&mut greenhouse, bad, &SetpointBounds::default()).is_err());
        assert_eq!(greenhouse.expert_settings, prior);

        save_expert_settings(&mut greenhouse, prediction(), &SetpointBounds::default()).unwrap();
        assert_eq!(greenhouse.expert_settings, prediction());
    }
}
