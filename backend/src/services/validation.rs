use crate::models::{ExpertSettings, Setpoint};
use crate::services::ControlError;

/// Absolute bounds a setpoint must fall within. The dashboard sliders expose
/// the same ranges, but they are enforced here regardless of the client.
#[derive(Debug, Clone, Copy)]
pub struct SetpointBounds {
    pub temp_min: f64,
    pub temp_max: f64,
    pub diff_min: f64,
    pub diff_max: f64,
}

impl Default for SetpointBounds {
    fn default() -> Self {
        Self {
            temp_min: 0.0,
            temp_max: 45.0,
            diff_min: 0.0,
            diff_max: 10.0,
        }
    }
}

/// Check a single setpoint for internal consistency: all four values finite,
/// inside the absolute bounds, and min <= max for both pairs.
pub fn validate_setpoint(setpoint: &Setpoint, bounds: &SetpointBounds) -> Result<(), ControlError> {
    check_bounded("temp_min", setpoint.temp_min, bounds.temp_min, bounds.temp_max)?;
    check_bounded("temp_max", setpoint.temp_max, bounds.temp_min, bounds.temp_max)?;
    check_bounded(
        "temp_diff_min",
        setpoint.temp_diff_min,
        bounds.diff_min,
        bounds.diff_max,
    )?;
    check_bounded(
        "temp_diff_max",
        setpoint.temp_diff_max,
        bounds.diff_min,
        bounds.diff_max,
    )?;

    if setpoint.temp_min > setpoint.temp_max {
        return Err(ControlError::OutOfRange {
            field: "temp_min",
            value: setpoint.temp_min,
        });
    }
    if setpoint.temp_diff_min > setpoint.temp_diff_max {
        return Err(ControlError::OutOfRange {
            field: "temp_diff_min",
            value: setpoint.temp_diff_min,
        });
    }

    Ok(())
}

/// Validate both halves of a day/night setpoint pair.
pub fn validate_settings(
    settings: &ExpertSettings,
    bounds: &SetpointBounds,
) -> Result<(), ControlError> {
    validate_setpoint(&settings.day, bounds)?;
    validate_setpoint(&settings.night, bounds)
}

fn check_bounded(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ControlError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ControlError::OutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setpoint(temp_min: f64, temp_max: f64, diff_min: f64, diff_max: f64) -> Setpoint {
        Setpoint {
            temp_min,
            temp_max,
            temp_diff_min: diff_min,
            temp_diff_max: diff_max,
        }
    }

    #[test]
    fn test_accepts_values_within_bounds() {
        let bounds = SetpointBounds::default();
        assert!(validate_setpoint(&setpoint(18.0, 23.0, 3.0, 5.0), &bounds).is_ok());
        // Boundary values are inclusive.
        assert!(validate_setpoint(&setpoint(0.0, 45.0, 0.0, 10.0), &bounds).is_ok());
        // Equal min and max is a legal (degenerate) range.
        assert!(validate_setpoint(&setpoint(20.0, 20.0, 4.0, 4.0), &bounds).is_ok());
    }

    #[test]
    fn test_rejects_inverted_temperature_range() {
        let bounds = SetpointBounds::default();
        let err = validate_setpoint(&setpoint(25.0, 18.0, 3.0, 5.0), &bounds).unwrap_err();
        assert_eq!(
            err,
            ControlError::OutOfRange {
                field: "temp_min",
                value: 25.0
            }
        );
    }

    #[test]
    fn test_rejects_inverted_differential_range() {
        let bounds = SetpointBounds::default();
        let err = validate_setpoint(&setpoint(18.0, 23.0, 6.0, 2.0), &bounds).unwrap_err();
        assert_eq!(
            err,
            ControlError::OutOfRange {
                field: "temp_diff_min",
                value: 6.0
            }
        );
    }

    #[test]
    fn test_rejects_values_outside_absolute_bounds() {
        let bounds = SetpointBounds::default();
        assert!(validate_setpoint(&setpoint(-1.0, 23.0, 3.0, 5.0), &bounds).is_err());
        assert!(validate_setpoint(&setpoint(18.0, 50.0, 3.0, 5.0), &bounds).is_err());
        assert!(validate_setpoint(&setpoint(18.0, 23.0, 3.0, 12.0), &bounds).is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let bounds = SetpointBounds::default();
        assert!(validate_setpoint(&setpoint(f64::NAN, 23.0, 3.0, 5.0), &bounds).is_err());
        assert!(validate_setpoint(&setpoint(18.0, f64::INFINITY, 3.0, 5.0), &bounds).is_err());
    }

    #[test]
    fn test_validates_both_halves_of_the_pair() {
        let bounds = SetpointBounds::default();
        let settings = ExpertSettings {
            day: setpoint(18.0, 23.0, 3.0, 5.0),
            night: setpoint(9.0, 5.0, 3.0, 5.0),
        };
        let err = validate_settings(&settings, &bounds).unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { field: "temp_min", .. }));

        assert!(validate_settings(&ExpertSettings::default(), &bounds).is_ok());
    }
}
