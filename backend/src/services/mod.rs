pub mod control;
pub mod prediction;
pub mod registry;
pub mod rules;
pub mod validation;

/// Error types for control-state edits. Every variant blocks the offending
/// edit; no edit is ever partially applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The device key is already present in the registry.
    DuplicateKey(String),
    /// The device key does not match `[A-Za-z0-9_]+`.
    InvalidKey(String),
    /// A setpoint value is non-finite, outside its configured bound, or
    /// inverts its min/max pair.
    OutOfRange { field: &'static str, value: f64 },
    /// No device or rule with the given identifier exists.
    NotFound(String),
}

impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::DuplicateKey(key) => write!(f, "Device key already in use: {}", key),
            ControlError::InvalidKey(key) => write!(
                f,
                "Invalid device key (only letters, digits and underscores are allowed): {}",
                key
            ),
            ControlError::OutOfRange { field, value } => {
                write!(f, "Value out of range for {}: {}", field, value)
            }
            ControlError::NotFound(id) => write!(f, "Not found: {}", id),
        }
    }
}

impl std::error::Error for ControlError {}
