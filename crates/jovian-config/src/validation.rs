//! Range checks for configuration and preset values.
//!
//! Loading never clamps silently: a value outside its declared range is
//! reported so the user can fix the file. The engine itself still clamps
//! everything it receives.

use jovian_synth::{ModDestination, Param};
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value outside its allowed range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Field or key name.
        field: String,
        /// The offending value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Named preset exists neither in the factory bank nor as a user file.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Preset name is empty.
    #[error("preset name must not be empty")]
    EmptyName,
}

/// Check that `value` lies in `min..=max`.
pub fn check_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Copy + Into<f64>,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    }
}

/// Check a parameter value against its descriptor.
pub fn validate_param(param: Param, value: i32) -> Result<(), ValidationError> {
    let desc = param.descriptor();
    check_range(desc.string_id, value, desc.min, desc.max)
}

/// Check a raw hub value (0..=100).
pub fn validate_hub(dest: ModDestination, raw: i32) -> Result<(), ValidationError> {
    check_range(dest.descriptor().string_id, raw, 0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(check_range("x", 5, 0, 10).is_ok());
        assert!(check_range("x", 0.0_f32, 0.0, 1.0).is_ok());
        let err = check_range("unison_voices", 9_u32, 1, 7).unwrap_err();
        assert_eq!(err.to_string(), "'unison_voices' value 9 out of range [1, 7]");
    }

    #[test]
    fn test_param_and_hub() {
        assert!(validate_param(Param::Cutoff, 100).is_ok());
        assert!(validate_param(Param::Cutoff, 101).is_err());
        assert!(validate_param(Param::Dco1Octave, 3).is_err());
        assert!(validate_hub(ModDestination::Portamento, 100).is_ok());
        assert!(matches!(
            validate_hub(ModDestination::Portamento, -1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
