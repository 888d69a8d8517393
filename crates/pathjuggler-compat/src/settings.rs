use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOLERANCE: f64 = 60.0;
pub const DEFAULT_HORIZONTAL_TOLERANCE: f64 = 15.0;
pub const DEFAULT_MAX_MISMATCHES: u32 = 0;
pub const DEFAULT_SUPPRESS_OUTPUT: usize = 20;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{name} must be a finite, non-negative angle in degrees (got {value})")]
    InvalidTolerance { name: &'static str, value: f64 },
}

/// Tuning knobs shared by every algorithm for the duration of one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum bearing difference, in degrees, for two segments to count as the same stroke.
    pub tolerance: f64,
    /// Applies instead of `tolerance` when either segment is exactly horizontal.
    pub horizontal_tolerance: f64,
    /// Consecutive mismatched segments allowed before two paths are incompatible.
    pub max_mismatches: u32,
    /// Selections larger than this only report warnings and a summary.
    pub suppress_output: usize,
    /// Skip short seam segments that vanish when overlaps are removed.
    pub ignore_overlap: bool,
    /// Compare 16-way compass buckets instead of continuous bearings.
    pub use_compass: bool,
    /// Skip line segments that form a consistent corner turn in both paths.
    pub ignore_corners: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            horizontal_tolerance: DEFAULT_HORIZONTAL_TOLERANCE,
            max_mismatches: DEFAULT_MAX_MISMATCHES,
            suppress_output: DEFAULT_SUPPRESS_OUTPUT,
            ignore_overlap: true,
            use_compass: false,
            ignore_corners: false,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_yaml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [
            ("tolerance", self.tolerance),
            ("horizontal_tolerance", self.horizontal_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let s = Settings::from_yaml_str("tolerance: 30\nignore_overlap: false\n").unwrap();
        assert_eq!(s.tolerance, 30.0);
        assert!(!s.ignore_overlap);
        assert_eq!(s.horizontal_tolerance, DEFAULT_HORIZONTAL_TOLERANCE);
        assert_eq!(s.suppress_output, DEFAULT_SUPPRESS_OUTPUT);
    }

    #[test]
    fn json_settings_are_accepted() {
        let s = Settings::from_json_str(r#"{"max_mismatches": 2}"#).unwrap();
        assert_eq!(s.max_mismatches, 2);
        assert_eq!(s.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn rejects_negative_tolerance() {
        let err = Settings::from_yaml_str("horizontal_tolerance: -1\n").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidTolerance {
                name: "horizontal_tolerance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            Settings::from_yaml_str("tolerence: 10\n"),
            Err(SettingsError::Yaml(_))
        ));
    }
}
