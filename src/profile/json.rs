// JSON profile loader
// Load device profiles from JSON files at runtime

use std::path::Path;

use thiserror::Error;

use super::types::DeviceProfile;
use crate::error::EncodeError;
use crate::handlers::SettingKind;

/// Profile loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Setting \"{setting}\": no handler for value_type \"{value_type}\"")]
    NoHandlerForType { setting: String, value_type: String },

    #[error("Setting \"{setting}\": {source}")]
    Setting {
        setting: String,
        #[source]
        source: EncodeError,
    },
}

impl DeviceProfile {
    /// Load a profile from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| LoadError::Io(e.to_string()))?;
        Self::load_from_json(&content)
    }

    /// Load a profile from a JSON string
    ///
    /// Every setting's `value_type` is checked against the known handlers
    /// before the typed parse, so an unknown handler is reported by name
    /// instead of as a generic serde error.
    pub fn load_from_json(json: &str) -> Result<Self, LoadError> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;
        check_value_types(&raw)?;

        let profile: DeviceProfile =
            serde_json::from_value(raw).map_err(|e| LoadError::Parse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Serialize back to pretty JSON
    pub fn to_json(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(self).map_err(|e| LoadError::Parse(e.to_string()))
    }
}

fn check_value_types(raw: &serde_json::Value) -> Result<(), LoadError> {
    let Some(settings) = raw.get("settings").and_then(|s| s.as_array()) else {
        return Ok(());
    };

    for setting in settings {
        let Some(value_type) = setting.get("value_type").and_then(|t| t.as_str()) else {
            continue;
        };
        if !SettingKind::TYPE_NAMES.contains(&value_type) {
            let name = setting
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("<unnamed>");
            return Err(LoadError::NoHandlerForType {
                setting: name.to_string(),
                value_type: value_type.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"{
        "name": "rival110",
        "display_name": "SteelSeries Rival 110",
        "vendor_id": 4152,
        "product_id": 5929,
        "settings": [
            {
                "name": "sensitivity",
                "command": [3],
                "value_type": "range",
                "input_range": [200, 7200, 100],
                "output_range": [4, 167, 2.33],
                "default": 800
            },
            {
                "name": "color",
                "command": [5, 0],
                "value_type": "rgbcolor",
                "default": "red"
            }
        ],
        "save_command": {"command": [9]}
    }"#;

    #[test]
    fn test_load_from_json() {
        let profile = DeviceProfile::load_from_json(PROFILE).unwrap();
        assert_eq!(profile.id_string(), "1038:1729");
        assert_eq!(profile.settings.len(), 2);
        assert_eq!(profile.settings[1].kind, SettingKind::Rgbcolor);
        assert_eq!(profile.save_command.unwrap().command, vec![9]);
    }

    #[test]
    fn test_unknown_value_type() {
        let json = PROFILE.replace("\"rgbcolor\"", "\"laser_show\"");
        assert_eq!(
            DeviceProfile::load_from_json(&json).unwrap_err(),
            LoadError::NoHandlerForType {
                setting: "color".into(),
                value_type: "laser_show".into(),
            }
        );
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let json = PROFILE.replace("\"output_range\": [4, 167, 2.33],", "");
        assert!(matches!(
            DeviceProfile::load_from_json(&json),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_authoring_error_is_caught() {
        let json = PROFILE.replace("[4, 167, 2.33]", "[4, 100, 1]");
        assert!(matches!(
            DeviceProfile::load_from_json(&json),
            Err(LoadError::Setting {
                source: EncodeError::RangeLengthMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let profile = DeviceProfile::load_from_json(PROFILE).unwrap();
        let again = DeviceProfile::load_from_json(&profile.to_json().unwrap()).unwrap();
        assert_eq!(profile, again);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DeviceProfile::load_from_file("/nonexistent/profile.json"),
            Err(LoadError::Io(_))
        ));
    }
}
