//! Configuration management: defaults, validation, loading from the environment.

pub mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::AppConfig;

use serde::{Deserialize, Serialize};

use defaults::DEFAULT_SETTINGS;

/// Raised at startup when a configured value is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// A setting as returned to the settings panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInfo {
    pub key: String,
    pub value: String,
    pub description: String,
    pub is_default: bool,
}

/// Describe every known setting, resolving values through `lookup`.
pub fn list_settings<F>(lookup: F) -> Vec<SettingInfo>
where
    F: Fn(&str) -> Option<String>,
{
    defaults::setting_keys()
        .filter_map(|key| DEFAULT_SETTINGS.get(key))
        .map(|def| {
            let current = lookup(def.key);
            SettingInfo {
                key: def.key.to_string(),
                is_default: current.is_none(),
                value: current.unwrap_or_else(|| def.default.to_string()),
                description: def.description.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_settings_marks_overrides() {
        let settings = list_settings(|key| (key == "MERGE_AXIS").then(|| "vertical".to_string()));

        let axis = settings.iter().find(|s| s.key == "MERGE_AXIS").unwrap();
        assert_eq!(axis.value, "vertical");
        assert!(!axis.is_default);

        let color = settings
            .iter()
            .find(|s| s.key == "MERGE_SEPARATOR_COLOR")
            .unwrap();
        assert_eq!(color.value, "#000000");
        assert!(color.is_default);
    }

    #[test]
    fn setting_info_serializes_for_the_panel() {
        let settings = list_settings(|_| None);
        let json = serde_json::to_value(&settings[0]).unwrap();
        assert_eq!(json["key"], "MERGE_AXIS");
        assert_eq!(json["is_default"], true);
    }
}
