//! Runtime application configuration loaded from defaults + environment overrides.

use std::time::Duration;

use image_merger::{Axis, ExportFormat, ScalingPolicy, Separator};

use super::ConfigError;
use super::defaults::{get_default, setting_keys};
use super::validation::{parse_color, validate_setting};

/// Runtime configuration for a merge session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub axis: Axis,
    pub scaling_policy: ScalingPolicy,
    pub maintain_aspect_ratio: bool,
    pub separator: Separator,
    pub export_format: ExportFormat,
    pub export_quality: u8,
    pub max_file_bytes: usize,
    pub debounce: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Horizontal,
            scaling_policy: ScalingPolicy::Reduce,
            maintain_aspect_ratio: true,
            separator: Separator::default(),
            export_format: ExportFormat::Png,
            export_quality: image_merger::DEFAULT_QUALITY,
            max_file_bytes: image_merger::DEFAULT_MAX_FILE_BYTES,
            debounce: Duration::from_millis(150),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults.
    ///
    /// Every value is validated before use; the first invalid value aborts the load.
    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in setting_keys() {
            if let Some(value) = lookup(key) {
                validate_setting(key, &value).map_err(|reason| ConfigError::Invalid {
                    key: key.to_string(),
                    value,
                    reason,
                })?;
            }
        }

        let g = |key: &str| -> String {
            lookup(key)
                .or_else(|| get_default(key).map(str::to_string))
                .unwrap_or_default()
        };
        let invalid = |key: &str, value: String| ConfigError::Invalid {
            key: key.to_string(),
            value,
            reason: "could not be parsed".into(),
        };

        let axis_raw = g("MERGE_AXIS");
        let axis = Axis::from_str_setting(&axis_raw).ok_or_else(|| invalid("MERGE_AXIS", axis_raw))?;

        let scaling_raw = g("MERGE_SCALING");
        let scaling_policy = ScalingPolicy::from_str_setting(&scaling_raw)
            .ok_or_else(|| invalid("MERGE_SCALING", scaling_raw))?;

        let color_raw = g("MERGE_SEPARATOR_COLOR");
        let color = parse_color(&color_raw).ok_or_else(|| invalid("MERGE_SEPARATOR_COLOR", color_raw))?;

        let format_raw = g("MERGE_EXPORT_FORMAT");
        let export_format = ExportFormat::from_str_setting(&format_raw)
            .ok_or_else(|| invalid("MERGE_EXPORT_FORMAT", format_raw))?;

        let max_file_mb: usize = parse_or(&g("MERGE_MAX_FILE_MB"), 20);

        Ok(Self {
            axis,
            scaling_policy,
            maintain_aspect_ratio: g("MERGE_MAINTAIN_ASPECT_RATIO") == "true",
            separator: Separator {
                thickness: parse_or(&g("MERGE_SEPARATOR_THICKNESS"), 0),
                color,
            },
            export_format,
            export_quality: parse_or(&g("MERGE_EXPORT_QUALITY"), image_merger::DEFAULT_QUALITY),
            max_file_bytes: max_file_mb * 1024 * 1024,
            debounce: Duration::from_millis(parse_or(&g("MERGE_DEBOUNCE_MS"), 150)),
        })
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use image::Rgb;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::load(lookup(&[])).unwrap();
        assert_eq!(config.axis, Axis::Horizontal);
        assert_eq!(config.scaling_policy, ScalingPolicy::Reduce);
        assert!(config.maintain_aspect_ratio);
        assert_eq!(config.separator, Separator::default());
        assert_eq!(config.export_format, ExportFormat::Png);
        assert_eq!(config.export_quality, 92);
        assert_eq!(config.max_file_bytes, 20 * 1024 * 1024);
        assert_eq!(config.debounce, Duration::from_millis(150));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::load(lookup(&[
            ("MERGE_AXIS", "vertical"),
            ("MERGE_SCALING", "magnify"),
            ("MERGE_MAINTAIN_ASPECT_RATIO", "false"),
            ("MERGE_SEPARATOR_THICKNESS", "12"),
            ("MERGE_SEPARATOR_COLOR", "#ff0000"),
            ("MERGE_EXPORT_FORMAT", "jpg"),
            ("MERGE_EXPORT_QUALITY", "70"),
            ("MERGE_MAX_FILE_MB", "5"),
            ("MERGE_DEBOUNCE_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.axis, Axis::Vertical);
        assert_eq!(config.scaling_policy, ScalingPolicy::Magnify);
        assert!(!config.maintain_aspect_ratio);
        assert_eq!(config.separator.thickness, 12);
        assert_eq!(config.separator.color, Rgb([255, 0, 0]));
        assert_eq!(config.export_format, ExportFormat::Jpeg);
        assert_eq!(config.export_quality, 70);
        assert_eq!(config.max_file_bytes, 5 * 1024 * 1024);
        assert!(config.debounce.is_zero());
    }

    #[test]
    fn invalid_value_fails_fast() {
        let err = AppConfig::load(lookup(&[("MERGE_SEPARATOR_THICKNESS", "80")])).unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "MERGE_SEPARATOR_THICKNESS");
                assert_eq!(value, "80");
            }
        }
    }
}
