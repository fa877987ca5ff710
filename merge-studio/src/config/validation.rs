//! Setting value validation.

use std::sync::LazyLock;

use image::Rgb;
use image_merger::{Axis, ExportFormat, ScalingPolicy};
use regex::Regex;

static RE_HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").unwrap());

/// Largest separator band the settings panel allows.
pub const MAX_SEPARATOR_THICKNESS: u32 = 50;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "MERGE_AXIS" => {
            if Axis::from_str_setting(value).is_none() {
                return Err("must be 'horizontal' or 'vertical'".into());
            }
        }
        "MERGE_SCALING" => {
            if ScalingPolicy::from_str_setting(value).is_none() {
                return Err("must be reduce, magnify, crop, or preserve".into());
            }
        }
        "MERGE_MAINTAIN_ASPECT_RATIO" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        "MERGE_SEPARATOR_THICKNESS" => {
            validate_int_range(value, 0, i64::from(MAX_SEPARATOR_THICKNESS))?
        }
        "MERGE_SEPARATOR_COLOR" => {
            if parse_color(value).is_none() {
                return Err("must be a hex color like #RRGGBB".into());
            }
        }
        "MERGE_EXPORT_FORMAT" => {
            if ExportFormat::from_str_setting(value).is_none() {
                return Err("must be png, jpeg, or webp".into());
            }
        }
        "MERGE_EXPORT_QUALITY" => validate_int_range(value, 1, 100)?,
        "MERGE_MAX_FILE_MB" => validate_int_range(value, 1, 200)?,
        "MERGE_DEBOUNCE_MS" => validate_int_range(value, 0, 5000)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

/// Parse `#RGB` or `#RRGGBB` (leading `#` optional).
pub fn parse_color(value: &str) -> Option<Rgb<u8>> {
    let caps = RE_HEX_COLOR.captures(value.trim())?;
    let hex = caps.get(1)?.as_str();
    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_axis() {
        assert!(validate_setting("MERGE_AXIS", "horizontal").is_ok());
        assert!(validate_setting("MERGE_AXIS", "Vertical").is_ok());
        assert!(validate_setting("MERGE_AXIS", "diagonal").is_err());
    }

    #[test]
    fn test_valid_separator_thickness() {
        assert!(validate_setting("MERGE_SEPARATOR_THICKNESS", "0").is_ok());
        assert!(validate_setting("MERGE_SEPARATOR_THICKNESS", "50").is_ok());
        assert!(validate_setting("MERGE_SEPARATOR_THICKNESS", "51").is_err());
        assert!(validate_setting("MERGE_SEPARATOR_THICKNESS", "-1").is_err());
        assert!(validate_setting("MERGE_SEPARATOR_THICKNESS", "thin").is_err());
    }

    #[test]
    fn test_valid_quality() {
        assert!(validate_setting("MERGE_EXPORT_QUALITY", "1").is_ok());
        assert!(validate_setting("MERGE_EXPORT_QUALITY", "100").is_ok());
        assert!(validate_setting("MERGE_EXPORT_QUALITY", "0").is_err());
    }

    #[test]
    fn test_valid_boolean() {
        assert!(validate_setting("MERGE_MAINTAIN_ASPECT_RATIO", "true").is_ok());
        assert!(validate_setting("MERGE_MAINTAIN_ASPECT_RATIO", "yes").is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000"), Some(Rgb([255, 128, 0])));
        assert_eq!(parse_color("00FF00"), Some(Rgb([0, 255, 0])));
        assert_eq!(parse_color("#fff"), Some(Rgb([255, 255, 255])));
        assert_eq!(parse_color("#ggg"), None);
        assert_eq!(parse_color("#12345"), None);
        assert!(validate_setting("MERGE_SEPARATOR_COLOR", "red").is_err());
    }
}
