//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("MERGE_AXIS", "horizontal", "Layout direction: horizontal or vertical"),
    (
        "MERGE_SCALING",
        "reduce",
        "Scaling policy: reduce, magnify, crop or preserve",
    ),
    (
        "MERGE_MAINTAIN_ASPECT_RATIO",
        "true",
        "Scale the along-axis size together with the cross-axis size",
    ),
    (
        "MERGE_SEPARATOR_THICKNESS",
        "0",
        "Separator band thickness in pixels (0-50)",
    ),
    ("MERGE_SEPARATOR_COLOR", "#000000", "Separator band color (#RRGGBB)"),
    ("MERGE_EXPORT_FORMAT", "png", "Download format: png, jpeg or webp"),
    ("MERGE_EXPORT_QUALITY", "92", "JPEG quality (1-100)"),
    ("MERGE_MAX_FILE_MB", "20", "Largest accepted upload in MiB (1-200)"),
    (
        "MERGE_DEBOUNCE_MS",
        "150",
        "Delay before recomposing after a change (0-5000 ms)",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Setting keys in declaration order.
pub fn setting_keys() -> impl Iterator<Item = &'static str> {
    DEFS.iter().map(|&(key, _, _)| key)
}

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
