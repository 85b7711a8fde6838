//! Pre-flight checks run before any request reaches the backend.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// Selections required to start an avatar video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarVideoSelection {
    pub script: Option<String>,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
}

impl AvatarVideoSelection {
    /// Names of the required selections that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.script) {
            missing.push("script");
        }
        if blank(&self.avatar_id) {
            missing.push("avatar");
        }
        if blank(&self.voice_id) {
            missing.push("voice");
        }
        missing
    }

    /// Fail with one error listing every missing selection.
    pub fn validate(&self) -> Result<(), CoreError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Please provide: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Normalize a hex color to upper-case `#RRGGBB`.
///
/// Accepts `RGB`, `#RGB`, `RRGGBB` and `#RRGGBB`.
pub fn normalize_hex_color(input: &str) -> Result<String, CoreError> {
    let caps = HEX_COLOR_RE
        .captures(input.trim())
        .ok_or_else(|| CoreError::Validation(format!("Invalid hex color '{input}'")))?;
    let digits = &caps[1];

    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    Ok(format!("#{}", expanded.to_uppercase()))
}
