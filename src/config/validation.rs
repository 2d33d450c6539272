//! Non-fatal sanity checks on a [`Layout`](super::Layout).
use std::collections::HashSet;

use super::Layout;

/// A validation warning detected after loading the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The layout key that triggered the warning (e.g. `"platforms"`).
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Build a warning for layout key `item`.
    #[must_use]
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

impl Layout {
    /// Check the layout for suspicious but runnable settings.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if self.platforms.is_empty() {
            warnings.push(ValidationWarning::new(
                "platforms",
                "no platforms configured; shared headers will not be deployed",
            ));
        }

        let mut seen = HashSet::new();
        for tag in &self.platforms {
            if !seen.insert(tag.as_str()) {
                warnings.push(ValidationWarning::new(
                    "platforms",
                    format!("platform '{tag}' is listed more than once"),
                ));
            }
        }

        if !self.platforms.contains(&self.resources.platform) {
            warnings.push(ValidationWarning::new(
                "resources.platform",
                format!(
                    "'{}' is not in the platform list; its folder will not be created",
                    self.resources.platform
                ),
            ));
        }

        if self.resources.extension.trim_start_matches('.').is_empty() {
            warnings.push(ValidationWarning::new(
                "resources.extension",
                "empty extension matches every file in the resource folder",
            ));
        }

        for name in &self.special_headers {
            if name.contains('/') || name.contains('\\') {
                warnings.push(ValidationWarning::new(
                    "special_headers",
                    format!("'{name}' contains a path separator; it is deployed under that relative path"),
                ));
            }
        }

        warnings
    }
}
