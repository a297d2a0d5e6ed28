// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection configuration
//!
//! Component types are data, not code: adding a category means extending
//! [`DetectorConfig::component_types`], never touching the classifier.

use crate::error::{DetectError, Result};
use regex::Regex;

/// Default Y thickness (model units) for height slicing
pub const DEFAULT_FLOOR_HEIGHT: f32 = 3.0;

/// A named component category defined by name-matching patterns
#[derive(Clone, Debug)]
pub struct ComponentTypeSpec {
    /// Display label (e.g. "Windows")
    pub label: String,
    /// Stable key (e.g. "window")
    pub key: String,
    /// Patterns tested against node and ancestor names
    pub patterns: Vec<Regex>,
}

impl ComponentTypeSpec {
    /// Create a spec, compiling `patterns`
    pub fn new(label: impl Into<String>, key: impl Into<String>, patterns: &[&str]) -> Result<Self> {
        let key = key.into();
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| DetectError::pattern(&key, e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            label: label.into(),
            key,
            patterns,
        })
    }
}

/// RGBA highlight colors, sRGB components in 0..1
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightColors {
    /// Applied to a selected floor's nodes
    pub floor: [f32; 4],
    /// Applied to a selected component type's nodes
    pub component_type: [f32; 4],
}

impl Default for HighlightColors {
    fn default() -> Self {
        Self {
            // 0xff6b35 orange / 0x36a2eb blue, both translucent
            floor: [1.0, 0.42, 0.208, 0.7],
            component_type: [0.212, 0.635, 0.922, 0.7],
        }
    }
}

/// Options recognized by the detection pass
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Substrings that mark a mesh as floor-tagged (case-insensitive)
    pub floor_keywords: Vec<String>,
    /// Slice thickness for the spatial fallback, in model units; must be > 0
    pub floor_height: f32,
    /// Component categories, classified in this order
    pub component_types: Vec<ComponentTypeSpec>,
    /// Highlight material colors
    pub highlight_colors: HighlightColors,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            floor_keywords: vec!["floor".into(), "level".into()],
            floor_height: DEFAULT_FLOOR_HEIGHT,
            component_types: default_component_types(),
            highlight_colors: HighlightColors::default(),
        }
    }
}

impl DetectorConfig {
    /// Validate the configuration.
    ///
    /// A non-positive slice thickness would turn into a division fault deep
    /// inside detection; it is rejected here instead.
    pub fn validate(&self) -> Result<()> {
        if !self.floor_height.is_finite() || self.floor_height <= 0.0 {
            return Err(DetectError::config(format!(
                "floor_height must be a positive number, got {}",
                self.floor_height
            )));
        }
        Ok(())
    }
}

/// Windows + doors, the categories building exporters name most reliably
fn default_component_types() -> Vec<ComponentTypeSpec> {
    vec![
        ComponentTypeSpec::new("Windows", "window", &["(?i)window", "(?i)win"])
            .expect("valid pattern"),
        ComponentTypeSpec::new("Doors", "door", &["(?i)door", "(?i)dr"]).expect("valid pattern"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_floor_height() {
        let mut config = DetectorConfig::default();
        config.floor_height = 0.0;
        assert!(matches!(
            config.validate(),
            Err(DetectError::InvalidConfig(_))
        ));

        config.floor_height = -2.5;
        assert!(config.validate().is_err());

        config.floor_height = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_pattern() {
        assert!(matches!(
            ComponentTypeSpec::new("Broken", "broken", &["("]),
            Err(DetectError::InvalidPattern { .. })
        ));
    }
}
