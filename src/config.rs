//! Style configuration loaded from JSON
//!
//! ```json
//! {
//!   "category_colors": { "FILTER": "#558333" },
//!   "datatype_colors": { "MESH": "#40A0A0FF" }
//! }
//! ```
//!
//! Entries override or extend the built-in color tables of a [`Theme`].

use crate::constants::config::{APP_DIR, STYLE_ENV_VAR, STYLE_FILE};
use crate::error::ConfigError;
use crate::geometry::parse_hex_color;
use crate::nodes::{DataType, NodeCategory};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Color overrides keyed by category and datatype identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub category_colors: BTreeMap<String, String>,
    pub datatype_colors: BTreeMap<String, String>,
}

impl StyleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a style file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded style from {} ({} category, {} datatype colors)",
            path.display(),
            config.category_colors.len(),
            config.datatype_colors.len()
        );
        Ok(config)
    }

    /// Default location of the style file in the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(STYLE_FILE))
    }

    /// Finds and loads the style file.
    ///
    /// Checks `NODECANVAS_STYLE` first, then the user config directory. No
    /// file at either place gives the empty config.
    pub fn discover() -> Result<Self, ConfigError> {
        let path = std::env::var_os(STYLE_ENV_VAR)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        match path {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                log::debug!("No style file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Merges the overrides into `theme`.
    ///
    /// Every color is parsed before the theme is touched, so a malformed
    /// entry leaves it unchanged.
    pub fn apply(&self, theme: &mut Theme) -> Result<(), ConfigError> {
        let categories = parse_table(&self.category_colors)?;
        let datatypes = parse_table(&self.datatype_colors)?;

        for (name, color) in categories {
            theme.set_category_color(NodeCategory::new(name), color);
        }
        for (name, color) in datatypes {
            theme.set_datatype_color(DataType::new(name), color);
        }
        Ok(())
    }

    /// Default theme with the overrides applied
    pub fn into_theme(self) -> Result<Theme, ConfigError> {
        let mut theme = Theme::default();
        self.apply(&mut theme)?;
        Ok(theme)
    }
}

fn parse_table(table: &BTreeMap<String, String>) -> Result<Vec<(&str, egui::Color32)>, ConfigError> {
    table
        .iter()
        .map(|(key, value)| {
            parse_hex_color(value)
                .map(|color| (key.as_str(), color))
                .ok_or_else(|| ConfigError::InvalidColor {
                    key: key.clone(),
                    value: value.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn test_parse_and_apply() {
        let config = StyleConfig::from_json_str(
            r##"{
                "category_colors": { "FILTER": "#102030" },
                "datatype_colors": { "MESH": "#40A0A080" }
            }"##,
        )
        .unwrap();

        let theme = config.into_theme().unwrap();
        assert_eq!(theme.category_color(&NodeCategory::FILTER), Ok(Color32::from_rgb(0x10, 0x20, 0x30)));
        assert_eq!(
            theme.datatype_color(&DataType::new("MESH"), "mesh"),
            Ok(Color32::from_rgba_unmultiplied(0x40, 0xA0, 0xA0, 0x80))
        );
        // Built-ins survive
        assert!(theme.datatype_color(&DataType::VALUE, "v").is_ok());
    }

    #[test]
    fn test_missing_sections_default() {
        let config = StyleConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StyleConfig::default());
    }

    #[test]
    fn test_invalid_color_leaves_theme_untouched() {
        let config = StyleConfig::from_json_str(
            r##"{
                "category_colors": { "FILTER": "#102030" },
                "datatype_colors": { "MESH": "teal" }
            }"##,
        )
        .unwrap();

        let mut theme = Theme::default();
        let err = config.apply(&mut theme).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { ref key, .. } if key == "MESH"));
        assert_eq!(theme, Theme::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            StyleConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = StyleConfig::load(Path::new("/nonexistent/nodecanvas/style.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("nodecanvas-style-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r##"{ "datatype_colors": { "VALUE": "#FFFFFF" } }"##).unwrap();

        let config = StyleConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.datatype_colors.get("VALUE").map(String::as_str), Some("#FFFFFF"));
        assert!(config.category_colors.is_empty());
    }
}
