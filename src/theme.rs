//! Color tables and node palette
//!
//! A [`Theme`] maps node categories to header colors and socket datatypes to
//! connector colors. Both lookups fail on unknown keys; a missing entry means
//! a node kind declared something the editor was never configured for.

use crate::error::NodeError;
use crate::nodes::{DataType, NodeCategory};
use egui::Color32;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed palette used by the node drawing contract
#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub body_fill: Color32,
    pub body_fill_muted: Color32,
    pub border: Color32,
    pub border_highlight: Color32,
    pub header_muted: Color32,
    pub label: Color32,
    pub socket_border: Color32,
    pub thumbnail_border: Color32,
    pub wire: Color32,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            body_fill: Color32::from_rgba_unmultiplied(70, 70, 70, 150),
            body_fill_muted: Color32::from_rgba_unmultiplied(70, 70, 70, 90),
            border: Color32::from_rgb(31, 31, 31),
            border_highlight: Color32::WHITE,
            header_muted: Color32::from_rgb(70, 70, 70),
            label: Color32::WHITE,
            socket_border: Color32::from_rgb(0x1C, 0x1C, 0x1C),
            thumbnail_border: Color32::from_rgb(0x2B, 0x2B, 0x2B),
            wire: Color32::from_rgb(0xB0, 0xB0, 0xB0),
        }
    }
}

/// Complete theme: palette plus the two lookup tables
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub colors: Colors,
    category_colors: HashMap<NodeCategory, Color32>,
    datatype_colors: HashMap<DataType, Color32>,
}

impl Default for Theme {
    fn default() -> Self {
        let category_colors = [
            (NodeCategory::INPUT, Color32::from_rgb(0xE6, 0x45, 0x55)),
            (NodeCategory::DRAW, Color32::from_rgb(0xAF, 0x44, 0x67)),
            (NodeCategory::MASK, Color32::from_rgb(0x08, 0x4D, 0x4D)),
            (NodeCategory::CONVERT, Color32::from_rgb(0x56, 0x4B, 0x7C)),
            (NodeCategory::VALUE, Color32::from_rgb(0xCC, 0x70, 0x3A)),
            (NodeCategory::FILTER, Color32::from_rgb(0x55, 0x83, 0x33)),
            (NodeCategory::BLEND, Color32::from_rgb(0x49, 0x8D, 0xB8)),
            (NodeCategory::COLOR, Color32::from_rgb(0xC2, 0xAF, 0x3A)),
            (NodeCategory::DISTORT, Color32::from_rgb(0x6B, 0x8B, 0x8B)),
            (NodeCategory::OUTPUT, Color32::from_rgb(0xB3, 0x36, 0x41)),
            (NodeCategory::DEFAULT, Color32::from_rgb(0x48, 0x48, 0x48)),
        ]
        .into_iter()
        .collect();

        let datatype_colors = [
            (DataType::RGBA_IMAGE, Color32::from_rgb(0xC6, 0xC6, 0x2E)),
            (DataType::VALUE, Color32::from_rgb(0xA1, 0xA1, 0xA1)),
            (DataType::INTEGER, Color32::from_rgb(0x59, 0x8C, 0x5C)),
            (DataType::VECTOR, Color32::from_rgb(0x63, 0x63, 0xC7)),
            (DataType::COLOR, Color32::from_rgb(0xC7, 0x63, 0x63)),
            (DataType::BOOLEAN, Color32::from_rgb(0xCC, 0xA6, 0xD6)),
            (DataType::STRING, Color32::from_rgb(0x70, 0xB2, 0xFF)),
        ]
        .into_iter()
        .collect();

        Self {
            colors: Colors::default(),
            category_colors,
            datatype_colors,
        }
    }
}

impl Theme {
    /// Header color for a category
    pub fn category_color(&self, category: &NodeCategory) -> Result<Color32, NodeError> {
        self.category_colors
            .get(category)
            .copied()
            .ok_or_else(|| NodeError::UnknownCategory(category.clone()))
    }

    /// Connector color for a datatype. `socket` names the socket asking, for
    /// the error message.
    pub fn datatype_color(&self, datatype: &DataType, socket: &str) -> Result<Color32, NodeError> {
        self.datatype_colors
            .get(datatype)
            .copied()
            .ok_or_else(|| NodeError::UnknownDatatype {
                socket: socket.to_string(),
                datatype: datatype.clone(),
            })
    }

    /// Add or replace a category color
    pub fn set_category_color(&mut self, category: NodeCategory, color: Color32) {
        self.category_colors.insert(category, color);
    }

    /// Add or replace a datatype color
    pub fn set_datatype_color(&mut self, datatype: DataType, color: Color32) {
        self.datatype_colors.insert(datatype, color);
    }
}

/// Process-wide default theme
static GLOBAL_THEME: Lazy<Arc<Theme>> = Lazy::new(|| Arc::new(Theme::default()));

/// Shared handle to the default theme
pub fn default_theme() -> Arc<Theme> {
    GLOBAL_THEME.clone()
}
