//! Bitmaps shared by every node: the expand icon and the checkerboard drawn
//! behind thumbnails
//!
//! Both are generated once per process and never change afterwards. Nodes
//! receive them through [`GraphContext`](crate::nodes::GraphContext) instead
//! of reaching for the global.

use crate::constants::expand_icon;
use egui::{Color32, ColorImage};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Side of one checkerboard cell in pixels
const CHECKER_CELL: usize = 8;

/// Read-only bitmap resources
#[derive(Debug, Clone)]
pub struct Assets {
    pub expand_icon: Arc<ColorImage>,
    pub checkerboard: Arc<ColorImage>,
}

static SHARED_ASSETS: Lazy<Arc<Assets>> = Lazy::new(|| {
    log::debug!("Generating shared node assets");
    Arc::new(Assets::generate())
});

impl Assets {
    /// Process-wide instance, generated on first use
    pub fn shared() -> Arc<Assets> {
        SHARED_ASSETS.clone()
    }

    /// Build a fresh set of assets
    pub fn generate() -> Self {
        Self {
            expand_icon: Arc::new(image_icon(expand_icon::SIZE as usize)),
            checkerboard: Arc::new(checkerboard(CHECKER_CELL * 2, CHECKER_CELL)),
        }
    }
}

/// Empty, fully transparent bitmap
pub fn empty_bitmap(width: usize, height: usize) -> ColorImage {
    ColorImage::new([width, height], Color32::TRANSPARENT)
}

fn checkerboard(side: usize, cell: usize) -> ColorImage {
    let light = Color32::from_rgb(0x99, 0x99, 0x99);
    let dark = Color32::from_rgb(0x66, 0x66, 0x66);
    let mut image = ColorImage::new([side, side], light);
    for y in 0..side {
        for x in 0..side {
            if ((x / cell) + (y / cell)) % 2 == 1 {
                image.pixels[y * side + x] = dark;
            }
        }
    }
    image
}

/// Small "picture" glyph: a framed square with a filled lower half
fn image_icon(side: usize) -> ColorImage {
    let frame = Color32::from_rgb(0xE0, 0xE0, 0xE0);
    let fill = Color32::from_rgb(0x9A, 0x9A, 0x9A);
    let mut image = ColorImage::new([side, side], Color32::TRANSPARENT);
    let last = side.saturating_sub(1);
    for y in 0..side {
        for x in 0..side {
            let on_frame = x == 0 || y == 0 || x == last || y == last;
            let in_lower_half = y > side / 2;
            if on_frame {
                image.pixels[y * side + x] = frame;
            } else if in_lower_half {
                image.pixels[y * side + x] = fill;
            }
        }
    }
    image
}
