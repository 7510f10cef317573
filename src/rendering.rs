//! Drawing seam between the node model and a rendering backend
//!
//! Nodes and sockets draw through the [`Canvas`] trait. [`PainterCanvas`]
//! forwards to an `egui::Painter`; [`RecordingCanvas`] keeps the operations
//! in a list so drawing can be inspected without a window.

use crate::nodes::NodeId;
use egui::{
    Align2, Color32, ColorImage, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, TextureHandle,
    TextureOptions,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Font size of node and socket labels
const LABEL_FONT_SIZE: f32 = 11.0;

/// Identity of a bitmap drawn on the canvas, used to cache its texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKey {
    ExpandIcon,
    Checkerboard,
    /// A node's thumbnail; `generation` changes whenever the bitmap is replaced
    Thumbnail { node: NodeId, generation: u64 },
}

/// Drawing operations needed by the node drawing contract
pub trait Canvas {
    fn rect(&mut self, rect: Rect, rounding: f32, fill: Color32, stroke: Stroke);
    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke);
    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, color: Color32);
    /// Draws `image` stretched over `rect`
    fn image(&mut self, key: ImageKey, image: &Arc<ColorImage>, rect: Rect);
    /// Fills `rect` with `image` repeated at its natural size
    fn pattern(&mut self, key: ImageKey, image: &Arc<ColorImage>, rect: Rect);
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect { rect: Rect, rounding: f32, fill: Color32, stroke: Stroke },
    Circle { center: Pos2, radius: f32, fill: Color32, stroke: Stroke },
    Text { pos: Pos2, anchor: Align2, text: String, color: Color32 },
    Image { key: ImageKey, rect: Rect },
    Pattern { key: ImageKey, rect: Rect },
}

/// Canvas that records every operation in order
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded texts in drawing order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Recorded image and pattern keys in drawing order
    pub fn images(&self) -> Vec<ImageKey> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { key, .. } | DrawOp::Pattern { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn rect(&mut self, rect: Rect, rounding: f32, fill: Color32, stroke: Stroke) {
        self.ops.push(DrawOp::Rect { rect, rounding, fill, stroke });
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        self.ops.push(DrawOp::Circle { center, radius, fill, stroke });
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, color: Color32) {
        self.ops.push(DrawOp::Text {
            pos,
            anchor,
            text: text.to_string(),
            color,
        });
    }

    fn image(&mut self, key: ImageKey, _image: &Arc<ColorImage>, rect: Rect) {
        self.ops.push(DrawOp::Image { key, rect });
    }

    fn pattern(&mut self, key: ImageKey, _image: &Arc<ColorImage>, rect: Rect) {
        self.ops.push(DrawOp::Pattern { key, rect });
    }
}

/// Textures uploaded for [`ImageKey`]s, kept across frames
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<ImageKey, TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_upload(
        &mut self,
        ctx: &egui::Context,
        key: ImageKey,
        image: &Arc<ColorImage>,
        options: TextureOptions,
    ) -> &TextureHandle {
        if let ImageKey::Thumbnail { node, generation } = key {
            // Drop textures of replaced thumbnails
            self.textures.retain(|existing, _| match existing {
                ImageKey::Thumbnail { node: n, generation: g } => *n != node || *g == generation,
                _ => true,
            });
        }
        self.textures.entry(key).or_insert_with(|| {
            log::debug!("Uploading texture for {:?}", key);
            ctx.load_texture(format!("{:?}", key), (**image).clone(), options)
        })
    }

    /// Drops thumbnail textures of nodes not in `nodes`
    pub fn retain_nodes(&mut self, nodes: &[NodeId]) {
        let before = self.textures.len();
        self.textures.retain(|key, _| match key {
            ImageKey::Thumbnail { node, .. } => nodes.contains(node),
            _ => true,
        });
        let evicted = before - self.textures.len();
        if evicted > 0 {
            log::debug!("Evicted {} thumbnail textures", evicted);
        }
    }

    /// Number of live textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Canvas backed by an `egui::Painter`.
///
/// Every coordinate is translated by `offset`, which maps graph space to
/// screen space for a panned view.
pub struct PainterCanvas<'a> {
    painter: &'a Painter,
    textures: &'a mut TextureCache,
    offset: egui::Vec2,
}

impl<'a> PainterCanvas<'a> {
    pub fn new(painter: &'a Painter, textures: &'a mut TextureCache, offset: egui::Vec2) -> Self {
        Self {
            painter,
            textures,
            offset,
        }
    }
}

impl Canvas for PainterCanvas<'_> {
    fn rect(&mut self, rect: Rect, rounding: f32, fill: Color32, stroke: Stroke) {
        self.painter.rect(
            rect.translate(self.offset),
            rounding,
            fill,
            stroke,
            StrokeKind::Inside,
        );
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        self.painter.circle(center + self.offset, radius, fill, stroke);
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, color: Color32) {
        self.painter.text(
            pos + self.offset,
            anchor,
            text,
            FontId::proportional(LABEL_FONT_SIZE),
            color,
        );
    }

    fn image(&mut self, key: ImageKey, image: &Arc<ColorImage>, rect: Rect) {
        let texture = self
            .textures
            .get_or_upload(self.painter.ctx(), key, image, TextureOptions::LINEAR);
        self.painter.image(
            texture.id(),
            rect.translate(self.offset),
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    fn pattern(&mut self, key: ImageKey, image: &Arc<ColorImage>, rect: Rect) {
        let texture =
            self.textures
                .get_or_upload(self.painter.ctx(), key, image, TextureOptions::LINEAR_REPEAT);
        self.painter.image(
            texture.id(),
            rect.translate(self.offset),
            pattern_uv(rect, image.size),
            Color32::WHITE,
        );
    }
}

/// UV rectangle repeating a `size` bitmap over `rect` at one texel per unit
fn pattern_uv(rect: Rect, size: [usize; 2]) -> Rect {
    let [width, height] = size;
    Rect::from_min_max(
        Pos2::ZERO,
        Pos2::new(rect.width() / width.max(1) as f32, rect.height() / height.max(1) as f32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_canvas_keeps_order() {
        let mut canvas = RecordingCanvas::new();
        let image = Arc::new(ColorImage::new([1, 1], Color32::WHITE));
        canvas.rect(Rect::from_min_size(Pos2::ZERO, egui::vec2(4.0, 4.0)), 1.0, Color32::GRAY, Stroke::NONE);
        canvas.text(Pos2::ZERO, Align2::LEFT_TOP, "A", Color32::WHITE);
        canvas.image(ImageKey::ExpandIcon, &image, Rect::NOTHING);
        canvas.text(Pos2::ZERO, Align2::LEFT_TOP, "B", Color32::WHITE);

        assert_eq!(canvas.ops.len(), 4);
        assert!(matches!(canvas.ops[0], DrawOp::Rect { .. }));
        assert_eq!(canvas.texts(), vec!["A", "B"]);
        assert_eq!(canvas.images(), vec![ImageKey::ExpandIcon]);
    }

    #[test]
    fn test_pattern_uv_repeats_per_texel() {
        let frame = Rect::from_min_size(Pos2::new(8.0, 100.0), egui::vec2(120.0, 48.0));
        let uv = pattern_uv(frame, [16, 16]);
        assert_eq!(uv, Rect::from_min_max(Pos2::ZERO, Pos2::new(7.5, 3.0)));
    }

    #[test]
    fn test_retain_nodes_evicts_removed_thumbnails() {
        let ctx = egui::Context::default();
        let image = Arc::new(ColorImage::new([2, 2], Color32::WHITE));
        let (kept, removed) = (NodeId::new_v4(), NodeId::new_v4());

        let mut cache = TextureCache::new();
        cache.get_or_upload(&ctx, ImageKey::Checkerboard, &image, TextureOptions::LINEAR_REPEAT);
        for node in [kept, removed] {
            cache.get_or_upload(&ctx, ImageKey::Thumbnail { node, generation: 0 }, &image, TextureOptions::LINEAR);
        }
        assert_eq!(cache.len(), 3);

        cache.retain_nodes(&[kept]);

        assert_eq!(cache.len(), 2);
        assert!(cache.textures.contains_key(&ImageKey::Thumbnail { node: kept, generation: 0 }));
        assert!(cache.textures.contains_key(&ImageKey::Checkerboard));
    }

    #[test]
    fn test_new_generation_replaces_thumbnail_texture() {
        let ctx = egui::Context::default();
        let image = Arc::new(ColorImage::new([2, 2], Color32::WHITE));
        let node = NodeId::new_v4();

        let mut cache = TextureCache::new();
        cache.get_or_upload(&ctx, ImageKey::Thumbnail { node, generation: 0 }, &image, TextureOptions::LINEAR);
        cache.get_or_upload(&ctx, ImageKey::Thumbnail { node, generation: 1 }, &image, TextureOptions::LINEAR);

        assert_eq!(cache.len(), 1);
        assert!(cache.textures.contains_key(&ImageKey::Thumbnail { node, generation: 1 }));
    }
}
