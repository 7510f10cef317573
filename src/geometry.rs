//! Coordinate and color helpers shared by nodes and sockets

use egui::{Color32, Pos2, Rect, Vec2};

/// Checks whether two rectangles share a non-empty area.
///
/// Unlike [`Rect::intersects`], rectangles that only touch along an edge do
/// not count as overlapping.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Rectangle from a top-left corner and a size given as plain numbers
pub fn rect_xywh(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect::from_min_size(Pos2::new(x, y), Vec2::new(width, height))
}

/// Point in the coordinate space whose origin sits at `origin`
pub fn to_local(point: Pos2, origin: Pos2) -> Pos2 {
    (point - origin).to_pos2()
}

/// Lightens or darkens a color.
///
/// `amount` below 100 blends toward black, above 100 toward white; 100 leaves
/// the color unchanged. Alpha is preserved.
pub fn change_lightness(color: Color32, amount: u8) -> Color32 {
    let amount = amount.min(200) as f32;
    let (background, weight) = if amount > 100.0 {
        (255.0, (200.0 - amount) / 100.0)
    } else {
        (0.0, amount / 100.0)
    };
    let blend = |channel: u8| -> u8 {
        (channel as f32 * weight + background * (1.0 - weight)).round() as u8
    };
    Color32::from_rgba_unmultiplied(
        blend(color.r()),
        blend(color.g()),
        blend(color.b()),
        color.a(),
    )
}

/// Parses `#RRGGBB` or `#RRGGBBAA`
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    Color32::from_hex(value.trim()).ok()
}
