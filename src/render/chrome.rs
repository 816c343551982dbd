//! Selection affordances drawn over the design while editing.
//!
//! None of this is ever part of an exported mockup.

use crate::composer::geometry::GeometryState;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::render::composite::over;

pub(crate) const SELECTION_COLOR: Rgba8Premul = Rgba8Premul {
    r: 0x8B,
    g: 0x5C,
    b: 0xF6,
    a: 0xFF,
};
pub(crate) const DASH_ON: i64 = 4;
pub(crate) const DASH_OFF: i64 = 4;
pub(crate) const HANDLE_SIZE: f64 = 8.0;
/// Pixel coordinates are clamped to this magnitude before integer math.
const COORD_LIMIT: f64 = (1u64 << 40) as f64;

fn to_px(v: f64) -> i64 {
    v.clamp(-COORD_LIMIT, COORD_LIMIT) as i64
}

/// Draw the dashed 1-px outline and the bottom-right resize handle.
pub(crate) fn draw_selection(dst: &mut [u8], canvas: Canvas, geometry: &GeometryState) {
    if dst.len() != canvas.byte_len() {
        return;
    }
    let bounds = geometry.bounds();
    let x0 = to_px(bounds.x0.floor());
    let y0 = to_px(bounds.y0.floor());
    let x1 = (to_px(bounds.x1.ceil()) - 1).max(x0);
    let y1 = (to_px(bounds.y1.ceil()) - 1).max(y0);

    // Dash phase is the clockwise perimeter distance from the top-left corner.
    let w = x1 - x0;
    let h = y1 - y0;
    let mut dash = |x: i64, y: i64, phase: i64| {
        if phase.rem_euclid(DASH_ON + DASH_OFF) < DASH_ON {
            put_px(dst, canvas, x, y, SELECTION_COLOR.to_array());
        }
    };
    let (cx0, cx1) = (x0.max(-1), x1.min(i64::from(canvas.width)));
    let (cy0, cy1) = (y0.max(-1), y1.min(i64::from(canvas.height)));
    for x in cx0..=cx1 {
        dash(x, y0, x - x0);
        if h > 0 {
            dash(x, y1, w + h + (x1 - x));
        }
    }
    for y in cy0.max(y0 + 1)..=cy1.min(y1 - 1) {
        dash(x1, y, w + (y - y0));
        if w > 0 {
            dash(x0, y, 2 * w + h + (y1 - y));
        }
    }

    let corner = geometry.resize_corner();
    let hx = to_px((corner.x - HANDLE_SIZE / 2.0).round());
    let hy = to_px((corner.y - HANDLE_SIZE / 2.0).round());
    let side = HANDLE_SIZE as i64;
    for y in hy..hy + side {
        for x in hx..hx + side {
            put_px(dst, canvas, x, y, SELECTION_COLOR.to_array());
        }
    }
}

fn put_px(dst: &mut [u8], canvas: Canvas, x: i64, y: i64, px: [u8; 4]) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width) || y >= i64::from(canvas.height) {
        return;
    }
    let i = ((y as usize) * (canvas.width as usize) + (x as usize)) * 4;
    let d = &mut dst[i..i + 4];
    let out = over([d[0], d[1], d[2], d[3]], px);
    d.copy_from_slice(&out);
}

#[cfg(test)]
#[path = "../../tests/unit/render/chrome.rs"]
mod tests;
