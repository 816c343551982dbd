use rayon::prelude::*;

use crate::assets::store::PreparedImage;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{MockupError, MockupResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

pub type PremulRgba8 = [u8; 4];

/// Separable blend modes supported by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Porter-Duff source-over.
    Normal,
    /// Source-over with `B(s, d) = s * d` on unpremultiplied channels.
    Multiply,
}

pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    out[3] = add_sat_u8(src[3], mul_div255_u8(u16::from(dst[3]), inv));
    for c in 0..3 {
        let dc = mul_div255_u8(u16::from(dst[c]), inv);
        out[c] = add_sat_u8(src[c], dc);
    }
    out
}

pub fn multiply(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }

    // out_a = sa + da * (1 - sa)
    // out_p = sp * (1 - da) + dp * (1 - sa) + (sc * dc) * sa * da
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;

    let mut out = [0u8; 4];
    for c in 0..3 {
        let sp = f32::from(src[c]) / 255.0;
        let dp = f32::from(dst[c]) / 255.0;
        let sc = if sa > 0.0 { (sp / sa).clamp(0.0, 1.0) } else { 0.0 };
        let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
        let b = (sc * dc).clamp(0.0, 1.0);
        let out_p = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
        out[c] = (out_p * 255.0).round() as u8;
    }
    let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);
    out[3] = (out_a * 255.0).round() as u8;
    out
}

pub fn fill_in_place(dst: &mut [u8], px: PremulRgba8) {
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

/// Composite two equal-size premultiplied buffers.
pub fn composite_in_place(dst: &mut [u8], src: &[u8], blend: BlendMode) -> MockupResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MockupError::validation(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }

    // Dispatch once per op, not per pixel.
    match blend {
        BlendMode::Normal => composite_with(dst, src, over),
        BlendMode::Multiply => composite_with(dst, src, multiply),
    }
    Ok(())
}

fn composite_with<F>(dst: &mut [u8], src: &[u8], blend_px: F)
where
    F: Fn(PremulRgba8, PremulRgba8) -> PremulRgba8 + Sync,
{
    dst.par_chunks_mut(4 * 1024)
        .zip(src.par_chunks(4 * 1024))
        .for_each(|(d, s)| {
            for (d, s) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
                let out = blend_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        });
}

/// Bilinear sample in texel space (texel centers at integer coordinates), clamped to edge.
fn sample_bilinear(img: &PreparedImage, u: f64, v: f64) -> PremulRgba8 {
    let max_x = f64::from(img.width - 1);
    let max_y = f64::from(img.height - 1);
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;
    let x0 = x0 as u32;
    let y0 = y0 as u32;
    let x1 = (x0 + 1).min(img.width - 1);
    let y1 = (y0 + 1).min(img.height - 1);

    let p00 = img.px(x0, y0);
    let p10 = img.px(x1, y0);
    let p01 = img.px(x0, y1);
    let p11 = img.px(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Resample `img` to exactly `canvas` size.
pub fn resample_to(img: &PreparedImage, canvas: Canvas) -> Vec<u8> {
    let mut out = vec![0u8; canvas.byte_len()];
    draw_image_in_rect(&mut out, canvas, img, canvas.bounds(), BlendMode::Normal);
    out
}

/// Draw `img` stretched into `rect` (logical pixels, may extend past the canvas).
///
/// A destination pixel is covered when its center lies inside `rect`; everything
/// outside the canvas is clipped.
pub fn draw_image_in_rect(
    dst: &mut [u8],
    canvas: Canvas,
    img: &PreparedImage,
    rect: Rect,
    blend: BlendMode,
) {
    match blend {
        BlendMode::Normal => draw_image_with(dst, canvas, img, rect, over),
        BlendMode::Multiply => draw_image_with(dst, canvas, img, rect, multiply),
    }
}

fn draw_image_with<F>(dst: &mut [u8], canvas: Canvas, img: &PreparedImage, rect: Rect, blend_px: F)
where
    F: Fn(PremulRgba8, PremulRgba8) -> PremulRgba8 + Sync,
{
    let rect = rect.abs();
    if rect.width() <= 0.0 || rect.height() <= 0.0 || dst.len() != canvas.byte_len() {
        return;
    }
    let clip = rect.intersect(canvas.bounds());
    if clip.width() <= 0.0 || clip.height() <= 0.0 {
        return;
    }

    let sx = f64::from(img.width) / rect.width();
    let sy = f64::from(img.height) / rect.height();
    let x_start = clip.x0.floor().max(0.0) as u32;
    let x_end = (clip.x1.ceil() as u32).min(canvas.width);
    let y_start = clip.y0.floor().max(0.0) as usize;
    let y_end = (clip.y1.ceil() as usize).min(canvas.height as usize);
    let row_bytes = canvas.width as usize * 4;

    dst.par_chunks_exact_mut(row_bytes)
        .enumerate()
        .skip(y_start)
        .take(y_end.saturating_sub(y_start))
        .for_each(|(y, row)| {
            let cy = y as f64 + 0.5;
            if cy < rect.y0 || cy >= rect.y1 {
                return;
            }
            let v = (cy - rect.y0) * sy - 0.5;
            for x in x_start..x_end {
                let cx = f64::from(x) + 0.5;
                if cx < rect.x0 || cx >= rect.x1 {
                    continue;
                }
                let u = (cx - rect.x0) * sx - 0.5;
                let s = sample_bilinear(img, u, v);
                let i = x as usize * 4;
                let d = &mut row[i..i + 4];
                let out = blend_px([d[0], d[1], d[2], d[3]], s);
                d.copy_from_slice(&out);
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
