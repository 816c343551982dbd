use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{MockupError, MockupResult};

/// Placement of the design on the canvas, in logical pixels.
///
/// The center is unconstrained: the design may sit partially or fully off-canvas.
/// `width` and `height` are always > 0.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryState {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl GeometryState {
    pub fn new(center: Point, width: f64, height: f64) -> MockupResult<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(MockupError::validation(
                "design width and height must be finite and > 0",
            ));
        }
        Ok(Self {
            center_x: center.x,
            center_y: center.y,
            width,
            height,
        })
    }

    /// Fit an image of the given pixel size into a `max_side` box centered at `center`.
    ///
    /// Landscape images get `width = max_side`; square and portrait images get
    /// `height = max_side`.
    pub fn fitted(center: Point, image_width: u32, image_height: u32, max_side: f64) -> Self {
        let ratio = if image_height == 0 {
            1.0
        } else {
            f64::from(image_width) / f64::from(image_height)
        };
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };

        let (width, height) = if ratio > 1.0 {
            (max_side, max_side / ratio)
        } else {
            (max_side * ratio, max_side)
        };
        Self {
            center_x: center.x,
            center_y: center.y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center(), (self.width, self.height))
    }

    pub fn resize_corner(&self) -> Point {
        Point::new(
            self.center_x + self.width / 2.0,
            self.center_y + self.height / 2.0,
        )
    }

    /// Inclusive bounding-box test.
    pub fn contains(&self, p: Point) -> bool {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        p.x >= self.center_x - half_w
            && p.x <= self.center_x + half_w
            && p.y >= self.center_y - half_h
            && p.y <= self.center_y + half_h
    }

    /// Whether `p` lies in the square resize hit region of side `hit_size`, centered on
    /// the bottom-right corner.
    pub fn hits_resize_handle(&self, p: Point, hit_size: f64) -> bool {
        let corner = self.resize_corner();
        let half = hit_size / 2.0;
        (p.x - corner.x).abs() <= half && (p.y - corner.y).abs() <= half
    }

    pub fn move_center_to(&mut self, center: Point) {
        self.center_x = center.x;
        self.center_y = center.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.center_x += delta.x;
        self.center_y += delta.y;
    }

    /// Scale both dimensions by `factor` about the center.
    ///
    /// The factor is raised as needed so the shorter side stays at or above `min_side`;
    /// a design already below `min_side` may grow but never shrink. A non-finite factor
    /// leaves the geometry untouched. Returns `true` when the size changed.
    pub fn scale_uniform(&mut self, factor: f64, min_side: f64) -> bool {
        if !factor.is_finite() {
            return false;
        }
        let shorter = self.width.min(self.height);
        let floor = if shorter > 0.0 {
            (min_side / shorter).min(1.0)
        } else {
            1.0
        };
        let factor = factor.max(floor);
        if factor == 1.0 {
            return false;
        }
        self.width *= factor;
        self.height *= factor;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composer/geometry.rs"]
mod tests;
