use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::load_image_file;
use crate::assets::store::PreparedImage;
use crate::composer::garment::{GarmentState, ViewSide};
use crate::composer::geometry::GeometryState;
use crate::foundation::core::Canvas;
use crate::render::chrome::draw_selection;
use crate::render::composite::{
    BlendMode, composite_in_place, draw_image_in_rect, fill_in_place, resample_to,
};
use crate::render::frame::FrameRGBA;

/// Whether selection chrome is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Live editing: dashed outline and resize handle over the design.
    Interactive,
    /// Clean output for the saved mockup.
    Export,
}

/// Everything the compositor reads for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub garment: &'a GarmentState,
    pub geometry: &'a GeometryState,
    pub design: Option<&'a PreparedImage>,
}

/// Renders garment + color + design into a premultiplied RGBA8 frame.
///
/// Garment base images are resampled to the canvas once, when they are installed, so
/// each render is a fill, one multiply pass and one scaled design draw.
#[derive(Clone, Debug)]
pub struct Compositor {
    canvas: Canvas,
    front: Option<Arc<Vec<u8>>>,
    back: Option<Arc<Vec<u8>>>,
}

impl Compositor {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            front: None,
            back: None,
        }
    }

    /// Build a compositor from garment base files.
    ///
    /// Load failures are logged and leave that side empty; rendering then no-ops for
    /// views that have no base image.
    pub fn from_files(canvas: Canvas, front: &Path, back: Option<&Path>) -> Self {
        let mut out = Self::new(canvas);
        match load_image_file(front) {
            Ok(img) => out.set_garment_base(ViewSide::Front, &img),
            Err(err) => {
                tracing::warn!(path = %front.display(), %err, "garment base image failed to load")
            }
        }
        if let Some(back) = back {
            match load_image_file(back) {
                Ok(img) => out.set_garment_base(ViewSide::Back, &img),
                Err(err) => {
                    tracing::warn!(path = %back.display(), %err, "back garment image failed to load")
                }
            }
        }
        out
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn set_garment_base(&mut self, side: ViewSide, img: &PreparedImage) {
        let resampled = Arc::new(resample_to(img, self.canvas));
        match side {
            ViewSide::Front => self.front = Some(resampled),
            ViewSide::Back => self.back = Some(resampled),
        }
    }

    pub fn has_garment_base(&self) -> bool {
        self.front.is_some()
    }

    /// The back view falls back to the front art when no back image is installed.
    fn base_for(&self, side: ViewSide) -> Option<&Arc<Vec<u8>>> {
        match side {
            ViewSide::Front => self.front.as_ref(),
            ViewSide::Back => self.back.as_ref().or(self.front.as_ref()),
        }
    }

    /// Render one frame. Returns `None` (and draws nothing) when no garment base image
    /// is available for the requested view.
    #[tracing::instrument(level = "trace", skip(self, scene))]
    pub fn render(&self, scene: &Scene<'_>, mode: RenderMode) -> Option<FrameRGBA> {
        let Some(base) = self.base_for(scene.garment.view_side) else {
            tracing::warn!("garment base image unavailable; skipping render");
            return None;
        };

        let canvas = self.canvas;
        let mut data = vec![0u8; canvas.byte_len()];
        fill_in_place(&mut data, scene.garment.color.to_rgba8_premul().to_array());
        if let Err(err) = composite_in_place(&mut data, base, BlendMode::Multiply) {
            tracing::warn!(%err, "garment multiply pass failed; skipping render");
            return None;
        }

        if let Some(design) = scene.design {
            draw_image_in_rect(
                &mut data,
                canvas,
                design,
                scene.geometry.bounds(),
                BlendMode::Normal,
            );
            if mode == RenderMode::Interactive {
                draw_selection(&mut data, canvas, scene.geometry);
            }
        }

        Some(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
