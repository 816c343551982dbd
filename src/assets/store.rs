use std::sync::Arc;

use crate::foundation::error::{MockupError, MockupResult};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> MockupResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| MockupError::validation("image size overflow"))?;
        if width == 0 || height == 0 || rgba8_premul.len() != expected {
            return Err(MockupError::validation(
                "prepared image expects non-empty width*height*4 premultiplied bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub(crate) fn px(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let d = &self.rgba8_premul;
        [d[idx], d[idx + 1], d[idx + 2], d[idx + 3]]
    }
}

/// Raster formats accepted for customer designs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DesignFormat {
    Png,
    Jpeg,
}

/// The customer's uploaded artwork, decoded and owned by one composer session.
#[derive(Clone, Debug)]
pub struct DesignAsset {
    pub image: PreparedImage,
    pub format: DesignFormat,
    /// Size of the encoded upload in bytes.
    pub byte_len: u64,
}
