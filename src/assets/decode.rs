use std::path::Path;

use anyhow::Context;

use crate::assets::store::{DesignAsset, DesignFormat, PreparedImage};
use crate::foundation::error::{MockupError, MockupResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Default ceiling for uploaded design files (10 MiB).
pub const MAX_DESIGN_BYTES: u64 = 10 * 1024 * 1024;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MockupResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| MockupError::asset_load(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage::from_premul(width, height, rgba8_premul)
}

/// Read and decode an image file (garment base art).
pub fn load_image_file(path: &Path) -> MockupResult<PreparedImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))
        .map_err(|e| MockupError::asset_load(format!("{e:#}")))?;
    decode_image(&bytes)
}

/// Validate an uploaded design file, then decode it.
///
/// Checks run cheapest first and nothing is decoded unless the size ceiling and the
/// format whitelist (PNG/JPEG) both pass. `declared_mime` is the type reported by the
/// upload form, if any; it must agree with the whitelist too.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_design(
    bytes: &[u8],
    declared_mime: Option<&str>,
    max_bytes: u64,
) -> MockupResult<DesignAsset> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(MockupError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }

    if let Some(mime) = declared_mime {
        let mime = mime.trim().to_ascii_lowercase();
        if mime != "image/png" && mime != "image/jpeg" && mime != "image/jpg" {
            return Err(MockupError::invalid_file_type(format!(
                "only PNG and JPG files are supported (got {mime})"
            )));
        }
    }

    let format = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => DesignFormat::Png,
        Ok(image::ImageFormat::Jpeg) => DesignFormat::Jpeg,
        Ok(other) => {
            return Err(MockupError::invalid_file_type(format!(
                "only PNG and JPG files are supported (got {other:?})"
            )));
        }
        Err(_) => {
            return Err(MockupError::invalid_file_type(
                "unrecognized image data; only PNG and JPG files are supported",
            ));
        }
    };

    let image = decode_image(bytes)?;
    tracing::debug!(
        width = image.width,
        height = image.height,
        ?format,
        "design decoded"
    );
    Ok(DesignAsset {
        image,
        format,
        byte_len: size,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
