use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Embed PNG bytes as a `data:image/png;base64,...` URL.
pub(crate) fn png_data_url(png: &[u8]) -> String {
    let mut out = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len().div_ceil(3) * 4);
    out.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut out);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/inline.rs"]
mod tests;
