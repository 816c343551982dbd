use super::*;

#[test]
fn data_url_has_png_prefix_and_standard_padding() {
    assert_eq!(png_data_url(b""), "data:image/png;base64,");
    assert_eq!(png_data_url(b"\x89PNG"), "data:image/png;base64,iVBORw==");
}

#[test]
fn payload_decodes_back_to_input() {
    let bytes: Vec<u8> = (0..=255u8).collect();
    let url = png_data_url(&bytes);
    let payload = url.strip_prefix("data:image/png;base64,").unwrap();
    assert_eq!(STANDARD.decode(payload).unwrap(), bytes);
}
