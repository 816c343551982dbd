use super::*;

#[test]
fn canvas_rejects_empty_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(3, 2).unwrap();
    assert_eq!(c.pixel_count(), 6);
    assert_eq!(c.byte_len(), 24);
}

#[test]
fn canvas_bounds_cover_full_surface() {
    let c = Canvas::default();
    assert_eq!(c.bounds(), Rect::new(0.0, 0.0, 300.0, 400.0));
}

#[test]
fn opaque_color_has_full_alpha() {
    assert_eq!(Rgba8Premul::opaque(1, 2, 3).to_array(), [1, 2, 3, 255]);
}
