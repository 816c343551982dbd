use super::*;
use crate::composer::garment::GarmentColor;
use crate::foundation::core::Point;

fn solid(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage::from_premul(w, h, px.repeat((w * h) as usize)).unwrap()
}

fn compositor_with_white_base(canvas: Canvas) -> Compositor {
    let mut c = Compositor::new(canvas);
    c.set_garment_base(ViewSide::Front, &solid(4, 4, [255, 255, 255, 255]));
    c
}

fn at(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

#[test]
fn missing_garment_base_renders_nothing() {
    let c = Compositor::new(Canvas::new(8, 8).unwrap());
    let garment = GarmentState::default();
    let geometry = GeometryState::new(Point::new(4.0, 4.0), 2.0, 2.0).unwrap();
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: None,
    };
    assert!(c.render(&scene, RenderMode::Interactive).is_none());
    assert!(!c.has_garment_base());
}

#[test]
fn white_base_shows_garment_color() {
    let canvas = Canvas::new(8, 8).unwrap();
    let c = compositor_with_white_base(canvas);
    let garment = GarmentState {
        color: GarmentColor::rgb(200, 30, 60),
        view_side: ViewSide::Front,
    };
    let geometry = GeometryState::new(Point::new(4.0, 4.0), 2.0, 2.0).unwrap();
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: None,
    };
    let frame = c.render(&scene, RenderMode::Export).unwrap();
    assert!(frame.premultiplied);
    assert_eq!(frame.data, [200u8, 30, 60, 255].repeat(64));
}

#[test]
fn shaded_base_darkens_color_by_multiply() {
    let canvas = Canvas::new(4, 4).unwrap();
    let mut c = Compositor::new(canvas);
    c.set_garment_base(ViewSide::Front, &solid(4, 4, [128, 128, 128, 255]));
    let garment = GarmentState {
        color: GarmentColor::rgb(128, 0, 0),
        view_side: ViewSide::Front,
    };
    let geometry = GeometryState::new(Point::new(2.0, 2.0), 1.0, 1.0).unwrap();
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: None,
    };
    let frame = c.render(&scene, RenderMode::Export).unwrap();
    assert_eq!(at(&frame, 0, 0), [64, 0, 0, 255]);
}

#[test]
fn transparent_base_leaves_flat_color() {
    let canvas = Canvas::new(4, 4).unwrap();
    let mut c = Compositor::new(canvas);
    c.set_garment_base(ViewSide::Front, &solid(2, 2, [0, 0, 0, 0]));
    let garment = GarmentState {
        color: GarmentColor::rgb(10, 20, 30),
        view_side: ViewSide::Front,
    };
    let geometry = GeometryState::new(Point::new(2.0, 2.0), 1.0, 1.0).unwrap();
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: None,
    };
    let frame = c.render(&scene, RenderMode::Export).unwrap();
    assert_eq!(frame.data, [10u8, 20, 30, 255].repeat(16));
}

#[test]
fn design_is_drawn_over_garment_at_geometry() {
    let canvas = Canvas::new(20, 20).unwrap();
    let c = compositor_with_white_base(canvas);
    let garment = GarmentState::default();
    let geometry = GeometryState::new(Point::new(10.0, 10.0), 4.0, 4.0).unwrap();
    let design = solid(3, 3, [0, 0, 255, 255]);
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: Some(&design),
    };
    let frame = c.render(&scene, RenderMode::Export).unwrap();
    assert_eq!(at(&frame, 8, 8), [0, 0, 255, 255]);
    assert_eq!(at(&frame, 11, 11), [0, 0, 255, 255]);
    assert_eq!(at(&frame, 7, 8), [255, 255, 255, 255]);
    assert_eq!(at(&frame, 12, 12), [255, 255, 255, 255]);
}

#[test]
fn export_is_deterministic_and_chrome_free() {
    let canvas = Canvas::new(40, 40).unwrap();
    let c = compositor_with_white_base(canvas);
    let garment = GarmentState::default();
    let geometry = GeometryState::new(Point::new(20.0, 20.0), 10.0, 10.0).unwrap();
    let design = solid(2, 2, [0, 255, 0, 255]);
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: Some(&design),
    };

    let a = c.render(&scene, RenderMode::Export).unwrap();
    let b = c.render(&scene, RenderMode::Export).unwrap();
    assert_eq!(a.data, b.data);

    let live = c.render(&scene, RenderMode::Interactive).unwrap();
    assert_ne!(live.data, a.data);
    let chrome = crate::render::chrome::SELECTION_COLOR.to_array();
    assert!(!a.data.chunks_exact(4).any(|p| p == chrome));
    assert!(live.data.chunks_exact(4).any(|p| p == chrome));
}

#[test]
fn back_view_uses_back_art_or_falls_back_to_front() {
    let canvas = Canvas::new(2, 2).unwrap();
    let mut c = Compositor::new(canvas);
    c.set_garment_base(ViewSide::Front, &solid(1, 1, [255, 255, 255, 255]));
    let garment = GarmentState {
        color: GarmentColor::rgb(100, 100, 100),
        view_side: ViewSide::Back,
    };
    let geometry = GeometryState::new(Point::new(1.0, 1.0), 1.0, 1.0).unwrap();
    let scene = Scene {
        garment: &garment,
        geometry: &geometry,
        design: None,
    };
    let fallback = c.render(&scene, RenderMode::Export).unwrap();
    assert_eq!(at(&fallback, 0, 0), [100, 100, 100, 255]);

    c.set_garment_base(ViewSide::Back, &solid(1, 1, [0, 0, 0, 255]));
    let back = c.render(&scene, RenderMode::Export).unwrap();
    assert_eq!(at(&back, 0, 0), [0, 0, 0, 255]);
}

#[test]
fn from_files_with_missing_paths_degrades_to_no_op() {
    let c = Compositor::from_files(
        Canvas::new(4, 4).unwrap(),
        Path::new("missing/front.png"),
        Some(Path::new("missing/back.png")),
    );
    assert!(!c.has_garment_base());
}
