use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::assets::store::PreparedImage;
use crate::export::upload::UploadedImage;
use crate::foundation::core::{Canvas, Point};

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn session() -> ComposerSession {
    let cfg = ComposerConfig::default();
    let mut c = Compositor::new(cfg.canvas);
    let white = PreparedImage::from_premul(1, 1, vec![255; 4]).unwrap();
    c.set_garment_base(ViewSide::Front, &white);
    ComposerSession::with_compositor(cfg, c).unwrap()
}

fn session_with_design() -> ComposerSession {
    let mut s = session();
    s.load_design(&png_bytes(70, 100, [255, 0, 0, 255]), Some("image/png"))
        .unwrap();
    s.take_frame_request();
    s
}

#[derive(Default)]
struct CountingUploader {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingUploader {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageUploader for CountingUploader {
    fn upload(&self, png: &[u8]) -> MockupResult<UploadedImage> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(png.starts_with(b"\x89PNG"));
        if self.fail {
            return Err(MockupError::upload("503 Service Unavailable"));
        }
        Ok(UploadedImage {
            url: format!("https://i.ibb.co/{n}/mockup.png"),
            asset_id: Some(n.to_string()),
            delete_ref: None,
        })
    }
}

fn draft() -> OrderDraft {
    OrderDraft::start("tee-1", "Classic Tee", 499.0)
}

#[test]
fn portrait_design_is_fitted_at_origin() {
    let mut s = session();
    assert!(!s.editor_visible());
    s.load_design(&png_bytes(70, 100, [0, 0, 0, 255]), None)
        .unwrap();
    let g = s.geometry();
    assert_eq!(g.center(), Point::new(150.0, 150.0));
    assert_eq!(g.height, 150.0);
    assert!((g.width - 105.0).abs() < 1e-9);
    assert!(s.editor_visible());
    assert!(s.take_frame_request());
}

#[test]
fn rejected_upload_leaves_state_alone() {
    let mut s = session_with_design();
    let before = s.geometry();

    let err = s
        .load_design(b"GIF89a\x01\x00\x01\x00", Some("image/gif"))
        .unwrap_err();
    assert!(matches!(err, MockupError::InvalidFileType(_)));

    let mut small = ComposerConfig::default();
    small.max_design_bytes = 16;
    let mut tiny = ComposerSession::with_compositor(small, Compositor::new(Canvas::default()))
        .unwrap();
    assert!(matches!(
        tiny.load_design(&png_bytes(4, 4, [0; 4]), None),
        Err(MockupError::FileTooLarge { limit: 16, .. })
    ));
    assert!(!tiny.has_design());

    assert_eq!(s.geometry(), before);
    assert_eq!(s.design().unwrap().image.width, 70);
    assert!(!s.frame_pending());
}

#[test]
fn drag_moves_center_by_pointer_delta() {
    let mut s = session_with_design();
    let requested = s.dispatch([
        PointerEvent::Down { x: 140.0, y: 160.0 },
        PointerEvent::Move { x: 160.0, y: 150.0 },
        PointerEvent::Up,
    ]);
    assert!(requested);
    let g = s.geometry();
    assert_eq!(g.center(), Point::new(170.0, 140.0));
    assert_eq!(g.height, 150.0);
    assert_eq!(s.interaction_state(), InteractionState::Idle);
}

#[test]
fn pointer_input_without_design_is_ignored() {
    let mut s = session();
    let before = s.geometry();
    assert!(!s.dispatch([
        PointerEvent::Down { x: 150.0, y: 150.0 },
        PointerEvent::Move { x: 10.0, y: 10.0 },
    ]));
    assert_eq!(s.interaction_state(), InteractionState::Idle);
    assert_eq!(s.geometry(), before);
}

#[test]
fn frame_requests_coalesce_across_events() {
    let mut s = session_with_design();
    s.dispatch([PointerEvent::Down { x: 150.0, y: 150.0 }]);
    for i in 0..10 {
        s.handle_event(PointerEvent::Move {
            x: 150.0 + f64::from(i),
            y: 150.0,
        });
    }
    assert!(s.render_frame().is_some());
    assert!(s.render_frame().is_none());
}

#[test]
fn save_without_design_never_uploads() {
    let mut s = session();
    let up = CountingUploader::default();
    let mut d = draft();
    assert!(matches!(
        s.save(&up, &mut d),
        Err(MockupError::NoDesignLoaded)
    ));
    assert_eq!(up.calls(), 0);
    assert!(d.mockup().is_none());
    assert_eq!(s.save_state(), SaveState::Idle);
}

#[test]
fn save_without_garment_art_fails_before_upload() {
    let mut s = ComposerSession::with_compositor(
        ComposerConfig::default(),
        Compositor::new(Canvas::default()),
    )
    .unwrap();
    s.load_design(&png_bytes(10, 10, [0, 0, 0, 255]), None)
        .unwrap();
    let up = CountingUploader::default();
    assert!(matches!(
        s.save(&up, &mut draft()),
        Err(MockupError::AssetLoad(_))
    ));
    assert_eq!(up.calls(), 0);
    assert_eq!(s.save_state(), SaveState::Idle);
}

#[test]
fn successful_save_records_geometry_at_save_time() {
    let mut s = session_with_design();
    s.dispatch([
        PointerEvent::Down { x: 150.0, y: 150.0 },
        PointerEvent::Move { x: 170.0, y: 140.0 },
        PointerEvent::Up,
    ]);
    s.set_garment_color(GarmentColor::rgb(0x1E, 0x3A, 0x8A));
    let at_save = s.geometry();

    let up = CountingUploader::default();
    let mut d = draft();
    let outcome = s.save(&up, &mut d).unwrap();
    assert_eq!(up.calls(), 1);
    assert_eq!(outcome.notice(), Some("Mockup saved successfully!"));

    let saved = d.mockup().unwrap();
    assert_eq!(saved.geometry, at_save);
    assert_eq!(saved.garment_color, GarmentColor::rgb(0x1E, 0x3A, 0x8A));
    assert_eq!(saved.mockup_image_ref, "https://i.ibb.co/0/mockup.png");
    assert_eq!(s.save_state(), SaveState::Done);
    assert!(!s.editor_visible());
}

#[test]
fn failing_upload_saves_inline_copy() {
    let mut s = session_with_design();
    let up = CountingUploader::failing();
    let mut d = draft();
    let outcome = s.save(&up, &mut d).unwrap();
    assert_eq!(up.calls(), 1);
    assert_eq!(outcome.notice(), Some("Mockup saved locally (upload failed)"));
    let saved = d.mockup().unwrap();
    assert!(saved.mockup_image_ref.starts_with("data:image/png;base64,"));
    assert_eq!(s.save_state(), SaveState::FallbackDone);
}

#[test]
fn second_save_while_uploading_is_rejected() {
    let mut s = session_with_design();
    let ticket = s.begin_save().unwrap();
    assert_eq!(
        s.save_state(),
        SaveState::Uploading {
            generation: s.generation()
        }
    );
    assert!(matches!(s.begin_save(), Err(MockupError::SaveInFlight)));

    let mut d = draft();
    let outcome = s.finish_save(ticket.upload(&CountingUploader::default()), &mut d);
    assert!(matches!(outcome, SaveOutcome::Uploaded(_)));
    assert!(s.begin_save().is_ok());
}

#[test]
fn edits_during_upload_do_not_leak_into_descriptor() {
    let mut s = session_with_design();
    let snapshot = s.geometry();
    let ticket = s.begin_save().unwrap();

    s.dispatch([
        PointerEvent::Down { x: 150.0, y: 150.0 },
        PointerEvent::Move { x: 10.0, y: 10.0 },
        PointerEvent::Up,
    ]);
    s.set_view_side(ViewSide::Back);

    let mut d = draft();
    s.finish_save(ticket.upload(&CountingUploader::default()), &mut d);
    let saved = d.mockup().unwrap();
    assert_eq!(saved.geometry, snapshot);
    assert_eq!(saved.view_side, ViewSide::Front);
}

#[test]
fn reset_discards_in_flight_save() {
    let mut s = session_with_design();
    let mut d = draft();
    s.save(&CountingUploader::default(), &mut d).unwrap();
    let first = d.mockup().cloned();

    s.load_design(&png_bytes(20, 20, [0, 255, 0, 255]), None)
        .unwrap();
    let ticket = s.begin_save().unwrap();
    s.reset();
    assert!(!s.has_design());
    assert_eq!(s.garment(), GarmentState::default());
    assert_eq!(s.save_state(), SaveState::Idle);

    let outcome = s.finish_save(ticket.upload(&CountingUploader::default()), &mut d);
    assert_eq!(outcome, SaveOutcome::Discarded);
    assert_eq!(d.mockup().cloned(), first);
    assert_eq!(s.save_state(), SaveState::Idle);
}

#[test]
fn ticket_upload_can_run_on_another_thread() {
    let mut s = session_with_design();
    let ticket = s.begin_save().unwrap();
    let uploaded = std::thread::spawn(move || ticket.upload(&CountingUploader::default()))
        .join()
        .unwrap();
    let mut d = draft();
    assert!(matches!(
        s.finish_save(uploaded, &mut d),
        SaveOutcome::Uploaded(_)
    ));
}

#[test]
fn slider_sets_longer_side_and_respects_minimum() {
    let mut s = session();
    assert!(!s.set_design_size(200.0));

    let mut s = session_with_design();
    assert!(s.set_design_size(200.0));
    let g = s.geometry();
    assert!((g.height - 200.0).abs() < 1e-9);
    assert!((g.width - 140.0).abs() < 1e-9);
    assert_eq!(g.center(), Point::new(150.0, 150.0));

    s.set_design_size(1.0);
    let g = s.geometry();
    assert!((g.width - 10.0).abs() < 1e-9);
    assert!(g.height > g.width);
    assert!(!s.set_design_size(f64::NAN));
}

#[test]
fn reset_placement_restores_fitted_geometry() {
    let mut s = session_with_design();
    let initial = s.geometry();
    s.dispatch([
        PointerEvent::Down { x: 150.0, y: 150.0 },
        PointerEvent::Move { x: 30.0, y: 300.0 },
    ]);
    s.set_design_size(60.0);
    assert!(s.reset_placement());
    assert_eq!(s.geometry(), initial);
    assert_eq!(s.interaction_state(), InteractionState::Idle);
}

#[test]
fn garment_changes_request_frames() {
    let mut s = session();
    s.take_frame_request();
    s.set_garment_color(GarmentColor::WHITE);
    assert!(!s.frame_pending());

    assert_eq!(s.toggle_view_side(), ViewSide::Back);
    assert!(s.take_frame_request());
    s.set_garment_color(GarmentColor::rgb(1, 2, 3));
    assert!(s.take_frame_request());
    assert_eq!(s.toggle_view_side(), ViewSide::Front);
}

#[test]
fn mismatched_compositor_canvas_is_rejected() {
    let c = Compositor::new(Canvas::new(10, 10).unwrap());
    assert!(ComposerSession::with_compositor(ComposerConfig::default(), c).is_err());
}

#[test]
fn oversized_design_still_renders_interactive_frames() {
    let mut s = session_with_design();
    assert!(s.set_design_size(1e20));
    assert!(s.render(RenderMode::Interactive).is_some());

    let mut s = session_with_design();
    let corner = s.geometry().resize_corner();
    s.dispatch([
        PointerEvent::Down {
            x: corner.x,
            y: corner.y,
        },
        PointerEvent::Move {
            x: 1e21,
            y: corner.y,
        },
    ]);
    assert!(s.geometry().width > 1e20);
    assert!(s.render(RenderMode::Interactive).is_some());
}

#[test]
fn abandoned_save_frees_the_guard() {
    let mut s = session_with_design();
    assert!(!s.abandon_save());

    let lost = s.begin_save().unwrap();
    let late = lost.upload(&CountingUploader::default());
    assert!(s.abandon_save());
    assert_eq!(s.save_state(), SaveState::Idle);
    assert!(s.has_design());

    let mut d = draft();
    assert_eq!(s.finish_save(late, &mut d), SaveOutcome::Discarded);
    assert!(d.mockup().is_none());

    let outcome = s.save(&CountingUploader::default(), &mut d).unwrap();
    assert!(matches!(outcome, SaveOutcome::Uploaded(_)));
}
