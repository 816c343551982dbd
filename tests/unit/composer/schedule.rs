use super::*;

#[test]
fn many_requests_collapse_into_one_frame() {
    let mut s = FrameScheduler::new();
    assert!(!s.take_frame_request());

    for _ in 0..5 {
        s.request();
    }
    assert!(s.is_pending());
    assert_eq!(s.coalesced(), 4);
    assert!(s.take_frame_request());
    assert!(!s.take_frame_request());
    assert!(!s.is_pending());
}

#[test]
fn requests_after_a_frame_schedule_the_next_one() {
    let mut s = FrameScheduler::new();
    s.request();
    assert!(s.take_frame_request());
    s.request();
    assert!(s.take_frame_request());
    assert_eq!(s.coalesced(), 0);
}
