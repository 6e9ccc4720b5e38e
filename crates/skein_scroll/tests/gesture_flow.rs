//! End-to-end gesture flows through the router
//!
//! Drives full pre-scroll / post-scroll / pre-fling / post-fling sequences
//! the way a host framework would, with a real motion scheduler stepped at
//! a fixed frame rate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use skein_core::events::ScrollSource;
use skein_motion::MotionScheduler;
use skein_scroll::{
    OverscrollController, PullToRefresh, RefreshConfig, RefreshState, ScrollPriority,
    ScrollPriorityRouter, TopBarController,
};

const FRAME: f32 = 1.0 / 120.0;

struct Harness {
    router: ScrollPriorityRouter,
    scheduler: Arc<Mutex<MotionScheduler>>,
    refreshes: Arc<AtomicUsize>,
}

impl Harness {
    fn new() -> Self {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&refreshes);
        let mut router = ScrollPriorityRouter::new(
            TopBarController::new(-200.0).unwrap(),
            PullToRefresh::new(RefreshConfig::default(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap(),
            OverscrollController::default(),
        );
        let scheduler = Arc::new(Mutex::new(MotionScheduler::new()));
        router.set_scheduler(&scheduler);
        Self {
            router,
            scheduler,
            refreshes,
        }
    }

    /// Run frames until all settles resolve (or the frame budget runs out)
    fn run_to_rest(&mut self) {
        for _ in 0..2000 {
            self.scheduler.lock().unwrap().advance(FRAME);
            self.router.tick();
            if !self.scheduler.lock().unwrap().has_active_animations()
                && self.router.refresh_state() != RefreshState::Settling
            {
                return;
            }
        }
        panic!("animations did not settle within the frame budget");
    }
}

#[test]
fn bar_collapses_under_repeated_upward_drag() {
    let mut h = Harness::new();
    h.router.on_gesture_start();

    for _ in 0..3 {
        assert_eq!(h.router.on_pre_scroll(-50.0, ScrollSource::UserInput), -50.0);
    }

    assert_eq!(h.router.height_offset(), -150.0);
    assert_eq!(h.router.current_priority(), ScrollPriority::TopBar);
    // Nothing leaked to the other consumers.
    assert_eq!(h.router.refresh_state(), RefreshState::Idle);
    assert_eq!(h.router.overscroll_offset(), 0.0);
}

#[test]
fn fully_collapsed_bar_passes_drag_to_content() {
    let mut h = Harness::new();
    h.router.on_gesture_start();
    h.router.on_pre_scroll(-200.0, ScrollSource::UserInput);

    assert_eq!(h.router.on_pre_scroll(-30.0, ScrollSource::UserInput), 0.0);
    assert_eq!(h.router.height_offset(), -200.0);
}

#[test]
fn full_refresh_lifecycle() {
    let mut h = Harness::new();

    // Gesture 1: pull past the arm threshold and release.
    h.router.on_gesture_start();
    h.router.on_post_scroll(0.0, 40.0, ScrollSource::UserInput);
    assert_eq!(h.router.refresh_state(), RefreshState::Pulling);
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);

    h.router.on_post_scroll(0.0, 50.0, ScrollSource::UserInput);
    assert_eq!(h.router.refresh_state(), RefreshState::Armed);

    h.router.on_pre_fling(0.0);
    h.router.on_post_fling(0.0);
    assert_eq!(h.router.refresh_state(), RefreshState::Refreshing);
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);

    // Gesture 2 while refreshing: the stream stays locked to the refresh.
    h.router.on_gesture_start();
    assert_eq!(h.router.current_priority(), ScrollPriority::PullToRefresh);
    assert_eq!(h.router.on_pre_scroll(-80.0, ScrollSource::UserInput), -80.0);
    assert_eq!(h.router.height_offset(), 0.0);
    assert_eq!(h.router.on_post_scroll(0.0, 15.0, ScrollSource::SideEffect), 15.0);
    assert_eq!(h.router.current_priority(), ScrollPriority::PullToRefresh);
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);

    // Completion settles the indicator and unwinds to Idle.
    let completed = Arc::new(AtomicUsize::new(0));
    let completed_clone = Arc::clone(&completed);
    h.router.complete_refresh_with(move || {
        completed_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(h.router.refresh_state(), RefreshState::Settling);

    h.run_to_rest();
    assert_eq!(h.router.refresh_state(), RefreshState::Idle);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);
}

#[test]
fn sub_threshold_release_animates_back_without_firing() {
    let mut h = Harness::new();
    h.router.on_gesture_start();
    h.router.on_post_scroll(0.0, 60.0, ScrollSource::UserInput);
    assert_eq!(h.router.refresh_state(), RefreshState::Pulling);

    h.router.on_pre_fling(0.0);
    h.router.on_post_fling(0.0);
    assert_eq!(h.router.refresh_state(), RefreshState::Idle);
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);

    h.run_to_rest();
    assert_eq!(h.router.refresh().pull_distance(), 0.0);
}

#[test]
fn bottom_overscroll_stretches_then_settles() {
    let mut h = Harness::new();

    let edges = Arc::new(Mutex::new(Vec::new()));
    let edges_clone = Arc::clone(&edges);
    h.router.on_overscroll_changed(move |active| {
        edges_clone.lock().unwrap().push(active);
    });

    h.router.on_gesture_start();
    // Content is at the bottom; the bar is collapsed from scrolling down.
    h.router.on_pre_scroll(-200.0, ScrollSource::UserInput);

    // Leftover upward drag rubber-bands at the bottom boundary.
    let mut displacement = 0.0;
    for _ in 0..4 {
        h.router.on_post_scroll(0.0, -25.0, ScrollSource::UserInput);
        let offset = h.router.overscroll_offset();
        assert!(offset < displacement, "band must keep stretching");
        displacement = offset;
    }
    assert_eq!(h.router.current_priority(), ScrollPriority::OverScroll);

    // Stretch is damped: four 25px deltas move the band less than 100px.
    assert!(displacement > -100.0);

    h.router.on_pre_fling(0.0);
    h.router.on_post_fling(0.0);
    h.run_to_rest();

    assert_eq!(h.router.overscroll_offset(), 0.0);
    assert!(!h.router.overscroll_active());
    assert_eq!(*edges.lock().unwrap(), vec![true, false]);
}

#[test]
fn new_drag_preempts_overscroll_settle() {
    let mut h = Harness::new();
    h.router.on_gesture_start();
    h.router.on_pre_scroll(-200.0, ScrollSource::UserInput);
    for _ in 0..4 {
        h.router.on_post_scroll(0.0, -30.0, ScrollSource::UserInput);
    }
    h.router.on_pre_fling(0.0);
    h.router.on_post_fling(0.0);

    // A few frames into the settle...
    for _ in 0..5 {
        h.scheduler.lock().unwrap().advance(FRAME);
        h.router.tick();
    }
    let mid_settle = h.router.overscroll_offset();
    assert!(mid_settle < 0.0, "settle should still be in flight");

    // ...a new drag takes over, synchronously cancelling the settle.
    h.router.on_gesture_start();
    assert_eq!(h.scheduler.lock().unwrap().settle_count(), 0);

    // The new gesture's deltas stretch from the preserved offset.
    h.router.on_post_scroll(0.0, -10.0, ScrollSource::UserInput);
    assert!(h.router.overscroll_offset() < mid_settle);
}

#[test]
fn momentum_remainder_rubber_bands_at_top() {
    let mut h = Harness::new();
    h.router.on_gesture_start();

    // Fling momentum overshooting the top edge arrives as SideEffect deltas;
    // pull-to-refresh must not arm, the band takes them instead.
    h.router.on_post_scroll(0.0, 30.0, ScrollSource::SideEffect);
    assert_eq!(h.router.refresh_state(), RefreshState::Idle);
    assert!(h.router.overscroll_offset() > 0.0);
    assert_eq!(h.router.current_priority(), ScrollPriority::OverScroll);

    let consumed = h.router.on_post_fling(150.0);
    assert_eq!(consumed, 150.0);
    h.run_to_rest();
    assert_eq!(h.router.overscroll_offset(), 0.0);
}

#[test]
fn fling_splits_between_bar_and_content() {
    let mut h = Harness::new();
    h.router.on_gesture_start();

    // Stopping distance 1000²/3000 ≈ 333 exceeds the bar's 200 of travel:
    // the bar runs to fully collapsed and only part of the velocity is used.
    let consumed = h.router.on_pre_fling(-1000.0);
    assert_eq!(h.router.height_offset(), -200.0);
    assert!(consumed < 0.0);
    assert!(consumed.abs() < 1000.0, "leftover velocity belongs to content");
}
