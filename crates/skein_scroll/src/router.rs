//! Scroll priority router
//!
//! The single arbiter for a scrollable region's nested-scroll stream. Every
//! pre-scroll, post-scroll, pre-fling, and post-fling callback is offered to
//! the consumers in a fixed precedence order:
//!
//! 1. pull-to-refresh while refreshing (stream locked)
//! 2. top bar collapse/expand
//! 3. pull-to-refresh arming
//! 4. rubber-band overscroll
//!
//! A single event is never split across two consumers: the first consumer in
//! precedence order that reports nonzero consumption takes the event, and
//! the remainder goes back to the caller for ordinary content scrolling.
//! This is what prevents the double-consumption feedback loops ad hoc
//! per-event routing runs into.

use std::sync::{Arc, Mutex};

use skein_core::events::ScrollSource;
use skein_motion::MotionScheduler;
use smallvec::SmallVec;

use crate::overscroll::OverscrollController;
use crate::priority::ScrollPriority;
use crate::refresh::{PullToRefresh, RefreshState};
use crate::top_bar::TopBarController;

type OverscrollListener = Box<dyn Fn(bool) + Send + Sync>;

/// Arbitrates one region's scroll stream among the three consumers
pub struct ScrollPriorityRouter {
    priority: ScrollPriority,
    top_bar: TopBarController,
    refresh: PullToRefresh,
    overscroll: OverscrollController,
    overscroll_listeners: SmallVec<[OverscrollListener; 2]>,
    overscroll_was_active: bool,
}

impl ScrollPriorityRouter {
    /// Create a router owning the region's three consumers
    pub fn new(
        top_bar: TopBarController,
        refresh: PullToRefresh,
        overscroll: OverscrollController,
    ) -> Self {
        Self {
            priority: ScrollPriority::None,
            top_bar,
            refresh,
            overscroll,
            overscroll_listeners: SmallVec::new(),
            overscroll_was_active: false,
        }
    }

    /// Wire all animated consumers to one motion scheduler
    pub fn set_scheduler(&mut self, scheduler: &Arc<Mutex<MotionScheduler>>) {
        self.refresh.set_scheduler(scheduler);
        self.overscroll.set_scheduler(scheduler);
    }

    // =========================================================================
    // Observables
    // =========================================================================

    /// The consumer currently entitled to the gesture's events
    pub fn current_priority(&self) -> ScrollPriority {
        self.priority
    }

    /// The bar's current height offset
    pub fn height_offset(&self) -> f32 {
        self.top_bar.height_offset()
    }

    /// The bar's fully-collapsed offset
    pub fn height_offset_limit(&self) -> f32 {
        self.top_bar.height_offset_limit()
    }

    /// The pull-to-refresh state
    pub fn refresh_state(&self) -> RefreshState {
        self.refresh.state()
    }

    /// Current rubber-band displacement
    pub fn overscroll_offset(&self) -> f32 {
        self.overscroll.offset()
    }

    /// Whether rubber-band displacement is currently visible
    pub fn overscroll_active(&self) -> bool {
        self.overscroll.is_active()
    }

    /// Read access to the bar controller for visual collaborators
    pub fn top_bar(&self) -> &TopBarController {
        &self.top_bar
    }

    /// Read access to the pull-to-refresh machine
    pub fn refresh(&self) -> &PullToRefresh {
        &self.refresh
    }

    /// Read access to the overscroll controller
    pub fn overscroll(&self) -> &OverscrollController {
        &self.overscroll
    }

    /// Register an edge-triggered listener for overscroll visibility
    ///
    /// Invoked only when the active flag flips, never per-delta.
    pub fn on_overscroll_changed<F>(&mut self, listener: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.overscroll_listeners.push(Box::new(listener));
    }

    /// Signal that the refresh work finished (see [`PullToRefresh::complete`])
    pub fn complete_refresh(&mut self) {
        self.refresh.complete();
    }

    /// Signal refresh completion, running `on_complete` once settled
    pub fn complete_refresh_with<F>(&mut self, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.refresh.complete_with(on_complete);
    }

    // =========================================================================
    // Event routing
    // =========================================================================

    /// A new gesture sequence begins: reset priority and cancel settles
    ///
    /// Settle cancellation is synchronous; by the time the first delta of
    /// the new gesture arrives there is exactly one writer per offset.
    pub fn on_gesture_start(&mut self) {
        self.priority = if self.refresh.is_refreshing() {
            // The lock survives gesture boundaries.
            ScrollPriority::PullToRefresh
        } else {
            ScrollPriority::None
        };
        self.overscroll.on_gesture_start();
        self.refresh.on_gesture_start();
        tracing::trace!(priority = ?self.priority, "gesture start");
    }

    /// Offer a delta before content sees it; returns the consumed amount
    pub fn on_pre_scroll(&mut self, available: f32, source: ScrollSource) -> f32 {
        if self.refresh.is_refreshing() {
            self.priority = ScrollPriority::PullToRefresh;
            return self.refresh.on_pull(available);
        }

        // A visible pull indicator owns the drag in both directions until
        // release; the bar must not slide out from under it.
        if source.is_user_input() && self.refresh.state().is_pulling() {
            let consumed = self.refresh.on_pull(available);
            if consumed != 0.0 {
                self.priority = ScrollPriority::PullToRefresh;
            }
            return consumed;
        }

        // Upward drag collapses the bar before content scrolls.
        if available < 0.0 && self.top_bar.can_collapse() {
            let consumed = self.top_bar.consume(available);
            if consumed != 0.0 {
                self.priority = ScrollPriority::TopBar;
            }
            return consumed;
        }

        0.0
    }

    /// Offer the delta content left unconsumed; returns the consumed amount
    pub fn on_post_scroll(&mut self, consumed: f32, available: f32, source: ScrollSource) -> f32 {
        if self.refresh.is_refreshing() {
            self.priority = ScrollPriority::PullToRefresh;
            return self.refresh.on_pull(available);
        }
        if available == 0.0 {
            return 0.0;
        }
        tracing::trace!(consumed, available, ?source, "post-scroll leftover");

        // Leftover downward delta re-expands a collapsed bar first.
        if available > 0.0 && self.top_bar.can_expand() {
            let taken = self.top_bar.consume(available);
            if taken != 0.0 {
                self.priority = ScrollPriority::TopBar;
                return taken;
            }
        }

        // Content is at its top edge with delta to spare: the pull gesture
        // strictly dominates overscroll at the top boundary.
        if self.should_offer_refresh(available, source) {
            let taken = self.refresh.on_pull(available);
            if taken != 0.0 {
                self.priority = ScrollPriority::PullToRefresh;
                return taken;
            }
        }

        if self.should_offer_overscroll(available, source) {
            let taken = self.overscroll.on_scroll(available);
            if taken != 0.0 {
                self.priority = ScrollPriority::OverScroll;
            }
            self.notify_overscroll();
            return taken;
        }

        0.0
    }

    /// Offer a fling velocity before content flings; returns consumed velocity
    pub fn on_pre_fling(&mut self, velocity: f32) -> f32 {
        if self.refresh.is_refreshing() {
            self.priority = ScrollPriority::PullToRefresh;
            return velocity;
        }

        // A fling while the indicator is out is the release edge; the
        // indicator owns whatever momentum the gesture carried.
        if self.refresh.state().is_pulling() {
            self.priority = ScrollPriority::PullToRefresh;
            self.refresh.on_release();
            return velocity;
        }

        // Upward velocity drains into bar collapse before content flings.
        if velocity < 0.0 && self.top_bar.can_collapse() {
            let consumed = self.top_bar.consume_fling(velocity);
            if consumed != 0.0 {
                self.priority = ScrollPriority::TopBar;
            }
            return consumed;
        }

        0.0
    }

    /// Offer the velocity content left over; returns the consumed velocity
    pub fn on_post_fling(&mut self, velocity: f32) -> f32 {
        if self.refresh.is_refreshing() {
            self.priority = ScrollPriority::PullToRefresh;
            // The gesture is over regardless of the lock; a band displaced
            // before the refresh claimed the stream still springs home.
            self.overscroll.on_gesture_end();
            self.notify_overscroll();
            return velocity;
        }

        // Leftover downward velocity re-expands the bar.
        if velocity > 0.0 && self.top_bar.can_expand() {
            let consumed = self.top_bar.consume_fling(velocity);
            if consumed != 0.0 {
                self.priority = ScrollPriority::TopBar;
                return consumed;
            }
        }

        // Whatever is left settles the rubber band; the drag is over either
        // way, so a displaced band springs home even at zero velocity.
        let consumed = self.overscroll.on_fling(velocity);
        if consumed != 0.0 {
            self.priority = ScrollPriority::OverScroll;
        }
        self.overscroll.on_gesture_end();
        self.notify_overscroll();
        consumed
    }

    /// Advance settle-driven state and publish edge-triggered notifications
    ///
    /// Call once per frame, after [`MotionScheduler::tick`].
    pub fn tick(&mut self) {
        self.overscroll.tick();
        self.refresh.tick();
        self.notify_overscroll();
    }

    // =========================================================================
    // Routing predicates
    // =========================================================================

    fn should_offer_refresh(&self, available: f32, source: ScrollSource) -> bool {
        source.is_user_input()
            && available > 0.0
            && (self.top_bar.is_fully_expanded() || self.refresh.state().is_pulling())
    }

    fn should_offer_overscroll(&self, available: f32, source: ScrollSource) -> bool {
        match source {
            // Momentum and programmatic remainders rubber-band at either edge.
            ScrollSource::SideEffect => true,
            // The top boundary belongs to pull-to-refresh for live drags;
            // user input only rubber-bands at the bottom.
            ScrollSource::UserInput => available < 0.0,
        }
    }

    fn notify_overscroll(&mut self) {
        let active = self.overscroll.is_active();
        if active != self.overscroll_was_active {
            self.overscroll_was_active = active;
            tracing::debug!(active, "overscroll visibility changed");
            for listener in &self.overscroll_listeners {
                listener(active);
            }
        }
    }
}
