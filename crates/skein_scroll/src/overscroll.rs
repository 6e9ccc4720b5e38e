//! Boundary overscroll controller
//!
//! Owns the rubber-band displacement shown when scrolling past a content
//! boundary. Leftover deltas stretch the band through the resistance curve;
//! when input stops, a spring settle drives the offset back to rest.
//!
//! Exactly one writer at a time: a settle in flight is cancelled
//! synchronously before the first delta of a new drag is applied, and a
//! cancelled settle leaves the offset at its last computed value.

use std::sync::{Arc, Mutex, Weak};

use skein_core::events::{event_types, EventType};
use skein_core::fsm::StateTransitions;
use skein_motion::{MotionScheduler, RubberBand, Settle, SettleId, SpringConfig};

/// Gesture-phase state for an overscroll region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollState {
    /// At rest, no displacement
    #[default]
    Idle,
    /// A drag is feeding deltas into the band
    Dragging,
    /// A settle animation is returning the offset to rest
    Settling,
}

impl StateTransitions for ScrollState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use skein_core::events::event_types::*;
        match (self, event) {
            (ScrollState::Idle, SCROLL) => Some(ScrollState::Dragging),
            (ScrollState::Dragging, HIT_EDGE) => Some(ScrollState::Settling),
            (ScrollState::Dragging, SETTLED) => Some(ScrollState::Idle),
            (ScrollState::Idle, HIT_EDGE) => Some(ScrollState::Settling),
            (ScrollState::Settling, SCROLL) => Some(ScrollState::Dragging),
            (ScrollState::Settling, SETTLED) => Some(ScrollState::Idle),
            _ => None,
        }
    }
}

/// Rubber-band overscroll state for one scrollable region
pub struct OverscrollController {
    offset: f32,
    state: ScrollState,
    rubber: RubberBand,
    settle_spring: SpringConfig,
    settle_id: Option<SettleId>,
    scheduler: Weak<Mutex<MotionScheduler>>,
}

impl Default for OverscrollController {
    fn default() -> Self {
        Self::new(RubberBand::default(), SpringConfig::default())
    }
}

impl OverscrollController {
    /// Create a controller with explicit resistance and settle tuning
    pub fn new(rubber: RubberBand, settle_spring: SpringConfig) -> Self {
        Self {
            offset: 0.0,
            state: ScrollState::Idle,
            rubber,
            settle_spring,
            settle_id: None,
            scheduler: Weak::new(),
        }
    }

    /// Set the motion scheduler that animates the settle
    pub fn set_scheduler(&mut self, scheduler: &Arc<Mutex<MotionScheduler>>) {
        self.scheduler = Arc::downgrade(scheduler);
    }

    /// Current signed displacement from rest
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Current gesture-phase state
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Whether any rubber-band displacement is visible
    pub fn is_active(&self) -> bool {
        self.offset != 0.0
    }

    /// A new drag gesture takes over: cancel any settle in flight
    ///
    /// The offset resumes manual tracking from its last computed value; no
    /// half-written state is possible because the settle is removed before
    /// any new delta is applied.
    pub fn on_gesture_start(&mut self) {
        let Some(id) = self.settle_id.take() else { return };
        if let Some(scheduler) = self.scheduler.upgrade() {
            if let Some(settle) = scheduler.lock().unwrap().remove_settle(id) {
                self.offset = settle.value();
            }
        }
        self.transition(event_types::SCROLL);
    }

    /// Stretch the band with a leftover delta; returns the consumed amount
    ///
    /// The whole delta is spent on the band: the visible displacement is
    /// resisted, but none of the delta goes back to content while the
    /// boundary effect owns it.
    pub fn on_scroll(&mut self, delta: f32) -> f32 {
        if delta == 0.0 {
            return 0.0;
        }
        if self.settle_id.is_some() {
            self.on_gesture_start();
        }
        if self.state != ScrollState::Dragging {
            self.transition(event_types::SCROLL);
        }
        self.offset = self.rubber.apply(self.offset, delta);
        delta
    }

    /// The drag ended; spring back to rest if displaced
    pub fn on_gesture_end(&mut self) {
        // Don't restart an in-flight settle; resetting the spring would
        // cause visible jitter.
        if self.state == ScrollState::Settling {
            return;
        }
        if self.offset != 0.0 {
            self.start_settle(0.0);
            self.transition(event_types::HIT_EDGE);
        } else if self.state == ScrollState::Dragging {
            self.transition(event_types::SETTLED);
        }
    }

    /// Absorb leftover fling velocity into the settle; returns consumed velocity
    ///
    /// With no visible displacement there is nothing to settle, so the
    /// velocity stays with the caller for ordinary fling handling.
    pub fn on_fling(&mut self, velocity: f32) -> f32 {
        if self.offset.abs() <= self.settle_spring.rest_threshold {
            return 0.0;
        }
        self.start_settle(velocity);
        self.transition(event_types::HIT_EDGE);
        velocity
    }

    /// Poll the settle animation and resolve `Settling` to `Idle`
    pub fn tick(&mut self) {
        let Some(id) = self.settle_id else {
            if self.state == ScrollState::Settling {
                // Settle was snapped at start; resolve the state.
                self.offset = 0.0;
                self.transition(event_types::SETTLED);
            }
            return;
        };

        let Some(scheduler) = self.scheduler.upgrade() else {
            self.settle_id = None;
            self.offset = 0.0;
            self.transition(event_types::SETTLED);
            return;
        };

        let mut scheduler = scheduler.lock().unwrap();
        let Some(settle) = scheduler.get_settle(id) else {
            drop(scheduler);
            self.settle_id = None;
            self.offset = 0.0;
            self.transition(event_types::SETTLED);
            return;
        };

        self.offset = settle.value();
        if settle.is_done() {
            scheduler.remove_settle(id);
            drop(scheduler);
            self.settle_id = None;
            self.offset = 0.0;
            self.transition(event_types::SETTLED);
        }
    }

    fn start_settle(&mut self, velocity: f32) {
        let Some(scheduler) = self.scheduler.upgrade() else {
            // No scheduler to animate with: snap to rest.
            self.offset = 0.0;
            return;
        };
        let mut scheduler = scheduler.lock().unwrap();
        if let Some(id) = self.settle_id.take() {
            scheduler.remove_settle(id);
        }
        let settle = Settle::new(self.offset, velocity, self.settle_spring);
        if settle.is_done() {
            self.offset = 0.0;
        } else {
            tracing::trace!(offset = self.offset, velocity, "overscroll settle start");
            self.settle_id = Some(scheduler.add_settle(settle));
        }
    }

    fn transition(&mut self, event: EventType) {
        if let Some(next) = self.state.on_event(event) {
            tracing::debug!(from = ?self.state, to = ?next, event, "overscroll transition");
            self.state = next;
        }
    }
}

impl Drop for OverscrollController {
    fn drop(&mut self) {
        // Teardown cancels the settle task; orphaned tasks would keep the
        // scheduler active for a region that no longer exists.
        if let (Some(id), Some(scheduler)) = (self.settle_id.take(), self.scheduler.upgrade()) {
            scheduler.lock().unwrap().remove_settle(id);
        }
    }
}
