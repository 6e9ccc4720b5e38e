//! Pull-to-refresh state machine
//!
//! Tracks a downward pull at the content's top edge through
//! `Idle → Pulling → Armed → Refreshing → Settling → Idle`. The refresh
//! action fires exactly once per arm-then-release cycle; completion is
//! caller-driven via [`PullToRefresh::complete`], so a caller that never
//! completes parks the machine in `Refreshing` — that is the caller's
//! contract, not a detected fault.
//!
//! While `Refreshing`, the router locks the whole event stream to this
//! machine so neither the bar nor content can fight the in-flight visual.

use std::sync::{Arc, Mutex, Weak};

use skein_core::events::{event_types, EventType};
use skein_core::fsm::StateTransitions;
use skein_motion::{MotionScheduler, RubberBand, Settle, SettleId, SpringConfig};

use crate::ScrollError;

/// Tuning for a pull-to-refresh region
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    /// Pull distance past which releasing triggers the refresh action
    pub arm_threshold: f32,
    /// Spring used to settle the indicator back to rest
    pub settle_spring: SpringConfig,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            arm_threshold: 80.0,
            settle_spring: SpringConfig::default(),
        }
    }
}

/// Pull-to-refresh gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefreshState {
    /// At rest, indicator hidden
    #[default]
    Idle,
    /// Pulled down, below the arm threshold
    Pulling,
    /// Pulled past the arm threshold; release triggers a refresh
    Armed,
    /// Refresh action in flight, stream locked
    Refreshing,
    /// Indicator animating back to rest
    Settling,
}

impl RefreshState {
    /// Whether the refresh action is in flight
    pub fn is_refreshing(&self) -> bool {
        matches!(self, RefreshState::Refreshing)
    }

    /// Whether a live pull owns the gesture (indicator visible, not yet released)
    pub fn is_pulling(&self) -> bool {
        matches!(self, RefreshState::Pulling | RefreshState::Armed)
    }
}

impl StateTransitions for RefreshState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use skein_core::events::event_types::*;
        match (self, event) {
            (RefreshState::Idle, PULL) => Some(RefreshState::Pulling),
            (RefreshState::Pulling, ARM) => Some(RefreshState::Armed),
            (RefreshState::Armed, RETRACT) => Some(RefreshState::Pulling),
            (RefreshState::Pulling, RETRACT) => Some(RefreshState::Idle),
            (RefreshState::Pulling, RELEASE) => Some(RefreshState::Idle),
            (RefreshState::Armed, RELEASE) => Some(RefreshState::Refreshing),
            (RefreshState::Refreshing, COMPLETE) => Some(RefreshState::Settling),
            (RefreshState::Settling, SETTLED) => Some(RefreshState::Idle),
            (RefreshState::Settling, PULL) => Some(RefreshState::Pulling),
            _ => None,
        }
    }
}

type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Pull-to-refresh state machine for one scrollable region
pub struct PullToRefresh {
    state: RefreshState,
    /// Raw accumulated pull distance, >= 0
    pull_distance: f32,
    config: RefreshConfig,
    rubber: RubberBand,
    on_refresh: Arc<dyn Fn() + Send + Sync>,
    on_complete: Option<CompletionCallback>,
    settle_id: Option<SettleId>,
    scheduler: Weak<Mutex<MotionScheduler>>,
}

impl PullToRefresh {
    /// Create a machine that fires `on_refresh` on each armed release
    pub fn new<F>(config: RefreshConfig, on_refresh: F) -> Result<Self, ScrollError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if !(config.arm_threshold.is_finite() && config.arm_threshold > 0.0) {
            return Err(ScrollError::InvalidArmThreshold(config.arm_threshold));
        }
        Ok(Self {
            state: RefreshState::Idle,
            pull_distance: 0.0,
            config,
            rubber: RubberBand::default(),
            on_refresh: Arc::new(on_refresh),
            on_complete: None,
            settle_id: None,
            scheduler: Weak::new(),
        })
    }

    /// Set the motion scheduler used to animate the indicator back to rest
    pub fn set_scheduler(&mut self, scheduler: &Arc<Mutex<MotionScheduler>>) {
        self.scheduler = Arc::downgrade(scheduler);
    }

    /// Current state
    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Whether the refresh action is in flight
    pub fn is_refreshing(&self) -> bool {
        self.state.is_refreshing()
    }

    /// Raw accumulated pull distance
    pub fn pull_distance(&self) -> f32 {
        self.pull_distance
    }

    /// Visual indicator offset: tracks the pull 1:1 up to the arm threshold,
    /// then stretches sub-linearly like a rubber band
    pub fn indicator_offset(&self) -> f32 {
        let threshold = self.config.arm_threshold;
        if self.pull_distance <= threshold {
            self.pull_distance
        } else {
            threshold + self.rubber.apply(0.0, self.pull_distance - threshold)
        }
    }

    /// A new drag gesture takes over: cancel any settle-back in flight
    pub fn on_gesture_start(&mut self) {
        if self.settle_id.is_some() {
            self.cancel_settle();
        }
    }

    /// Feed a vertical delta into the pull gesture; returns consumed amount
    ///
    /// Positive deltas deepen the pull (arming at the threshold), negative
    /// deltas retract it down to zero. While `Refreshing` the whole delta is
    /// swallowed without moving anything.
    pub fn on_pull(&mut self, dy: f32) -> f32 {
        if self.state == RefreshState::Refreshing {
            return dy;
        }
        if dy == 0.0 {
            return 0.0;
        }

        if dy > 0.0 {
            // A live downward pull preempts any settle-back in flight.
            if self.settle_id.is_some() {
                self.cancel_settle();
            }
            if matches!(self.state, RefreshState::Idle | RefreshState::Settling) {
                self.transition(event_types::PULL);
            }
            self.pull_distance += dy;
            if self.state == RefreshState::Pulling
                && self.pull_distance >= self.config.arm_threshold
            {
                self.transition(event_types::ARM);
            }
            dy
        } else if self.state.is_pulling() && self.pull_distance > 0.0 {
            let consumed = dy.max(-self.pull_distance);
            self.pull_distance += consumed;
            if self.state == RefreshState::Armed
                && self.pull_distance < self.config.arm_threshold
            {
                self.transition(event_types::RETRACT);
            }
            if self.state == RefreshState::Pulling && self.pull_distance <= 0.0 {
                self.pull_distance = 0.0;
                self.transition(event_types::RETRACT);
            }
            consumed
        } else {
            0.0
        }
    }

    /// The pull gesture was released; returns true if the refresh fired
    pub fn on_release(&mut self) -> bool {
        match self.state {
            RefreshState::Armed => {
                self.transition(event_types::RELEASE);
                tracing::debug!(distance = self.pull_distance, "refresh action fired");
                (self.on_refresh)();
                true
            }
            RefreshState::Pulling => {
                self.transition(event_types::RELEASE);
                // The indicator animates back outside the state machine;
                // the gesture itself is already over.
                self.start_settle();
                false
            }
            _ => false,
        }
    }

    /// Signal that the refresh work finished; the indicator settles back
    ///
    /// No-op unless currently `Refreshing`.
    pub fn complete(&mut self) {
        self.finish(None);
    }

    /// Like [`complete`](Self::complete), also running `on_complete` once the
    /// indicator has fully settled
    pub fn complete_with<F>(&mut self, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.finish(Some(Box::new(on_complete)));
    }

    fn finish(&mut self, on_complete: Option<CompletionCallback>) {
        if self.state != RefreshState::Refreshing {
            return;
        }
        self.on_complete = on_complete;
        self.transition(event_types::COMPLETE);
        self.start_settle();
    }

    /// Poll the settle animation, if any, and resolve `Settling` to `Idle`
    pub fn tick(&mut self) {
        let Some(id) = self.settle_id else { return };

        let Some(scheduler) = self.scheduler.upgrade() else {
            self.settle_id = None;
            self.pull_distance = 0.0;
            self.finish_settle();
            return;
        };

        let mut scheduler = scheduler.lock().unwrap();
        let Some(settle) = scheduler.get_settle(id) else {
            drop(scheduler);
            self.settle_id = None;
            return;
        };

        self.pull_distance = settle.value().max(0.0);
        if settle.is_done() {
            scheduler.remove_settle(id);
            drop(scheduler);
            self.settle_id = None;
            self.pull_distance = 0.0;
            self.finish_settle();
        }
    }

    fn start_settle(&mut self) {
        let Some(scheduler) = self.scheduler.upgrade() else {
            // No scheduler to animate with: snap to rest.
            self.pull_distance = 0.0;
            self.finish_settle();
            return;
        };

        let mut scheduler = scheduler.lock().unwrap();
        if let Some(id) = self.settle_id.take() {
            scheduler.remove_settle(id);
        }
        let settle = Settle::new(self.pull_distance, 0.0, self.config.settle_spring);
        if settle.is_done() {
            drop(scheduler);
            self.pull_distance = 0.0;
            self.finish_settle();
        } else {
            self.settle_id = Some(scheduler.add_settle(settle));
        }
    }

    fn finish_settle(&mut self) {
        if self.state == RefreshState::Settling {
            self.transition(event_types::SETTLED);
        }
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    fn cancel_settle(&mut self) {
        let Some(id) = self.settle_id.take() else { return };
        if let Some(scheduler) = self.scheduler.upgrade() {
            if let Some(settle) = scheduler.lock().unwrap().remove_settle(id) {
                // Resume manual tracking from the last computed value.
                self.pull_distance = settle.value().max(0.0);
            }
        }
    }

    fn transition(&mut self, event: EventType) {
        if let Some(next) = self.state.on_event(event) {
            tracing::debug!(from = ?self.state, to = ?next, event, "refresh transition");
            self.state = next;
        }
    }
}

impl Drop for PullToRefresh {
    fn drop(&mut self) {
        if let (Some(id), Some(scheduler)) = (self.settle_id.take(), self.scheduler.upgrade()) {
            scheduler.lock().unwrap().remove_settle(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn machine_with_counter() -> (PullToRefresh, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let machine = PullToRefresh::new(RefreshConfig::default(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (machine, fired)
    }

    #[test]
    fn test_invalid_arm_threshold_rejected() {
        let bad = RefreshConfig {
            arm_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            PullToRefresh::new(bad, || {}),
            Err(ScrollError::InvalidArmThreshold(_))
        ));
        let negative = RefreshConfig {
            arm_threshold: -10.0,
            ..Default::default()
        };
        assert!(PullToRefresh::new(negative, || {}).is_err());
    }

    #[test]
    fn test_short_pull_released_returns_to_idle_without_callback() {
        let (mut machine, fired) = machine_with_counter();

        machine.on_pull(40.0);
        assert_eq!(machine.state(), RefreshState::Pulling);

        machine.on_release();
        assert_eq!(machine.state(), RefreshState::Idle);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pull_accumulates_and_arms_at_threshold() {
        let (mut machine, fired) = machine_with_counter();

        machine.on_pull(40.0);
        assert_eq!(machine.state(), RefreshState::Pulling);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        machine.on_pull(50.0); // cumulative 90 >= 80
        assert_eq!(machine.state(), RefreshState::Armed);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_armed_release_fires_exactly_once() {
        let (mut machine, fired) = machine_with_counter();

        machine.on_pull(100.0);
        assert_eq!(machine.state(), RefreshState::Armed);

        assert!(machine.on_release());
        assert_eq!(machine.state(), RefreshState::Refreshing);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // A second release in the same cycle does nothing.
        assert!(!machine.on_release());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retract_below_threshold_disarms() {
        let (mut machine, _) = machine_with_counter();

        machine.on_pull(100.0);
        assert_eq!(machine.state(), RefreshState::Armed);

        machine.on_pull(-30.0); // back to 70, below 80
        assert_eq!(machine.state(), RefreshState::Pulling);

        machine.on_pull(-80.0); // clamped at zero
        assert_eq!(machine.pull_distance(), 0.0);
        assert_eq!(machine.state(), RefreshState::Idle);
    }

    #[test]
    fn test_retract_consumes_only_down_to_zero() {
        let (mut machine, _) = machine_with_counter();
        machine.on_pull(30.0);
        let consumed = machine.on_pull(-50.0);
        assert_eq!(consumed, -30.0);
    }

    #[test]
    fn test_complete_transitions_through_settling_to_idle() {
        let (mut machine, _) = machine_with_counter();
        let scheduler = Arc::new(Mutex::new(MotionScheduler::new()));
        machine.set_scheduler(&scheduler);

        machine.on_pull(100.0);
        machine.on_release();
        assert_eq!(machine.state(), RefreshState::Refreshing);

        machine.complete();
        assert_eq!(machine.state(), RefreshState::Settling);

        for _ in 0..2000 {
            scheduler.lock().unwrap().advance(1.0 / 120.0);
            machine.tick();
            if machine.state() == RefreshState::Idle {
                break;
            }
        }
        assert_eq!(machine.state(), RefreshState::Idle);
        assert_eq!(machine.pull_distance(), 0.0);
    }

    #[test]
    fn test_complete_without_scheduler_snaps_to_idle() {
        let (mut machine, _) = machine_with_counter();

        machine.on_pull(100.0);
        machine.on_release();
        machine.complete();
        assert_eq!(machine.state(), RefreshState::Idle);
        assert_eq!(machine.pull_distance(), 0.0);
    }

    #[test]
    fn test_complete_while_idle_is_noop() {
        let (mut machine, fired) = machine_with_counter();
        machine.complete();
        assert_eq!(machine.state(), RefreshState::Idle);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_complete_with_runs_callback_after_settle() {
        let (mut machine, _) = machine_with_counter();
        let completed = Arc::new(AtomicUsize::new(0));
        let completed_clone = Arc::clone(&completed);

        machine.on_pull(100.0);
        machine.on_release();
        machine.complete_with(move || {
            completed_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Without a scheduler the settle snaps, so completion is immediate.
        assert_eq!(machine.state(), RefreshState::Idle);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refreshing_swallows_all_deltas_without_moving() {
        let (mut machine, _) = machine_with_counter();

        machine.on_pull(100.0);
        machine.on_release();
        let distance = machine.pull_distance();

        assert_eq!(machine.on_pull(-60.0), -60.0);
        assert_eq!(machine.on_pull(35.0), 35.0);
        assert_eq!(machine.pull_distance(), distance);
        assert_eq!(machine.state(), RefreshState::Refreshing);
    }

    #[test]
    fn test_indicator_resists_past_threshold() {
        let (mut machine, _) = machine_with_counter();
        machine.on_pull(300.0);

        let offset = machine.indicator_offset();
        assert!(offset > machine.config.arm_threshold);
        assert!(offset < 300.0, "pull past the threshold must be damped");
    }

    #[test]
    fn test_new_pull_preempts_settle_back() {
        let (mut machine, _) = machine_with_counter();
        let scheduler = Arc::new(Mutex::new(MotionScheduler::new()));
        machine.set_scheduler(&scheduler);

        machine.on_pull(60.0);
        machine.on_release(); // Pulling -> Idle, settle starts
        assert_eq!(machine.state(), RefreshState::Idle);
        assert_eq!(scheduler.lock().unwrap().settle_count(), 1);

        scheduler.lock().unwrap().advance(1.0 / 120.0);
        machine.tick();

        machine.on_gesture_start();
        machine.on_pull(10.0);
        // Settle task is gone; the drag owns the distance again.
        assert_eq!(scheduler.lock().unwrap().settle_count(), 0);
        assert_eq!(machine.state(), RefreshState::Pulling);
        assert!(machine.pull_distance() > 0.0);
    }
}
