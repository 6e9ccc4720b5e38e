//! Motion scheduler
//!
//! Owns all active settle animations and steps them from a frame clock.
//! Consumers keep a `SettleId` handle; cancelling is removing the task by
//! id, which leaves the consumer's offset at its last computed value.

use crate::settle::Settle;
use slotmap::{new_key_type, SlotMap};
use std::time::Instant;

new_key_type! {
    pub struct SettleId;
}

/// The scheduler that ticks all active settle animations
pub struct MotionScheduler {
    settles: SlotMap<SettleId, Settle>,
    last_frame: Instant,
    target_fps: u32,
}

impl MotionScheduler {
    pub fn new() -> Self {
        Self {
            settles: SlotMap::with_key(),
            last_frame: Instant::now(),
            target_fps: 120,
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps;
    }

    pub fn add_settle(&mut self, settle: Settle) -> SettleId {
        self.settles.insert(settle)
    }

    pub fn get_settle(&self, id: SettleId) -> Option<&Settle> {
        self.settles.get(id)
    }

    pub fn get_settle_mut(&mut self, id: SettleId) -> Option<&mut Settle> {
        self.settles.get_mut(id)
    }

    /// Cancel a settle, returning it so the caller can read the last value
    pub fn remove_settle(&mut self, id: SettleId) -> Option<Settle> {
        self.settles.remove(id)
    }

    /// Tick all animations using the wall clock
    ///
    /// Frame deltas are capped at four target-rate frames so a stalled or
    /// backgrounded host does not teleport every animation on resume.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(dt.min(4.0 / self.target_fps as f32));
    }

    /// Advance all animations by an explicit delta time in seconds
    ///
    /// `tick()` delegates here; tests drive this directly for determinism.
    pub fn advance(&mut self, dt: f32) {
        for (_, settle) in self.settles.iter_mut() {
            settle.step(dt);
        }
    }

    /// Check if any settle is still animating
    pub fn has_active_animations(&self) -> bool {
        self.settles.iter().any(|(_, s)| !s.is_done())
    }

    /// Iterate over all settles (immutable)
    pub fn settles_iter(&self) -> impl Iterator<Item = (SettleId, &Settle)> {
        self.settles.iter()
    }

    /// Get the number of settles in the scheduler
    pub fn settle_count(&self) -> usize {
        self.settles.len()
    }
}

impl Default for MotionScheduler {
    fn default() -> Self {
        Self::new()
    }
}
