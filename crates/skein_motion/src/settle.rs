//! Settle animations
//!
//! A settle drives a displaced offset back to rest (zero) on a spring,
//! seeded with whatever velocity the gesture left behind. Settles are
//! cancellable: a new drag removes the task from the scheduler and takes
//! over the offset at its last computed value.
//!
//! When the offset is already within the spring's rest threshold there is
//! nothing visible to animate; the settle completes immediately and reports
//! the seed velocity unchanged so the caller can re-inject it into ordinary
//! fling handling.

use crate::spring::{Spring, SpringConfig};

/// A spring-driven return of an offset to rest
#[derive(Debug, Clone, Copy)]
pub struct Settle {
    spring: Spring,
    done: bool,
    residual_velocity: f32,
}

impl Settle {
    /// Start a settle from `offset` toward zero, seeded with `velocity`
    pub fn new(offset: f32, velocity: f32, config: SpringConfig) -> Self {
        if offset.abs() <= config.rest_threshold {
            // Nothing to animate; hand the velocity straight back.
            return Self {
                spring: Spring::new(config, 0.0),
                done: true,
                residual_velocity: velocity,
            };
        }

        let mut spring = Spring::with_velocity(config, offset, velocity);
        spring.set_target(0.0);
        Self {
            spring,
            done: false,
            residual_velocity: 0.0,
        }
    }

    /// Advance the settle by `dt` seconds; returns true while still animating
    pub fn step(&mut self, dt: f32) -> bool {
        if self.done {
            return false;
        }

        self.spring.step(dt);
        if self.spring.is_settled() {
            // Terminal state is exactly zero; whatever velocity is left at
            // rest is reported back rather than silently dropped.
            self.residual_velocity = self.spring.velocity();
            self.spring.snap_to_target();
            self.done = true;
            return false;
        }
        true
    }

    /// Current offset value
    pub fn value(&self) -> f32 {
        self.spring.value()
    }

    /// Whether the settle has reached rest
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Velocity left over when the settle completed
    ///
    /// Zero until `is_done`; for a settle that completed immediately this is
    /// the original seed velocity.
    pub fn residual_velocity(&self) -> f32 {
        self.residual_velocity
    }
}
