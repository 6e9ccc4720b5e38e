//! Spring physics
//!
//! A damped harmonic oscillator integrated with RK4. Springs are the single
//! animation primitive in this workspace: settle animations, bar flings, and
//! refresh-indicator returns all ride on one of these.
//!
//! Springs are interruptible by construction: retargeting keeps the current
//! velocity, so handing an offset from a dying animation to a new one never
//! produces a visible kink.

/// Maximum integration step in seconds. Larger frame deltas are substepped
/// so a dropped frame cannot destabilize the integrator.
const MAX_STEP: f32 = 1.0 / 120.0;

/// Spring tuning parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Spring stiffness (force per unit displacement)
    pub stiffness: f32,
    /// Damping coefficient (force per unit velocity)
    pub damping: f32,
    /// Mass of the animated value
    pub mass: f32,
    /// Displacement below which the spring counts as at rest
    pub rest_threshold: f32,
    /// Velocity below which the spring counts as at rest
    pub rest_velocity: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        // Critically damped return-to-rest: no overshoot, no oscillation.
        Self::critically_damped(150.0)
    }
}

impl SpringConfig {
    /// Create a config from raw stiffness, damping, and mass
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        debug_assert!(stiffness > 0.0 && stiffness.is_finite());
        debug_assert!(damping >= 0.0 && damping.is_finite());
        debug_assert!(mass > 0.0 && mass.is_finite());
        Self {
            stiffness,
            damping,
            mass,
            rest_threshold: 0.5,
            rest_velocity: 1.0,
        }
    }

    /// Critically damped spring: damping = 2 * sqrt(stiffness * mass)
    ///
    /// Fastest possible return to rest without overshoot.
    pub fn critically_damped(stiffness: f32) -> Self {
        Self::new(stiffness, 2.0 * stiffness.sqrt(), 1.0)
    }

    /// Create a config from stiffness and a damping ratio
    ///
    /// Ratio 1.0 is critical damping, below 1.0 overshoots, above 1.0 is
    /// sluggish.
    pub fn with_damping_ratio(stiffness: f32, ratio: f32, mass: f32) -> Self {
        Self::new(stiffness, ratio * 2.0 * (stiffness * mass).sqrt(), mass)
    }

    /// Stiff spring for snappy UI transitions
    pub fn stiff() -> Self {
        Self::new(210.0, 20.0, 1.0)
    }

    /// Gentle spring with a soft approach
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// Underdamped spring with visible wobble
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// Override the rest displacement threshold
    pub fn rest_threshold(mut self, threshold: f32) -> Self {
        self.rest_threshold = threshold;
        self
    }
}

/// A spring-animated scalar value
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    /// Create a spring at rest at `initial_value`
    pub fn new(config: SpringConfig, initial_value: f32) -> Self {
        Self {
            config,
            value: initial_value,
            velocity: 0.0,
            target: initial_value,
        }
    }

    /// Create a spring with an initial velocity (e.g. inherited from a drag)
    pub fn with_velocity(config: SpringConfig, initial_value: f32, velocity: f32) -> Self {
        Self {
            config,
            value: initial_value,
            velocity,
            target: initial_value,
        }
    }

    /// Current value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Current velocity (units per second)
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Current target
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget the spring, keeping the current velocity
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Whether the spring has reached its target and stopped moving
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() <= self.config.rest_threshold
            && self.velocity.abs() <= self.config.rest_velocity
    }

    /// Jump to the target and stop. Used when an animation is finalized.
    pub fn snap_to_target(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        // Substep long frames; RK4 is accurate but not unconditionally stable.
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP);
            self.rk4_step(h);
            remaining -= h;
        }
    }

    fn acceleration(&self, value: f32, velocity: f32) -> f32 {
        let displacement = value - self.target;
        (-self.config.stiffness * displacement - self.config.damping * velocity) / self.config.mass
    }

    fn rk4_step(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let k1_x = v;
        let k1_v = self.acceleration(x, v);

        let k2_x = v + k1_v * h / 2.0;
        let k2_v = self.acceleration(x + k1_x * h / 2.0, v + k1_v * h / 2.0);

        let k3_x = v + k2_v * h / 2.0;
        let k3_v = self.acceleration(x + k2_x * h / 2.0, v + k2_v * h / 2.0);

        let k4_x = v + k3_v * h;
        let k4_v = self.acceleration(x + k3_x * h, v + k3_v * h);

        self.value = x + h / 6.0 * (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x);
        self.velocity = v + h / 6.0 * (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v);
    }
}
