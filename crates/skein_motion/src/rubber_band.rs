//! Rubber-band overscroll resistance
//!
//! Converts an out-of-bounds scroll delta into a damped visual offset.
//! Displacement grows sub-linearly with pull distance (the band "stiffens"
//! the farther it is stretched) and collapses without resistance the moment
//! the input reverses direction.

use thiserror::Error;

/// Lower clamp for the resistance ratio and the displacement term, guarding
/// the division and square root at rest.
pub const EPSILON: f32 = 1e-4;

/// Rubber-band construction errors
#[derive(Debug, Error, PartialEq)]
pub enum MotionError {
    #[error("rubber band tuning must be positive and finite: p={p}, density={density}")]
    InvalidTuning { p: f32, density: f32 },
}

/// Resistance tuning for a rubber-band boundary effect
///
/// `p` controls how quickly resistance builds with distance; `density`
/// scales the curve to the display so the effect feels identical across
/// screen densities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBand {
    p: f32,
    density: f32,
}

impl Default for RubberBand {
    fn default() -> Self {
        Self {
            p: 50.0,
            density: 1.0,
        }
    }
}

impl RubberBand {
    /// Create a rubber band with explicit tuning
    ///
    /// Rejects non-positive or non-finite tuning; a zero `p` would collapse
    /// every delta to nothing and read as a frozen scroll view.
    pub fn new(p: f32, density: f32) -> Result<Self, MotionError> {
        if !(p > 0.0 && p.is_finite() && density > 0.0 && density.is_finite()) {
            return Err(MotionError::InvalidTuning { p, density });
        }
        Ok(Self { p, density })
    }

    /// Apply a raw delta to the current offset, returning the damped offset
    ///
    /// Same-signed input is resisted by a ratio that shrinks with distance
    /// from rest; input opposing the existing offset passes through
    /// unresisted so releasing the band never feels sticky.
    pub fn apply(&self, current_offset: f32, raw_delta: f32) -> f32 {
        if raw_delta == 0.0 {
            return current_offset;
        }

        // Returning toward rest: no drag.
        if current_offset != 0.0 && current_offset.signum() != raw_delta.signum() {
            return current_offset + raw_delta;
        }

        let real_p = self.p * self.density;
        // Midpoint of the step keeps the ratio symmetric for large deltas.
        let reach = (current_offset + raw_delta / 2.0).abs().max(EPSILON);
        let ratio = (real_p / (real_p * reach).sqrt()).clamp(EPSILON, 1.0);

        let next = current_offset + raw_delta * ratio;
        tracing::trace!(
            current_offset,
            raw_delta,
            ratio,
            next,
            "rubber band stretch"
        );
        next
    }
}
