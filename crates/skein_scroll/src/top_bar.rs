//! Collapsible top bar controller
//!
//! Owns the bar's height offset and converts scroll deltas into collapse or
//! expansion, consuming only as much of each delta as fits within bounds.
//! Offset 0 is fully expanded; the (negative) limit is fully collapsed.
//!
//! Rendering collaborators read `height_offset` every frame to interpolate
//! the visual title/height; nothing outside this controller ever writes it.

use crate::ScrollError;

/// Deceleration applied when draining a fling into bar travel, px/s²
const FLING_DECELERATION: f32 = 1500.0;

/// Controller for a collapsible top bar's height offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopBarController {
    height_offset: f32,
    height_offset_limit: f32,
}

impl TopBarController {
    /// Create a controller for a bar that can collapse by `-height_offset_limit`
    ///
    /// The limit is the fully-collapsed offset and must be negative and
    /// finite; anything else is a configuration error, not something to
    /// silently clamp at startup.
    pub fn new(height_offset_limit: f32) -> Result<Self, ScrollError> {
        if !(height_offset_limit.is_finite() && height_offset_limit < 0.0) {
            return Err(ScrollError::InvalidBarLimit(height_offset_limit));
        }
        Ok(Self {
            height_offset: 0.0,
            height_offset_limit,
        })
    }

    /// Current height offset, in `[height_offset_limit, 0]`
    pub fn height_offset(&self) -> f32 {
        self.height_offset
    }

    /// The fully-collapsed offset (negative)
    pub fn height_offset_limit(&self) -> f32 {
        self.height_offset_limit
    }

    /// How collapsed the bar is: 0.0 fully expanded, 1.0 fully collapsed
    pub fn collapsed_fraction(&self) -> f32 {
        self.height_offset / self.height_offset_limit
    }

    /// Whether an upward delta can still shrink the bar
    pub fn can_collapse(&self) -> bool {
        self.height_offset > self.height_offset_limit
    }

    /// Whether a downward delta can still grow the bar
    pub fn can_expand(&self) -> bool {
        self.height_offset < 0.0
    }

    /// Whether the bar is at its full height
    pub fn is_fully_expanded(&self) -> bool {
        self.height_offset == 0.0
    }

    /// Consume as much of `delta` as fits within the bar's bounds
    ///
    /// Negative deltas collapse, positive deltas expand. Returns the signed
    /// amount actually consumed; the router subtracts this from the event
    /// before handing the remainder back to content.
    pub fn consume(&mut self, delta: f32) -> f32 {
        let consumed = if delta < 0.0 && self.can_collapse() {
            delta.max(self.height_offset_limit - self.height_offset)
        } else if delta > 0.0 && self.can_expand() {
            delta.min(-self.height_offset)
        } else {
            0.0
        };

        self.height_offset = (self.height_offset + consumed)
            .clamp(self.height_offset_limit, 0.0);
        if consumed != 0.0 {
            tracing::trace!(delta, consumed, offset = self.height_offset, "top bar consume");
        }
        consumed
    }

    /// Drain a fling velocity into the bar's remaining travel
    ///
    /// Models the fling as a body under constant deceleration: stopping
    /// distance `d = v² / 2a`. If the remaining travel absorbs the whole
    /// stopping distance the full velocity is consumed; otherwise the bar
    /// runs to its bound and the velocity still carried at that point is
    /// left for the caller.
    pub fn consume_fling(&mut self, velocity: f32) -> f32 {
        if velocity == 0.0 {
            return 0.0;
        }
        let travel = if velocity < 0.0 {
            self.height_offset - self.height_offset_limit
        } else {
            -self.height_offset
        };
        if travel <= 0.0 {
            return 0.0;
        }

        let stopping_distance = velocity * velocity / (2.0 * FLING_DECELERATION);
        let consumed = if stopping_distance <= travel {
            self.height_offset = (self.height_offset + stopping_distance.copysign(velocity))
                .clamp(self.height_offset_limit, 0.0);
            velocity
        } else {
            let carried = (velocity * velocity - 2.0 * FLING_DECELERATION * travel)
                .sqrt()
                .copysign(velocity);
            self.height_offset = if velocity < 0.0 {
                self.height_offset_limit
            } else {
                0.0
            };
            velocity - carried
        };
        tracing::trace!(velocity, consumed, offset = self.height_offset, "top bar fling");
        consumed
    }
}
