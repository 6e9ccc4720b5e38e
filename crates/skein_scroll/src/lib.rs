//! Skein Scroll Coordination
//!
//! Arbitrates a single stream of drag/fling events among three independent,
//! potentially conflicting consumers:
//!
//! - a collapsible top bar ([`TopBarController`])
//! - a pull-to-refresh gesture ([`PullToRefresh`])
//! - a rubber-band boundary overscroll ([`OverscrollController`])
//!
//! The [`ScrollPriorityRouter`] owns all three and routes every scroll
//! callback to at most one of them in a fixed precedence order, so no two
//! consumers ever mutate state for the same event.
//!
//! # Example
//!
//! ```rust
//! use skein_core::events::ScrollSource;
//! use skein_scroll::{
//!     OverscrollController, PullToRefresh, RefreshConfig, ScrollPriority,
//!     ScrollPriorityRouter, TopBarController,
//! };
//!
//! let top_bar = TopBarController::new(-200.0).unwrap();
//! let refresh = PullToRefresh::new(RefreshConfig::default(), || {}).unwrap();
//! let mut router =
//!     ScrollPriorityRouter::new(top_bar, refresh, OverscrollController::default());
//!
//! router.on_gesture_start();
//! let consumed = router.on_pre_scroll(-50.0, ScrollSource::UserInput);
//! assert_eq!(consumed, -50.0);
//! assert_eq!(router.current_priority(), ScrollPriority::TopBar);
//! ```

use thiserror::Error;

pub mod overscroll;
pub mod priority;
pub mod refresh;
pub mod router;
pub mod top_bar;

pub use overscroll::{OverscrollController, ScrollState};
pub use priority::ScrollPriority;
pub use refresh::{PullToRefresh, RefreshConfig, RefreshState};
pub use router::ScrollPriorityRouter;
pub use top_bar::TopBarController;

/// Construction-time configuration errors
///
/// Clamping during normal operation is expected behavior; these errors are
/// reserved for configurations that could never behave correctly.
#[derive(Debug, Error, PartialEq)]
pub enum ScrollError {
    #[error("top bar height offset limit must be negative and finite, got {0}")]
    InvalidBarLimit(f32),
    #[error("pull-to-refresh arm threshold must be positive and finite, got {0}")]
    InvalidArmThreshold(f32),
}
