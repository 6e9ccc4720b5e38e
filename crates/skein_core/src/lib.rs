//! Skein Core Primitives
//!
//! This crate provides the foundational pieces shared by the skein scroll
//! coordination stack:
//!
//! - **Event Model**: scroll/pull event constants and the source tag that
//!   distinguishes direct user input from programmatic deltas
//! - **State Machines**: the transition trait implemented by every
//!   interaction state enum in the workspace
//!
//! # Example
//!
//! ```rust
//! use skein_core::events::{event_types, ScrollSource};
//! use skein_core::fsm::StateTransitions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
//! enum Phase {
//!     #[default]
//!     Idle,
//!     Active,
//! }
//!
//! impl StateTransitions for Phase {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Phase::Idle, event_types::SCROLL) => Some(Phase::Active),
//!             (Phase::Active, event_types::SETTLED) => Some(Phase::Idle),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let phase = Phase::Idle;
//! assert_eq!(phase.on_event(event_types::SCROLL), Some(Phase::Active));
//! assert!(ScrollSource::UserInput.is_user_input());
//! ```

pub mod events;
pub mod fsm;

pub use events::{EventType, ScrollSource};
pub use fsm::StateTransitions;
