//! State transition trait
//!
//! Every interaction state in the workspace is a plain `Copy` enum that maps
//! events to transitions through this trait. Keeping transitions in one
//! `match` per enum makes the legal state graph reviewable at a glance and
//! keeps illegal transitions unrepresentable at the call site:
//!
//! ```ignore
//! if let Some(next) = self.state.on_event(event_types::SCROLL_END) {
//!     self.state = next;
//! }
//! ```

use std::hash::Hash;

use crate::events::EventType;

/// Trait for state types that advance via event transitions
///
/// Implement this on a state enum to define which events cause which
/// transitions. Returning `None` means the event does not apply in the
/// current state and the caller keeps the state unchanged.
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventType) -> Option<Self>;
}
