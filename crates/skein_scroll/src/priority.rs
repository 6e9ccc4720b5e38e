//! Scroll priority
//!
//! Which single consumer is currently entitled to the active gesture's
//! events. Written only by the router; observers read it to suppress their
//! own scroll handling while a higher-priority consumer is active.

/// The consumer currently claiming the gesture's event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollPriority {
    /// No consumer has claimed the gesture; content scrolls normally
    #[default]
    None,
    /// The collapsible top bar is absorbing deltas
    TopBar,
    /// The pull-to-refresh gesture owns the stream
    PullToRefresh,
    /// The rubber-band boundary effect is absorbing deltas
    OverScroll,
}

impl ScrollPriority {
    /// Whether any consumer has claimed the gesture
    pub fn is_active(&self) -> bool {
        !matches!(self, ScrollPriority::None)
    }
}
