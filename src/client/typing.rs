//! Typing Debouncer
//!
//! Keystroke-driven typing signals with a trailing quiet window: the
//! first keystroke emits an immediate "started typing" edge, and a
//! single "stopped typing" edge fires once no keystroke has arrived
//! for the quiet window (timer reset on every keystroke). That bounds
//! stop signals to one per pause instead of one per keystroke.
//!
//! Time is passed in by the caller so the state machine is testable
//! without sleeping.

use std::time::{Duration, Instant};

/// Default trailing quiet window
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_secs(2);

/// An edge the caller must forward to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    /// Send `is_typing = true`
    Start,
    /// Send `is_typing = false`
    Stop,
}

/// Per-conversation typing debouncer
#[derive(Debug)]
pub struct TypingDebouncer {
    quiet_window: Duration,
    active: bool,
    last_keystroke: Option<Instant>,
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

impl TypingDebouncer {
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            active: false,
            last_keystroke: None,
        }
    }

    /// Record a keystroke. Returns `Start` on the inactive→active edge;
    /// subsequent keystrokes only reset the trailing timer.
    pub fn keystroke(&mut self, now: Instant) -> Option<TypingSignal> {
        self.last_keystroke = Some(now);
        if self.active {
            None
        } else {
            self.active = true;
            Some(TypingSignal::Start)
        }
    }

    /// Poll the trailing timer. Returns `Stop` exactly once per pause,
    /// when the quiet window has elapsed since the last keystroke.
    pub fn poll(&mut self, now: Instant) -> Option<TypingSignal> {
        if !self.active {
            return None;
        }
        let last = self.last_keystroke?;
        if now.duration_since(last) >= self.quiet_window {
            self.active = false;
            self.last_keystroke = None;
            Some(TypingSignal::Stop)
        } else {
            None
        }
    }

    /// A send just happened: the server cleared the typing entry as a
    /// side effect, so the trailing timer is cancelled without emitting
    /// another signal.
    pub fn message_sent(&mut self) {
        self.active = false;
        self.last_keystroke = None;
    }

    /// Explicit stop (conversation switched, input blurred). Returns
    /// the `Stop` edge if one is owed.
    pub fn stop_now(&mut self) -> Option<TypingSignal> {
        if self.active {
            self.active = false;
            self.last_keystroke = None;
            Some(TypingSignal::Stop)
        } else {
            None
        }
    }

    /// Whether a "started typing" edge has been emitted without a
    /// matching stop
    pub fn is_active(&self) -> bool {
        self.active
    }
}
