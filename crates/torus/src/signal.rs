//! Signal tracking and the tick debounce policy.
//!
//! Interpolation only runs while a relevant signal is live. Each
//! pointer move or scroll event arms its signal for a bounded number of
//! frames; every tick ages both signals, and when neither is armed the
//! runtime stops asking to be rescheduled. This is the backpressure
//! that keeps a page with declarative effects from doing per-frame work
//! while nothing moves.

use crate::geometry::{Point, Viewport};

/// The signal kinds the runtime distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Pointer,
    Scroll,
}

/// Snapshot of the input state for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalFrame {
    pub viewport: Viewport,
    /// Last known pointer position; `None` before the first move.
    pub pointer: Option<Point>,
    pub scroll: Point,
}

/// How many idle frames a signal stays armed after its last event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPolicy {
    pub pointer_idle_frames: u32,
    pub scroll_idle_frames: u32,
}

impl Default for TickPolicy {
    /// Pointer input settles fast; scroll momentum lingers.
    fn default() -> Self {
        TickPolicy {
            pointer_idle_frames: 5,
            scroll_idle_frames: 10,
        }
    }
}

/// Ages the armed signals frame by frame.
#[derive(Debug, Clone)]
pub struct SignalTracker {
    policy: TickPolicy,
    pointer_frames: u32,
    scroll_frames: u32,
}

impl SignalTracker {
    pub fn new(policy: TickPolicy) -> Self {
        SignalTracker {
            policy,
            pointer_frames: 0,
            scroll_frames: 0,
        }
    }

    /// Records an input event, re-arming its signal.
    pub fn note(&mut self, kind: SignalKind) {
        match kind {
            SignalKind::Pointer => self.pointer_frames = self.policy.pointer_idle_frames,
            SignalKind::Scroll => self.scroll_frames = self.policy.scroll_idle_frames,
        }
    }

    /// Consumes one frame; returns which signals are still armed for
    /// the tick being processed.
    pub fn advance(&mut self) -> ArmedSignals {
        let armed = ArmedSignals {
            pointer: self.pointer_frames > 0,
            scroll: self.scroll_frames > 0,
        };
        self.pointer_frames = self.pointer_frames.saturating_sub(1);
        self.scroll_frames = self.scroll_frames.saturating_sub(1);
        armed
    }

    /// Whether any signal would drive the next tick.
    pub fn any_armed(&self) -> bool {
        self.pointer_frames > 0 || self.scroll_frames > 0
    }
}

/// Which signals were live during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedSignals {
    pub pointer: bool,
    pub scroll: bool,
}

impl ArmedSignals {
    pub fn includes(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::Pointer => self.pointer,
            SignalKind::Scroll => self.scroll,
        }
    }

    pub fn any(&self) -> bool {
        self.pointer || self.scroll
    }
}
