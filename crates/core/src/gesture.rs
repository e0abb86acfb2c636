//! Swipe recognition for the answer card.
//!
//! Pointer drags and arrow keys are turned into at most one left/right
//! decision per interaction. The visual parameters are pure functions of the
//! horizontal offset so they can be tested without simulating pointer events.
//! Time is supplied by the caller in milliseconds.

use crate::model::Choice;

/// Horizontal distance a drag must exceed to count as a swipe.
pub const SWIPE_THRESHOLD: f64 = 100.0;
/// Card rotation in degrees per unit of offset.
pub const ROTATION_PER_UNIT: f64 = 0.1;
/// Offset at which the card would be fully transparent, before clamping.
pub const FADE_DISTANCE: f64 = 300.0;
pub const MIN_OPACITY: f64 = 0.5;
/// Where a committed card flies to.
pub const EXIT_OFFSET: f64 = 300.0;
pub const EXIT_ROTATION: f64 = 30.0;
/// Exit animation length; the decision is released only after it.
pub const SETTLE_MS: u64 = 300;

//
// ─── VISUAL FEEDBACK ───────────────────────────────────────────────────────────
//

/// Presentation parameters for the card.
///
/// `animated` is false while the card tracks the pointer 1:1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardVisual {
    pub offset: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub animated: bool,
}

impl CardVisual {
    /// Card at rest at its anchor.
    pub const RESTING: CardVisual = CardVisual {
        offset: 0.0,
        rotation: 0.0,
        opacity: 1.0,
        animated: true,
    };

    /// Visual state for a card being dragged by `offset`.
    #[must_use]
    pub fn tracking(offset: f64) -> Self {
        Self {
            offset,
            rotation: offset * ROTATION_PER_UNIT,
            opacity: (1.0 - offset.abs() / FADE_DISTANCE).max(MIN_OPACITY),
            animated: false,
        }
    }

    /// Target of the exit animation after a committed swipe.
    #[must_use]
    pub fn exit(direction: Choice) -> Self {
        let sign = match direction {
            Choice::Left => -1.0,
            Choice::Right => 1.0,
        };
        Self {
            offset: sign * EXIT_OFFSET,
            rotation: sign * EXIT_ROTATION,
            opacity: 0.0,
            animated: true,
        }
    }
}

/// Decision for a finished drag. The threshold is exclusive.
#[must_use]
pub fn decide(offset: f64, threshold: f64) -> Option<Choice> {
    if offset.abs() > threshold {
        Some(if offset > 0.0 { Choice::Right } else { Choice::Left })
    } else {
        None
    }
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Keys the recognizer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// No drag was in progress.
    Ignored,
    /// The drag stayed within the threshold; the card snaps back.
    Reset(CardVisual),
    /// A swipe was recognized. The decision becomes available through
    /// [`SwipeRecognizer::poll`] once `ready_at` has passed.
    Committed {
        direction: Choice,
        exit: CardVisual,
        ready_at: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Dragging { anchor: f64, offset: f64 },
    Settling { direction: Choice, ready_at: u64 },
}

//
// ─── RECOGNIZER ────────────────────────────────────────────────────────────────
//

/// Single-card gesture state machine.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    threshold: f64,
    settle_ms: u64,
    phase: Phase,
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeRecognizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: SWIPE_THRESHOLD,
            settle_ms: SETTLE_MS,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_settle_ms(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    #[must_use]
    pub fn is_settling(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    /// Starts an interaction at `x`.
    ///
    /// Returns `None` when an interaction is already running or a decision is settling.
    pub fn pointer_down(&mut self, x: f64) -> Option<CardVisual> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.phase = Phase::Dragging {
            anchor: x,
            offset: 0.0,
        };
        Some(CardVisual::tracking(0.0))
    }

    /// Tracks the pointer. Ignored outside a drag.
    pub fn pointer_move(&mut self, x: f64) -> Option<CardVisual> {
        let Phase::Dragging { anchor, .. } = self.phase else {
            return None;
        };
        let offset = x - anchor;
        self.phase = Phase::Dragging { anchor, offset };
        Some(CardVisual::tracking(offset))
    }

    /// Ends the drag at time `now`.
    pub fn pointer_up(&mut self, now: u64) -> Release {
        let Phase::Dragging { offset, .. } = self.phase else {
            return Release::Ignored;
        };
        match decide(offset, self.threshold) {
            Some(direction) => {
                let ready_at = now.saturating_add(self.settle_ms);
                self.phase = Phase::Settling {
                    direction,
                    ready_at,
                };
                Release::Committed {
                    direction,
                    exit: CardVisual::exit(direction),
                    ready_at,
                }
            }
            None => {
                self.phase = Phase::Idle;
                Release::Reset(CardVisual::RESTING)
            }
        }
    }

    /// Arrow keys decide immediately. A drag in progress is abandoned.
    pub fn key(&mut self, key: Key) -> Option<Choice> {
        if self.is_settling() {
            return None;
        }
        let choice = match key {
            Key::ArrowLeft => Choice::Left,
            Key::ArrowRight => Choice::Right,
            Key::Other => return None,
        };
        self.phase = Phase::Idle;
        Some(choice)
    }

    /// Releases a settled decision once `now` reaches its deadline.
    pub fn poll(&mut self, now: u64) -> Option<Choice> {
        match self.phase {
            Phase::Settling {
                direction,
                ready_at,
            } if now >= ready_at => {
                self.phase = Phase::Idle;
                Some(direction)
            }
            _ => None,
        }
    }
}
