//! Navigation guard.
//!
//! Entry to step N is gated on step N-1 having a stored payload. Only the
//! direct predecessor is consulted: if earlier steps are missing too, the
//! redirect target re-runs its own check and walks the user back one step
//! at a time.

use serde::Serialize;

/// Whether a step may be entered, and where to go if not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// The step may be entered.
    Proceed,
    /// The direct predecessor has no stored payload; return to it.
    Redirect { to_index: usize, to_step: String },
}

impl GuardDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Entry decision for the step at `index`, given the name of its direct
/// predecessor (`None` for the first step) and whether that predecessor has
/// a stored payload.
pub fn decide(index: usize, predecessor: Option<&str>, stored: bool) -> GuardDecision {
    if index == 0 {
        return GuardDecision::Proceed;
    }
    match predecessor {
        Some(name) if !stored => GuardDecision::Redirect {
            to_index: index - 1,
            to_step: name.to_string(),
        },
        _ => GuardDecision::Proceed,
    }
}
