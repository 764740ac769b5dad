use crate::pipeline::zones::ZoneMasses;
use serde::{Deserialize, Serialize};

/// Directional command steered toward the least obstructed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidanceDecision {
    MoveLeft,
    MoveForward,
    MoveRight,
}

impl GuidanceDecision {
    /// Exact wire string sent to the companion device: unframed UTF-8,
    /// no length prefix, no acknowledgment.
    pub fn as_message(&self) -> &'static str {
        match self {
            GuidanceDecision::MoveLeft => "Move left",
            GuidanceDecision::MoveForward => "Move forward",
            GuidanceDecision::MoveRight => "Move right",
        }
    }
}

/// Minimum-mass-direction heuristic.
///
/// Branch order and strict comparisons are load-bearing: a side zone wins
/// only when it is the strict minimum, and every tie (including center being
/// the minimum) falls through to forward.
pub fn decide(masses: &ZoneMasses) -> GuidanceDecision {
    if masses.left < masses.center && masses.left < masses.right {
        GuidanceDecision::MoveLeft
    } else if masses.right < masses.center && masses.right < masses.left {
        GuidanceDecision::MoveRight
    } else {
        GuidanceDecision::MoveForward
    }
}
