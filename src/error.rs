//! Error taxonomy for score construction and probability queries.
//!
//! Every failure is local and synchronous: a malformed score or parameter is
//! rejected at construction, and the aggregator never fails once its inputs
//! have been validated.

use thiserror::Error;

/// Errors surfaced by the scoring model and the probability engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// The count pair cannot be reached under the level's rules
    #[error("invalid {level} score {p1}-{p2}: {reason}")]
    InvalidScore {
        level: &'static str,
        p1: u32,
        p2: u32,
        reason: String,
    },

    /// An outcome was recorded on (or successors requested from) a terminal score
    #[error("{level} is already final")]
    AlreadyFinal { level: &'static str },

    /// Player designator outside {1, 2}
    #[error("invalid player {0}: expected 1 or 2")]
    InvalidPlayer(u8),

    /// Probability outside [0, 1] (or NaN)
    #[error("invalid probability {0}: expected a value in [0, 1]")]
    InvalidProbability(f64),

    /// Format configuration that no score can be built from
    #[error("invalid match format: {0}")]
    InvalidFormat(String),

    /// Interpolation grid that cannot be built or evaluated
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Internal invariant violation in a composite score
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

/// Convenience result alias for the library
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Reject probabilities outside [0, 1], including NaN.
pub fn check_probability(p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ScoreError::InvalidProbability(p))
    }
}
