//! Exact tennis win probabilities.
//!
//! Scores at every level (game, tiebreak, set, match) are enumerated into all
//! finite paths to a final or tied score; each path is weighted by its step
//! probabilities and the results summed. Higher levels use the level below as
//! their step probability. Grids of results can be precomputed, interpolated
//! and stored in SQLite.

pub mod bridge;
pub mod contest;
pub mod error;
pub mod paths;
pub mod probability;
pub mod score;
pub mod simulation;
pub mod store;

pub use error::{Result, ScoreError};
pub use probability::ServeProbabilities;
pub use score::{GameScore, MatchFormat, MatchScore, Player, SetEnding, SetScore, TiebreakScore};
