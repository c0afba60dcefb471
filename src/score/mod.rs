//! Score state machines for every level of tennis scoring.
//!
//! Each level is an immutable value type: a pair of counts plus the shared
//! [`MatchFormat`]. Scores move forward only through `record` (one point) or
//! `successors` (one step at the level's own granularity: points for games and
//! tiebreaks, games for sets, sets for matches).
//!
//! Levels:
//! - **Game**: points, ad or no-ad scoring
//! - **Tiebreak**: points to 7 (or 10 for a super-tiebreak), win by two
//! - **Set**: games, ending in a tiebreak or played out with advantage
//! - **Match**: sets, best-of-N with an optional deciding match tiebreak

pub mod format;
pub mod game;
pub mod match_score;
pub mod player;
pub mod set;
pub mod tiebreak;

pub use format::{MatchFormat, SetEnding};
pub use game::GameScore;
pub use match_score::{MatchScore, MatchStage};
pub use player::Player;
pub use set::{SetScore, SetStage};
pub use tiebreak::TiebreakScore;

use crate::error::Result;

/// Uniform contract implemented by the score of every level.
pub trait Score: Sized + Clone + PartialEq + std::fmt::Debug {
    /// Count held by `player` at this level's granularity
    fn count(&self, player: Player) -> u32;

    fn is_final(&self) -> bool;

    /// Winner of the contest; defined exactly when the score is final
    fn winner(&self) -> Option<Player>;

    /// True at the level's repetition boundary (deuce, tiebreak tie, n-n in a set)
    fn is_tied(&self) -> bool;

    /// The two scores reached when player one or player two takes the next
    /// step, or `None` once final.
    fn successors(&self) -> Option<(Self, Self)>;

    /// Apply one point won by `winner`.
    fn record(&self, winner: Player) -> Result<Self>;
}

/// Counts ordered from the point of view of `pov`.
pub(crate) fn ordered(pov: Player, p1: u32, p2: u32) -> (u32, u32) {
    match pov {
        Player::One => (p1, p2),
        Player::Two => (p2, p1),
    }
}
