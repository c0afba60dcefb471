//! Exact win probabilities by summing over enumerated paths.
//!
//! Every level works the same way:
//! 1. Generate all paths from the starting score ([`crate::paths`]).
//! 2. Weight each path by the product of its step probabilities
//!    ([`path_probability`]).
//! 3. Multiply by the path's outcome value: 1 or 0 for a final score, the
//!    closed-form boundary probability ([`formulas`]) for a tie.
//! 4. Sum ([`win_probability_over`]).
//!
//! Higher levels take the level below as their step probability: a set step
//! uses the chance of holding a fresh game, a match step the chance of
//! winning a fresh set. Queries starting part-way through a game (or set)
//! split on the outcome of that sub-contest first.

pub mod formulas;
pub mod game;
pub mod match_level;
pub mod set;
pub mod tiebreak;

pub use game::GameQuery;
pub use match_level::{MatchInputs, MatchInputsBuilder, MatchQuery};
pub use set::{SetInputs, SetInputsBuilder, SetQuery};
pub use tiebreak::TiebreakQuery;

use serde::{Deserialize, Serialize};

use crate::error::{check_probability, Result};
use crate::paths::{Path, PathSet, PathState};
use crate::score::Player;

/// Each player's probability of winning a point on their own serve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServeProbabilities {
    p1: f64,
    p2: f64,
}

impl ServeProbabilities {
    pub fn new(p1: f64, p2: f64) -> Result<Self> {
        Ok(Self {
            p1: check_probability(p1)?,
            p2: check_probability(p2)?,
        })
    }

    /// Serve probability of `player`
    pub fn of(&self, player: Player) -> f64 {
        player.pick(self.p1, self.p2)
    }

    pub fn p1(&self) -> f64 {
        self.p1
    }

    pub fn p2(&self) -> f64 {
        self.p2
    }
}

/// Step and boundary probabilities for one level.
pub trait TransitionModel<S> {
    /// Probability of moving from `from` to `to` in one step.
    fn step(&self, from: &S, to: &S) -> f64;

    /// Probability that `player` eventually wins from the boundary `state`.
    fn boundary_win(&self, state: &S, player: Player) -> f64;
}

/// Probability that play follows `path` exactly. A one-state path has
/// probability 1.
pub fn path_probability<S, M>(path: &Path<'_, S>, model: &M) -> f64
where
    S: PathState,
    M: TransitionModel<S>,
{
    path.steps().map(|(from, to)| model.step(from, to)).product()
}

/// Value of the path's last state for `player`.
fn outcome_value<S, M>(state: &S, model: &M, player: Player) -> f64
where
    S: PathState,
    M: TransitionModel<S>,
{
    match state.winner() {
        Some(winner) if winner == player => 1.0,
        Some(_) => 0.0,
        None if state.is_boundary() => model.boundary_win(state, player),
        None => 0.0,
    }
}

/// Sum of path probability times outcome value over every path.
pub fn win_probability_over<S, M>(paths: &PathSet<S>, model: &M, player: Player) -> f64
where
    S: PathState,
    M: TransitionModel<S>,
{
    let total: f64 = paths
        .iter()
        .map(|path| path_probability(&path, model) * outcome_value(path.last(), model, player))
        .sum();
    total.clamp(0.0, 1.0)
}

/// Sum of all path probabilities; 1 whenever the paths partition the outcomes.
pub fn total_probability<S, M>(paths: &PathSet<S>, model: &M) -> f64
where
    S: PathState,
    M: TransitionModel<S>,
{
    paths.iter().map(|path| path_probability(&path, model)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_probabilities_validation() {
        assert!(ServeProbabilities::new(0.6, 0.7).is_ok());
        assert!(ServeProbabilities::new(1.2, 0.7).is_err());
        assert!(ServeProbabilities::new(0.6, -0.1).is_err());
        let points = ServeProbabilities::new(0.6, 0.7).unwrap();
        assert_eq!(points.of(Player::Two), 0.7);
    }
}
