use super::formulas::win_from_tie;
use super::{path_probability as weigh, win_probability_over, ServeProbabilities, TransitionModel};
use crate::error::Result;
use crate::paths::{generate_all_paths, Path, PathSet, PathState, TiebreakNode};
use crate::score::{MatchFormat, Player, TiebreakScore};

/// Points inside a tiebreak, each won by its server with that player's
/// serve probability.
#[derive(Debug, Clone, Copy)]
pub struct TiebreakModel {
    points: ServeProbabilities,
}

impl TiebreakModel {
    pub fn new(points: ServeProbabilities) -> Self {
        Self { points }
    }
}

impl TransitionModel<TiebreakNode> for TiebreakModel {
    fn step(&self, from: &TiebreakNode, to: &TiebreakNode) -> f64 {
        let server = from.serves_next;
        let p = self.points.of(server);
        if to.count(server) > from.count(server) {
            p
        } else {
            1.0 - p
        }
    }

    fn boundary_win(&self, _state: &TiebreakNode, player: Player) -> f64 {
        win_from_tie(self.points.of(player), self.points.of(player.other()))
    }
}

/// Paths from one tiebreak score and server.
#[derive(Debug, Clone)]
pub struct TiebreakQuery {
    paths: PathSet<TiebreakNode>,
}

impl TiebreakQuery {
    pub fn new(score: TiebreakScore, serves_next: Player) -> Result<Self> {
        Ok(Self {
            paths: generate_all_paths(TiebreakNode::new(score, serves_next))?,
        })
    }

    pub fn paths(&self) -> &PathSet<TiebreakNode> {
        &self.paths
    }

    pub fn win_probability(&self, points: ServeProbabilities, player: Player) -> f64 {
        win_probability_over(&self.paths, &TiebreakModel::new(points), player)
    }
}

pub fn path_probability(path: &Path<'_, TiebreakNode>, points: ServeProbabilities) -> f64 {
    weigh(path, &TiebreakModel::new(points))
}

/// Probability that `player` wins the tiebreak from `score` when
/// `serves_next` serves the next point.
pub fn win_probability(
    score: &TiebreakScore,
    serves_next: Player,
    points: ServeProbabilities,
    player: Player,
) -> Result<f64> {
    Ok(TiebreakQuery::new(*score, serves_next)?.win_probability(points, player))
}

/// Probability that player one wins a fresh tiebreak served first by `first_server`.
pub fn fresh_tiebreak_win(
    format: &MatchFormat,
    is_super: bool,
    first_server: Player,
    points: ServeProbabilities,
) -> Result<f64> {
    win_probability(
        &TiebreakScore::blank(is_super, *format),
        first_server,
        points,
        Player::One,
    )
}
