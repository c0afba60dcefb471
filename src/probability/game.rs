use super::formulas::win_from_deuce;
use super::{path_probability as weigh, win_probability_over, TransitionModel};
use crate::error::{check_probability, Result};
use crate::paths::{generate_all_paths, Path, PathSet, PathState};
use crate::score::{GameScore, MatchFormat, Player};

/// A game served throughout by `server`, who wins each point with `p_serve`.
#[derive(Debug, Clone, Copy)]
pub struct GameModel {
    server: Player,
    p_serve: f64,
}

impl GameModel {
    pub fn new(server: Player, p_serve: f64) -> Result<Self> {
        Ok(Self {
            server,
            p_serve: check_probability(p_serve)?,
        })
    }
}

impl TransitionModel<GameScore> for GameModel {
    fn step(&self, from: &GameScore, to: &GameScore) -> f64 {
        if to.count(self.server) > from.count(self.server) {
            self.p_serve
        } else {
            1.0 - self.p_serve
        }
    }

    fn boundary_win(&self, _state: &GameScore, player: Player) -> f64 {
        let server_wins = win_from_deuce(self.p_serve);
        if player == self.server {
            server_wins
        } else {
            1.0 - server_wins
        }
    }
}

/// Paths from one game score, ready to be evaluated for many serve
/// probabilities.
#[derive(Debug, Clone)]
pub struct GameQuery {
    paths: PathSet<GameScore>,
    server: Player,
}

impl GameQuery {
    pub fn new(score: GameScore, server: Player) -> Result<Self> {
        Ok(Self {
            paths: generate_all_paths(score)?,
            server,
        })
    }

    pub fn paths(&self) -> &PathSet<GameScore> {
        &self.paths
    }

    pub fn server(&self) -> Player {
        self.server
    }

    pub fn win_probability(&self, p_serve: f64, player: Player) -> Result<f64> {
        let model = GameModel::new(self.server, p_serve)?;
        Ok(win_probability_over(&self.paths, &model, player))
    }

    /// Probability that the server wins the game.
    pub(crate) fn server_wins(&self, p_serve: f64) -> f64 {
        let model = GameModel {
            server: self.server,
            p_serve,
        };
        win_probability_over(&self.paths, &model, self.server)
    }
}

/// Probability of one game path when `server` wins each point with `p_serve`.
pub fn path_probability(path: &Path<'_, GameScore>, server: Player, p_serve: f64) -> Result<f64> {
    Ok(weigh(path, &GameModel::new(server, p_serve)?))
}

/// Probability that `player` wins the game from `score`.
pub fn win_probability(
    score: &GameScore,
    server: Player,
    p_serve: f64,
    player: Player,
) -> Result<f64> {
    GameQuery::new(*score, server)?.win_probability(p_serve, player)
}

/// Probability that a server winning each point with `p_serve` holds a fresh game.
pub fn hold_probability(format: &MatchFormat, p_serve: f64) -> Result<f64> {
    win_probability(&GameScore::blank(*format), Player::One, p_serve, Player::One)
}
