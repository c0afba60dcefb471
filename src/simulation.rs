//! Monte Carlo play-outs used to cross-check the exact engine.
//!
//! Each trial clones the starting contest and plays random points until it
//! ends: the server wins a point with their serve probability.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contest::Contest;
use crate::error::Result;
use crate::probability::ServeProbabilities;
use crate::score::Player;

/// Trials that run this long are abandoned (both players can hold forever).
pub const MAX_POINTS_PER_TRIAL: usize = 10_000;

/// Outcome counts from a batch of simulated contests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trials: usize,
    pub p1_wins: usize,
    /// Trials abandoned after [`MAX_POINTS_PER_TRIAL`] points
    pub unresolved: usize,
    pub total_points: usize,
}

impl SimulationSummary {
    fn resolved(&self) -> usize {
        self.trials - self.unresolved
    }

    /// Observed probability that `player` wins, over resolved trials
    pub fn win_rate(&self, player: Player) -> f64 {
        if self.resolved() == 0 {
            return 0.5;
        }
        player.share(self.p1_wins as f64 / self.resolved() as f64)
    }

    /// Binomial standard error of [`win_rate`](Self::win_rate)
    pub fn standard_error(&self) -> f64 {
        let n = self.resolved() as f64;
        if n == 0.0 {
            return 0.0;
        }
        let p = self.win_rate(Player::One);
        (p * (1.0 - p) / n).sqrt()
    }

    pub fn mean_points(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.total_points as f64 / self.trials as f64
    }
}

/// Play `trials` copies of `contest` to completion.
pub fn simulate<C, R>(
    contest: &C,
    points: ServeProbabilities,
    trials: usize,
    rng: &mut R,
) -> Result<SimulationSummary>
where
    C: Contest + Clone,
    R: Rng + ?Sized,
{
    let mut summary = SimulationSummary {
        trials,
        p1_wins: 0,
        unresolved: 0,
        total_points: 0,
    };
    for _ in 0..trials {
        let mut play = contest.clone();
        let mut played = 0;
        while !play.is_over() && played < MAX_POINTS_PER_TRIAL {
            let server = play.serves_next();
            let winner = if rng.gen_bool(points.of(server)) {
                server
            } else {
                server.other()
            };
            play.record_point(winner)?;
            played += 1;
        }
        summary.total_points += played;
        match play.winner() {
            Some(Player::One) => summary.p1_wins += 1,
            Some(Player::Two) => {}
            None => summary.unresolved += 1,
        }
    }
    debug!(
        trials,
        p1_wins = summary.p1_wins,
        unresolved = summary.unresolved,
        "simulation finished"
    );
    Ok(summary)
}
