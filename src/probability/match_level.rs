use tracing::debug;

use super::set::{SetInputs, SetInputsBuilder, SetQuery};
use super::tiebreak::TiebreakQuery;
use super::{path_probability as weigh, win_probability_over, ServeProbabilities, TransitionModel};
use crate::error::{check_probability, Result, ScoreError};
use crate::paths::{generate_all_paths, Path, PathSet, PathState};
use crate::score::{MatchFormat, MatchScore, MatchStage, Player, SetScore, TiebreakScore};

// ── Inputs from the level below ──────────────────────────────────────────────

/// Set-level probabilities a match query consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchInputs {
    /// Inputs for regular sets
    regular: SetInputs,
    /// Inputs for the deciding set (same as `regular` when a match tiebreak decides)
    deciding: SetInputs,
    /// Probability that player one wins a fresh regular set
    set_win: f64,
    /// Probability that player one wins the deciding set or match tiebreak
    deciding_win: f64,
}

impl MatchInputs {
    pub fn from_points(points: ServeProbabilities, format: &MatchFormat) -> Result<Self> {
        Ok(MatchInputsBuilder::new(format)?.build(points))
    }

    /// Replace the fresh-set probabilities with already-known values.
    pub fn with_set_probabilities(mut self, set_win: f64, deciding_win: f64) -> Result<Self> {
        self.set_win = check_probability(set_win)?;
        self.deciding_win = check_probability(deciding_win)?;
        Ok(self)
    }

    pub fn set_inputs(&self, deciding: bool) -> &SetInputs {
        if deciding {
            &self.deciding
        } else {
            &self.regular
        }
    }

    pub fn set_win(&self) -> f64 {
        self.set_win
    }

    pub fn deciding_win(&self) -> f64 {
        self.deciding_win
    }

    pub fn points(&self) -> ServeProbabilities {
        self.regular.points()
    }
}

#[derive(Debug, Clone)]
enum DecidingQuery {
    Set {
        inputs: SetInputsBuilder,
        query: SetQuery,
    },
    MatchTiebreak(TiebreakQuery),
}

/// Prepared fresh-set queries for one match format.
#[derive(Debug, Clone)]
pub struct MatchInputsBuilder {
    regular_inputs: SetInputsBuilder,
    regular_set: SetQuery,
    deciding: DecidingQuery,
}

impl MatchInputsBuilder {
    pub fn new(format: &MatchFormat) -> Result<Self> {
        format.sets_to_win()?;
        let regular_inputs = SetInputsBuilder::new(format, format.set_ending)?;
        let regular_set = SetQuery::new(SetScore::new(0, 0, false, *format)?, Player::One)?;
        let deciding = if format.match_tiebreak {
            DecidingQuery::MatchTiebreak(TiebreakQuery::new(
                TiebreakScore::blank(true, *format),
                Player::One,
            )?)
        } else {
            DecidingQuery::Set {
                inputs: SetInputsBuilder::new(format, format.final_set_ending)?,
                query: SetQuery::new(SetScore::new(0, 0, true, *format)?, Player::One)?,
            }
        };
        Ok(Self {
            regular_inputs,
            regular_set,
            deciding,
        })
    }

    pub fn build(&self, points: ServeProbabilities) -> MatchInputs {
        let regular = self.regular_inputs.build(points);
        let set_win = self.regular_set.p1_wins(&regular);
        let (deciding, deciding_win) = match &self.deciding {
            DecidingQuery::Set { inputs, query } => {
                let deciding = inputs.build(points);
                (deciding, query.p1_wins(&deciding))
            }
            DecidingQuery::MatchTiebreak(query) => {
                (regular, query.win_probability(points, Player::One))
            }
        };
        MatchInputs {
            regular,
            deciding,
            set_win,
            deciding_win,
        }
    }
}

// ── Path model ───────────────────────────────────────────────────────────────

/// Sets inside a match: each step is a set won by player one with the fresh
/// set probability (deciding-set probability when both need one set).
#[derive(Debug, Clone, Copy)]
pub struct MatchModel<'a> {
    inputs: &'a MatchInputs,
}

impl<'a> MatchModel<'a> {
    pub fn new(inputs: &'a MatchInputs) -> Self {
        Self { inputs }
    }
}

impl TransitionModel<MatchScore> for MatchModel<'_> {
    fn step(&self, from: &MatchScore, to: &MatchScore) -> f64 {
        let p1_set = if from.is_deciding_set() {
            self.inputs.deciding_win
        } else {
            self.inputs.set_win
        };
        if to.count(Player::One) > from.count(Player::One) {
            p1_set
        } else {
            1.0 - p1_set
        }
    }

    /// Match scores never sit on a repetition boundary.
    fn boundary_win(&self, _state: &MatchScore, _player: Player) -> f64 {
        0.0
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum MatchQueryKind {
    Boundary {
        paths: PathSet<MatchScore>,
    },
    Set {
        set: SetQuery,
        deciding: bool,
        p1_takes_set: Box<MatchQuery>,
        p2_takes_set: Box<MatchQuery>,
    },
    MatchTiebreak {
        tiebreak: TiebreakQuery,
    },
}

/// Win-probability query for one match score, reusable across many inputs.
#[derive(Debug, Clone)]
pub struct MatchQuery {
    kind: MatchQueryKind,
}

impl MatchQuery {
    /// `serves_next` only matters when a set or match tiebreak is in progress.
    pub fn new(score: MatchScore, serves_next: Player) -> Result<Self> {
        if !score.sub_contest_in_progress() {
            let paths = generate_all_paths(score)?;
            debug!(score = %score, paths = paths.len(), "match paths generated");
            return Ok(Self {
                kind: MatchQueryKind::Boundary { paths },
            });
        }
        let kind = match score.stage() {
            MatchStage::Set(set) => MatchQueryKind::Set {
                set: SetQuery::new(*set, serves_next)?,
                deciding: set.is_final_set(),
                p1_takes_set: Box::new(Self::new(score.after_set(Player::One)?, serves_next)?),
                p2_takes_set: Box::new(Self::new(score.after_set(Player::Two)?, serves_next)?),
            },
            MatchStage::MatchTiebreak(tiebreak) => MatchQueryKind::MatchTiebreak {
                tiebreak: TiebreakQuery::new(*tiebreak, serves_next)?,
            },
            MatchStage::Over => {
                return Err(ScoreError::InconsistentState(format!(
                    "finished match {score} reported a set in progress"
                )))
            }
        };
        Ok(Self { kind })
    }

    pub fn win_probability(&self, inputs: &MatchInputs, player: Player) -> f64 {
        player.share(self.p1_wins(inputs))
    }

    fn p1_wins(&self, inputs: &MatchInputs) -> f64 {
        match &self.kind {
            MatchQueryKind::Boundary { paths } => {
                win_probability_over(paths, &MatchModel::new(inputs), Player::One)
            }
            MatchQueryKind::Set {
                set,
                deciding,
                p1_takes_set,
                p2_takes_set,
            } => {
                let p1_set = set.p1_wins(inputs.set_inputs(*deciding));
                p1_set * p1_takes_set.p1_wins(inputs) + (1.0 - p1_set) * p2_takes_set.p1_wins(inputs)
            }
            MatchQueryKind::MatchTiebreak { tiebreak } => {
                tiebreak.win_probability(inputs.points(), Player::One)
            }
        }
    }

    pub fn paths(&self) -> Option<&PathSet<MatchScore>> {
        match &self.kind {
            MatchQueryKind::Boundary { paths } => Some(paths),
            _ => None,
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

pub fn path_probability(path: &Path<'_, MatchScore>, inputs: &MatchInputs) -> f64 {
    weigh(path, &MatchModel::new(inputs))
}

/// Probability that `player` wins the match from `score`, with `serves_next`
/// serving the next point.
pub fn win_probability(
    score: &MatchScore,
    serves_next: Player,
    points: ServeProbabilities,
    player: Player,
) -> Result<f64> {
    let inputs = MatchInputs::from_points(points, score.format())?;
    win_probability_with(score, serves_next, &inputs, player)
}

/// As [`win_probability`], with the set-level probabilities supplied.
pub fn win_probability_with(
    score: &MatchScore,
    serves_next: Player,
    inputs: &MatchInputs,
    player: Player,
) -> Result<f64> {
    Ok(MatchQuery::new(*score, serves_next)?.win_probability(inputs, player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::set::win_probability as set_win_probability;
    use crate::probability::total_probability;
    use crate::score::{GameScore, SetEnding};
    use approx::assert_relative_eq;

    fn points(p1: f64, p2: f64) -> ServeProbabilities {
        ServeProbabilities::new(p1, p2).unwrap()
    }

    #[test]
    fn test_paths_partition_probability() {
        let format = MatchFormat::best_of(5);
        let inputs = MatchInputs::from_points(points(0.65, 0.60), &format).unwrap();
        let query = MatchQuery::new(MatchScore::blank(format).unwrap(), Player::One).unwrap();
        let total = total_probability(query.paths().unwrap(), &MatchModel::new(&inputs));
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_best_of_three_closed_form() {
        // s^2 (3 - 2s) when every set has the same probability s
        let format = MatchFormat::best_of(3);
        let inputs = MatchInputs::from_points(points(0.65, 0.60), &format).unwrap();
        let s = inputs.set_win();
        assert_relative_eq!(inputs.deciding_win(), s, epsilon = 1e-12);
        let p = win_probability_with(&MatchScore::blank(format).unwrap(), Player::One, &inputs, Player::One)
            .unwrap();
        assert_relative_eq!(p, s * s * (3.0 - 2.0 * s), epsilon = 1e-12);
    }

    #[test]
    fn test_set_win_matches_set_engine() {
        let format = MatchFormat::best_of(3);
        let serve = points(0.65, 0.60);
        let inputs = MatchInputs::from_points(serve, &format).unwrap();
        let direct = set_win_probability(
            &SetScore::new(0, 0, false, format).unwrap(),
            Player::One,
            serve,
            Player::One,
        )
        .unwrap();
        assert_relative_eq!(inputs.set_win(), direct, epsilon = 1e-12);
    }

    #[test]
    fn test_equal_players_are_even() {
        let format = MatchFormat::best_of(5);
        let p = win_probability(&MatchScore::blank(format).unwrap(), Player::One, points(0.6, 0.6), Player::Two)
            .unwrap();
        assert_relative_eq!(p, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_final_match_is_exact() {
        let format = MatchFormat::best_of(3);
        let won = MatchScore::new(2, 1, format).unwrap();
        assert_eq!(win_probability(&won, Player::One, points(0.1, 0.9), Player::One).unwrap(), 1.0);
    }

    #[test]
    fn test_mid_set_decomposition() {
        let format = MatchFormat::best_of(3);
        let serve = points(0.65, 0.60);
        let inputs = MatchInputs::from_points(serve, &format).unwrap();
        let game = GameScore::new(0, 2, format).unwrap();
        let set = SetScore::with_game(4, 5, false, game).unwrap();
        let score = MatchScore::with_set(1, 0, set).unwrap();
        let p = win_probability_with(&score, Player::One, &inputs, Player::One).unwrap();

        let p_set = set_win_probability(&set, Player::One, serve, Player::One).unwrap();
        let won = win_probability_with(&MatchScore::new(2, 0, format).unwrap(), Player::One, &inputs, Player::One).unwrap();
        let lost = win_probability_with(&MatchScore::new(1, 1, format).unwrap(), Player::One, &inputs, Player::One).unwrap();
        assert_eq!(won, 1.0);
        assert_relative_eq!(p, p_set * won + (1.0 - p_set) * lost, epsilon = 1e-12);
    }

    #[test]
    fn test_match_tiebreak_decides() {
        let format = MatchFormat::best_of(3).with_match_tiebreak(true);
        let serve = points(0.66, 0.62);
        let inputs = MatchInputs::from_points(serve, &format).unwrap();
        let one_all = MatchScore::new(1, 1, format).unwrap();
        let p = win_probability_with(&one_all, Player::One, &inputs, Player::One).unwrap();
        assert_relative_eq!(p, inputs.deciding_win(), epsilon = 1e-12);

        let tiebreak = TiebreakScore::new(5, 5, true, format).unwrap();
        let in_progress = MatchScore::with_match_tiebreak(1, 1, tiebreak).unwrap();
        let mid = win_probability_with(&in_progress, Player::Two, &inputs, Player::One).unwrap();
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_advantage_final_set_changes_deciding_probability() {
        let format = MatchFormat::best_of(5).with_final_set_ending(SetEnding::Advantage);
        let inputs = MatchInputs::from_points(points(0.70, 0.60), &format).unwrap();
        assert!(inputs.deciding_win() > 0.5);
        assert!((inputs.deciding_win() - inputs.set_win()).abs() > 1e-6);
    }

    #[test]
    fn test_known_set_probabilities_override() {
        let format = MatchFormat::best_of(3);
        let inputs = MatchInputs::from_points(points(0.6, 0.6), &format)
            .unwrap()
            .with_set_probabilities(0.8, 0.8)
            .unwrap();
        let p = win_probability_with(&MatchScore::blank(format).unwrap(), Player::One, &inputs, Player::One)
            .unwrap();
        assert_relative_eq!(p, 0.64 * (3.0 - 1.6), epsilon = 1e-12);
        assert!(inputs.with_set_probabilities(1.1, 0.5).is_err());
    }

    #[test]
    fn test_monotonic_in_serve_probability() {
        let format = MatchFormat::best_of(3);
        let query = MatchQuery::new(MatchScore::new(0, 1, format).unwrap(), Player::One).unwrap();
        let builder = MatchInputsBuilder::new(&format).unwrap();
        let mut last = -1.0;
        for i in 1..10 {
            let p1 = i as f64 / 10.0;
            let p = query.win_probability(&builder.build(points(p1, 0.6)), Player::One);
            assert!(p > last, "not increasing at p1 = {p1}");
            last = p;
        }
    }
}
