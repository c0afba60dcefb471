use tracing::debug;

use super::formulas::win_from_tie;
use super::game::GameQuery;
use super::tiebreak::TiebreakQuery;
use super::{path_probability as weigh, win_probability_over, ServeProbabilities, TransitionModel};
use crate::error::{check_probability, Result, ScoreError};
use crate::paths::{generate_all_paths, Path, PathSet, PathState, SetNode};
use crate::score::{GameScore, MatchFormat, Player, SetEnding, SetScore, SetStage, TiebreakScore};

// ── Inputs from the level below ──────────────────────────────────────────────

/// Lower-level probabilities a set query consumes.
///
/// Normally derived from serve probabilities with [`SetInputs::from_points`];
/// a grid builder holding memoized game and tiebreak results can supply them
/// directly through [`SetInputs::with_known`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetInputs {
    points: ServeProbabilities,
    /// Probability that each player holds a fresh service game
    hold: [f64; 2],
    /// Probability that player one wins a fresh tiebreak, by first server
    tiebreak: [f64; 2],
}

impl SetInputs {
    /// Derive game and tiebreak probabilities for sets with `ending`.
    pub fn from_points(
        points: ServeProbabilities,
        format: &MatchFormat,
        ending: SetEnding,
    ) -> Result<Self> {
        Ok(SetInputsBuilder::new(format, ending)?.build(points))
    }

    /// Use already-known lower-level probabilities.
    ///
    /// `hold` is (player one holds, player two holds); `tiebreak` is the
    /// probability that player one wins a tiebreak when (player one, player
    /// two) serves first.
    pub fn with_known(
        points: ServeProbabilities,
        hold: (f64, f64),
        tiebreak: (f64, f64),
    ) -> Result<Self> {
        Ok(Self {
            points,
            hold: [check_probability(hold.0)?, check_probability(hold.1)?],
            tiebreak: [check_probability(tiebreak.0)?, check_probability(tiebreak.1)?],
        })
    }

    pub fn points(&self) -> ServeProbabilities {
        self.points
    }

    /// Probability that `server` holds a fresh game
    pub fn hold(&self, server: Player) -> f64 {
        server.pick(self.hold[0], self.hold[1])
    }

    /// Probability that player one wins a fresh tiebreak served first by `first_server`
    pub fn tiebreak(&self, first_server: Player) -> f64 {
        first_server.pick(self.tiebreak[0], self.tiebreak[1])
    }
}

/// Prepared fresh-game and fresh-tiebreak queries, reused across many
/// serve-probability pairs.
#[derive(Debug, Clone)]
pub struct SetInputsBuilder {
    fresh_game: GameQuery,
    tiebreak_p1_first: TiebreakQuery,
    tiebreak_p2_first: TiebreakQuery,
}

impl SetInputsBuilder {
    pub fn new(format: &MatchFormat, ending: SetEnding) -> Result<Self> {
        let tiebreak = TiebreakScore::blank(ending.is_super(), *format);
        Ok(Self {
            fresh_game: GameQuery::new(GameScore::blank(*format), Player::One)?,
            tiebreak_p1_first: TiebreakQuery::new(tiebreak, Player::One)?,
            tiebreak_p2_first: TiebreakQuery::new(tiebreak, Player::Two)?,
        })
    }

    pub fn build(&self, points: ServeProbabilities) -> SetInputs {
        SetInputs {
            points,
            hold: [
                self.fresh_game.server_wins(points.p1()),
                self.fresh_game.server_wins(points.p2()),
            ],
            tiebreak: [
                self.tiebreak_p1_first.win_probability(points, Player::One),
                self.tiebreak_p2_first.win_probability(points, Player::One),
            ],
        }
    }
}

// ── Path model ───────────────────────────────────────────────────────────────

/// Games inside a set: each step is a service game won by its server with
/// that player's hold probability.
#[derive(Debug, Clone, Copy)]
pub struct SetModel<'a> {
    inputs: &'a SetInputs,
    ending: SetEnding,
}

impl<'a> SetModel<'a> {
    pub fn new(inputs: &'a SetInputs, ending: SetEnding) -> Self {
        Self { inputs, ending }
    }

    fn p1_wins_from_tie(&self, serves_next: Player) -> f64 {
        if self.ending.plays_tiebreak() {
            self.inputs.tiebreak(serves_next)
        } else {
            win_from_tie(self.inputs.hold(Player::One), self.inputs.hold(Player::Two))
        }
    }
}

impl TransitionModel<SetNode> for SetModel<'_> {
    fn step(&self, from: &SetNode, to: &SetNode) -> f64 {
        let server = from.serves_next;
        let hold = self.inputs.hold(server);
        if to.count(server) > from.count(server) {
            hold
        } else {
            1.0 - hold
        }
    }

    fn boundary_win(&self, state: &SetNode, player: Player) -> f64 {
        player.share(self.p1_wins_from_tie(state.serves_next))
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum SetQueryKind {
    /// At a game boundary: enumerate games
    Boundary {
        paths: PathSet<SetNode>,
        ending: SetEnding,
    },
    /// Part-way through a game: split on its outcome
    Game {
        game: GameQuery,
        server: Player,
        p1_takes_game: Box<SetQuery>,
        p2_takes_game: Box<SetQuery>,
    },
    /// Part-way through the tiebreak, which decides the set
    Tiebreak { tiebreak: TiebreakQuery },
}

/// Win-probability query for one set score and server, reusable across
/// many input probabilities.
#[derive(Debug, Clone)]
pub struct SetQuery {
    kind: SetQueryKind,
}

impl SetQuery {
    /// `serves_next` serves the next point (the current game's server when a
    /// game is in progress).
    pub fn new(score: SetScore, serves_next: Player) -> Result<Self> {
        if !score.sub_contest_in_progress() {
            let paths = generate_all_paths(SetNode::new(score, serves_next))?;
            debug!(score = %score, paths = paths.len(), "set paths generated");
            return Ok(Self {
                kind: SetQueryKind::Boundary {
                    paths,
                    ending: score.ending(),
                },
            });
        }
        let kind = match score.stage() {
            SetStage::Game(game) => SetQueryKind::Game {
                game: GameQuery::new(*game, serves_next)?,
                server: serves_next,
                p1_takes_game: Box::new(Self::new(
                    score.after_game(Player::One)?,
                    serves_next.other(),
                )?),
                p2_takes_game: Box::new(Self::new(
                    score.after_game(Player::Two)?,
                    serves_next.other(),
                )?),
            },
            SetStage::Tiebreak(tiebreak) => SetQueryKind::Tiebreak {
                tiebreak: TiebreakQuery::new(*tiebreak, serves_next)?,
            },
            SetStage::Over => {
                return Err(ScoreError::InconsistentState(format!(
                    "finished set {score} reported a game in progress"
                )))
            }
        };
        Ok(Self { kind })
    }

    pub fn win_probability(&self, inputs: &SetInputs, player: Player) -> f64 {
        player.share(self.p1_wins(inputs))
    }

    pub(crate) fn p1_wins(&self, inputs: &SetInputs) -> f64 {
        match &self.kind {
            SetQueryKind::Boundary { paths, ending } => {
                win_probability_over(paths, &SetModel::new(inputs, *ending), Player::One)
            }
            SetQueryKind::Game {
                game,
                server,
                p1_takes_game,
                p2_takes_game,
            } => {
                let server_holds = game.server_wins(inputs.points().of(*server));
                let p1_game = server.share(server_holds);
                p1_game * p1_takes_game.p1_wins(inputs)
                    + (1.0 - p1_game) * p2_takes_game.p1_wins(inputs)
            }
            SetQueryKind::Tiebreak { tiebreak } => {
                tiebreak.win_probability(inputs.points(), Player::One)
            }
        }
    }

    /// Paths enumerated when the query starts at a game boundary
    pub fn paths(&self) -> Option<&PathSet<SetNode>> {
        match &self.kind {
            SetQueryKind::Boundary { paths, .. } => Some(paths),
            _ => None,
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

pub fn path_probability(path: &Path<'_, SetNode>, inputs: &SetInputs, ending: SetEnding) -> f64 {
    weigh(path, &SetModel::new(inputs, ending))
}

/// Probability that `player` wins the set from `score`, with `serves_next`
/// serving the next point.
pub fn win_probability(
    score: &SetScore,
    serves_next: Player,
    points: ServeProbabilities,
    player: Player,
) -> Result<f64> {
    let inputs = SetInputs::from_points(points, score.format(), score.ending())?;
    win_probability_with(score, serves_next, &inputs, player)
}

/// As [`win_probability`], with the lower-level probabilities supplied.
pub fn win_probability_with(
    score: &SetScore,
    serves_next: Player,
    inputs: &SetInputs,
    player: Player,
) -> Result<f64> {
    Ok(SetQuery::new(*score, serves_next)?.win_probability(inputs, player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::total_probability;
    use approx::assert_relative_eq;

    fn format() -> MatchFormat {
        MatchFormat::default()
    }

    fn points(p1: f64, p2: f64) -> ServeProbabilities {
        ServeProbabilities::new(p1, p2).unwrap()
    }

    fn set(g1: u32, g2: u32) -> SetScore {
        SetScore::new(g1, g2, false, format()).unwrap()
    }

    fn inputs(p1: f64, p2: f64) -> SetInputs {
        SetInputs::from_points(points(p1, p2), &format(), SetEnding::Tiebreak).unwrap()
    }

    #[test]
    fn test_paths_partition_probability() {
        let query = SetQuery::new(set(0, 0), Player::One).unwrap();
        let inputs = inputs(0.65, 0.60);
        let model = SetModel::new(&inputs, SetEnding::Tiebreak);
        let total = total_probability(query.paths().unwrap(), &model);
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equal_players_are_even() {
        for p in [0.4, 0.55, 0.7] {
            let prob = win_probability(&set(0, 0), Player::One, points(p, p), Player::One).unwrap();
            assert_relative_eq!(prob, 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_final_set_scores_are_exact() {
        let won = set(6, 3);
        assert_eq!(
            win_probability(&won, Player::One, points(0.2, 0.9), Player::One).unwrap(),
            1.0
        );
        assert_eq!(
            win_probability(&won, Player::One, points(0.2, 0.9), Player::Two).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_decomposition_matches_direct_enumeration() {
        // P(set | 0-0) = hold * P(set | 1-0) + (1 - hold) * P(set | 0-1),
        // with the other player serving after the first game
        let inputs = inputs(0.65, 0.60);
        let direct = win_probability_with(&set(0, 0), Player::One, &inputs, Player::One).unwrap();

        let hold = inputs.hold(Player::One);
        let after_hold = win_probability_with(&set(1, 0), Player::Two, &inputs, Player::One).unwrap();
        let after_break = win_probability_with(&set(0, 1), Player::Two, &inputs, Player::One).unwrap();
        assert_relative_eq!(
            direct,
            hold * after_hold + (1.0 - hold) * after_break,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_mid_game_matches_next_point_average() {
        // Splitting on the next point must agree with splitting on the game
        let serve = points(0.65, 0.60);
        let at = |p1: u32, p2: u32| {
            let game = GameScore::new(p1, p2, format()).unwrap();
            let score = SetScore::with_game(3, 2, false, game).unwrap();
            win_probability(&score, Player::One, serve, Player::One).unwrap()
        };
        let expected = 0.65 * at(2, 0) + 0.35 * at(1, 1);
        assert_relative_eq!(at(1, 0), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_mid_tiebreak_uses_tiebreak_engine() {
        let serve = points(0.65, 0.60);
        let tiebreak = TiebreakScore::new(4, 2, false, format()).unwrap();
        let score = SetScore::with_tiebreak(6, 6, false, tiebreak).unwrap();
        let via_set = win_probability(&score, Player::Two, serve, Player::One).unwrap();
        let via_tiebreak =
            crate::probability::tiebreak::win_probability(&tiebreak, Player::Two, serve, Player::One)
                .unwrap();
        assert_relative_eq!(via_set, via_tiebreak, epsilon = 1e-12);
    }

    #[test]
    fn test_stronger_server_is_favoured() {
        let prob = win_probability(&set(0, 0), Player::One, points(0.65, 0.60), Player::One).unwrap();
        assert!(prob > 0.5 && prob < 1.0, "expected a modest edge, got {:.3}", prob);
    }

    #[test]
    fn test_monotonic_in_serve_probability() {
        let query = SetQuery::new(set(2, 4), Player::Two).unwrap();
        let mut last = -1.0;
        for i in 1..20 {
            let p1 = i as f64 / 20.0;
            let prob = query.win_probability(&inputs(p1, 0.62), Player::One);
            assert!(prob > last, "not increasing at p1 = {p1}");
            last = prob;
        }
    }

    #[test]
    fn test_known_inputs_override() {
        // Holding every game guarantees a tiebreak; the override decides it
        let known = SetInputs::with_known(points(0.6, 0.6), (1.0, 1.0), (0.7, 0.4)).unwrap();
        let p1_serving = win_probability_with(&set(0, 0), Player::One, &known, Player::One).unwrap();
        assert_relative_eq!(p1_serving, 0.7, epsilon = 1e-12);
        // Twelve games later the same player serves first in the tiebreak
        let p2_serving = win_probability_with(&set(0, 0), Player::Two, &known, Player::One).unwrap();
        assert_relative_eq!(p2_serving, 0.4, epsilon = 1e-12);
        assert!(SetInputs::with_known(points(0.6, 0.6), (1.2, 0.5), (0.5, 0.5)).is_err());
    }

    #[test]
    fn test_advantage_set_tie_formula() {
        let format = format().with_set_ending(SetEnding::Advantage);
        let serve = points(0.65, 0.60);
        let inputs = SetInputs::from_points(serve, &format, SetEnding::Advantage).unwrap();
        let tied = SetScore::new(8, 8, false, format).unwrap();
        let prob = win_probability_with(&tied, Player::One, &inputs, Player::One).unwrap();
        let expected = win_from_tie(inputs.hold(Player::One), inputs.hold(Player::Two));
        assert_relative_eq!(prob, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_mid_game_path_root() {
        let game = GameScore::new(1, 1, format()).unwrap();
        let score = SetScore::with_game(0, 0, false, game).unwrap();
        assert!(generate_all_paths(SetNode::new(score, Player::One)).is_err());
        // but the query decomposes instead
        assert!(SetQuery::new(score, Player::One).is_ok());
    }
}
