//! Grid builders: evaluate the exact engine over a serve-probability grid for
//! every starting score of a level.
//!
//! - **Game**: one curve per score, indexed by the server's serve probability
//! - **Tiebreak / set**: one surface per score and next server, over (p1, p2)
//! - **Match**: one surface per set score (serve order is irrelevant at set boundaries)
//!
//! Set grids can reuse memoized game and tiebreak grids instead of re-deriving
//! the lower levels at every cell (see [`SetLowerGrids`]).

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::grid::{evaluate_1d, evaluate_2d, GridSpec};
use super::surface::{Curve, CurveData, GridData, Interpolation, Surface, SurfaceData};
use crate::error::{Result, ScoreError};
use crate::probability::{
    GameQuery, MatchInputsBuilder, MatchQuery, ServeProbabilities, SetInputs, SetInputsBuilder,
    SetQuery, TiebreakQuery,
};
use crate::score::format::{GAME_POINTS, SUPER_TIEBREAK_POINTS, TIEBREAK_POINTS};
use crate::score::{
    GameScore, MatchFormat, MatchScore, Player, SetEnding, SetScore, TiebreakScore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Game,
    Tiebreak,
    Set,
    Match,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Game, Level::Tiebreak, Level::Set, Level::Match];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Game => "game",
            Level::Tiebreak => "tiebreak",
            Level::Set => "set",
            Level::Match => "match",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ScoreError::InvalidGrid(format!("unknown level '{s}'")))
    }
}

// ── Grid keys ────────────────────────────────────────────────────────────────

/// Compact name for the parts of a format that change probabilities,
/// e.g. `bo3-g6-tb` or `bo5-g6-tb-adv-noad`.
pub fn format_tag(format: &MatchFormat) -> String {
    let ending = |ending: SetEnding| match ending {
        SetEnding::Advantage => "adv",
        SetEnding::Tiebreak => "tb",
        SetEnding::SuperTiebreak => "stb",
    };
    let mut tag = match format.best_of_sets {
        Some(n) => format!("bo{n}"),
        None => "open".to_string(),
    };
    tag.push_str(&format!("-g{}-{}", format.set_length, ending(format.set_ending)));
    if format.match_tiebreak {
        tag.push_str("-mtb");
    } else if format.final_set_ending != format.set_ending {
        tag.push('-');
        tag.push_str(ending(format.final_set_ending));
    }
    if format.no_ad {
        tag.push_str("-noad");
    }
    tag
}

/// Identifies one precomputed grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridKey {
    pub level: Level,
    pub format: String,
    /// Starting score from player one's point of view, e.g. `5-4` or `final-6-5`
    pub score: String,
    /// Who serves next (the server, for games)
    pub server: Player,
}

impl GridKey {
    pub fn new(level: Level, format: &MatchFormat, score: String, server: Player) -> Self {
        Self {
            level,
            format: format_tag(format),
            score,
            server,
        }
    }

    /// Storage name, e.g. `set/bo3-g6-tb/5-4/P1`
    pub fn name(&self) -> String {
        format!("{}/{}/{}/{}", self.level, self.format, self.score, self.server)
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn count_key(p1: u32, p2: u32) -> String {
    format!("{p1}-{p2}")
}

fn set_key(score: &SetScore) -> String {
    let (g1, g2) = score.games(Player::One);
    if score.is_final_set() {
        format!("final-{g1}-{g2}")
    } else {
        count_key(g1, g2)
    }
}

// ── Starting scores ──────────────────────────────────────────────────────────

/// Every reachable game score, normalized, server's points first.
pub fn game_start_scores(format: &MatchFormat) -> Vec<GameScore> {
    (0..=GAME_POINTS)
        .flat_map(|a| (0..=GAME_POINTS).map(move |b| (a, b)))
        .filter_map(|(a, b)| GameScore::new(a, b, *format).ok())
        .filter(|score| score.normalized() == *score)
        .collect()
}

pub fn tiebreak_start_scores(format: &MatchFormat, is_super: bool) -> Vec<TiebreakScore> {
    let n = if is_super {
        SUPER_TIEBREAK_POINTS
    } else {
        TIEBREAK_POINTS
    };
    (0..=n)
        .flat_map(|a| (0..=n).map(move |b| (a, b)))
        .filter_map(|(a, b)| TiebreakScore::new(a, b, is_super, *format).ok())
        .filter(|score| score.normalized() == *score)
        .collect()
}

/// Every set score at a game boundary with at most one game past the set length.
pub fn set_start_scores(format: &MatchFormat, is_final_set: bool) -> Vec<SetScore> {
    let n = format.set_length + 1;
    (0..=n)
        .flat_map(|a| (0..=n).map(move |b| (a, b)))
        .filter_map(|(a, b)| SetScore::new(a, b, is_final_set, *format).ok())
        .collect()
}

/// Every match score at a set boundary, finished ones included.
pub fn match_start_scores(format: &MatchFormat) -> Result<Vec<MatchScore>> {
    let to_win = format.sets_to_win()?;
    Ok((0..=to_win)
        .flat_map(|a| (0..=to_win).map(move |b| (a, b)))
        .filter_map(|(a, b)| MatchScore::new(a, b, *format).ok())
        .collect())
}

/// Tiebreak kinds the format can play (regular, super, or both).
fn tiebreak_kinds(format: &MatchFormat) -> Vec<bool> {
    let mut kinds = Vec::new();
    let endings = [format.set_ending, format.final_set_ending];
    if endings.contains(&SetEnding::Tiebreak) {
        kinds.push(false);
    }
    if endings.contains(&SetEnding::SuperTiebreak) || format.match_tiebreak {
        kinds.push(true);
    }
    kinds
}

/// Set kinds the format can play: regular, plus a final set with its own ending.
fn set_kinds(format: &MatchFormat) -> Vec<bool> {
    let mut kinds = vec![false];
    let distinct_final = format.final_set_ending != format.set_ending;
    if format.best_of_sets.is_some() && !format.match_tiebreak && distinct_final {
        kinds.push(true);
    }
    kinds
}

// ── Builders ─────────────────────────────────────────────────────────────────

/// Probability that the server wins the game from `score` (server's points first).
pub fn game_curve(score: GameScore, spec: &GridSpec) -> Result<CurveData> {
    let query = GameQuery::new(score, Player::One)?;
    let xs = spec.points();
    let values = evaluate_1d(&xs, |p| query.win_probability(p, Player::One))?;
    Ok(CurveData { xs, values })
}

/// Probability that player one wins the tiebreak from `score`.
pub fn tiebreak_surface(
    score: TiebreakScore,
    serves_next: Player,
    spec: &GridSpec,
) -> Result<SurfaceData> {
    let query = TiebreakQuery::new(score, serves_next)?;
    surface(spec, |points| Ok(query.win_probability(points, Player::One)))
}

/// Memoized fresh-game and fresh-tiebreak grids for one set ending.
#[derive(Debug, Clone)]
pub struct SetLowerGrids {
    hold: Curve,
    /// Player one wins a tiebreak served first by (player one, player two)
    tiebreak: Option<(Surface, Surface)>,
}

impl SetLowerGrids {
    pub fn build(
        format: &MatchFormat,
        ending: SetEnding,
        spec: &GridSpec,
        method: Interpolation,
    ) -> Result<Self> {
        let hold = Curve::new(game_curve(GameScore::blank(*format), spec)?, method)?;
        let tiebreak = if ending.plays_tiebreak() {
            let blank = TiebreakScore::blank(ending.is_super(), *format);
            Some((
                Surface::new(tiebreak_surface(blank, Player::One, spec)?, method)?,
                Surface::new(tiebreak_surface(blank, Player::Two, spec)?, method)?,
            ))
        } else {
            None
        };
        Ok(Self { hold, tiebreak })
    }

    /// Set inputs read off the memoized grids.
    pub fn inputs(&self, points: ServeProbabilities) -> Result<SetInputs> {
        let (p1, p2) = (points.p1(), points.p2());
        let tiebreak = match &self.tiebreak {
            Some((p1_first, p2_first)) => (p1_first.eval(p1, p2), p2_first.eval(p1, p2)),
            // Never consulted by an advantage set
            None => (0.5, 0.5),
        };
        SetInputs::with_known(points, (self.hold.eval(p1), self.hold.eval(p2)), tiebreak)
    }
}

/// Probability that player one wins the set from `score`.
///
/// With `lower`, game and tiebreak probabilities come from the memoized grids;
/// otherwise they are derived exactly at every cell.
pub fn set_surface(
    score: SetScore,
    serves_next: Player,
    spec: &GridSpec,
    lower: Option<&SetLowerGrids>,
) -> Result<SurfaceData> {
    let query = SetQuery::new(score, serves_next)?;
    match lower {
        Some(lower) => surface(spec, |points| {
            Ok(query.win_probability(&lower.inputs(points)?, Player::One))
        }),
        None => {
            let builder = SetInputsBuilder::new(score.format(), score.ending())?;
            surface(spec, |points| {
                Ok(query.win_probability(&builder.build(points), Player::One))
            })
        }
    }
}

/// Probability that player one wins the match from `score`.
pub fn match_surface(score: MatchScore, serves_next: Player, spec: &GridSpec) -> Result<SurfaceData> {
    let query = MatchQuery::new(score, serves_next)?;
    let builder = MatchInputsBuilder::new(score.format())?;
    surface(spec, |points| {
        Ok(query.win_probability(&builder.build(points), Player::One))
    })
}

fn surface<F>(spec: &GridSpec, f: F) -> Result<SurfaceData>
where
    F: Fn(ServeProbabilities) -> Result<f64> + Sync,
{
    let xs = spec.points();
    let ys = xs.clone();
    let values = evaluate_2d(&xs, &ys, |p1, p2| f(ServeProbabilities::new(p1, p2)?))?;
    Ok(SurfaceData { xs, ys, values })
}

// ── Level drivers ────────────────────────────────────────────────────────────

/// One finished grid, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct Precomputed {
    pub key: GridKey,
    pub data: GridData,
}

/// What to precompute for one level.
#[derive(Debug, Clone, Copy)]
pub struct PrecomputeOptions {
    pub spec: GridSpec,
    /// Only the blank starting score of each contest
    pub blank_only: bool,
    /// Interpolation used when reading memoized lower-level grids
    pub method: Interpolation,
}

/// Build every grid of `level` for `format`.
pub fn precompute_level(
    level: Level,
    format: &MatchFormat,
    options: &PrecomputeOptions,
) -> Result<Vec<Precomputed>> {
    format.validate()?;
    options.spec.validate()?;
    let spec = &options.spec;
    let mut out = Vec::new();

    match level {
        Level::Game => {
            let scores: Vec<GameScore> = if options.blank_only {
                vec![GameScore::blank(*format)]
            } else {
                game_start_scores(format)
            };
            for score in scores {
                let (a, b) = score.points(Player::One);
                let key = GridKey::new(level, format, count_key(a, b), Player::One);
                out.push(Precomputed {
                    key,
                    data: GridData::Curve(game_curve(score, spec)?),
                });
            }
        }
        Level::Tiebreak => {
            for is_super in tiebreak_kinds(format) {
                let scores = if options.blank_only {
                    vec![TiebreakScore::blank(is_super, *format)]
                } else {
                    tiebreak_start_scores(format, is_super)
                };
                for score in scores {
                    let (a, b) = score.points(Player::One);
                    let name = if is_super {
                        format!("super-{}", count_key(a, b))
                    } else {
                        count_key(a, b)
                    };
                    for server in Player::BOTH {
                        let key = GridKey::new(level, format, name.clone(), server);
                        out.push(Precomputed {
                            key,
                            data: GridData::Surface(tiebreak_surface(score, server, spec)?),
                        });
                    }
                }
            }
        }
        Level::Set => {
            for is_final_set in set_kinds(format) {
                let ending = format.ending(is_final_set);
                let lower = SetLowerGrids::build(format, ending, spec, options.method)?;
                debug!(ending = ?ending, "lower-level grids memoized");
                let scores = if options.blank_only {
                    vec![SetScore::new(0, 0, is_final_set, *format)?]
                } else {
                    set_start_scores(format, is_final_set)
                };
                for score in scores {
                    for server in Player::BOTH {
                        let key = GridKey::new(level, format, set_key(&score), server);
                        let data = set_surface(score, server, spec, Some(&lower))?;
                        out.push(Precomputed {
                            key,
                            data: GridData::Surface(data),
                        });
                    }
                }
            }
        }
        Level::Match => {
            let scores = if options.blank_only {
                vec![MatchScore::blank(*format)?]
            } else {
                match_start_scores(format)?
            };
            for score in scores {
                let (a, b) = score.sets(Player::One);
                let key = GridKey::new(level, format, count_key(a, b), Player::One);
                out.push(Precomputed {
                    key,
                    data: GridData::Surface(match_surface(score, Player::One, spec)?),
                });
            }
        }
    }

    info!(level = %level, format = %format_tag(format), grids = out.len(), "level precomputed");
    Ok(out)
}
