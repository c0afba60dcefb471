use std::fmt;

use super::format::{MatchFormat, SetEnding};
use super::{ordered, GameScore, Player, Score, TiebreakScore};
use crate::error::{Result, ScoreError};

/// Sub-contest currently being played inside a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetStage {
    Game(GameScore),
    Tiebreak(TiebreakScore),
    /// The set has been decided
    Over,
}

/// Games won by each player in a set, plus the game or tiebreak in progress.
///
/// The stage is held by value and replaced wholesale on every recorded point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetScore {
    g1: u32,
    g2: u32,
    is_final_set: bool,
    format: MatchFormat,
    stage: SetStage,
}

impl SetScore {
    /// Set score at a game boundary (the next game or tiebreak not yet started).
    pub fn new(g1: u32, g2: u32, is_final_set: bool, format: MatchFormat) -> Result<Self> {
        Self::from_parts(g1, g2, is_final_set, format, None)
    }

    /// Set score with a game in progress.
    pub fn with_game(g1: u32, g2: u32, is_final_set: bool, game: GameScore) -> Result<Self> {
        Self::from_parts(g1, g2, is_final_set, *game.format(), Some(SetStage::Game(game)))
    }

    /// Set score with a tiebreak in progress.
    pub fn with_tiebreak(
        g1: u32,
        g2: u32,
        is_final_set: bool,
        tiebreak: TiebreakScore,
    ) -> Result<Self> {
        Self::from_parts(
            g1,
            g2,
            is_final_set,
            *tiebreak.format(),
            Some(SetStage::Tiebreak(tiebreak)),
        )
    }

    /// Reachability of a game pair under a set ending.
    pub fn is_valid(g1: u32, g2: u32, ending: SetEnding, set_length: u32) -> bool {
        let (hi, lo) = (g1.max(g2), g1.min(g2));
        if hi > set_length && hi - lo > 2 {
            return false;
        }
        if ending.plays_tiebreak() && hi > set_length {
            return hi == set_length + 1 && lo + 1 >= set_length && lo <= set_length;
        }
        true
    }

    fn from_parts(
        g1: u32,
        g2: u32,
        is_final_set: bool,
        format: MatchFormat,
        stage: Option<SetStage>,
    ) -> Result<Self> {
        format.validate()?;
        let ending = format.ending(is_final_set);
        let invalid = |reason: &str| ScoreError::InvalidScore {
            level: "set",
            p1: g1,
            p2: g2,
            reason: reason.to_string(),
        };
        if !Self::is_valid(g1, g2, ending, format.set_length) {
            return Err(invalid("the set would already have ended"));
        }
        let n = format.set_length;
        let finished = set_winner(g1, g2, n, ending).is_some();
        let tiebreak_due = ending.plays_tiebreak() && g1 == n && g2 == n;

        let stage = match stage {
            None | Some(SetStage::Over) if finished => SetStage::Over,
            Some(_) if finished => return Err(invalid("a finished set has no game in progress")),
            None | Some(SetStage::Over) if tiebreak_due => {
                SetStage::Tiebreak(TiebreakScore::blank(ending.is_super(), format))
            }
            None | Some(SetStage::Over) => SetStage::Game(GameScore::blank(format)),
            Some(SetStage::Game(game)) => {
                if tiebreak_due {
                    return Err(invalid("a tied set is decided by a tiebreak, not a game"));
                }
                if game.is_final() {
                    return Err(invalid("the game in progress is already final"));
                }
                if *game.format() != format {
                    return Err(invalid("the game uses a different format"));
                }
                SetStage::Game(game)
            }
            Some(SetStage::Tiebreak(tiebreak)) => {
                if !tiebreak_due {
                    return Err(invalid("a tiebreak is only played at a tie"));
                }
                if tiebreak.is_final() {
                    return Err(invalid("the tiebreak in progress is already final"));
                }
                if tiebreak.is_super() != ending.is_super() || *tiebreak.format() != format {
                    return Err(invalid("the tiebreak does not match the set ending"));
                }
                SetStage::Tiebreak(tiebreak)
            }
        };

        Ok(Self {
            g1,
            g2,
            is_final_set,
            format,
            stage,
        })
    }

    pub fn games(&self, pov: Player) -> (u32, u32) {
        ordered(pov, self.g1, self.g2)
    }

    pub fn format(&self) -> &MatchFormat {
        &self.format
    }

    pub fn is_final_set(&self) -> bool {
        self.is_final_set
    }

    pub fn ending(&self) -> SetEnding {
        self.format.ending(self.is_final_set)
    }

    pub fn stage(&self) -> &SetStage {
        &self.stage
    }

    pub fn current_game(&self) -> Option<&GameScore> {
        match &self.stage {
            SetStage::Game(game) => Some(game),
            _ => None,
        }
    }

    pub fn current_tiebreak(&self) -> Option<&TiebreakScore> {
        match &self.stage {
            SetStage::Tiebreak(tiebreak) => Some(tiebreak),
            _ => None,
        }
    }

    /// True once any point of the current game or tiebreak has been played.
    pub fn sub_contest_in_progress(&self) -> bool {
        match &self.stage {
            SetStage::Game(game) => !game.is_blank(),
            SetStage::Tiebreak(tiebreak) => !tiebreak.is_blank(),
            SetStage::Over => false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.g1 == 0 && self.g2 == 0 && !self.sub_contest_in_progress()
    }

    /// Both set outcomes after the next game (or tiebreak).
    ///
    /// Fails when the set is over or a game is part-way through.
    pub fn next_game_scores(&self) -> Result<(Self, Self)> {
        if self.is_final() {
            return Err(ScoreError::AlreadyFinal { level: "set" });
        }
        if self.sub_contest_in_progress() {
            return Err(ScoreError::InconsistentState(format!(
                "set {self} is not at a game boundary"
            )));
        }
        Ok((self.after_game(Player::One)?, self.after_game(Player::Two)?))
    }

    /// Set score once `winner` takes the current game or tiebreak.
    pub fn after_game(&self, winner: Player) -> Result<Self> {
        if self.is_final() {
            return Err(ScoreError::AlreadyFinal { level: "set" });
        }
        let (g1, g2) = match winner {
            Player::One => (self.g1 + 1, self.g2),
            Player::Two => (self.g1, self.g2 + 1),
        };
        Self::from_parts(g1, g2, self.is_final_set, self.format, None)
    }
}

fn set_winner(g1: u32, g2: u32, n: u32, ending: SetEnding) -> Option<Player> {
    for (player, mine, theirs) in [(Player::One, g1, g2), (Player::Two, g2, g1)] {
        let by_two = mine >= n && mine >= theirs + 2;
        let by_tiebreak = ending.plays_tiebreak() && mine == n + 1 && theirs == n;
        if by_two || by_tiebreak {
            return Some(player);
        }
    }
    None
}

impl Score for SetScore {
    fn count(&self, player: Player) -> u32 {
        player.pick(self.g1, self.g2)
    }

    fn is_final(&self) -> bool {
        matches!(self.stage, SetStage::Over)
    }

    fn winner(&self) -> Option<Player> {
        set_winner(self.g1, self.g2, self.format.set_length, self.ending())
    }

    /// n-n (or later, in an advantage set)
    fn is_tied(&self) -> bool {
        self.g1 == self.g2 && self.g1 >= self.format.set_length
    }

    fn successors(&self) -> Option<(Self, Self)> {
        self.next_game_scores().ok()
    }

    fn record(&self, winner: Player) -> Result<Self> {
        match &self.stage {
            SetStage::Over => Err(ScoreError::AlreadyFinal { level: "set" }),
            SetStage::Game(game) => {
                let game = game.record(winner)?;
                match game.winner() {
                    Some(game_winner) => self.after_game(game_winner),
                    None => Ok(Self {
                        stage: SetStage::Game(game),
                        ..*self
                    }),
                }
            }
            SetStage::Tiebreak(tiebreak) => {
                let tiebreak = tiebreak.record(winner)?;
                match tiebreak.winner() {
                    Some(tiebreak_winner) => self.after_game(tiebreak_winner),
                    None => Ok(Self {
                        stage: SetStage::Tiebreak(tiebreak),
                        ..*self
                    }),
                }
            }
        }
    }
}

impl fmt::Display for SetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.g1, self.g2)?;
        match &self.stage {
            SetStage::Game(game) if !game.is_blank() => write!(f, " ({game})"),
            SetStage::Tiebreak(tiebreak) if !tiebreak.is_blank() => write!(f, " [{tiebreak}]"),
            _ => Ok(()),
        }
    }
}
