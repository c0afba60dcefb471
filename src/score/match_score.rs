use std::fmt;

use super::format::MatchFormat;
use super::{ordered, Player, Score, SetScore, TiebreakScore};
use crate::error::{Result, ScoreError};

/// Sub-contest currently being played inside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStage {
    Set(SetScore),
    /// 10-point tiebreak replacing the deciding set
    MatchTiebreak(TiebreakScore),
    Over,
}

/// Sets won by each player, plus the set (or match tiebreak) in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchScore {
    s1: u32,
    s2: u32,
    format: MatchFormat,
    stage: MatchStage,
}

impl MatchScore {
    /// Match score between sets. `format.best_of_sets` must be set.
    pub fn new(s1: u32, s2: u32, format: MatchFormat) -> Result<Self> {
        Self::from_parts(s1, s2, format, None)
    }

    pub fn blank(format: MatchFormat) -> Result<Self> {
        Self::new(0, 0, format)
    }

    /// Match score with a set in progress.
    pub fn with_set(s1: u32, s2: u32, set: SetScore) -> Result<Self> {
        Self::from_parts(s1, s2, *set.format(), Some(MatchStage::Set(set)))
    }

    /// Match score with the deciding match tiebreak in progress.
    pub fn with_match_tiebreak(s1: u32, s2: u32, tiebreak: TiebreakScore) -> Result<Self> {
        Self::from_parts(
            s1,
            s2,
            *tiebreak.format(),
            Some(MatchStage::MatchTiebreak(tiebreak)),
        )
    }

    pub fn is_valid(s1: u32, s2: u32, sets_to_win: u32) -> bool {
        s1 <= sets_to_win && s2 <= sets_to_win && !(s1 == sets_to_win && s2 == sets_to_win)
    }

    fn from_parts(
        s1: u32,
        s2: u32,
        format: MatchFormat,
        stage: Option<MatchStage>,
    ) -> Result<Self> {
        format.validate()?;
        let target = format.sets_to_win()?;
        let invalid = |reason: &str| ScoreError::InvalidScore {
            level: "match",
            p1: s1,
            p2: s2,
            reason: reason.to_string(),
        };
        if !Self::is_valid(s1, s2, target) {
            return Err(invalid("the match would already have ended"));
        }
        let finished = s1 == target || s2 == target;
        let deciding = s1 + 1 == target && s2 + 1 == target;
        let tiebreak_decides = deciding && format.match_tiebreak;

        let stage = match stage {
            None | Some(MatchStage::Over) if finished => MatchStage::Over,
            Some(_) if finished => {
                return Err(invalid("a finished match has no set in progress"))
            }
            None | Some(MatchStage::Over) if tiebreak_decides => {
                MatchStage::MatchTiebreak(TiebreakScore::blank(true, format))
            }
            None | Some(MatchStage::Over) => {
                MatchStage::Set(SetScore::new(0, 0, deciding, format)?)
            }
            Some(MatchStage::Set(set)) => {
                if tiebreak_decides {
                    return Err(invalid("the deciding set is a match tiebreak"));
                }
                if set.is_final() {
                    return Err(invalid("the set in progress is already final"));
                }
                if set.is_final_set() != deciding {
                    return Err(invalid("the set in progress has the wrong final-set flag"));
                }
                if *set.format() != format {
                    return Err(invalid("the set uses a different format"));
                }
                MatchStage::Set(set)
            }
            Some(MatchStage::MatchTiebreak(tiebreak)) => {
                if !tiebreak_decides {
                    return Err(invalid("a match tiebreak only replaces the deciding set"));
                }
                if tiebreak.is_final() || !tiebreak.is_super() || *tiebreak.format() != format {
                    return Err(invalid("the match tiebreak is final or mis-configured"));
                }
                MatchStage::MatchTiebreak(tiebreak)
            }
        };

        Ok(Self {
            s1,
            s2,
            format,
            stage,
        })
    }

    pub fn sets(&self, pov: Player) -> (u32, u32) {
        ordered(pov, self.s1, self.s2)
    }

    pub fn format(&self) -> &MatchFormat {
        &self.format
    }

    pub fn stage(&self) -> &MatchStage {
        &self.stage
    }

    pub fn sets_to_win(&self) -> u32 {
        self.format.best_of_sets.map_or(1, |n| n / 2 + 1)
    }

    /// Both players are one set away from the match.
    pub fn is_deciding_set(&self) -> bool {
        let target = self.sets_to_win();
        self.s1 + 1 == target && self.s2 + 1 == target
    }

    pub fn current_set(&self) -> Option<&SetScore> {
        match &self.stage {
            MatchStage::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn current_match_tiebreak(&self) -> Option<&TiebreakScore> {
        match &self.stage {
            MatchStage::MatchTiebreak(tiebreak) => Some(tiebreak),
            _ => None,
        }
    }

    pub fn sub_contest_in_progress(&self) -> bool {
        match &self.stage {
            MatchStage::Set(set) => !set.is_blank(),
            MatchStage::MatchTiebreak(tiebreak) => !tiebreak.is_blank(),
            MatchStage::Over => false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.s1 == 0 && self.s2 == 0 && !self.sub_contest_in_progress()
    }

    /// Both match outcomes after the next set.
    pub fn next_set_scores(&self) -> Result<(Self, Self)> {
        if self.is_final() {
            return Err(ScoreError::AlreadyFinal { level: "match" });
        }
        if self.sub_contest_in_progress() {
            return Err(ScoreError::InconsistentState(format!(
                "match {self} is not at a set boundary"
            )));
        }
        Ok((self.after_set(Player::One)?, self.after_set(Player::Two)?))
    }

    /// Match score once `winner` takes the current set.
    pub fn after_set(&self, winner: Player) -> Result<Self> {
        if self.is_final() {
            return Err(ScoreError::AlreadyFinal { level: "match" });
        }
        let (s1, s2) = match winner {
            Player::One => (self.s1 + 1, self.s2),
            Player::Two => (self.s1, self.s2 + 1),
        };
        Self::from_parts(s1, s2, self.format, None)
    }
}

impl Score for MatchScore {
    fn count(&self, player: Player) -> u32 {
        player.pick(self.s1, self.s2)
    }

    fn is_final(&self) -> bool {
        matches!(self.stage, MatchStage::Over)
    }

    fn winner(&self) -> Option<Player> {
        let target = self.sets_to_win();
        if self.s1 == target {
            Some(Player::One)
        } else if self.s2 == target {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Matches have no repetition boundary.
    fn is_tied(&self) -> bool {
        false
    }

    fn successors(&self) -> Option<(Self, Self)> {
        self.next_set_scores().ok()
    }

    fn record(&self, winner: Player) -> Result<Self> {
        match &self.stage {
            MatchStage::Over => Err(ScoreError::AlreadyFinal { level: "match" }),
            MatchStage::Set(set) => {
                let set = set.record(winner)?;
                match set.winner() {
                    Some(set_winner) => self.after_set(set_winner),
                    None => Ok(Self {
                        stage: MatchStage::Set(set),
                        ..*self
                    }),
                }
            }
            MatchStage::MatchTiebreak(tiebreak) => {
                let tiebreak = tiebreak.record(winner)?;
                match tiebreak.winner() {
                    Some(tiebreak_winner) => self.after_set(tiebreak_winner),
                    None => Ok(Self {
                        stage: MatchStage::MatchTiebreak(tiebreak),
                        ..*self
                    }),
                }
            }
        }
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.s1, self.s2)?;
        match &self.stage {
            MatchStage::Set(set) if !set.is_blank() => write!(f, ", {set}"),
            MatchStage::MatchTiebreak(tiebreak) if !tiebreak.is_blank() => {
                write!(f, ", [{tiebreak}]")
            }
            _ => Ok(()),
        }
    }
}
