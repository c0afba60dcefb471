use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

/// Points needed to win a game (with a two-point lead under ad scoring)
pub const GAME_POINTS: u32 = 4;
/// Points needed to win a regular tiebreak
pub const TIEBREAK_POINTS: u32 = 7;
/// Points needed to win a super (match) tiebreak
pub const SUPER_TIEBREAK_POINTS: u32 = 10;

/// How a set is decided once the games reach the set length all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SetEnding {
    /// Played on until one player leads by two games
    Advantage,
    /// 7-point tiebreak at n-n
    Tiebreak,
    /// 10-point tiebreak at n-n
    SuperTiebreak,
}

impl SetEnding {
    pub fn plays_tiebreak(self) -> bool {
        !matches!(self, SetEnding::Advantage)
    }

    pub fn is_super(self) -> bool {
        matches!(self, SetEnding::SuperTiebreak)
    }
}

/// Immutable rule set shared by every score level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchFormat {
    /// Number of sets in a match; required for match scores
    pub best_of_sets: Option<u32>,
    /// Replace the deciding set with a 10-point match tiebreak
    pub match_tiebreak: bool,
    /// Games needed to win a set
    pub set_length: u32,
    pub set_ending: SetEnding,
    pub final_set_ending: SetEnding,
    /// Sudden-death point at 3-3 in a game
    pub no_ad: bool,
    /// Collapse deuce/advantage scores after each recorded point
    pub cap_points: bool,
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self {
            best_of_sets: None,
            match_tiebreak: false,
            set_length: 6,
            set_ending: SetEnding::Tiebreak,
            final_set_ending: SetEnding::Tiebreak,
            no_ad: false,
            cap_points: true,
        }
    }
}

impl MatchFormat {
    /// Standard best-of-`sets` match with tiebreaks in every set
    pub fn best_of(sets: u32) -> Self {
        Self {
            best_of_sets: Some(sets),
            ..Self::default()
        }
    }

    pub fn with_no_ad(mut self, no_ad: bool) -> Self {
        self.no_ad = no_ad;
        self
    }

    pub fn with_set_length(mut self, games: u32) -> Self {
        self.set_length = games;
        self
    }

    pub fn with_set_ending(mut self, ending: SetEnding) -> Self {
        self.set_ending = ending;
        self
    }

    pub fn with_final_set_ending(mut self, ending: SetEnding) -> Self {
        self.final_set_ending = ending;
        self
    }

    pub fn with_match_tiebreak(mut self, match_tiebreak: bool) -> Self {
        self.match_tiebreak = match_tiebreak;
        self
    }

    pub fn with_cap_points(mut self, cap: bool) -> Self {
        self.cap_points = cap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.set_length == 0 {
            return Err(ScoreError::InvalidFormat(
                "set length must be at least one game".into(),
            ));
        }
        if let Some(n) = self.best_of_sets {
            if n == 0 || n % 2 == 0 {
                return Err(ScoreError::InvalidFormat(format!(
                    "best of {n} sets: expected a positive odd number"
                )));
            }
        }
        if self.match_tiebreak && self.best_of_sets.is_none() {
            return Err(ScoreError::InvalidFormat(
                "a match tiebreak needs a best-of-sets count".into(),
            ));
        }
        Ok(())
    }

    /// Sets a player needs to win the match.
    pub fn sets_to_win(&self) -> Result<u32> {
        match self.best_of_sets {
            Some(n) => Ok(n / 2 + 1),
            None => Err(ScoreError::InvalidFormat(
                "match scores need a best-of-sets count".into(),
            )),
        }
    }

    /// Ending rule for a regular or final set
    pub fn ending(&self, final_set: bool) -> SetEnding {
        if final_set {
            self.final_set_ending
        } else {
            self.set_ending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_valid() {
        let format = MatchFormat::default();
        assert!(format.validate().is_ok());
        assert_eq!(format.set_length, 6);
        assert!(format.sets_to_win().is_err());
    }

    #[test]
    fn test_sets_to_win() {
        assert_eq!(MatchFormat::best_of(3).sets_to_win(), Ok(2));
        assert_eq!(MatchFormat::best_of(5).sets_to_win(), Ok(3));
        assert_eq!(MatchFormat::best_of(1).sets_to_win(), Ok(1));
    }

    #[test]
    fn test_invalid_formats() {
        assert!(MatchFormat::best_of(4).validate().is_err());
        assert!(MatchFormat::best_of(0).validate().is_err());
        assert!(MatchFormat::default().with_set_length(0).validate().is_err());
        assert!(MatchFormat::default()
            .with_match_tiebreak(true)
            .validate()
            .is_err());
    }

    #[test]
    fn test_final_set_ending() {
        let format = MatchFormat::best_of(5).with_final_set_ending(SetEnding::Advantage);
        assert_eq!(format.ending(false), SetEnding::Tiebreak);
        assert_eq!(format.ending(true), SetEnding::Advantage);
        assert!(!SetEnding::Advantage.plays_tiebreak());
        assert!(SetEnding::SuperTiebreak.is_super());
    }
}
