use std::fmt;

use super::format::{MatchFormat, GAME_POINTS};
use super::{ordered, Player, Score};
use crate::error::{Result, ScoreError};

/// Points won by each player in a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameScore {
    p1: u32,
    p2: u32,
    format: MatchFormat,
}

impl GameScore {
    pub fn new(p1: u32, p2: u32, format: MatchFormat) -> Result<Self> {
        if !Self::is_valid(p1, p2, &format) {
            return Err(ScoreError::InvalidScore {
                level: "game",
                p1,
                p2,
                reason: if format.no_ad {
                    "a no-ad game ends when a player reaches 4 points".into()
                } else {
                    "the game would already have ended".into()
                },
            });
        }
        Ok(Self { p1, p2, format })
    }

    /// 0-0
    pub fn blank(format: MatchFormat) -> Self {
        Self { p1: 0, p2: 0, format }
    }

    /// Reachability of a point pair under the format's scoring.
    pub fn is_valid(p1: u32, p2: u32, format: &MatchFormat) -> bool {
        let (hi, lo) = (p1.max(p2), p1.min(p2));
        if hi < GAME_POINTS {
            return true;
        }
        if format.no_ad {
            return hi == GAME_POINTS && lo < GAME_POINTS;
        }
        if hi == GAME_POINTS && lo + 2 <= GAME_POINTS {
            return true;
        }
        lo + 1 >= GAME_POINTS && hi - lo <= 2
    }

    /// Points as (`pov`, opponent)
    pub fn points(&self, pov: Player) -> (u32, u32) {
        ordered(pov, self.p1, self.p2)
    }

    pub fn format(&self) -> &MatchFormat {
        &self.format
    }

    pub fn is_blank(&self) -> bool {
        self.p1 == 0 && self.p2 == 0
    }

    pub fn points_played(&self) -> u32 {
        self.p1 + self.p2
    }

    pub fn is_deuce(&self) -> bool {
        self.p1 == self.p2 && self.p1 + 1 >= GAME_POINTS
    }

    /// Player holding advantage (ad scoring only)
    pub fn advantage(&self) -> Option<Player> {
        if self.format.no_ad || self.p1.max(self.p2) < GAME_POINTS {
            return None;
        }
        match self.p1 as i64 - self.p2 as i64 {
            1 => Some(Player::One),
            -1 => Some(Player::Two),
            _ => None,
        }
    }

    /// Collapse scores beyond the first deuce to 3-3, 4-3 or 3-4.
    pub fn normalized(&self) -> Self {
        let floor = GAME_POINTS - 1;
        if self.format.no_ad || self.p1.min(self.p2) <= floor {
            return *self;
        }
        let shift = self.p1.min(self.p2) - floor;
        Self {
            p1: self.p1 - shift,
            p2: self.p2 - shift,
            format: self.format,
        }
    }

    fn step(&self, winner: Player) -> Self {
        let (p1, p2) = match winner {
            Player::One => (self.p1 + 1, self.p2),
            Player::Two => (self.p1, self.p2 + 1),
        };
        Self { p1, p2, format: self.format }
    }
}

impl Score for GameScore {
    fn count(&self, player: Player) -> u32 {
        player.pick(self.p1, self.p2)
    }

    fn is_final(&self) -> bool {
        self.winner().is_some()
    }

    fn winner(&self) -> Option<Player> {
        let leader = if self.p1 > self.p2 {
            Player::One
        } else if self.p2 > self.p1 {
            Player::Two
        } else {
            return None;
        };
        let (hi, lo) = self.points(leader);
        if hi < GAME_POINTS {
            return None;
        }
        if self.format.no_ad || hi - lo >= 2 {
            Some(leader)
        } else {
            None
        }
    }

    /// No-ad games have no repetition boundary: 3-3 is a deciding point.
    fn is_tied(&self) -> bool {
        !self.format.no_ad && self.is_deuce()
    }

    fn successors(&self) -> Option<(Self, Self)> {
        if self.is_final() {
            return None;
        }
        Some((self.step(Player::One), self.step(Player::Two)))
    }

    fn record(&self, winner: Player) -> Result<Self> {
        if self.is_final() {
            return Err(ScoreError::AlreadyFinal { level: "game" });
        }
        let next = self.step(winner);
        Ok(if self.format.cap_points {
            next.normalized()
        } else {
            next
        })
    }
}

impl fmt::Display for GameScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.p1, self.p2)
    }
}
