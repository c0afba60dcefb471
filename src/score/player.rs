use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoreError;

/// One of the two players of a contest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    /// The opponent
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// 1 or 2
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Select the value belonging to this player.
    pub fn pick<T>(self, one: T, two: T) -> T {
        match self {
            Player::One => one,
            Player::Two => two,
        }
    }

    /// Convert a probability that player one wins into this player's.
    pub fn share(self, p_one: f64) -> f64 {
        self.pick(p_one, 1.0 - p_one)
    }
}

impl TryFrom<u8> for Player {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(ScoreError::InvalidPlayer(other)),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}
