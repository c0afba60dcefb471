use super::PathState;
use crate::score::tiebreak::next_tiebreak_server;
use crate::score::{Player, Score, TiebreakScore};

/// Tiebreak score plus the player serving the next point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TiebreakNode {
    pub score: TiebreakScore,
    pub serves_next: Player,
}

impl TiebreakNode {
    pub fn new(score: TiebreakScore, serves_next: Player) -> Self {
        Self { score, serves_next }
    }
}

impl PathState for TiebreakNode {
    fn is_final(&self) -> bool {
        self.score.is_final()
    }

    fn is_boundary(&self) -> bool {
        self.score.is_tied()
    }

    fn winner(&self) -> Option<Player> {
        self.score.winner()
    }

    fn count(&self, player: Player) -> u32 {
        self.score.count(player)
    }

    fn successors(&self) -> Option<(Self, Self)> {
        let (first, second) = self.score.successors()?;
        let serves_next = next_tiebreak_server(self.serves_next, self.score.points_played());
        Some((Self::new(first, serves_next), Self::new(second, serves_next)))
    }
}
