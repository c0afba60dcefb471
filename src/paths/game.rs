use super::PathState;
use crate::score::{GameScore, Player, Score};

impl PathState for GameScore {
    fn is_final(&self) -> bool {
        Score::is_final(self)
    }

    fn is_boundary(&self) -> bool {
        Score::is_tied(self)
    }

    fn winner(&self) -> Option<Player> {
        Score::winner(self)
    }

    fn count(&self, player: Player) -> u32 {
        Score::count(self, player)
    }

    fn successors(&self) -> Option<(Self, Self)> {
        Score::successors(self)
    }
}
