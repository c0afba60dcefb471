use super::PathState;
use crate::error::{Result, ScoreError};
use crate::score::{Player, Score, SetScore};

/// Set score at a game boundary plus the player serving the next game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetNode {
    pub score: SetScore,
    pub serves_next: Player,
}

impl SetNode {
    pub fn new(score: SetScore, serves_next: Player) -> Self {
        Self { score, serves_next }
    }
}

impl PathState for SetNode {
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
        let serves_next = self.serves_next.other();
        Some((Self::new(first, serves_next), Self::new(second, serves_next)))
    }

    fn check_root(&self) -> Result<()> {
        if self.score.sub_contest_in_progress() {
            return Err(ScoreError::InconsistentState(format!(
                "set paths start at a game boundary, got {}",
                self.score
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::generate_all_paths;
    use crate::score::{GameScore, MatchFormat, SetEnding};

    #[test]
    fn test_blank_set_has_1428_paths() {
        // 2 x (1 + 6 + 21 + 56 + 126) to 6-x, plus 252 routes to 5-5 times 4 endings
        let set = SetScore::new(0, 0, false, MatchFormat::default()).unwrap();
        let paths = generate_all_paths(SetNode::new(set, Player::One)).unwrap();
        assert_eq!(paths.len(), 1428);
    }

    #[test]
    fn test_paths_stop_at_six_all() {
        let set = SetScore::new(5, 5, false, MatchFormat::default()).unwrap();
        let paths = generate_all_paths(SetNode::new(set, Player::Two)).unwrap();
        assert_eq!(paths.len(), 4);
        let ties = paths.iter().filter(|p| p.last().score.is_tied()).count();
        assert_eq!(ties, 2);
    }

    #[test]
    fn test_advantage_set_stops_at_tie() {
        let format = MatchFormat::default().with_set_ending(SetEnding::Advantage);
        let set = SetScore::new(7, 7, false, format).unwrap();
        let paths = generate_all_paths(SetNode::new(set, Player::One)).unwrap();
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_servers_alternate_each_game() {
        let set = SetScore::new(4, 4, false, MatchFormat::default()).unwrap();
        let paths = generate_all_paths(SetNode::new(set, Player::One)).unwrap();
        for path in paths.iter() {
            for (from, to) in path.steps() {
                assert_eq!(to.serves_next, from.serves_next.other());
            }
        }
    }

    #[test]
    fn test_mid_game_root_rejected() {
        let format = MatchFormat::default();
        let set = SetScore::with_game(2, 1, false, GameScore::new(0, 2, format).unwrap()).unwrap();
        let err = generate_all_paths(SetNode::new(set, Player::One)).unwrap_err();
        assert!(matches!(err, ScoreError::InconsistentState(_)));
    }
}
