use super::PathState;
use crate::error::{Result, ScoreError};
use crate::score::{MatchScore, Player, Score};

impl PathState for MatchScore {
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

    fn check_root(&self) -> Result<()> {
        if self.sub_contest_in_progress() {
            return Err(ScoreError::InconsistentState(format!(
                "match paths start at a set boundary, got {self}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::paths::generate_all_paths;
    use crate::score::{MatchFormat, MatchScore};

    fn count(best_of: u32, s1: u32, s2: u32) -> usize {
        let score = MatchScore::new(s1, s2, MatchFormat::best_of(best_of)).unwrap();
        generate_all_paths(score).unwrap().len()
    }

    #[test]
    fn test_blank_best_of_three_has_6_paths() {
        assert_eq!(count(3, 0, 0), 6);
    }

    #[test]
    fn test_blank_best_of_five_has_20_paths() {
        assert_eq!(count(5, 0, 0), 20);
    }

    #[test]
    fn test_mid_match_counts() {
        assert_eq!(count(3, 1, 1), 2);
        assert_eq!(count(5, 2, 0), 4);
        assert_eq!(count(5, 1, 0), 10);
        assert_eq!(count(5, 3, 1), 1);
    }

    #[test]
    fn test_match_tiebreak_format_keeps_counts() {
        let format = MatchFormat::best_of(3).with_match_tiebreak(true);
        let score = MatchScore::blank(format).unwrap();
        assert_eq!(generate_all_paths(score).unwrap().len(), 6);
    }
}
