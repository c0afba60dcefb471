//! Contests: a score plus who serves, played point by point.
//!
//! Service rules:
//! - **Game**: one server throughout
//! - **Tiebreak**: first server serves one point, then two points each
//! - **Set / match**: service alternates each game; after a tiebreak the
//!   player who received first in it serves the next game

use crate::error::Result;
use crate::score::tiebreak::{next_tiebreak_server, tiebreak_first_server};
use crate::score::{GameScore, MatchScore, Player, Score, SetScore, TiebreakScore};

/// A score being played out point by point.
pub trait Contest {
    fn serves_next(&self) -> Player;

    fn record_point(&mut self, winner: Player) -> Result<()>;

    fn is_over(&self) -> bool;

    fn winner(&self) -> Option<Player>;

    /// Winners of the points recorded so far
    fn history(&self) -> &[Player];
}

// ── Service bookkeeping ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ServeTracker {
    serves_next: Player,
    /// (first server, points played) while a tiebreak is under way
    tiebreak: Option<(Player, u32)>,
}

impl ServeTracker {
    fn new(serves_next: Player) -> Self {
        Self {
            serves_next,
            tiebreak: None,
        }
    }

    fn after_game_point(&mut self, game_over: bool) {
        if game_over {
            self.serves_next = self.serves_next.other();
        }
    }

    fn after_tiebreak_point(&mut self, before: &TiebreakScore, tiebreak_over: bool) {
        let (first, played) = self.tiebreak.unwrap_or_else(|| {
            let played = before.points_played();
            (tiebreak_first_server(self.serves_next, played), played)
        });
        if tiebreak_over {
            self.serves_next = first.other();
            self.tiebreak = None;
        } else {
            self.serves_next = next_tiebreak_server(self.serves_next, played);
            self.tiebreak = Some((first, played + 1));
        }
    }

    /// `tiebreak_before` is the tiebreak the point was played in, if any.
    fn after_point(&mut self, tiebreak_before: Option<&TiebreakScore>, unit_over: bool) {
        match tiebreak_before {
            Some(tiebreak) => self.after_tiebreak_point(tiebreak, unit_over),
            None => self.after_game_point(unit_over),
        }
    }
}

// ── Game ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Game {
    score: GameScore,
    server: Player,
    history: Vec<Player>,
}

impl Game {
    pub fn new(score: GameScore, server: Player) -> Self {
        Self {
            score,
            server,
            history: Vec::new(),
        }
    }

    pub fn score(&self) -> &GameScore {
        &self.score
    }
}

impl Contest for Game {
    fn serves_next(&self) -> Player {
        self.server
    }

    fn record_point(&mut self, winner: Player) -> Result<()> {
        self.score = self.score.record(winner)?;
        self.history.push(winner);
        Ok(())
    }

    fn is_over(&self) -> bool {
        self.score.is_final()
    }

    fn winner(&self) -> Option<Player> {
        self.score.winner()
    }

    fn history(&self) -> &[Player] {
        &self.history
    }
}

// ── Tiebreak ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Tiebreak {
    score: TiebreakScore,
    serve: ServeTracker,
    history: Vec<Player>,
}

impl Tiebreak {
    pub fn new(score: TiebreakScore, serves_next: Player) -> Self {
        Self {
            score,
            serve: ServeTracker::new(serves_next),
            history: Vec::new(),
        }
    }

    pub fn score(&self) -> &TiebreakScore {
        &self.score
    }
}

impl Contest for Tiebreak {
    fn serves_next(&self) -> Player {
        self.serve.serves_next
    }

    fn record_point(&mut self, winner: Player) -> Result<()> {
        let before = self.score;
        self.score = before.record(winner)?;
        self.serve.after_tiebreak_point(&before, self.score.is_final());
        self.history.push(winner);
        Ok(())
    }

    fn is_over(&self) -> bool {
        self.score.is_final()
    }

    fn winner(&self) -> Option<Player> {
        self.score.winner()
    }

    fn history(&self) -> &[Player] {
        &self.history
    }
}

// ── Set ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Set {
    score: SetScore,
    serve: ServeTracker,
    history: Vec<Player>,
}

impl Set {
    pub fn new(score: SetScore, serves_next: Player) -> Self {
        Self {
            score,
            serve: ServeTracker::new(serves_next),
            history: Vec::new(),
        }
    }

    pub fn score(&self) -> &SetScore {
        &self.score
    }
}

impl Contest for Set {
    fn serves_next(&self) -> Player {
        self.serve.serves_next
    }

    fn record_point(&mut self, winner: Player) -> Result<()> {
        let before = self.score;
        self.score = before.record(winner)?;
        let unit_over = !self.score.sub_contest_in_progress();
        self.serve.after_point(before.current_tiebreak(), unit_over);
        self.history.push(winner);
        Ok(())
    }

    fn is_over(&self) -> bool {
        self.score.is_final()
    }

    fn winner(&self) -> Option<Player> {
        self.score.winner()
    }

    fn history(&self) -> &[Player] {
        &self.history
    }
}

// ── Match ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Match {
    score: MatchScore,
    serve: ServeTracker,
    history: Vec<Player>,
}

impl Match {
    pub fn new(score: MatchScore, serves_next: Player) -> Self {
        Self {
            score,
            serve: ServeTracker::new(serves_next),
            history: Vec::new(),
        }
    }

    pub fn score(&self) -> &MatchScore {
        &self.score
    }
}

impl Contest for Match {
    fn serves_next(&self) -> Player {
        self.serve.serves_next
    }

    fn record_point(&mut self, winner: Player) -> Result<()> {
        let before = self.score;
        self.score = before.record(winner)?;
        let tiebreak_before = before
            .current_set()
            .and_then(|set| set.current_tiebreak())
            .or(before.current_match_tiebreak());
        let unit_over = match self.score.current_set() {
            Some(set) => !set.sub_contest_in_progress(),
            None => self
                .score
                .current_match_tiebreak()
                .map_or(true, |tiebreak| tiebreak.is_blank()),
        };
        self.serve.after_point(tiebreak_before, unit_over);
        self.history.push(winner);
        Ok(())
    }

    fn is_over(&self) -> bool {
        self.score.is_final()
    }

    fn winner(&self) -> Option<Player> {
        self.score.winner()
    }

    fn history(&self) -> &[Player] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::MatchFormat;

    fn format() -> MatchFormat {
        MatchFormat::default()
    }

    #[test]
    fn test_game_server_is_fixed() {
        let mut game = Game::new(GameScore::blank(format()), Player::Two);
        for winner in [Player::One, Player::Two, Player::Two] {
            game.record_point(winner).unwrap();
            assert_eq!(game.serves_next(), Player::Two);
        }
        assert_eq!(game.history().len(), 3);
        assert!(!game.is_over());
    }

    #[test]
    fn test_tiebreak_rotation() {
        let mut tiebreak = Tiebreak::new(TiebreakScore::blank(false, format()), Player::One);
        let mut servers = vec![tiebreak.serves_next()];
        for _ in 0..6 {
            tiebreak.record_point(Player::One).unwrap();
            servers.push(tiebreak.serves_next());
        }
        use Player::{One as A, Two as B};
        assert_eq!(servers, vec![A, B, B, A, A, B, B]);
        tiebreak.record_point(Player::One).unwrap();
        assert_eq!(tiebreak.winner(), Some(Player::One));
        assert!(tiebreak.record_point(Player::One).is_err());
    }

    #[test]
    fn test_tiebreak_rotation_survives_normalization() {
        // Point 13 of a tiebreak is served by the first server, 14 and 15 by the other
        let score = TiebreakScore::new(6, 6, false, format()).unwrap();
        let mut tiebreak = Tiebreak::new(score, Player::One);
        tiebreak.record_point(Player::One).unwrap();
        assert_eq!(tiebreak.serves_next(), Player::Two);
        tiebreak.record_point(Player::Two).unwrap();
        assert_eq!(tiebreak.score().points(Player::One), (6, 6));
        assert_eq!(tiebreak.serves_next(), Player::Two);
        tiebreak.record_point(Player::Two).unwrap();
        assert_eq!(tiebreak.serves_next(), Player::One);
    }

    #[test]
    fn test_set_alternates_each_game() {
        let mut set = Set::new(SetScore::new(0, 0, false, format()).unwrap(), Player::One);
        for _ in 0..4 {
            set.record_point(Player::One).unwrap();
        }
        assert_eq!(set.score().games(Player::One), (1, 0));
        assert_eq!(set.serves_next(), Player::Two);
        for _ in 0..4 {
            set.record_point(Player::Two).unwrap();
        }
        assert_eq!(set.serves_next(), Player::One);
    }

    #[test]
    fn test_receiver_serves_after_tiebreak() {
        let format = MatchFormat::best_of(3);
        let set = SetScore::new(6, 6, false, format).unwrap();
        let mut play = Match::new(MatchScore::with_set(0, 0, set).unwrap(), Player::Two);
        for _ in 0..7 {
            play.record_point(Player::One).unwrap();
        }
        assert_eq!(play.score().sets(Player::One), (1, 0));
        // Player two served first in the tiebreak, so player one opens set two
        assert_eq!(play.serves_next(), Player::One);
    }

    #[test]
    fn test_match_plays_to_completion() {
        let format = MatchFormat::best_of(3);
        let mut play = Match::new(MatchScore::blank(format).unwrap(), Player::One);
        while !play.is_over() {
            play.record_point(Player::One).unwrap();
        }
        assert_eq!(play.score().sets(Player::One), (2, 0));
        assert_eq!(play.winner(), Some(Player::One));
        // Two 6-0 sets of four-point games
        assert_eq!(play.history().len(), 48);
        assert_eq!(play.serves_next(), Player::One);
    }
}
