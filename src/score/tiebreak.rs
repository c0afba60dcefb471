use std::fmt;

use super::format::{MatchFormat, SUPER_TIEBREAK_POINTS, TIEBREAK_POINTS};
use super::{ordered, Player, Score};
use crate::error::{Result, ScoreError};

/// Points won by each player in a tiebreak (7-point or 10-point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TiebreakScore {
    p1: u32,
    p2: u32,
    is_super: bool,
    format: MatchFormat,
}

impl TiebreakScore {
    pub fn new(p1: u32, p2: u32, is_super: bool, format: MatchFormat) -> Result<Self> {
        if !Self::is_valid(p1, p2, is_super) {
            return Err(ScoreError::InvalidScore {
                level: "tiebreak",
                p1,
                p2,
                reason: "the tiebreak would already have ended".into(),
            });
        }
        Ok(Self { p1, p2, is_super, format })
    }

    pub fn blank(is_super: bool, format: MatchFormat) -> Self {
        Self { p1: 0, p2: 0, is_super, format }
    }

    pub fn is_valid(p1: u32, p2: u32, is_super: bool) -> bool {
        let target = points_to_win(is_super);
        (p1 <= target && p2 <= target) || p1.abs_diff(p2) <= 2
    }

    pub fn points(&self, pov: Player) -> (u32, u32) {
        ordered(pov, self.p1, self.p2)
    }

    pub fn points_to_win(&self) -> u32 {
        points_to_win(self.is_super)
    }

    pub fn is_super(&self) -> bool {
        self.is_super
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

    pub fn advantage(&self) -> Option<Player> {
        if self.p1.max(self.p2) < self.points_to_win() {
            return None;
        }
        match self.p1 as i64 - self.p2 as i64 {
            1 => Some(Player::One),
            -1 => Some(Player::Two),
            _ => None,
        }
    }

    /// Collapse scores beyond the first tie to (N-1)-(N-1), N-(N-1) or (N-1)-N.
    pub fn normalized(&self) -> Self {
        let floor = self.points_to_win() - 1;
        if self.p1.min(self.p2) <= floor {
            return *self;
        }
        let shift = self.p1.min(self.p2) - floor;
        Self {
            p1: self.p1 - shift,
            p2: self.p2 - shift,
            ..*self
        }
    }

    fn step(&self, winner: Player) -> Self {
        let (p1, p2) = match winner {
            Player::One => (self.p1 + 1, self.p2),
            Player::Two => (self.p1, self.p2 + 1),
        };
        Self { p1, p2, ..*self }
    }
}

fn points_to_win(is_super: bool) -> u32 {
    if is_super {
        SUPER_TIEBREAK_POINTS
    } else {
        TIEBREAK_POINTS
    }
}

/// Server of the next point, given who serves it now and how many points
/// have been played so far. Service changes after the first point and then
/// every two points.
pub fn next_tiebreak_server(serving: Player, points_played: u32) -> Player {
    if points_played % 2 == 0 {
        serving.other()
    } else {
        serving
    }
}

/// Player who served the first point of a tiebreak, recovered from the
/// player serving the next point after `points_played` points.
pub fn tiebreak_first_server(serves_next: Player, points_played: u32) -> Player {
    if ((points_played + 1) / 2) % 2 == 0 {
        serves_next
    } else {
        serves_next.other()
    }
}

impl Score for TiebreakScore {
    fn count(&self, player: Player) -> u32 {
        player.pick(self.p1, self.p2)
    }

    fn is_final(&self) -> bool {
        self.winner().is_some()
    }

    fn winner(&self) -> Option<Player> {
        let target = self.points_to_win();
        if self.p1 >= target && self.p1 >= self.p2 + 2 {
            Some(Player::One)
        } else if self.p2 >= target && self.p2 >= self.p1 + 2 {
            Some(Player::Two)
        } else {
            None
        }
    }

    fn is_tied(&self) -> bool {
        self.p1 == self.p2 && self.p1 + 1 >= self.points_to_win()
    }

    fn successors(&self) -> Option<(Self, Self)> {
        if self.is_final() {
            return None;
        }
        Some((self.step(Player::One), self.step(Player::Two)))
    }

    fn record(&self, winner: Player) -> Result<Self> {
        if self.is_final() {
            return Err(ScoreError::AlreadyFinal { level: "tiebreak" });
        }
        let next = self.step(winner);
        Ok(if self.format.cap_points {
            next.normalized()
        } else {
            next
        })
    }
}

impl fmt::Display for TiebreakScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.p1, self.p2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> MatchFormat {
        MatchFormat::default()
    }

    #[test]
    fn test_validity() {
        assert!(TiebreakScore::is_valid(7, 7, false));
        assert!(TiebreakScore::is_valid(7, 0, false));
        assert!(TiebreakScore::is_valid(9, 7, false));
        assert!(!TiebreakScore::is_valid(8, 5, false));
        assert!(!TiebreakScore::is_valid(8, 0, false));
        assert!(TiebreakScore::is_valid(10, 3, true));
        assert!(!TiebreakScore::is_valid(11, 3, true));
        assert!(TiebreakScore::new(8, 5, false, format()).is_err());
    }

    #[test]
    fn test_final_and_tied() {
        let won = TiebreakScore::new(7, 5, false, format()).unwrap();
        assert_eq!(won.winner(), Some(Player::One));
        let close = TiebreakScore::new(7, 6, false, format()).unwrap();
        assert!(!close.is_final());
        assert_eq!(close.advantage(), Some(Player::One));
        assert!(TiebreakScore::new(6, 6, false, format()).unwrap().is_tied());
        assert!(!TiebreakScore::new(6, 6, true, format()).unwrap().is_tied());
        assert!(TiebreakScore::new(9, 9, true, format()).unwrap().is_tied());
        let super_won = TiebreakScore::new(4, 10, true, format()).unwrap();
        assert_eq!(super_won.winner(), Some(Player::Two));
    }

    #[test]
    fn test_record() {
        let tb = TiebreakScore::new(6, 5, false, format()).unwrap();
        let done = tb.record(Player::One).unwrap();
        assert!(done.is_final());
        assert_eq!(
            done.record(Player::Two),
            Err(ScoreError::AlreadyFinal { level: "tiebreak" })
        );
        let back = TiebreakScore::new(7, 6, false, format())
            .unwrap()
            .record(Player::Two)
            .unwrap();
        assert_eq!(back.points(Player::One), (6, 6));
    }

    #[test]
    fn test_serve_rotation() {
        // A serves point 1, B points 2-3, A points 4-5, B points 6-7
        let mut server = Player::One;
        let mut servers = vec![server];
        for played in 0..6 {
            server = next_tiebreak_server(server, played);
            servers.push(server);
        }
        use Player::{One as A, Two as B};
        assert_eq!(servers, vec![A, B, B, A, A, B, B]);
        for (played, serving) in servers.iter().enumerate() {
            assert_eq!(tiebreak_first_server(*serving, played as u32), A);
        }
    }
}
