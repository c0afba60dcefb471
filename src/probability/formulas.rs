//! Closed-form win probabilities from repetition boundaries.
//!
//! From a deuce or tie the process can cycle forever; summing the geometric
//! series of returns to the tie gives these closed forms.

/// Tolerance for the degenerate tie where neither player can ever break away.
pub const DEGENERATE_EPSILON: f64 = 1e-10;

/// Probability that the server wins a game from deuce, given the
/// probability `p` of winning each service point.
///
/// `p² / (1 − 2p(1−p))`; the denominator never drops below 0.5.
pub fn win_from_deuce(p: f64) -> f64 {
    p * p / (1.0 - 2.0 * p * (1.0 - p))
}

/// Probability that a player wins from a tie where the next two steps are
/// one on each player's serve (tiebreak tie, or n-n in an advantage set).
///
/// `p_self` is the player's probability of winning a step on their own
/// serve, `p_opp` the opponent's. Who serves first does not matter.
///
/// When both players always hold (or both always lose serve) the tie never
/// resolves and the result is 0.5.
pub fn win_from_tie(p_self: f64, p_opp: f64) -> f64 {
    let both_hold = (1.0 - p_self).abs() < DEGENERATE_EPSILON
        && (1.0 - p_opp).abs() < DEGENERATE_EPSILON;
    let both_break = p_self.abs() < DEGENERATE_EPSILON && p_opp.abs() < DEGENERATE_EPSILON;
    if both_hold || both_break {
        return 0.5;
    }
    let split = p_self * (1.0 - p_opp);
    let back_to_tie = p_self * p_opp + (1.0 - p_self) * (1.0 - p_opp);
    split / (1.0 - back_to_tie)
}
