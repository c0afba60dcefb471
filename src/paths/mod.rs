//! Enumeration of every finite score progression from a starting score.
//!
//! Tennis scoring repeats forever at ties (deuce, 6-6 in a tiebreak), so the
//! generator expands a binary tree breadth-first and prunes it at two kinds of
//! leaves: **final** scores and **boundary** scores, where the aggregator
//! substitutes a closed-form formula for the infinite tail.
//!
//! Paths share their prefixes through an arena of parent-linked nodes, so
//! branching costs one node per successor instead of a copy of the history.
//!
//! Path states per level:
//! - **Game**: [`GameScore`](crate::score::GameScore), server fixed by the caller
//! - **Tiebreak**: [`TiebreakNode`], carrying the player serving the next point
//! - **Set**: [`SetNode`], carrying the player serving the next game
//! - **Match**: [`MatchScore`](crate::score::MatchScore), one step per set

pub mod game;
pub mod match_level;
pub mod set;
pub mod tiebreak;

pub use set::SetNode;
pub use tiebreak::TiebreakNode;

use crate::error::Result;
use crate::score::Player;

/// State the path generator can expand.
pub trait PathState: Clone {
    fn is_final(&self) -> bool;

    /// Repetition boundary where enumeration stops without a winner
    fn is_boundary(&self) -> bool;

    fn winner(&self) -> Option<Player>;

    /// Count of `player` at the level's step granularity
    fn count(&self, player: Player) -> u32;

    /// States after player one or player two takes the next step
    fn successors(&self) -> Option<(Self, Self)>;

    /// Reject starting states the generator cannot expand.
    fn check_root(&self) -> Result<()> {
        Ok(())
    }

    /// Player who won the step from `self` to `next`.
    fn step_winner(&self, next: &Self) -> Player {
        if next.count(Player::One) > self.count(Player::One) {
            Player::One
        } else {
            Player::Two
        }
    }
}

#[derive(Debug, Clone)]
struct Node<S> {
    state: S,
    parent: Option<usize>,
}

/// Every distinct progression from one initial state, stored as an arena.
#[derive(Debug, Clone)]
pub struct PathSet<S> {
    nodes: Vec<Node<S>>,
    leaves: Vec<usize>,
}

/// Read-only view of one path inside a [`PathSet`].
#[derive(Debug, Clone, Copy)]
pub struct Path<'a, S> {
    set: &'a PathSet<S>,
    leaf: usize,
}

/// Generate every path from `initial` to a final or boundary state.
///
/// A starting state that is already final or on the boundary yields the
/// single one-element path.
pub fn generate_all_paths<S: PathState>(initial: S) -> Result<PathSet<S>> {
    initial.check_root()?;
    let mut set = PathSet {
        nodes: vec![Node {
            state: initial,
            parent: None,
        }],
        leaves: Vec::new(),
    };

    let mut frontier = vec![0usize];
    while !frontier.is_empty() {
        let mut next = Vec::with_capacity(frontier.len() * 2);
        for idx in frontier {
            let state = &set.nodes[idx].state;
            let expansion = if state.is_final() || state.is_boundary() {
                None
            } else {
                state.successors()
            };
            match expansion {
                Some((first, second)) => {
                    for child in [first, second] {
                        next.push(set.nodes.len());
                        set.nodes.push(Node {
                            state: child,
                            parent: Some(idx),
                        });
                    }
                }
                None => set.leaves.push(idx),
            }
        }
        frontier = next;
    }
    Ok(set)
}

impl<S> PathSet<S> {
    /// Number of paths
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Arena size (distinct prefixes across all paths)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn initial(&self) -> &S {
        &self.nodes[0].state
    }

    pub fn iter(&self) -> impl Iterator<Item = Path<'_, S>> + '_ {
        self.leaves.iter().map(move |&leaf| Path { set: self, leaf })
    }
}

impl<'a, S> Path<'a, S> {
    pub fn first(&self) -> &'a S {
        self.set.initial()
    }

    pub fn last(&self) -> &'a S {
        let set: &'a PathSet<S> = self.set;
        &set.nodes[self.leaf].state
    }

    /// Number of states on the path (at least one)
    pub fn len(&self) -> usize {
        self.ancestry().count()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// States from the initial score to the last one.
    pub fn states(&self) -> Vec<&'a S> {
        let set: &'a PathSet<S> = self.set;
        let mut states: Vec<&'a S> = self.ancestry().map(|idx| &set.nodes[idx].state).collect();
        states.reverse();
        states
    }

    /// Transitions `(from, to)`, walked from the last state back to the first.
    pub fn steps(&self) -> impl Iterator<Item = (&'a S, &'a S)> + 'a {
        let set: &'a PathSet<S> = self.set;
        let nodes = &set.nodes;
        self.ancestry().filter_map(move |idx| {
            nodes[idx]
                .parent
                .map(|parent| (&nodes[parent].state, &nodes[idx].state))
        })
    }

    fn ancestry(&self) -> impl Iterator<Item = usize> + 'a {
        let set: &'a PathSet<S> = self.set;
        let nodes = &set.nodes;
        std::iter::successors(Some(self.leaf), move |&idx| nodes[idx].parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{GameScore, MatchFormat};

    #[test]
    fn test_final_root_is_singleton() {
        let won = GameScore::new(4, 1, MatchFormat::default()).unwrap();
        let paths = generate_all_paths(won).unwrap();
        assert_eq!(paths.len(), 1);
        let path = paths.iter().next().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.steps().count(), 0);
        assert_eq!(*path.first(), won);
    }

    #[test]
    fn test_paths_are_distinct_and_start_at_root() {
        let root = GameScore::new(2, 2, MatchFormat::default()).unwrap();
        let paths = generate_all_paths(root).unwrap();
        let mut seen = std::collections::HashSet::new();
        for path in paths.iter() {
            let states = path.states();
            assert_eq!(*states[0], root);
            assert_eq!(states.len(), path.steps().count() + 1);
            assert!(seen.insert(states.iter().map(|s| s.to_string()).collect::<Vec<_>>()));
            let last = path.last();
            assert!(last.is_final() || last.is_boundary());
        }
        // 2-2: 4-2, 3-3 via P1; 3-3 via P2, 2-4 (3-3 is the deuce boundary)
        assert_eq!(paths.len(), 4);
    }
}
