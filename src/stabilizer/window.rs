use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Bounded FIFO of admitted label votes.
///
/// Pushing into a full window evicts the oldest vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteWindow {
    capacity: usize,
    votes: VecDeque<usize>,
}

impl VoteWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            votes: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, label: usize) {
        if self.capacity == 0 {
            return;
        }
        while self.votes.len() >= self.capacity {
            self.votes.pop_front();
        }
        self.votes.push_back(label);
    }

    /// Drop the oldest vote without adding one. Used for rejected samples so
    /// stale evidence still expires.
    pub fn age_out(&mut self) {
        self.votes.pop_front();
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.votes.len() >= self.capacity
    }

    /// Number of votes for `label`.
    pub fn count(&self, label: usize) -> usize {
        self.votes.iter().filter(|&&v| v == label).count()
    }

    /// Most frequent label and its count. Ties go to the lowest label index,
    /// so the result never depends on vote order.
    pub fn leader(&self) -> Option<(usize, usize)> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &label in &self.votes {
            *counts.entry(label).or_default() += 1;
        }
        let mut best: Option<(usize, usize)> = None;
        for (label, count) in counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label, count)),
            }
        }
        best
    }

    pub fn votes(&self) -> impl Iterator<Item = usize> + '_ {
        self.votes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = VoteWindow::new(3);
        for label in [1, 2, 3, 4] {
            window.push(label);
        }
        assert_eq!(window.votes().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(window.is_full());
    }

    #[test]
    fn test_age_out_drops_oldest() {
        let mut window = VoteWindow::new(3);
        window.push(7);
        window.push(8);
        window.age_out();
        assert_eq!(window.votes().collect::<Vec<_>>(), vec![8]);
        window.age_out();
        window.age_out();
        assert!(window.is_empty());
    }

    #[test]
    fn test_leader_counts_votes() {
        let mut window = VoteWindow::new(5);
        for label in [4, 2, 4, 9, 4] {
            window.push(label);
        }
        assert_eq!(window.leader(), Some((4, 3)));
        assert_eq!(window.count(9), 1);
    }

    #[test]
    fn test_leader_tie_breaks_to_lowest_index() {
        let mut a = VoteWindow::new(4);
        let mut b = VoteWindow::new(4);
        for label in [12, 5, 12, 5] {
            a.push(label);
        }
        for label in [5, 5, 12, 12] {
            b.push(label);
        }
        assert_eq!(a.leader(), Some((5, 2)));
        assert_eq!(b.leader(), Some((5, 2)));
    }

    #[test]
    fn test_zero_capacity_window_stays_empty() {
        let mut window = VoteWindow::new(0);
        window.push(1);
        assert!(window.is_empty());
        assert!(!window.is_full());
        assert_eq!(window.leader(), None);
    }
}
