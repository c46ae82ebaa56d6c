//! Score-ordered membership engine backing the ZADD family.
//!
//! Members are unique byte strings bound to an `f64` score. Ordering is by
//! score ascending with member byte order breaking ties, and ranks are
//! 0-based. The member map is the source of truth; ordered views are built
//! on demand, which keeps insert-or-update O(1) and range reads O(n log n)
//! over the cardinality a single key realistically holds here.

use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, PartialEq, Clone, Default)]
pub struct SortedSet {
    members: HashMap<String, f64>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
        }
    }

    /// Inserts the member or updates its score. Returns `true` only when the
    /// member was not present before, matching the ZADD reply contract.
    pub fn insert(&mut self, member: String, score: f64) -> bool {
        self.members.insert(member, score).is_none()
    }

    /// Removes the member, reporting whether it was present.
    pub fn remove(&mut self, member: &str) -> bool {
        self.members.remove(member).is_some()
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.members.get(member).copied()
    }

    /// 0-based position of the member in (score, member) order.
    pub fn rank(&self, member: &str) -> Option<usize> {
        self.members.get(member)?;

        let position = self
            .ordered()
            .iter()
            .position(|(candidate, _)| candidate == member);

        position
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members between `start` and `stop` rank inclusive. Negative indices
    /// count from the highest rank; out-of-bounds ranges clamp and may come
    /// back empty.
    pub fn range(&self, start: i64, stop: i64) -> Vec<String> {
        let length = self.members.len() as i64;

        let mut start = if start < 0 { length + start } else { start };
        let mut stop = if stop < 0 { length + stop } else { stop };

        start = start.max(0);
        stop = stop.min(length - 1);

        if length == 0 || start > stop || start >= length {
            return Vec::new();
        }

        self.ordered()[start as usize..=stop as usize]
            .iter()
            .map(|(member, _)| member.clone())
            .collect()
    }

    fn ordered(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .members
            .iter()
            .map(|(member, score)| (member.clone(), *score))
            .collect();

        pairs.sort_by(|a, b| match a.1.total_cmp(&b.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        pairs
    }
}
