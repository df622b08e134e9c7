//! Message Components
//!
//! Messages are opaque, globally unique tokens. Each simulation owns one
//! [`MessageLedger`] that issues them in increasing order.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Insertion-ordered set of messages; duplicates are never retained.
/// Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct MessageSet {
    order: Vec<MessageId>,
    members: HashSet<MessageId>,
}

impl MessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.members.contains(&id)
    }

    /// Adds `id`; returns false if it was already held
    pub fn insert(&mut self, id: MessageId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, id: MessageId) -> bool {
        if self.members.remove(&id) {
            self.order.retain(|m| *m != id);
            true
        } else {
            false
        }
    }

    /// Adds every message of `other`; returns how many were new
    pub fn absorb(&mut self, other: &MessageSet) -> usize {
        other.iter().filter(|id| self.insert(*id)).count()
    }

    /// Messages held here that `other` lacks, in insertion order
    pub fn missing_from(&self, other: &MessageSet) -> Vec<MessageId> {
        self.order
            .iter()
            .copied()
            .filter(|id| !other.contains(*id))
            .collect()
    }

    /// Removes and returns one message chosen at random
    pub fn take_random(&mut self, rng: &mut impl RandomSource) -> Option<MessageId> {
        if self.order.is_empty() {
            return None;
        }
        let id = self.order.remove(rng.below(self.order.len()));
        self.members.remove(&id);
        Some(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.order.iter().copied()
    }

    pub fn as_slice(&self) -> &[MessageId] {
        &self.order
    }

    pub fn labels(&self) -> Vec<String> {
        self.order.iter().map(ToString::to_string).collect()
    }
}

impl PartialEq for MessageSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for MessageSet {}

impl FromIterator<MessageId> for MessageSet {
    fn from_iter<I: IntoIterator<Item = MessageId>>(iter: I) -> Self {
        let mut set = MessageSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Per-simulation message counter. Only ever increases.
#[derive(Resource, Debug, Clone, Default)]
pub struct MessageLedger {
    issued: u64,
}

impl MessageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused message id
    pub fn issue(&mut self) -> MessageId {
        let id = MessageId(self.issued);
        self.issued += 1;
        id
    }

    /// Draws 1..=max fresh messages
    pub fn issue_batch(&mut self, max: u32, rng: &mut impl RandomSource) -> MessageSet {
        let count = rng.range_inclusive(1, i64::from(max.max(1)));
        (0..count).map(|_| self.issue()).collect()
    }

    /// Number of messages ever issued
    pub fn total(&self) -> u64 {
        self.issued
    }
}
