//! Engagement log - bounded history of resolved conflicts

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, TerritoryId, Turn};

/// Entries retained; the oldest is evicted first. A bounded ring, not an
/// audit trail.
pub const LOG_CAPACITY: usize = 25;

/// One resolved engagement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub turn: Turn,
    pub territory: TerritoryId,
    pub kind: EngagementKind,
    pub outcome: EngagementOutcome,
    /// (nation, armies lost)
    pub casualties: Vec<(NationId, u32)>,
    pub instability_deltas: Vec<(NationId, f32)>,
    pub production_deltas: Vec<(NationId, f32)>,
    /// Round-by-round strength exchange, border attacks only
    pub rounds: Option<Vec<RoundTrace>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementKind {
    BorderAttack,
    Proxy,
    Movement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementOutcome {
    TerritoryCaptured,
    AttackRepelled,
    ProxySuccess,
    ProxyFailure,
    Moved,
}

/// Snapshot of one combat round
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundTrace {
    pub round: u32,
    pub attacker_strength: f32,
    pub defender_strength: f32,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub attackers_remaining: u32,
    pub defenders_remaining: u32,
}

/// Fixed-capacity ring of recent engagements
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngagementLog {
    records: VecDeque<EngagementRecord>,
}

impl EngagementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest once past capacity
    pub fn push(&mut self, record: EngagementRecord) {
        if self.records.len() == LOG_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &EngagementRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&EngagementRecord> {
        self.records.back()
    }

    pub fn for_nation<'a>(
        &'a self,
        nation: &'a NationId,
    ) -> impl Iterator<Item = &'a EngagementRecord> {
        self.records
            .iter()
            .filter(move |r| r.casualties.iter().any(|(n, _)| n == nation))
    }
}
