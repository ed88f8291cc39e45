//! Nation registry - the external nation store the engine transacts against
//!
//! The engine never holds references into nation records. It reads a
//! nation out, mutates the copy, and writes it back, so every operation
//! is one visible read-modify-write transaction.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, Resource, Turn};
use crate::nations::profile::{ConventionalProfile, Treaty};
use crate::nations::resources::ResourceLedger;

/// Everything the engine needs to know about one nation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationState {
    pub id: NationId,
    pub name: String,
    pub balances: ResourceLedger,
    /// Completed research ids
    pub researched: AHashSet<String>,
    pub instability: f32,
    /// 0-100, feeds the recruitment multiplier
    pub morale: f32,
    pub conventional: ConventionalProfile,
    pub treaties: AHashMap<NationId, Treaty>,
    pub alliances: Vec<NationId>,
}

impl NationState {
    pub fn new(id: impl Into<NationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balances: ResourceLedger::new(),
            researched: AHashSet::new(),
            instability: 10.0,
            morale: 50.0,
            conventional: ConventionalProfile::default(),
            treaties: AHashMap::new(),
            alliances: Vec::new(),
        }
    }

    /// Standard great-power starting stockpile
    pub fn with_starting_balances(mut self) -> Self {
        self.balances.set(Resource::Production, 800.0);
        self.balances.set(Resource::Intelligence, 150.0);
        self.balances.set(Resource::FissileMaterial, 40.0);
        self.balances.set(Resource::Oil, 400.0);
        self.balances.set(Resource::RareEarth, 120.0);
        self
    }

    pub fn has_researched(&self, tech: &str) -> bool {
        self.researched.contains(tech)
    }

    /// Morale-derived recruitment climate, 0.5-1.5
    pub fn recruitment_multiplier(&self) -> f32 {
        (0.5 + self.morale / 100.0).clamp(0.5, 1.5)
    }

    pub fn adjust_instability(&mut self, delta: f32) {
        self.instability = (self.instability + delta).max(0.0);
    }
}

/// A truce blocks attacks if either party's treaty record says so
pub fn truce_between(a: &NationState, b: &NationState, current_turn: Turn) -> bool {
    a.treaties
        .get(&b.id)
        .map(|t| t.truce_active(current_turn))
        .unwrap_or(false)
        || b.treaties
            .get(&a.id)
            .map(|t| t.truce_active(current_turn))
            .unwrap_or(false)
}

/// An alliance blocks attacks if either side declares it, by treaty flag or
/// by alliance list
pub fn allied(a: &NationState, b: &NationState) -> bool {
    a.treaties.get(&b.id).map(|t| t.alliance).unwrap_or(false)
        || b.treaties.get(&a.id).map(|t| t.alliance).unwrap_or(false)
        || a.alliances.contains(&b.id)
        || b.alliances.contains(&a.id)
}

/// The nation store interface the engine transacts against
pub trait NationRegistry {
    fn get(&self, id: &NationId) -> Option<NationState>;
    fn update(&mut self, nation: NationState);
}

/// Self-contained registry for tests, tools, and the console
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    nations: AHashMap<NationId, NationState>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four powers of the default campaign map
    pub fn with_default_nations() -> Self {
        let mut registry = Self::new();
        for (id, name) in [
            ("usa", "United States"),
            ("russia", "Russian Federation"),
            ("europa", "European Federation"),
            ("china", "People's Republic of China"),
        ] {
            registry.insert(NationState::new(id, name).with_starting_balances());
        }
        registry
    }

    pub fn insert(&mut self, nation: NationState) {
        self.nations.insert(nation.id.clone(), nation);
    }

    pub fn ids(&self) -> Vec<NationId> {
        let mut ids: Vec<NationId> = self.nations.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl NationRegistry for InMemoryRegistry {
    fn get(&self, id: &NationId) -> Option<NationState> {
        self.nations.get(id).cloned()
    }

    fn update(&mut self, nation: NationState) {
        self.nations.insert(nation.id.clone(), nation);
    }
}
