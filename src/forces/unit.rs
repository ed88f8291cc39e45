//! Deployed units and the roster that owns them

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, TemplateId, TerritoryId, UnitId};

/// Ceiling for passive unit readiness regeneration
pub const UNIT_READINESS_CAP: f32 = 95.0;

/// A trained unit instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedUnit {
    pub id: UnitId,
    pub template: TemplateId,
    pub nation: NationId,
    pub label: String,
    /// 0-100, spent by action and regenerated passively
    pub readiness: f32,
    /// Unbounded; feeds a diminishing-return combat multiplier
    pub experience: f32,
    /// None while the unit sits in strategic reserve
    pub location: Option<TerritoryId>,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Reserve,
    Deployed,
}

impl DeployedUnit {
    pub fn is_deployed_at(&self, territory: &TerritoryId) -> bool {
        self.status == UnitStatus::Deployed && self.location.as_ref() == Some(territory)
    }
}

/// Container owning every unit record, with sequential id allocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRoster {
    units: AHashMap<UnitId, DeployedUnit>,
    next_unit_id: u64,
}

impl UnitRoster {
    pub fn new() -> Self {
        Self {
            units: AHashMap::new(),
            next_unit_id: 1,
        }
    }

    /// Generate a new unique UnitId
    pub fn next_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }

    pub fn insert(&mut self, unit: DeployedUnit) {
        self.units.insert(unit.id, unit);
    }

    pub fn get(&self, id: UnitId) -> Option<&DeployedUnit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut DeployedUnit> {
        self.units.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeployedUnit> {
        self.units.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DeployedUnit> {
        self.units.values_mut()
    }

    /// Units owned by a nation, in id order
    pub fn owned_by(&self, nation: &NationId) -> Vec<&DeployedUnit> {
        let mut units: Vec<&DeployedUnit> =
            self.units.values().filter(|u| &u.nation == nation).collect();
        units.sort_by_key(|u| u.id);
        units
    }

    /// Units a nation has standing on one territory, in id order
    pub fn deployed_at(&self, nation: &NationId, territory: &TerritoryId) -> Vec<&DeployedUnit> {
        let mut units: Vec<&DeployedUnit> = self
            .units
            .values()
            .filter(|u| &u.nation == nation && u.is_deployed_at(territory))
            .collect();
        units.sort_by_key(|u| u.id);
        units
    }
}
