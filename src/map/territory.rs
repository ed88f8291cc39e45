//! Territory - node of the strategic map graph

use serde::{Deserialize, Serialize};

use crate::core::types::{ForceType, GeoPoint, NationId, TerrainKind, TerritoryId};

/// A node of the strategic map: one territory, its garrison, and its ownership
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,

    // Geography
    pub terrain: TerrainKind,
    pub region: Region,
    pub anchor: GeoPoint,
    pub adjacent: Vec<TerritoryId>,

    // Strategic weight
    pub strategic_value: f32,
    pub production_bonus: f32,
    pub instability_modifier: f32,
    /// 0..1 likelihood estimate that fighting breaks out here; decays each
    /// turn, bumped by resolved engagements
    pub conflict_risk: f32,

    // Ownership
    pub controller: Option<NationId>,
    pub contested_by: Vec<NationId>,

    // Garrison. `armies` always equals `composition.total()`; mutate through
    // the garrison methods to keep them in lockstep.
    pub armies: u32,
    pub composition: ForceComposition,
}

/// Continent-scale grouping used for reinforcement bonuses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    NorthAmerica,
    Europe,
    Siberia,
    EastAsia,
    MiddleEast,
    Arctic,
    NorthAtlantic,
    NorthPacific,
}

impl Region {
    /// Extra armies per turn for holding every territory of the region
    pub fn control_bonus(&self) -> u32 {
        match self {
            Region::NorthAmerica => 3,
            Region::Europe => 3,
            Region::Siberia => 3,
            Region::EastAsia => 3,
            Region::MiddleEast => 2,
            Region::Arctic => 1,
            Region::NorthAtlantic => 1,
            Region::NorthPacific => 1,
        }
    }
}

/// Branch breakdown of a garrison. Totals are counted in armies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceComposition {
    pub ground: u32,
    pub naval: u32,
    pub air: u32,
    pub unmanned: u32,
}

impl ForceComposition {
    pub fn new(ground: u32, naval: u32, air: u32, unmanned: u32) -> Self {
        Self {
            ground,
            naval,
            air,
            unmanned,
        }
    }

    pub fn all_ground(count: u32) -> Self {
        Self {
            ground: count,
            ..Default::default()
        }
    }

    pub fn total(&self) -> u32 {
        self.ground + self.naval + self.air + self.unmanned
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count(&self, force: ForceType) -> u32 {
        match force {
            ForceType::Ground => self.ground,
            ForceType::Naval => self.naval,
            ForceType::Air => self.air,
            ForceType::Unmanned => self.unmanned,
        }
    }

    pub fn add(&mut self, force: ForceType, count: u32) {
        match force {
            ForceType::Ground => self.ground += count,
            ForceType::Naval => self.naval += count,
            ForceType::Air => self.air += count,
            ForceType::Unmanned => self.unmanned += count,
        }
    }

    pub fn remove(&mut self, force: ForceType, count: u32) {
        match force {
            ForceType::Ground => self.ground = self.ground.saturating_sub(count),
            ForceType::Naval => self.naval = self.naval.saturating_sub(count),
            ForceType::Air => self.air = self.air.saturating_sub(count),
            ForceType::Unmanned => self.unmanned = self.unmanned.saturating_sub(count),
        }
    }

    pub fn merge(&mut self, other: &ForceComposition) {
        self.ground += other.ground;
        self.naval += other.naval;
        self.air += other.air;
        self.unmanned += other.unmanned;
    }

    /// Subtracts a slice previously produced by `proportional`. Saturates so a
    /// stale slice can never underflow the garrison.
    pub fn subtract(&mut self, other: &ForceComposition) {
        self.ground = self.ground.saturating_sub(other.ground);
        self.naval = self.naval.saturating_sub(other.naval);
        self.air = self.air.saturating_sub(other.air);
        self.unmanned = self.unmanned.saturating_sub(other.unmanned);
    }

    /// Proportional slice of this composition totalling exactly `count` armies.
    ///
    /// Largest-remainder apportionment: every branch gets the floor of its
    /// exact share, then leftover armies go to the branches with the largest
    /// fractional remainders. Ties break in branch order
    /// ground > naval > air > unmanned. Requesting the full total (or more)
    /// returns a copy.
    pub fn proportional(&self, count: u32) -> ForceComposition {
        let total = self.total();
        if total == 0 || count == 0 {
            return ForceComposition::default();
        }
        if count >= total {
            return *self;
        }

        let branches = [self.ground, self.naval, self.air, self.unmanned];
        let mut shares = [0u32; 4];
        let mut remainders = [0u64; 4];
        let mut allocated = 0u32;

        for (i, &branch) in branches.iter().enumerate() {
            let exact = branch as u64 * count as u64;
            shares[i] = (exact / total as u64) as u32;
            remainders[i] = exact % total as u64;
            allocated += shares[i];
        }

        // Stable sort keeps branch order on equal remainders
        let mut order = [0usize, 1, 2, 3];
        order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
        let mut leftover = count - allocated;
        for &i in &order {
            if leftover == 0 {
                break;
            }
            if shares[i] < branches[i] {
                shares[i] += 1;
                leftover -= 1;
            }
        }

        ForceComposition {
            ground: shares[0],
            naval: shares[1],
            air: shares[2],
            unmanned: shares[3],
        }
    }
}

impl Territory {
    pub fn new(id: impl Into<TerritoryId>, name: impl Into<String>, region: Region) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            terrain: TerrainKind::Land,
            region,
            anchor: GeoPoint::default(),
            adjacent: Vec::new(),
            strategic_value: 1.0,
            production_bonus: 0.0,
            instability_modifier: 0.0,
            conflict_risk: 0.0,
            controller: None,
            contested_by: Vec::new(),
            armies: 0,
            composition: ForceComposition::default(),
        }
    }

    pub fn is_sea(&self) -> bool {
        self.terrain == TerrainKind::Sea
    }

    pub fn is_adjacent_to(&self, other: &TerritoryId) -> bool {
        self.adjacent.contains(other)
    }

    pub fn add_forces(&mut self, forces: &ForceComposition) {
        self.composition.merge(forces);
        self.armies += forces.total();
    }

    pub fn remove_forces(&mut self, forces: &ForceComposition) {
        self.composition.subtract(forces);
        self.armies = self.armies.saturating_sub(forces.total());
    }

    pub fn add_garrison(&mut self, force: ForceType, count: u32) {
        self.composition.add(force, count);
        self.armies += count;
    }

    pub fn remove_garrison(&mut self, force: ForceType, count: u32) {
        let present = self.composition.count(force);
        let removed = count.min(present);
        self.composition.remove(force, removed);
        self.armies = self.armies.saturating_sub(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_conserves_count() {
        let comp = ForceComposition::new(7, 3, 2, 1);
        for count in 0..=comp.total() {
            let slice = comp.proportional(count);
            assert_eq!(slice.total(), count, "slice for count {}", count);
            assert!(slice.ground <= comp.ground);
            assert!(slice.naval <= comp.naval);
            assert!(slice.air <= comp.air);
            assert!(slice.unmanned <= comp.unmanned);
        }
    }

    #[test]
    fn test_proportional_tie_breaks_toward_ground() {
        // Four equal branches, odd request: remainders all tie, so the extra
        // armies must land in branch order.
        let comp = ForceComposition::new(2, 2, 2, 2);
        let slice = comp.proportional(5);
        assert_eq!(slice.ground, 2);
        assert_eq!(slice.naval, 1);
        assert_eq!(slice.air, 1);
        assert_eq!(slice.unmanned, 1);
    }

    #[test]
    fn test_proportional_full_request_returns_copy() {
        let comp = ForceComposition::new(4, 0, 1, 0);
        assert_eq!(comp.proportional(5), comp);
        assert_eq!(comp.proportional(50), comp);
    }

    #[test]
    fn test_garrison_mutators_keep_armies_synced() {
        let mut t = Territory::new("alaska", "Alaska", Region::NorthAmerica);
        t.add_garrison(ForceType::Ground, 4);
        t.add_garrison(ForceType::Air, 2);
        assert_eq!(t.armies, 6);
        assert_eq!(t.armies, t.composition.total());

        let slice = t.composition.proportional(3);
        t.remove_forces(&slice);
        assert_eq!(t.armies, 3);
        assert_eq!(t.armies, t.composition.total());

        t.remove_garrison(ForceType::Air, 10);
        assert_eq!(t.armies, t.composition.total());
    }
}
