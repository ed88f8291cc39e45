//! MapStore - container for the strategic map state

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, TerritoryId};
use crate::map::territory::{Region, Territory};

/// All territories of the campaign map, keyed by id
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapStore {
    territories: AHashMap<TerritoryId, Territory>,
}

impl MapStore {
    pub fn new(territories: Vec<Territory>) -> Self {
        Self {
            territories: territories.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn insert(&mut self, territory: Territory) {
        self.territories.insert(territory.id.clone(), territory);
    }

    pub fn get(&self, id: &TerritoryId) -> Option<&Territory> {
        self.territories.get(id)
    }

    pub fn get_mut(&mut self, id: &TerritoryId) -> Option<&mut Territory> {
        self.territories.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    pub fn are_adjacent(&self, from: &TerritoryId, to: &TerritoryId) -> bool {
        self.territories
            .get(from)
            .map(|t| t.is_adjacent_to(to))
            .unwrap_or(false)
    }

    /// Territories currently controlled by a nation
    pub fn controlled_by(&self, nation: &NationId) -> Vec<&Territory> {
        self.territories
            .values()
            .filter(|t| t.controller.as_ref() == Some(nation))
            .collect()
    }

    pub fn controlled_count(&self, nation: &NationId) -> usize {
        self.territories
            .values()
            .filter(|t| t.controller.as_ref() == Some(nation))
            .count()
    }

    /// Nations currently holding at least one territory
    pub fn controllers(&self) -> Vec<NationId> {
        let mut out: Vec<NationId> = Vec::new();
        for t in self.territories.values() {
            if let Some(n) = &t.controller {
                if !out.contains(n) {
                    out.push(n.clone());
                }
            }
        }
        out.sort();
        out
    }

    /// Sum of bonuses for every region the nation controls outright.
    /// A region counts only when the nation holds all of its territories.
    pub fn region_bonus_total(&self, nation: &NationId) -> u32 {
        let mut tally: AHashMap<Region, (u32, u32)> = AHashMap::new();
        for t in self.territories.values() {
            let entry = tally.entry(t.region).or_insert((0, 0));
            entry.0 += 1;
            if t.controller.as_ref() == Some(nation) {
                entry.1 += 1;
            }
        }
        tally
            .into_iter()
            .filter(|(_, (total, owned))| *total > 0 && total == owned)
            .map(|(region, _)| region.control_bonus())
            .sum()
    }

    /// Flip control of a territory. Contests evaporate with the old owner.
    pub fn transfer_control(&mut self, id: &TerritoryId, new_controller: NationId) {
        if let Some(t) = self.territories.get_mut(id) {
            t.controller = Some(new_controller);
            t.contested_by.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ForceType;

    fn tagged(id: &str, region: Region, controller: Option<&str>) -> Territory {
        let mut t = Territory::new(id, id, region);
        t.controller = controller.map(NationId::from);
        t
    }

    #[test]
    fn test_region_bonus_requires_full_control() {
        let store = MapStore::new(vec![
            tagged("alaska", Region::NorthAmerica, Some("usa")),
            tagged("continental_us", Region::NorthAmerica, Some("usa")),
            tagged("canadian_shield", Region::NorthAmerica, Some("usa")),
            tagged("greenland", Region::Arctic, Some("usa")),
            tagged("arctic_circle", Region::Arctic, None),
        ]);
        let usa = NationId::new("usa");
        // North America complete (3), Arctic missing one territory (0)
        assert_eq!(store.region_bonus_total(&usa), 3);
    }

    #[test]
    fn test_transfer_control_clears_contests() {
        let mut t = tagged("levant", Region::MiddleEast, Some("russia"));
        t.contested_by.push(NationId::new("usa"));
        t.add_garrison(ForceType::Ground, 2);
        let mut store = MapStore::new(vec![t]);

        let id = TerritoryId::new("levant");
        store.transfer_control(&id, NationId::new("usa"));
        let after = store.get(&id).unwrap();
        assert_eq!(after.controller, Some(NationId::new("usa")));
        assert!(after.contested_by.is_empty());
        // Garrison is untouched by the flip itself
        assert_eq!(after.armies, 2);
    }

    #[test]
    fn test_controllers_sorted_and_deduped() {
        let store = MapStore::new(vec![
            tagged("alaska", Region::NorthAmerica, Some("usa")),
            tagged("west_siberia", Region::Siberia, Some("russia")),
            tagged("east_siberia", Region::Siberia, Some("russia")),
            tagged("north_atlantic", Region::NorthAtlantic, None),
        ]);
        let controllers = store.controllers();
        assert_eq!(
            controllers,
            vec![NationId::new("russia"), NationId::new("usa")]
        );
    }
}
