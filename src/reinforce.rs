//! Reinforcement pools
//!
//! Each nation earns a per-turn budget of generic ground armies from the
//! territory it controls, plus bonuses for holding whole regions. The
//! pool is recomputed when a turn begins and again whenever control of a
//! territory changes hands; a mid-turn recompute can only shrink what is
//! left, never refill it.

use tracing::debug;

use crate::core::error::{FlashpointError, Result};
use crate::core::types::{ForceType, NationId, TerritoryId, Turn};
use crate::engine::ConquestEngine;
use crate::map::store::MapStore;

/// Minimum per-turn army grant for any nation still on the map
pub const BASE_REINFORCEMENTS: u32 = 3;

/// Territories controlled per additional pool army
pub const TERRITORIES_PER_ARMY: u32 = 3;

/// What remains of a nation's grant for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReinforcementPool {
    pub turn: Turn,
    pub remaining: u32,
}

/// Budget formula: a floor of three armies, one more per three
/// controlled territories, plus the control bonus of every region held
/// in full.
pub fn calculate_reinforcements(store: &MapStore, nation: &NationId) -> u32 {
    let controlled = store.controlled_count(nation) as u32;
    let base = BASE_REINFORCEMENTS.max(controlled / TERRITORIES_PER_ARMY);
    base + store.region_bonus_total(nation)
}

impl ConquestEngine {
    /// Remaining grant for the current turn without mutating the pool
    pub fn reinforcement_budget(&self, nation: &NationId) -> u32 {
        match self.pools.get(nation) {
            Some(pool) if pool.turn == self.turn => pool.remaining,
            _ => calculate_reinforcements(&self.store, nation),
        }
    }

    /// Refresh every pool against the current map. Stale pools reset to
    /// the full grant; pools already issued this turn only clamp down.
    pub(crate) fn recompute_reinforcement_pools(&mut self) {
        let mut nations = self.store.controllers();
        for id in self.pools.keys() {
            if !nations.contains(id) {
                nations.push(id.clone());
            }
        }

        for nation in nations {
            let calculated = calculate_reinforcements(&self.store, &nation);
            let pool = self
                .pools
                .entry(nation)
                .or_insert(ReinforcementPool {
                    turn: self.turn,
                    remaining: calculated,
                });
            if pool.turn == self.turn {
                pool.remaining = pool.remaining.min(calculated);
            } else {
                *pool = ReinforcementPool {
                    turn: self.turn,
                    remaining: calculated,
                };
            }
        }
    }

    /// Pool entry for the current turn, created from the formula if the
    /// nation has none or only a stale one
    fn ensure_pool(&mut self, nation: &NationId) -> u32 {
        let calculated = calculate_reinforcements(&self.store, nation);
        let turn = self.turn;
        let pool = self
            .pools
            .entry(nation.clone())
            .or_insert(ReinforcementPool {
                turn,
                remaining: calculated,
            });
        if pool.turn != turn {
            *pool = ReinforcementPool {
                turn,
                remaining: calculated,
            };
        }
        pool.remaining
    }

    /// Draw `count` ground armies from the nation's pool and station them
    /// in an owned territory. Placing armies mobilizes the nation: some
    /// readiness and tradition for a dent in professionalism.
    pub fn place_reinforcements(
        &mut self,
        nation_id: &NationId,
        territory_id: &TerritoryId,
        count: u32,
    ) -> Result<()> {
        let mut nation = self.nation(nation_id)?;
        {
            let territory = self
                .store
                .get(territory_id)
                .ok_or_else(|| FlashpointError::UnknownTerritory(territory_id.clone()))?;
            if territory.controller.as_ref() != Some(nation_id) {
                return Err(FlashpointError::NotOwner {
                    nation: Some(nation_id.clone()),
                    territory: territory_id.clone(),
                });
            }
        }

        if count < 1 {
            return Err(FlashpointError::InsufficientArmies {
                territory: territory_id.clone(),
                requested: count,
                available: self.reinforcement_budget(nation_id),
            });
        }

        let remaining = self.ensure_pool(nation_id);
        if count > remaining {
            return Err(FlashpointError::PoolExhausted {
                nation: nation_id.clone(),
                requested: count,
                remaining,
            });
        }

        if let Some(pool) = self.pools.get_mut(nation_id) {
            pool.remaining -= count;
        }
        if let Some(territory) = self.store.get_mut(territory_id) {
            territory.add_garrison(ForceType::Ground, count);
        }
        nation.conventional.mobilization_effect(count);
        self.commit_nation(nation);

        debug!(nation = %nation_id, territory = %territory_id, count, "reinforcements placed");
        self.pending.request_refresh();
        self.flush_effects();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::map::atlas;
    use crate::nations::registry::InMemoryRegistry;

    fn engine() -> ConquestEngine {
        ConquestEngine::with_default_world(
            Box::new(InMemoryRegistry::with_default_nations()),
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_budget_formula() {
        let store = atlas::default_world();
        let usa = NationId::new("usa");
        // Three territories: base 3, full North America control adds 3
        assert_eq!(calculate_reinforcements(&store, &usa), 6);

        let nobody = NationId::new("atlantis");
        assert_eq!(calculate_reinforcements(&store, &nobody), 3);
    }

    #[test]
    fn test_place_reinforcements_debits_pool() {
        let mut e = engine();
        let usa = NationId::new("usa");
        let alaska = TerritoryId::new("alaska");

        assert_eq!(e.reinforcement_budget(&usa), 6);
        let before = e.territory(&alaska).unwrap().armies;

        e.place_reinforcements(&usa, &alaska, 4).expect("places");

        assert_eq!(e.reinforcement_budget(&usa), 2);
        let territory = e.territory(&alaska).unwrap();
        assert_eq!(territory.armies, before + 4);
        assert_eq!(territory.composition.ground, 3 + 4);

        let nation = e.nation(&usa).unwrap();
        assert_eq!(nation.conventional.readiness, 72.0);
        assert_eq!(nation.conventional.reserves, 104);
        assert_eq!(nation.conventional.professionalism, 48.8);
        assert!((nation.conventional.tradition - 51.6).abs() < 1e-6);
    }

    #[test]
    fn test_pool_exhausted() {
        let mut e = engine();
        let usa = NationId::new("usa");
        let alaska = TerritoryId::new("alaska");

        e.place_reinforcements(&usa, &alaska, 6).expect("places");
        let err = e.place_reinforcements(&usa, &alaska, 1).unwrap_err();
        match err {
            FlashpointError::PoolExhausted {
                requested,
                remaining,
                ..
            } => {
                assert_eq!(requested, 1);
                assert_eq!(remaining, 0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_place_rejects_zero_count() {
        let mut e = engine();
        let usa = NationId::new("usa");
        let alaska = TerritoryId::new("alaska");

        let err = e.place_reinforcements(&usa, &alaska, 0).unwrap_err();
        match err {
            FlashpointError::InsufficientArmies {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 0);
                assert_eq!(available, 6);
            }
            other => panic!("unexpected error {:?}", other),
        }
        // A rejected placement must not touch the pool
        assert_eq!(e.reinforcement_budget(&usa), 6);
    }

    #[test]
    fn test_place_requires_ownership() {
        let mut e = engine();
        let usa = NationId::new("usa");
        let err = e
            .place_reinforcements(&usa, &TerritoryId::new("west_siberia"), 1)
            .unwrap_err();
        assert!(matches!(err, FlashpointError::NotOwner { .. }));

        let err = e
            .place_reinforcements(&usa, &TerritoryId::new("atlantis"), 1)
            .unwrap_err();
        assert!(matches!(err, FlashpointError::UnknownTerritory(_)));
    }

    #[test]
    fn test_mid_turn_recompute_only_shrinks() {
        let mut e = engine();
        let usa = NationId::new("usa");
        let alaska = TerritoryId::new("alaska");

        // Issue part of the grant, then lose a territory mid-turn
        e.place_reinforcements(&usa, &alaska, 1).expect("places");
        assert_eq!(e.reinforcement_budget(&usa), 5);

        if let Some(t) = e.store.get_mut(&alaska) {
            t.controller = None;
        }
        e.recompute_reinforcement_pools();
        // Two territories: base 3, North America no longer fully held
        assert_eq!(e.reinforcement_budget(&usa), 3);

        // Gaining ground mid-turn must not refill the pool
        if let Some(t) = e.store.get_mut(&alaska) {
            t.controller = Some(usa.clone());
        }
        e.recompute_reinforcement_pools();
        assert_eq!(e.reinforcement_budget(&usa), 3);
    }

    #[test]
    fn test_new_turn_restores_grant() {
        let mut e = engine();
        let usa = NationId::new("usa");
        let alaska = TerritoryId::new("alaska");

        e.place_reinforcements(&usa, &alaska, 6).expect("places");
        assert_eq!(e.reinforcement_budget(&usa), 0);

        e.begin_turn(2);
        assert_eq!(e.reinforcement_budget(&usa), 6);
    }
}
