//! Army redistribution between friendly territories
//!
//! Movement never changes ownership and never draws blood; it slices the
//! source garrison proportionally across force types and merges the slice
//! into the destination. Claiming uncontrolled ground goes through
//! `resolve_border_conflict`, which annexes by movement when nobody
//! defends.

use tracing::debug;

use crate::core::error::{FlashpointError, Result};
use crate::core::types::TerritoryId;
use crate::engine::ConquestEngine;
use crate::log::{EngagementKind, EngagementOutcome, EngagementRecord};

impl ConquestEngine {
    /// Move `count` armies between two adjacent territories held by the
    /// same nation. The source must keep at least one army behind.
    pub fn move_armies(&mut self, from: &TerritoryId, to: &TerritoryId, count: u32) -> Result<()> {
        let source = self
            .store
            .get(from)
            .cloned()
            .ok_or_else(|| FlashpointError::UnknownTerritory(from.clone()))?;
        let target = self
            .store
            .get(to)
            .cloned()
            .ok_or_else(|| FlashpointError::UnknownTerritory(to.clone()))?;

        let owner = source.controller.clone().ok_or(FlashpointError::NotOwner {
            nation: None,
            territory: from.clone(),
        })?;
        if target.controller.as_ref() != Some(&owner) {
            return Err(FlashpointError::NotOwner {
                nation: Some(owner),
                territory: to.clone(),
            });
        }
        if !self.store.are_adjacent(from, to) {
            return Err(FlashpointError::NotAdjacent {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if count < 1 || count >= source.armies {
            return Err(FlashpointError::InsufficientArmies {
                territory: from.clone(),
                requested: count,
                available: source.armies,
            });
        }

        let moved = source.composition.proportional(count);
        if let Some(t) = self.store.get_mut(from) {
            t.remove_forces(&moved);
        }
        if let Some(t) = self.store.get_mut(to) {
            t.add_forces(&moved);
        }

        self.record(EngagementRecord {
            turn: self.turn,
            territory: to.clone(),
            kind: EngagementKind::Movement,
            outcome: EngagementOutcome::Moved,
            casualties: Vec::new(),
            instability_deltas: Vec::new(),
            production_deltas: Vec::new(),
            rounds: None,
        });

        debug!(nation = %owner, from = %from, to = %to, count, "armies moved");
        self.pending.request_refresh();
        self.flush_effects();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::NationId;
    use crate::engine::EngineConfig;
    use crate::map::territory::ForceComposition;
    use crate::nations::registry::InMemoryRegistry;

    fn engine() -> ConquestEngine {
        ConquestEngine::with_default_world(
            Box::new(InMemoryRegistry::with_default_nations()),
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_move_preserves_army_total() {
        let mut e = engine();
        let alaska = TerritoryId::new("alaska");
        let shield = TerritoryId::new("canadian_shield");

        let total_before =
            e.territory(&alaska).unwrap().armies + e.territory(&shield).unwrap().armies;

        e.move_armies(&alaska, &shield, 2).expect("moves");

        let source = e.territory(&alaska).unwrap();
        let target = e.territory(&shield).unwrap();
        assert_eq!(source.armies + target.armies, total_before);
        assert_eq!(source.armies, 1);
        assert_eq!(source.armies, source.composition.total());
        assert_eq!(target.armies, target.composition.total());
    }

    #[test]
    fn test_move_splits_composition_proportionally() {
        let mut e = engine();
        let alaska = TerritoryId::new("alaska");
        let shield = TerritoryId::new("canadian_shield");

        if let Some(t) = e.store.get_mut(&alaska) {
            t.composition = ForceComposition {
                ground: 6,
                naval: 2,
                air: 1,
                unmanned: 1,
            };
            t.armies = 10;
        }

        e.move_armies(&alaska, &shield, 5).expect("moves");

        let source = e.territory(&alaska).unwrap();
        assert_eq!(source.armies, 5);
        assert_eq!(source.composition.ground, 3);
        assert_eq!(source.composition.naval, 1);

        let target = e.territory(&shield).unwrap();
        // Started with 3 ground, gained a 5-army slice
        assert_eq!(target.armies, 8);
        assert_eq!(target.composition.total(), 8);
        assert_eq!(target.composition.ground, 3 + 3);
    }

    #[test]
    fn test_move_requires_common_ownership() {
        let mut e = engine();
        let err = e
            .move_armies(
                &TerritoryId::new("alaska"),
                &TerritoryId::new("east_siberia"),
                1,
            )
            .unwrap_err();
        match err {
            FlashpointError::NotOwner { nation, territory } => {
                assert_eq!(nation, Some(NationId::new("usa")));
                assert_eq!(territory.as_str(), "east_siberia");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_move_into_neutral_territory_rejected() {
        let mut e = engine();
        let err = e
            .move_armies(
                &TerritoryId::new("canadian_shield"),
                &TerritoryId::new("greenland"),
                1,
            )
            .unwrap_err();
        assert!(matches!(err, FlashpointError::NotOwner { .. }));
        assert_eq!(e.territory(&TerritoryId::new("greenland")).unwrap().armies, 0);
    }

    #[test]
    fn test_move_validations() {
        let mut e = engine();
        let alaska = TerritoryId::new("alaska");

        let err = e
            .move_armies(&alaska, &TerritoryId::new("continental_us"), 1)
            .unwrap_err();
        assert!(matches!(err, FlashpointError::NotAdjacent { .. }));

        let err = e
            .move_armies(&alaska, &TerritoryId::new("canadian_shield"), 3)
            .unwrap_err();
        assert!(matches!(err, FlashpointError::InsufficientArmies { .. }));

        let err = e
            .move_armies(&alaska, &TerritoryId::new("canadian_shield"), 0)
            .unwrap_err();
        assert!(matches!(err, FlashpointError::InsufficientArmies { .. }));
    }

    #[test]
    fn test_move_logged_without_casualties() {
        let mut e = engine();
        e.move_armies(
            &TerritoryId::new("alaska"),
            &TerritoryId::new("canadian_shield"),
            1,
        )
        .expect("moves");

        let record = e.engagement_log().latest().unwrap();
        assert_eq!(record.kind, EngagementKind::Movement);
        assert_eq!(record.outcome, EngagementOutcome::Moved);
        assert!(record.casualties.is_empty());
        assert!(record.rounds.is_none());
    }
}
