//! Logistics interface - per-territory supply assessments
//!
//! The supply subsystem lives outside this engine. Combat only needs one
//! number per territory per fight: a strength multiplier derived from the
//! external assessment of how well the garrison is resupplied.

use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, TerritoryId};

/// Strength multiplier when supply lines are run by someone else
pub const FOREIGN_SUPPLIER_MODIFIER: f32 = 0.75;

/// Floor and ceiling for the fill-ratio component of the modifier
pub const FILL_RATIO_FLOOR: f32 = 0.35;
pub const FILL_RATIO_CEILING: f32 = 1.25;

/// External assessment of one territory's resupply adequacy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyState {
    pub controlling_nation: NationId,
    pub status: SupplyStatus,
    pub current_supply: f32,
    pub supply_demand: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyStatus {
    Oversupplied,
    Adequate,
    Low,
    Critical,
    None,
}

impl SupplyStatus {
    /// Base strength multiplier by status band
    pub fn modifier(&self) -> f32 {
        match self {
            SupplyStatus::Oversupplied => 1.15,
            SupplyStatus::Adequate => 1.00,
            SupplyStatus::Low => 0.85,
            SupplyStatus::Critical => 0.60,
            SupplyStatus::None => 0.40,
        }
    }
}

/// The external logistics subsystem
pub trait SupplyProvider {
    fn supply_state(&self, territory: &TerritoryId) -> Option<SupplyState>;
}

/// Combat strength multiplier for `nation` fighting on `territory`.
///
/// No provider or no record means neutral supply (1.0). A record naming a
/// different controlling nation means the fighter is living off someone
/// else's supply net (flat 0.75). Otherwise the status-band modifier is
/// scaled by the clamped fill ratio.
pub fn supply_modifier(
    provider: Option<&dyn SupplyProvider>,
    territory: &TerritoryId,
    nation: &NationId,
) -> f32 {
    let Some(state) = provider.and_then(|p| p.supply_state(territory)) else {
        return 1.0;
    };
    if &state.controlling_nation != nation {
        return FOREIGN_SUPPLIER_MODIFIER;
    }
    let fill = (state.current_supply / state.supply_demand.max(1.0))
        .clamp(FILL_RATIO_FLOOR, FILL_RATIO_CEILING);
    state.status.modifier() * fill
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;

    struct TableSupply {
        states: AHashMap<TerritoryId, SupplyState>,
    }

    impl TableSupply {
        fn new() -> Self {
            Self {
                states: AHashMap::new(),
            }
        }

        fn set(&mut self, territory: &str, state: SupplyState) {
            self.states.insert(TerritoryId::new(territory), state);
        }
    }

    impl SupplyProvider for TableSupply {
        fn supply_state(&self, territory: &TerritoryId) -> Option<SupplyState> {
            self.states.get(territory).cloned()
        }
    }

    #[test]
    fn test_no_provider_is_neutral() {
        let m = supply_modifier(None, &TerritoryId::new("alaska"), &NationId::new("usa"));
        assert_eq!(m, 1.0);
    }

    #[test]
    fn test_foreign_supplier_penalty() {
        let mut table = TableSupply::new();
        table.set(
            "alaska",
            SupplyState {
                controlling_nation: NationId::new("russia"),
                status: SupplyStatus::Oversupplied,
                current_supply: 100.0,
                supply_demand: 10.0,
            },
        );
        let m = supply_modifier(
            Some(&table),
            &TerritoryId::new("alaska"),
            &NationId::new("usa"),
        );
        assert_eq!(m, FOREIGN_SUPPLIER_MODIFIER);
    }

    #[test]
    fn test_status_band_times_fill_ratio() {
        let mut table = TableSupply::new();
        table.set(
            "alaska",
            SupplyState {
                controlling_nation: NationId::new("usa"),
                status: SupplyStatus::Low,
                current_supply: 5.0,
                supply_demand: 10.0,
            },
        );
        let m = supply_modifier(
            Some(&table),
            &TerritoryId::new("alaska"),
            &NationId::new("usa"),
        );
        // 0.85 * (5/10); a 0.5 fill ratio sits inside the clamp band
        assert!((m - 0.85 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fill_ratio_clamps() {
        let mut table = TableSupply::new();
        table.set(
            "alaska",
            SupplyState {
                controlling_nation: NationId::new("usa"),
                status: SupplyStatus::Adequate,
                current_supply: 0.0,
                supply_demand: 10.0,
            },
        );
        let floor = supply_modifier(
            Some(&table),
            &TerritoryId::new("alaska"),
            &NationId::new("usa"),
        );
        assert!((floor - FILL_RATIO_FLOOR).abs() < 1e-6);

        table.set(
            "alaska",
            SupplyState {
                controlling_nation: NationId::new("usa"),
                status: SupplyStatus::Adequate,
                current_supply: 1000.0,
                supply_demand: 0.0,
            },
        );
        let ceiling = supply_modifier(
            Some(&table),
            &TerritoryId::new("alaska"),
            &NationId::new("usa"),
        );
        // Zero demand reads as one unit of demand
        assert!((ceiling - FILL_RATIO_CEILING).abs() < 1e-6);
    }
}
