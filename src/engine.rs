//! ConquestEngine - the public face of the territorial-conquest engine
//!
//! Owns the map, the unit roster, the template catalogue, reinforcement
//! pools, and the engagement log. Nation records live in an external
//! registry; the engine reads a nation out, mutates the copy, and writes
//! it back, one visible transaction per operation. Every operation is
//! synchronous and validates all preconditions before touching state, so
//! a failure never leaves a partial mutation behind.

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::core::error::{FlashpointError, Result};
use crate::core::types::{NationId, Resource, TemplateId, TerritoryId, Turn, UnitId};
use crate::effects::{EffectSink, PendingEffects};
use crate::forces::catalog::{TemplateCatalog, TemplateResolution};
use crate::forces::template::{DivisionDesigner, UnitTemplate};
use crate::forces::unit::{DeployedUnit, UnitRoster, UnitStatus, UNIT_READINESS_CAP};
use crate::log::{EngagementLog, EngagementRecord};
use crate::logistics::SupplyProvider;
use crate::map::atlas;
use crate::map::store::MapStore;
use crate::map::territory::Territory;
use crate::nations::registry::{NationRegistry, NationState};
use crate::reinforce::ReinforcementPool;

/// Passive readiness regained by a nation each turn
pub const NATION_READINESS_REGEN: f32 = 4.0;

/// Passive readiness regained by a deployed unit each turn
pub const UNIT_READINESS_REGEN: f32 = 2.0;

/// Per-turn decay of territory conflict risk
pub const CONFLICT_RISK_DECAY: f32 = 0.02;

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed for the deterministic random source
    pub seed: u64,
    pub starting_turn: Turn,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            starting_turn: 1,
        }
    }
}

pub struct ConquestEngine {
    pub(crate) store: MapStore,
    pub(crate) roster: UnitRoster,
    pub(crate) catalog: TemplateCatalog,
    pub(crate) pools: AHashMap<NationId, ReinforcementPool>,
    pub(crate) log: EngagementLog,
    pub(crate) turn: Turn,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) registry: Box<dyn NationRegistry>,
    pub(crate) designer: Option<Box<dyn DivisionDesigner>>,
    pub(crate) supply: Option<Box<dyn SupplyProvider>>,
    pub(crate) sink: Option<Box<dyn EffectSink>>,
    pub(crate) pending: PendingEffects,
}

impl ConquestEngine {
    pub fn new(
        store: MapStore,
        catalog: TemplateCatalog,
        registry: Box<dyn NationRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            roster: UnitRoster::new(),
            catalog,
            pools: AHashMap::new(),
            log: EngagementLog::new(),
            turn: config.starting_turn,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            registry,
            designer: None,
            supply: None,
            sink: None,
            pending: PendingEffects::new(),
        }
    }

    /// Default campaign map and built-in arsenal
    pub fn with_default_world(registry: Box<dyn NationRegistry>, config: EngineConfig) -> Self {
        Self::new(
            atlas::default_world(),
            TemplateCatalog::with_defaults(),
            registry,
            config,
        )
    }

    pub fn with_division_designer(mut self, designer: Box<dyn DivisionDesigner>) -> Self {
        self.designer = Some(designer);
        self
    }

    pub fn with_supply_provider(mut self, supply: Box<dyn SupplyProvider>) -> Self {
        self.supply = Some(supply);
        self
    }

    pub fn with_effect_sink(mut self, sink: Box<dyn EffectSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // --- read-only queries ---

    pub fn current_turn(&self) -> Turn {
        self.turn
    }

    pub fn templates(&self) -> &[UnitTemplate] {
        self.catalog.all()
    }

    pub fn template(&self, id: &str) -> Option<&UnitTemplate> {
        self.catalog.get(id)
    }

    pub fn territory(&self, id: &TerritoryId) -> Option<&Territory> {
        self.store.get(id)
    }

    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.store.iter()
    }

    pub fn territories_owned_by(&self, nation: &NationId) -> Vec<&Territory> {
        let mut owned = self.store.controlled_by(nation);
        owned.sort_by(|a, b| a.id.cmp(&b.id));
        owned
    }

    pub fn units_owned_by(&self, nation: &NationId) -> Vec<&DeployedUnit> {
        self.roster.owned_by(nation)
    }

    pub fn unit(&self, id: UnitId) -> Option<&DeployedUnit> {
        self.roster.get(id)
    }

    /// Read-only copy of a nation's registry record
    pub fn nation_snapshot(&self, id: &NationId) -> Option<NationState> {
        self.registry.get(id)
    }

    pub fn engagement_log(&self) -> &EngagementLog {
        &self.log
    }

    // --- shared internals for the operation modules ---

    pub(crate) fn nation(&self, id: &NationId) -> Result<NationState> {
        self.registry
            .get(id)
            .ok_or_else(|| FlashpointError::UnknownNation(id.clone()))
    }

    pub(crate) fn commit_nation(&mut self, nation: NationState) {
        self.registry.update(nation);
    }

    pub(crate) fn record(&mut self, record: EngagementRecord) {
        self.log.push(record);
    }

    /// Deliver queued side effects; call only after the store mutation
    /// has committed
    pub(crate) fn flush_effects(&mut self) {
        self.pending.flush(self.sink.as_deref_mut());
    }

    // --- operations ---

    /// Check and debit a nation's strategic-resource balances. All-or-
    /// nothing: any shortfall spends nothing and reports the first
    /// missing resource.
    pub fn spend_resources(&mut self, nation_id: &NationId, cost: &[(Resource, f32)]) -> Result<()> {
        let mut nation = self.nation(nation_id)?;
        if let Some((resource, required, available)) = nation.balances.first_shortfall(cost) {
            return Err(FlashpointError::InsufficientResources {
                resource,
                required,
                available,
            });
        }
        let mut production_spent = 0.0;
        for (resource, amount) in cost {
            nation.balances.adjust(*resource, -amount);
            if *resource == Resource::Production {
                production_spent += amount;
            }
        }
        self.commit_nation(nation);

        if production_spent > 0.0 {
            self.pending.consume_production(nation_id, production_spent);
        }
        self.flush_effects();
        Ok(())
    }

    /// Train one unit from a template, station it, and charge the nation
    /// for the privilege.
    pub fn train_unit(
        &mut self,
        nation_id: &NationId,
        template_id: &TemplateId,
        territory_id: Option<&TerritoryId>,
    ) -> Result<UnitId> {
        let mut nation = self.nation(nation_id)?;

        let resolution = self
            .catalog
            .resolve(template_id, nation_id, self.designer.as_deref());
        let (template, converted) = match resolution {
            TemplateResolution::Found(t) => (t, false),
            TemplateResolution::Converted(t) => (t, true),
            TemplateResolution::NotFound => {
                return Err(FlashpointError::UnknownTemplate(template_id.clone()))
            }
        };

        if let Some(tech) = &template.research_requirement {
            if !nation.has_researched(tech) {
                return Err(FlashpointError::ResearchLocked {
                    template: template_id.clone(),
                    tech: tech.clone(),
                });
            }
        }

        let target = self.pick_training_ground(&nation, territory_id, &template)?;

        if let Some((resource, required, available)) = nation.balances.first_shortfall(&template.cost)
        {
            return Err(FlashpointError::InsufficientResources {
                resource,
                required,
                available,
            });
        }

        // All preconditions pass; commit.
        let mut production_spent = 0.0;
        for (resource, amount) in &template.cost {
            nation.balances.adjust(*resource, -amount);
            if *resource == Resource::Production {
                production_spent += amount;
            }
        }

        // Unit readiness reads the profile before fatigue lands
        let unit_readiness = (nation.conventional.readiness - template.readiness_impact * 0.5)
            .clamp(35.0, 95.0);
        nation.conventional.training_fatigue(
            template.readiness_impact,
            template.armies_value,
            nation.recruitment_multiplier(),
        );

        let unit_id = self.roster.next_unit_id();
        self.roster.insert(DeployedUnit {
            id: unit_id,
            template: template.id.clone(),
            nation: nation_id.clone(),
            label: format!("{} #{}", template.name, unit_id.0),
            readiness: unit_readiness,
            experience: 0.0,
            location: Some(target.clone()),
            status: UnitStatus::Deployed,
        });
        nation.conventional.deployed_units.push(unit_id);

        if let Some(t) = self.store.get_mut(&target) {
            t.add_garrison(template.force_type, template.armies_value);
        }

        if converted {
            // First successful use persists the converted design
            self.catalog.add(template.clone());
        }
        self.commit_nation(nation);

        info!(
            nation = %nation_id,
            template = %template.id,
            territory = %target,
            unit = %unit_id,
            "unit trained"
        );

        if production_spent > 0.0 {
            self.pending.consume_production(nation_id, production_spent);
        }
        self.pending.request_refresh();
        self.flush_effects();
        Ok(unit_id)
    }

    /// Explicit argument, else an owned territory matching the template's
    /// preferred terrain, else any owned territory
    fn pick_training_ground(
        &self,
        nation: &NationState,
        territory_id: Option<&TerritoryId>,
        template: &UnitTemplate,
    ) -> Result<TerritoryId> {
        if let Some(id) = territory_id {
            let t = self
                .store
                .get(id)
                .ok_or_else(|| FlashpointError::UnknownTerritory(id.clone()))?;
            if t.controller.as_ref() != Some(&nation.id) {
                return Err(FlashpointError::NotOwner {
                    nation: Some(nation.id.clone()),
                    territory: id.clone(),
                });
            }
            return Ok(id.clone());
        }

        let owned = self.territories_owned_by(&nation.id);
        let preferred = template.force_type.preferred_terrain();
        owned
            .iter()
            .find(|t| t.terrain == preferred)
            .or_else(|| owned.first())
            .map(|t| t.id.clone())
            .ok_or_else(|| FlashpointError::NoTerritory(nation.id.clone()))
    }

    /// Move a unit into a territory. A reserve unit becomes deployed and
    /// draws its army value out of the national reserve.
    pub fn deploy_unit(&mut self, unit_id: UnitId, territory_id: &TerritoryId) -> Result<()> {
        let unit = self
            .roster
            .get(unit_id)
            .ok_or(FlashpointError::UnknownUnit(unit_id))?;
        if self.store.get(territory_id).is_none() {
            return Err(FlashpointError::UnknownTerritory(territory_id.clone()));
        }
        let template = self
            .catalog
            .get(unit.template.as_str())
            .ok_or_else(|| FlashpointError::UnknownTemplate(unit.template.clone()))?;

        let force_type = template.force_type;
        let armies_value = template.armies_value;
        let nation_id = unit.nation.clone();
        let was_reserve = unit.status == UnitStatus::Reserve;
        let old_location = unit.location.clone();

        // Reserve units tap the national manpower pool on the way out
        let nation = if was_reserve {
            Some(self.nation(&nation_id)?)
        } else {
            None
        };

        if let Some(old) = &old_location {
            if let Some(t) = self.store.get_mut(old) {
                t.remove_garrison(force_type, armies_value);
            }
        }
        if let Some(t) = self.store.get_mut(territory_id) {
            t.add_garrison(force_type, armies_value);
        }

        if let Some(u) = self.roster.get_mut(unit_id) {
            u.location = Some(territory_id.clone());
            u.status = UnitStatus::Deployed;
        }
        if let Some(mut nation) = nation {
            nation.conventional.reserves = nation.conventional.reserves.saturating_sub(armies_value);
            self.commit_nation(nation);
        }

        debug!(unit = %unit_id, territory = %territory_id, "unit deployed");
        self.pending.request_refresh();
        self.flush_effects();
        Ok(())
    }

    /// Advance to a new turn: refresh reinforcement pools, regenerate
    /// readiness, and cool territory conflict risk.
    pub fn begin_turn(&mut self, turn: Turn) {
        self.turn = turn;
        self.recompute_reinforcement_pools();

        for nation_id in self.store.controllers() {
            if let Some(mut nation) = self.registry.get(&nation_id) {
                nation.conventional.regen_readiness(NATION_READINESS_REGEN);
                self.registry.update(nation);
            }
        }

        for unit in self.roster.iter_mut() {
            if unit.status == UnitStatus::Deployed {
                unit.readiness = (unit.readiness + UNIT_READINESS_REGEN).min(UNIT_READINESS_CAP);
            }
        }

        // Risk cools everywhere unless fresh engagements reheat it
        let ids: Vec<TerritoryId> = self.store.iter().map(|t| t.id.clone()).collect();
        for id in ids {
            if let Some(t) = self.store.get_mut(&id) {
                t.conflict_risk = (t.conflict_risk - CONFLICT_RISK_DECAY).clamp(0.0, 1.0);
            }
        }

        debug!(turn, "turn began");
    }
}
