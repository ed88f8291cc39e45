//! Border attack resolution
//!
//! The heavyweight operation of the engine: validates the full
//! precondition chain, queues the diplomatic fallout, runs the
//! deterministic exchange from `strength`, then commits the outcome to
//! the map, both nations, and the engagement log in one pass. An attack
//! on an uncontrolled territory skips combat entirely and degenerates
//! into an annexation march.

use serde::Serialize;
use tracing::info;

use crate::conflict::strength::{
    attacker_base, composition_bonus, defender_base, run_exchange, territory_profile,
};
use crate::core::error::{FlashpointError, Result};
use crate::core::types::{NationId, Resource, TerritoryId, Turn};
use crate::engine::ConquestEngine;
use crate::log::{EngagementKind, EngagementOutcome, EngagementRecord, RoundTrace};
use crate::logistics::supply_modifier;
use crate::nations::registry::{allied, truce_between, NationState};

/// Attacker readiness cost for a won battle
pub const ATTACKER_VICTORY_FATIGUE: f32 = 8.0;

/// Attacker readiness cost for a repelled attack
pub const ATTACKER_DEFEAT_FATIGUE: f32 = 15.0;

/// Defender readiness cost when the territory falls
pub const DEFENDER_COLLAPSE_FATIGUE: f32 = 18.0;

/// Defender readiness cost for holding the line
pub const DEFENDER_HOLD_FATIGUE: f32 = 10.0;

/// Relationship damage between attacker and defender
pub const BORDER_AGGRESSION_PENALTY: f32 = -25.0;

/// Relationship damage between the defender and each ally that sat out
pub const ALLIANCE_FAILURE_PENALTY: f32 = -15.0;

/// Largest single-battle drop of the global tension level
pub const TENSION_STEP_CAP: i32 = 2;

/// Conflict-risk spike on the attacked territory
pub const BORDER_CONFLICT_RISK: f32 = 0.10;

/// Experience granted to every unit present at a battle site
pub const BATTLE_EXPERIENCE: f32 = 1.0;

/// Full account of one border engagement
#[derive(Debug, Clone, Serialize)]
pub struct ConflictOutcome {
    pub attacker: NationId,
    pub defender: Option<NationId>,
    pub source: TerritoryId,
    pub target: TerritoryId,
    pub attacker_victory: bool,
    pub territory_captured: bool,
    /// True when the target had no controller and no shots were fired
    pub unopposed: bool,
    pub rounds: Vec<RoundTrace>,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub attacker_power: f32,
    pub defender_power: f32,
    pub attacker_supply: f32,
    pub defender_supply: f32,
}

impl ConquestEngine {
    /// Attack an adjacent territory with part of the source garrison.
    ///
    /// Every precondition is checked before anything mutates, so a
    /// returned error leaves the world exactly as it was. A target
    /// without a controller is annexed by movement instead of combat.
    pub fn resolve_border_conflict(
        &mut self,
        from: &TerritoryId,
        to: &TerritoryId,
        attacking_armies: u32,
    ) -> Result<ConflictOutcome> {
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

        let attacker_id = source.controller.clone().ok_or(FlashpointError::NotOwner {
            nation: None,
            territory: from.clone(),
        })?;
        let mut attacker = self.nation(&attacker_id)?;

        if !self.store.are_adjacent(from, to) {
            return Err(FlashpointError::NotAdjacent {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if attacking_armies < 1 || attacking_armies >= source.armies {
            return Err(FlashpointError::InsufficientArmies {
                territory: from.clone(),
                requested: attacking_armies,
                available: source.armies,
            });
        }

        let Some(defender_id) = target.controller.clone() else {
            return self.annex_uncontrolled(&attacker_id, attacker, from, to, attacking_armies);
        };
        let mut defender = self.nation(&defender_id)?;

        if truce_between(&attacker, &defender, self.turn) {
            return Err(FlashpointError::TruceActive {
                nation: defender_id,
                expires: truce_horizon(&attacker, &defender, self.turn),
            });
        }
        if allied(&attacker, &defender) {
            return Err(FlashpointError::AlliedNations(attacker_id, defender_id));
        }

        // Diplomatic fallout is decided up front and delivered only
        // after the battle commits
        let tension_step = ((target.strategic_value / 3.0).ceil() as i32).min(TENSION_STEP_CAP);
        self.pending.shift_tension(-tension_step);
        self.pending.adjust_relationship(
            &attacker_id,
            &defender_id,
            BORDER_AGGRESSION_PENALTY,
            "border aggression",
        );
        for ally in &defender.alliances {
            if *ally != attacker_id {
                self.pending.adjust_relationship(
                    &defender_id,
                    ally,
                    ALLIANCE_FAILURE_PENALTY,
                    "failed to honor alliance",
                );
            }
        }

        let supply = self.supply.as_deref();
        let attacker_profile =
            territory_profile(&attacker_id, &source, &self.roster, &self.catalog, supply);
        let defender_profile =
            territory_profile(&defender_id, &target, &self.roster, &self.catalog, supply);
        let attacker_power =
            attacker_base(&attacker_profile, &composition_bonus(&source.composition));
        let defender_power =
            defender_base(&defender_profile, &composition_bonus(&target.composition));
        let attacker_supply = supply_modifier(supply, from, &attacker_id);
        let defender_supply = supply_modifier(supply, to, &defender_id);

        let committed = source.composition.proportional(attacking_armies);
        let exchange = run_exchange(attacker_power, defender_power, attacking_armies, target.armies);
        let captured = exchange.attacker_victory();

        // Commit phase
        let production_bonus = target.production_bonus;
        let instability_modifier = target.instability_modifier;
        let mut production_deltas = Vec::new();
        let mut instability_deltas = Vec::new();

        if captured {
            if let Some(t) = self.store.get_mut(from) {
                t.remove_forces(&committed);
            }
            let survivors = committed.proportional(exchange.attackers_remaining);
            if let Some(t) = self.store.get_mut(to) {
                t.armies = exchange.attackers_remaining;
                t.composition = survivors;
            }
            self.store.transfer_control(to, attacker_id.clone());

            attacker
                .balances
                .adjust(Resource::Production, production_bonus);
            attacker.adjust_instability(-instability_modifier);
            attacker.conventional.debit_readiness(ATTACKER_VICTORY_FATIGUE);
            defender
                .balances
                .adjust(Resource::Production, -production_bonus);
            defender.adjust_instability(instability_modifier);
            defender.conventional.debit_readiness(DEFENDER_COLLAPSE_FATIGUE);

            production_deltas.push((attacker_id.clone(), production_bonus));
            production_deltas.push((defender_id.clone(), -production_bonus));
            instability_deltas.push((attacker_id.clone(), -instability_modifier));
            instability_deltas.push((defender_id.clone(), instability_modifier));
        } else {
            let lost = committed.proportional(exchange.attacker_losses);
            if let Some(t) = self.store.get_mut(from) {
                t.remove_forces(&lost);
            }
            if let Some(t) = self.store.get_mut(to) {
                t.composition = t.composition.proportional(exchange.defenders_remaining);
                t.armies = exchange.defenders_remaining;
                if !t.contested_by.contains(&attacker_id) {
                    t.contested_by.push(attacker_id.clone());
                }
            }

            attacker.adjust_instability(instability_modifier * 0.5);
            attacker.conventional.debit_readiness(ATTACKER_DEFEAT_FATIGUE);
            defender.conventional.debit_readiness(DEFENDER_HOLD_FATIGUE);

            instability_deltas.push((attacker_id.clone(), instability_modifier * 0.5));
        }

        if let Some(t) = self.store.get_mut(to) {
            t.conflict_risk = (t.conflict_risk + BORDER_CONFLICT_RISK).clamp(0.0, 1.0);
        }
        for unit in self.roster.iter_mut() {
            if matches!(&unit.location, Some(l) if l == from || l == to) {
                unit.experience += BATTLE_EXPERIENCE;
            }
        }

        self.commit_nation(attacker);
        self.commit_nation(defender);
        if captured {
            self.recompute_reinforcement_pools();
        }

        self.record(EngagementRecord {
            turn: self.turn,
            territory: to.clone(),
            kind: EngagementKind::BorderAttack,
            outcome: if captured {
                EngagementOutcome::TerritoryCaptured
            } else {
                EngagementOutcome::AttackRepelled
            },
            casualties: vec![
                (attacker_id.clone(), exchange.attacker_losses),
                (defender_id.clone(), exchange.defender_losses),
            ],
            instability_deltas,
            production_deltas,
            rounds: Some(exchange.rounds.clone()),
        });

        info!(
            attacker = %attacker_id,
            defender = %defender_id,
            from = %from,
            to = %to,
            captured,
            rounds = exchange.rounds.len(),
            "border conflict resolved"
        );

        self.pending.request_refresh();
        self.flush_effects();

        Ok(ConflictOutcome {
            attacker: attacker_id,
            defender: Some(defender_id),
            source: from.clone(),
            target: to.clone(),
            attacker_victory: captured,
            territory_captured: captured,
            unopposed: false,
            rounds: exchange.rounds,
            attacker_losses: exchange.attacker_losses,
            defender_losses: exchange.defender_losses,
            attacker_power,
            defender_power,
            attacker_supply,
            defender_supply,
        })
    }

    /// Annexation of a territory nobody controls: the committed armies
    /// march in, the attacker claims control and the territory's spoils,
    /// and the log shows a movement rather than a battle.
    fn annex_uncontrolled(
        &mut self,
        attacker_id: &NationId,
        mut attacker: NationState,
        from: &TerritoryId,
        to: &TerritoryId,
        attacking_armies: u32,
    ) -> Result<ConflictOutcome> {
        let (committed, production_bonus, instability_modifier, attacker_power, attacker_supply) = {
            let source = self
                .store
                .get(from)
                .ok_or_else(|| FlashpointError::UnknownTerritory(from.clone()))?;
            let target = self
                .store
                .get(to)
                .ok_or_else(|| FlashpointError::UnknownTerritory(to.clone()))?;
            let supply = self.supply.as_deref();
            let profile =
                territory_profile(attacker_id, source, &self.roster, &self.catalog, supply);
            (
                source.composition.proportional(attacking_armies),
                target.production_bonus,
                target.instability_modifier,
                attacker_base(&profile, &composition_bonus(&source.composition)),
                supply_modifier(supply, from, attacker_id),
            )
        };

        if let Some(t) = self.store.get_mut(from) {
            t.remove_forces(&committed);
        }
        if let Some(t) = self.store.get_mut(to) {
            t.add_forces(&committed);
        }
        self.store.transfer_control(to, attacker_id.clone());

        attacker
            .balances
            .adjust(Resource::Production, production_bonus);
        attacker.adjust_instability(-instability_modifier);
        self.commit_nation(attacker);
        self.recompute_reinforcement_pools();

        self.record(EngagementRecord {
            turn: self.turn,
            territory: to.clone(),
            kind: EngagementKind::Movement,
            outcome: EngagementOutcome::Moved,
            casualties: Vec::new(),
            instability_deltas: vec![(attacker_id.clone(), -instability_modifier)],
            production_deltas: vec![(attacker_id.clone(), production_bonus)],
            rounds: None,
        });

        info!(
            attacker = %attacker_id,
            from = %from,
            to = %to,
            armies = attacking_armies,
            "uncontrolled territory annexed"
        );

        self.pending.request_refresh();
        self.flush_effects();

        Ok(ConflictOutcome {
            attacker: attacker_id.clone(),
            defender: None,
            source: from.clone(),
            target: to.clone(),
            attacker_victory: true,
            territory_captured: true,
            unopposed: true,
            rounds: Vec::new(),
            attacker_losses: 0,
            defender_losses: 0,
            attacker_power,
            defender_power: 0.0,
            attacker_supply,
            defender_supply: 1.0,
        })
    }
}

/// Latest turn either party's treaty keeps the truce alive
fn truce_horizon(a: &NationState, b: &NationState, current_turn: Turn) -> Turn {
    let mut horizon = current_turn;
    for (owner, other) in [(a, &b.id), (b, &a.id)] {
        if let Some(treaty) = owner.treaties.get(other) {
            horizon = horizon.max(current_turn + Turn::from(treaty.truce_turns));
            if let Some(expiry) = treaty.truce_expiry_turn {
                horizon = horizon.max(expiry);
            }
        }
    }
    horizon
}
