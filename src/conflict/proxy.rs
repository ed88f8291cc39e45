//! Proxy engagement resolution
//!
//! Covert sponsorship fights don't move armies or flip controllers.
//! A single seeded RNG draw against a readiness- and supply-weighted
//! odds value decides the outcome; the fallout lands entirely on the
//! two nations' instability, production, and readiness.

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::core::error::{FlashpointError, Result};
use crate::core::types::{NationId, Resource, TerritoryId};
use crate::engine::ConquestEngine;
use crate::log::{EngagementKind, EngagementOutcome, EngagementRecord};
use crate::logistics::supply_modifier;

/// Starting point of the sponsor's success odds
pub const PROXY_BASE_ODDS: f32 = 0.45;

/// Readiness-gap divisor feeding the odds
pub const READINESS_ODDS_SCALE: f32 = 200.0;

/// Conflict-risk spike on the contested territory
pub const PROXY_CONFLICT_RISK: f32 = 0.05;

/// Sponsor readiness cost when the proxy wins
pub const SPONSOR_SUCCESS_FATIGUE: f32 = 6.0;

/// Opposing readiness cost when the proxy wins
pub const OPPOSING_SUCCESS_FATIGUE: f32 = 9.0;

/// Sponsor readiness cost when the proxy collapses
pub const SPONSOR_FAILURE_FATIGUE: f32 = 9.0;

/// Opposing readiness cost when the proxy collapses
pub const OPPOSING_FAILURE_FATIGUE: f32 = 5.0;

/// Flavor casualty figures logged as (sponsor, opposing)
pub const SUCCESS_CASUALTIES: (u32, u32) = (5, 12);
pub const FAILURE_CASUALTIES: (u32, u32) = (12, 6);

/// Result of one proxy engagement
#[derive(Debug, Clone, Serialize)]
pub struct ProxyOutcome {
    pub territory: TerritoryId,
    pub sponsor: NationId,
    pub opposing: NationId,
    pub success: bool,
    /// Success probability the draw was checked against
    pub odds: f32,
}

impl ConquestEngine {
    /// Resolve a sponsored flashpoint in `territory` between a sponsor
    /// and an opposing nation. One RNG draw per call keeps a seeded
    /// engine fully reproducible.
    pub fn resolve_proxy_engagement(
        &mut self,
        territory_id: &TerritoryId,
        sponsor_id: &NationId,
        opposing_id: &NationId,
    ) -> Result<ProxyOutcome> {
        let (production_bonus, instability_modifier) = {
            let territory = self
                .store
                .get(territory_id)
                .ok_or_else(|| FlashpointError::UnknownTerritory(territory_id.clone()))?;
            (territory.production_bonus, territory.instability_modifier)
        };
        let mut sponsor = self.nation(sponsor_id)?;
        let mut opposing = self.nation(opposing_id)?;

        let supply = self.supply.as_deref();
        let sponsor_supply = supply_modifier(supply, territory_id, sponsor_id);
        let opposing_supply = supply_modifier(supply, territory_id, opposing_id);

        let readiness_edge =
            (sponsor.conventional.readiness - opposing.conventional.readiness) / READINESS_ODDS_SCALE;
        let base_odds = (PROXY_BASE_ODDS + readiness_edge).clamp(0.2, 0.8);
        let supply_edge = (sponsor_supply / opposing_supply).clamp(0.5, 1.5);
        let odds = (base_odds * supply_edge).clamp(0.1, 0.9);

        let roll: f32 = self.rng.gen();
        let success = roll < odds;

        let mut production_deltas = Vec::new();
        let mut instability_deltas = Vec::new();
        let casualties;

        if success {
            let spoils = production_bonus / 2.0;
            let relief = instability_modifier / 2.0;
            sponsor.balances.adjust(Resource::Production, spoils);
            sponsor.adjust_instability(-relief);
            sponsor.conventional.debit_readiness(SPONSOR_SUCCESS_FATIGUE);
            opposing.balances.adjust(Resource::Production, -spoils);
            opposing.adjust_instability(relief);
            opposing.conventional.debit_readiness(OPPOSING_SUCCESS_FATIGUE);

            production_deltas.push((sponsor_id.clone(), spoils));
            production_deltas.push((opposing_id.clone(), -spoils));
            instability_deltas.push((sponsor_id.clone(), -relief));
            instability_deltas.push((opposing_id.clone(), relief));
            casualties = SUCCESS_CASUALTIES;
        } else {
            let blowback = instability_modifier * 0.25;
            sponsor.adjust_instability(blowback);
            sponsor.conventional.debit_readiness(SPONSOR_FAILURE_FATIGUE);
            opposing.adjust_instability(-blowback);
            opposing.conventional.debit_readiness(OPPOSING_FAILURE_FATIGUE);

            instability_deltas.push((sponsor_id.clone(), blowback));
            instability_deltas.push((opposing_id.clone(), -blowback));
            casualties = FAILURE_CASUALTIES;
        }

        if let Some(t) = self.store.get_mut(territory_id) {
            t.conflict_risk = (t.conflict_risk + PROXY_CONFLICT_RISK).clamp(0.0, 1.0);
        }
        self.commit_nation(sponsor);
        self.commit_nation(opposing);

        self.record(EngagementRecord {
            turn: self.turn,
            territory: territory_id.clone(),
            kind: EngagementKind::Proxy,
            outcome: if success {
                EngagementOutcome::ProxySuccess
            } else {
                EngagementOutcome::ProxyFailure
            },
            casualties: vec![
                (sponsor_id.clone(), casualties.0),
                (opposing_id.clone(), casualties.1),
            ],
            instability_deltas,
            production_deltas,
            rounds: None,
        });

        info!(
            territory = %territory_id,
            sponsor = %sponsor_id,
            opposing = %opposing_id,
            success,
            odds,
            "proxy engagement resolved"
        );

        self.pending.request_refresh();
        self.flush_effects();

        Ok(ProxyOutcome {
            territory: territory_id.clone(),
            sponsor: sponsor_id.clone(),
            opposing: opposing_id.clone(),
            success,
            odds,
        })
    }
}
