//! Combat strength computation and the multi-round exchange
//!
//! Strength has three layers: a combat profile (deployed units, or a
//! per-army estimate from garrison composition), a discrete composition
//! bonus for force mixes, and a combined-arms bonus on top. The exchange
//! itself is fully deterministic; no randomness is drawn here.

use serde::{Deserialize, Serialize};

use crate::core::types::NationId;
use crate::forces::catalog::TemplateCatalog;
use crate::forces::unit::UnitRoster;
use crate::log::RoundTrace;
use crate::logistics::{supply_modifier, SupplyProvider};
use crate::map::territory::{ForceComposition, Territory};

/// Hard cap on exchange rounds; anti-stalemate bound
pub const MAX_ROUNDS: u32 = 20;

/// Combined-arms bonus: fraction of (base + armies), capped
pub const COMBINED_ARMS_FACTOR: f32 = 0.12;
pub const COMBINED_ARMS_CAP: f32 = 8.0;

/// Per-round loss-rate tuning
pub const BASE_LOSS_RATE: f32 = 0.2;
pub const MIN_LOSS_RATE: f32 = 0.06;
pub const MAX_LOSS_RATE: f32 = 0.38;
/// Strength ratios below this read as this (keeps rates bounded)
pub const RATIO_FLOOR: f32 = 0.5;

/// Per-army estimate weights, relative to a ground army at 1.0/1.0
pub const NAVAL_ATTACK: f32 = 0.9;
pub const NAVAL_DEFENSE: f32 = 1.1;
pub const AIR_ATTACK: f32 = 1.1;
pub const AIR_DEFENSE: f32 = 0.9;
pub const UNMANNED_ATTACK: f32 = 1.15;
pub const UNMANNED_DEFENSE: f32 = 0.7;
/// Support contributed per army regardless of branch
pub const ARMY_SUPPORT: f32 = 0.2;

/// A side's aggregate combat ratings before bonuses
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatProfile {
    pub attack: f32,
    pub defense: f32,
    pub support: f32,
}

/// Discrete bonuses from the force mix (step functions, not continuous)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionBonus {
    pub attack: f32,
    pub defense: f32,
    pub support: f32,
}

/// Combat profile of `nation` fighting from `territory`.
///
/// Explicitly deployed units dominate: each contributes its template
/// ratings scaled by readiness and an experience multiplier. Without
/// units, the garrison composition gives a per-army estimate. Either way
/// the aggregate is scaled by the supply modifier.
pub fn territory_profile(
    nation: &NationId,
    territory: &Territory,
    roster: &UnitRoster,
    catalog: &TemplateCatalog,
    supply: Option<&dyn SupplyProvider>,
) -> CombatProfile {
    let units = roster.deployed_at(nation, &territory.id);

    let mut profile = CombatProfile::default();
    if !units.is_empty() {
        for unit in units {
            let Some(template) = catalog.get(unit.template.as_str()) else {
                continue;
            };
            let scale = (unit.readiness / 100.0) * (1.0 + unit.experience * 0.05);
            profile.attack += template.attack * scale;
            profile.defense += template.defense * scale;
            profile.support += template.support * scale;
        }
    } else {
        profile = composition_estimate(&territory.composition);
    }

    let supply_mod = supply_modifier(supply, &territory.id, nation);
    profile.attack *= supply_mod;
    profile.defense *= supply_mod;
    profile.support *= supply_mod;
    profile
}

/// Per-army estimate from raw garrison counts
pub fn composition_estimate(comp: &ForceComposition) -> CombatProfile {
    let (g, n, a, u) = (
        comp.ground as f32,
        comp.naval as f32,
        comp.air as f32,
        comp.unmanned as f32,
    );
    CombatProfile {
        attack: g + n * NAVAL_ATTACK + a * AIR_ATTACK + u * UNMANNED_ATTACK,
        defense: g + n * NAVAL_DEFENSE + a * AIR_DEFENSE + u * UNMANNED_DEFENSE,
        support: (g + n + a + u) * ARMY_SUPPORT,
    }
}

/// Threshold bonuses for force mixes: crossing a pair (or trio) of
/// same-branch units is worth a fixed step.
pub fn composition_bonus(comp: &ForceComposition) -> CompositionBonus {
    CompositionBonus {
        attack: (comp.air / 2) as f32 * 1.5 + (comp.unmanned / 2) as f32 * 1.25,
        defense: (comp.naval / 2) as f32 * 1.5,
        support: (comp.air / 3) as f32 * 0.5
            + (comp.naval / 3) as f32 * 0.5
            + (comp.unmanned / 2) as f32 * 0.75,
    }
}

/// Attacker-side base strength from profile and mix
pub fn attacker_base(profile: &CombatProfile, bonus: &CompositionBonus) -> f32 {
    profile.attack + profile.support + bonus.attack + bonus.support
}

/// Defender-side base strength from profile and mix
pub fn defender_base(profile: &CombatProfile, bonus: &CompositionBonus) -> f32 {
    profile.defense + profile.support + bonus.defense + bonus.support
}

pub fn combined_arms_bonus(base: f32, armies: u32) -> f32 {
    ((base + armies as f32) * COMBINED_ARMS_FACTOR).clamp(0.0, COMBINED_ARMS_CAP)
}

/// Result of a full strength exchange
#[derive(Debug, Clone)]
pub struct ExchangeResult {
    pub rounds: Vec<RoundTrace>,
    pub attackers_remaining: u32,
    pub defenders_remaining: u32,
    pub attacker_losses: u32,
    pub defender_losses: u32,
}

impl ExchangeResult {
    /// The attacker wins exactly when the defenders are wiped out
    pub fn attacker_victory(&self) -> bool {
        self.defenders_remaining == 0
    }
}

/// Run the deterministic multi-round exchange.
///
/// Combined-arms bonuses are fixed from the starting counts; per round
/// only the remaining armies move each side's strength. Loss rates are
/// ratio-driven and clamped, and every round costs each side at least one
/// army, so the loop always terminates well inside `MAX_ROUNDS`.
pub fn run_exchange(
    attacker_base: f32,
    defender_base: f32,
    attacking_armies: u32,
    defending_armies: u32,
) -> ExchangeResult {
    let attacker_combined = combined_arms_bonus(attacker_base, attacking_armies);
    let defender_combined = combined_arms_bonus(defender_base, defending_armies);

    let mut remaining_attackers = attacking_armies;
    let mut remaining_defenders = defending_armies;
    let mut rounds = Vec::new();

    for round in 1..=MAX_ROUNDS {
        if remaining_attackers == 0 || remaining_defenders == 0 {
            break;
        }

        let attacker_strength = attacker_base + attacker_combined + remaining_attackers as f32;
        let defender_strength = defender_base + defender_combined + remaining_defenders as f32;
        let ratio = attacker_strength / defender_strength.max(0.01);

        let attacker_rate =
            (BASE_LOSS_RATE / ratio.max(RATIO_FLOOR)).clamp(MIN_LOSS_RATE, MAX_LOSS_RATE);
        let defender_rate =
            (BASE_LOSS_RATE * ratio.max(RATIO_FLOOR)).clamp(MIN_LOSS_RATE, MAX_LOSS_RATE);

        let attacker_losses = round_losses(remaining_attackers, attacker_rate);
        let defender_losses = round_losses(remaining_defenders, defender_rate);

        remaining_attackers -= attacker_losses;
        remaining_defenders -= defender_losses;

        rounds.push(RoundTrace {
            round,
            attacker_strength,
            defender_strength,
            attacker_losses,
            defender_losses,
            attackers_remaining: remaining_attackers,
            defenders_remaining: remaining_defenders,
        });
    }

    ExchangeResult {
        rounds,
        attackers_remaining: remaining_attackers,
        defenders_remaining: remaining_defenders,
        attacker_losses: attacking_armies - remaining_attackers,
        defender_losses: defending_armies - remaining_defenders,
    }
}

/// At least one army falls per round per side, never more than remain
fn round_losses(remaining: u32, rate: f32) -> u32 {
    let raw = (remaining as f32 * rate).round() as u32;
    raw.max(1).min(remaining)
}
