//! Conflict engine integration tests
//!
//! End-to-end campaigns through the public API only: training, movement,
//! border attacks, proxy engagements, and the diplomatic gating and
//! side-effect fan-out around them.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use flashpoint::core::error::FlashpointError;
use flashpoint::core::types::{NationId, Resource, TemplateId, TerritoryId};
use flashpoint::effects::EffectSink;
use flashpoint::engine::{ConquestEngine, EngineConfig};
use flashpoint::logistics::{SupplyProvider, SupplyState, SupplyStatus};
use flashpoint::nations::profile::Treaty;
use flashpoint::nations::registry::{InMemoryRegistry, NationRegistry};

fn engine() -> ConquestEngine {
    ConquestEngine::with_default_world(
        Box::new(InMemoryRegistry::with_default_nations()),
        EngineConfig::default(),
    )
}

fn usa() -> NationId {
    NationId::new("usa")
}

fn russia() -> NationId {
    NationId::new("russia")
}

/// Sink that records every delivered effect for later inspection
#[derive(Clone, Default)]
struct SharedRecorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl SharedRecorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl EffectSink for SharedRecorder {
    fn production_consumed(&mut self, nation: &NationId, amount: f32) {
        self.events
            .lock()
            .unwrap()
            .push(format!("production:{}:{}", nation, amount));
    }

    fn display_refresh(&mut self) {
        self.events.lock().unwrap().push("refresh".into());
    }

    fn tension_shift(&mut self, delta: i32) {
        self.events.lock().unwrap().push(format!("tension:{}", delta));
    }

    fn relationship_delta(&mut self, a: &NationId, b: &NationId, delta: f32, reason: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("relationship:{}:{}:{}:{}", a, b, delta, reason));
    }
}

/// Fixed supply table standing in for the external logistics subsystem
struct TableSupply {
    states: AHashMap<TerritoryId, SupplyState>,
}

impl TableSupply {
    fn new(entries: Vec<(&str, &str, SupplyStatus, f32, f32)>) -> Self {
        let mut states = AHashMap::new();
        for (territory, nation, status, current, demand) in entries {
            states.insert(
                TerritoryId::new(territory),
                SupplyState {
                    controlling_nation: NationId::new(nation),
                    status,
                    current_supply: current,
                    supply_demand: demand,
                },
            );
        }
        Self { states }
    }
}

impl SupplyProvider for TableSupply {
    fn supply_state(&self, territory: &TerritoryId) -> Option<SupplyState> {
        self.states.get(territory).cloned()
    }
}

/// Ten armored-corps armies against three defenders on adequately
/// supplied ground: the territory falls and its garrison becomes the
/// attacker's surviving ground troops.
#[test]
fn test_armored_assault_captures_adjacent_territory() {
    let supply = TableSupply::new(vec![
        ("alaska", "usa", SupplyStatus::Adequate, 100.0, 100.0),
        ("east_siberia", "russia", SupplyStatus::Adequate, 100.0, 100.0),
    ]);
    let mut e = ConquestEngine::with_default_world(
        Box::new(InMemoryRegistry::with_default_nations()),
        EngineConfig::default(),
    )
    .with_supply_provider(Box::new(supply));

    let alaska = TerritoryId::new("alaska");
    let east_siberia = TerritoryId::new("east_siberia");

    // Build the garrison up through reinforcement and training
    e.place_reinforcements(&usa(), &alaska, 6).expect("places");
    e.begin_turn(2);
    e.place_reinforcements(&usa(), &alaska, 2).expect("places");
    e.train_unit(&usa(), &TemplateId::new("armored_corps"), Some(&alaska))
        .expect("trains");
    assert_eq!(e.territory(&alaska).unwrap().armies, 14);

    let outcome = e
        .resolve_border_conflict(&alaska, &east_siberia, 10)
        .expect("resolves");

    assert!(outcome.attacker_victory);
    assert!(outcome.territory_captured);
    assert_eq!(outcome.attacker_supply, 1.0);
    assert_eq!(outcome.defender_supply, 1.0);

    let target = e.territory(&east_siberia).unwrap();
    assert_eq!(target.controller, Some(usa()));
    assert_eq!(target.armies, 10 - outcome.attacker_losses);
    // All-ground assault leaves an all-ground garrison
    assert_eq!(target.composition.ground, target.armies);
    assert_eq!(target.composition.naval + target.composition.air, 0);
    assert_eq!(target.composition.total(), target.armies);

    let source = e.territory(&alaska).unwrap();
    assert_eq!(source.armies, 4);
    assert_eq!(source.composition.total(), source.armies);
}

#[test]
fn test_attack_between_non_neighbors_changes_nothing() {
    let mut e = engine();
    let alaska = TerritoryId::new("alaska");
    let west_siberia = TerritoryId::new("west_siberia");

    let before_from = e.territory(&alaska).unwrap().armies;
    let before_to = e.territory(&west_siberia).unwrap().armies;

    let err = e
        .resolve_border_conflict(&alaska, &west_siberia, 2)
        .unwrap_err();

    assert!(matches!(err, FlashpointError::NotAdjacent { .. }));
    assert_eq!(e.territory(&alaska).unwrap().armies, before_from);
    assert_eq!(e.territory(&west_siberia).unwrap().armies, before_to);
    assert!(e.engagement_log().is_empty());
}

/// Training a carrier battlegroup without the research unlock fails
/// before any balance is touched.
#[test]
fn test_research_gate_blocks_training_without_debit() {
    let mut e = engine();
    let before = e.nation_snapshot(&usa()).unwrap();

    let err = e
        .train_unit(&usa(), &TemplateId::new("carrier_battlegroup"), None)
        .unwrap_err();

    match err {
        FlashpointError::ResearchLocked { template, tech } => {
            assert_eq!(template.as_str(), "carrier_battlegroup");
            assert_eq!(tech, "conventional_carrier_battlegroups");
        }
        other => panic!("unexpected error {:?}", other),
    }

    let after = e.nation_snapshot(&usa()).unwrap();
    for resource in Resource::ALL {
        assert_eq!(
            after.balances.get(resource),
            before.balances.get(resource),
            "{} was debited",
            resource
        );
    }
    assert!(e.units_owned_by(&usa()).is_empty());
}

/// A truce vetoes the attack before any diplomatic fallout is queued:
/// the sink stays silent and the map stays put.
#[test]
fn test_truce_blocks_attack_without_diplomatic_fallout() {
    let mut registry = InMemoryRegistry::with_default_nations();
    let mut nation = registry.get(&usa()).unwrap();
    nation.treaties.insert(russia(), Treaty::truce(3));
    registry.update(nation);

    let recorder = SharedRecorder::default();
    let mut e = ConquestEngine::with_default_world(Box::new(registry), EngineConfig::default())
        .with_effect_sink(Box::new(recorder.clone()));

    let alaska = TerritoryId::new("alaska");
    let east_siberia = TerritoryId::new("east_siberia");
    let before = e.territory(&east_siberia).unwrap().armies;

    let err = e
        .resolve_border_conflict(&alaska, &east_siberia, 2)
        .unwrap_err();

    assert!(matches!(err, FlashpointError::TruceActive { .. }));
    assert_eq!(e.territory(&east_siberia).unwrap().armies, before);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_allied_nations_cannot_attack_each_other() {
    let mut registry = InMemoryRegistry::with_default_nations();
    let mut nation = registry.get(&russia()).unwrap();
    nation.alliances.push(usa());
    registry.update(nation);

    let mut e = ConquestEngine::with_default_world(Box::new(registry), EngineConfig::default());

    let err = e
        .resolve_border_conflict(
            &TerritoryId::new("alaska"),
            &TerritoryId::new("east_siberia"),
            2,
        )
        .unwrap_err();

    match err {
        FlashpointError::AlliedNations(a, b) => {
            assert_eq!(a, usa());
            assert_eq!(b, russia());
        }
        other => panic!("unexpected error {:?}", other),
    }
}

/// A contested attack fans out its full diplomatic fallout in delivery
/// order: refresh, tension, then relationship penalties including the
/// defender's no-show ally.
#[test]
fn test_attack_fans_out_tension_and_relationship_effects() {
    let china = NationId::new("china");
    let mut registry = InMemoryRegistry::with_default_nations();
    let mut nation = registry.get(&russia()).unwrap();
    nation.alliances.push(china.clone());
    registry.update(nation);

    let recorder = SharedRecorder::default();
    let mut e = ConquestEngine::with_default_world(Box::new(registry), EngineConfig::default())
        .with_effect_sink(Box::new(recorder.clone()));

    e.resolve_border_conflict(
        &TerritoryId::new("alaska"),
        &TerritoryId::new("east_siberia"),
        2,
    )
    .expect("resolves");

    // east_siberia strategic value 5 -> ceil(5/3) capped at 2
    let events = recorder.events();
    assert_eq!(
        events,
        vec![
            "refresh".to_string(),
            "tension:-2".to_string(),
            "relationship:usa:russia:-25:border aggression".to_string(),
            "relationship:russia:china:-15:failed to honor alliance".to_string(),
        ]
    );
}

/// Same battle plan, two supply pictures: a starved defender loses the
/// territory that a provisioned defender holds comfortably.
#[test]
fn test_supply_starvation_flips_the_outcome() {
    let run = |defender_supply: Option<(SupplyStatus, f32)>| {
        let mut e = match defender_supply {
            Some((status, current)) => {
                let supply = TableSupply::new(vec![
                    ("alaska", "usa", SupplyStatus::Adequate, 100.0, 100.0),
                    ("east_siberia", "russia", status, current, 100.0),
                ]);
                ConquestEngine::with_default_world(
                    Box::new(InMemoryRegistry::with_default_nations()),
                    EngineConfig::default(),
                )
                .with_supply_provider(Box::new(supply))
            }
            None => engine(),
        };

        let alaska = TerritoryId::new("alaska");
        let east_siberia = TerritoryId::new("east_siberia");
        e.place_reinforcements(&usa(), &alaska, 5).expect("places");
        e.place_reinforcements(&russia(), &east_siberia, 6)
            .expect("places");
        e.resolve_border_conflict(&alaska, &east_siberia, 7)
            .expect("resolves")
    };

    // Well-supplied nine-army garrison repels seven attackers
    let held = run(None);
    assert!(!held.territory_captured);

    // The same garrison on critical supply at half fill collapses
    let starved = run(Some((SupplyStatus::Critical, 50.0)));
    assert!(starved.territory_captured);
    assert!(starved.defender_supply < 0.5);
}

/// Identical seeds and call sequences replay to identical round traces,
/// outcomes, and map state.
#[test]
fn test_seeded_campaigns_replay_identically() {
    let script = |seed: u64| {
        let mut e = ConquestEngine::with_default_world(
            Box::new(InMemoryRegistry::with_default_nations()),
            EngineConfig {
                seed,
                starting_turn: 1,
            },
        );
        let alaska = TerritoryId::new("alaska");
        let east_siberia = TerritoryId::new("east_siberia");
        let levant = TerritoryId::new("levant");

        e.place_reinforcements(&usa(), &alaska, 6).expect("places");
        e.begin_turn(2);
        e.train_unit(&usa(), &TemplateId::new("armored_corps"), Some(&alaska))
            .expect("trains");
        let border = e
            .resolve_border_conflict(&alaska, &east_siberia, 8)
            .expect("resolves");
        let proxy = e
            .resolve_proxy_engagement(&levant, &usa(), &russia())
            .expect("resolves");
        let armies: Vec<u32> = {
            let mut territories: Vec<_> = e.territories().collect();
            territories.sort_by(|a, b| a.id.cmp(&b.id));
            territories.iter().map(|t| t.armies).collect()
        };
        (border, proxy, armies)
    };

    let (border_a, proxy_a, armies_a) = script(777);
    let (border_b, proxy_b, armies_b) = script(777);

    assert_eq!(border_a.rounds, border_b.rounds);
    assert_eq!(border_a.attacker_victory, border_b.attacker_victory);
    assert_eq!(border_a.attacker_losses, border_b.attacker_losses);
    assert_eq!(border_a.defender_losses, border_b.defender_losses);
    assert_eq!(proxy_a.success, proxy_b.success);
    assert_eq!(proxy_a.odds, proxy_b.odds);
    assert_eq!(armies_a, armies_b);
}

/// Composition counts stay in lockstep with army totals across a whole
/// campaign of mixed operations.
#[test]
fn test_composition_totals_survive_a_campaign() {
    let mut e = engine();
    let usa = usa();
    let alaska = TerritoryId::new("alaska");
    let shield = TerritoryId::new("canadian_shield");
    let greenland = TerritoryId::new("greenland");

    e.place_reinforcements(&usa, &alaska, 4).expect("places");
    e.train_unit(&usa, &TemplateId::new("strike_wing"), Some(&alaska))
        .expect("trains");
    e.move_armies(&alaska, &shield, 3).expect("moves");
    e.begin_turn(2);
    e.place_reinforcements(&usa, &shield, 6).expect("places");
    e.resolve_border_conflict(&shield, &greenland, 5)
        .expect("annexes");
    e.begin_turn(3);
    e.resolve_border_conflict(
        &TerritoryId::new("alaska"),
        &TerritoryId::new("east_siberia"),
        3,
    )
    .expect("resolves");

    for territory in e.territories() {
        assert_eq!(
            territory.armies,
            territory.composition.total(),
            "composition drifted on {}",
            territory.id
        );
    }
}

/// Movement conserves every army it touches
#[test]
fn test_movement_conserves_across_multiple_hops() {
    let mut e = engine();
    let usa = usa();
    let alaska = TerritoryId::new("alaska");
    let shield = TerritoryId::new("canadian_shield");
    let continental = TerritoryId::new("continental_us");

    e.place_reinforcements(&usa, &alaska, 6).expect("places");
    let total = |e: &ConquestEngine| -> u32 {
        e.territories_owned_by(&usa).iter().map(|t| t.armies).sum()
    };
    let before = total(&e);

    e.move_armies(&alaska, &shield, 4).expect("moves");
    e.move_armies(&shield, &continental, 5).expect("moves");
    e.move_armies(&continental, &shield, 2).expect("moves");

    assert_eq!(total(&e), before);
}
