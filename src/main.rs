//! Flashpoint - Entry Point
//!
//! Interactive console for the territorial-conquest engine. Builds the
//! default campaign world, then reads commands from stdin: advancing
//! turns, training and moving forces, and resolving border or proxy
//! conflicts, with the engagement log available for review.

use flashpoint::core::error::Result;
use flashpoint::core::types::{NationId, TemplateId, TerritoryId, UnitId};
use flashpoint::effects::TracingSink;
use flashpoint::engine::{ConquestEngine, EngineConfig};
use flashpoint::nations::registry::InMemoryRegistry;

use std::io::{self, Write};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("flashpoint=info")
        .init();

    tracing::info!("Flashpoint starting...");

    let registry = Box::new(InMemoryRegistry::with_default_nations());
    let mut engine = ConquestEngine::with_default_world(registry, EngineConfig::default())
        .with_effect_sink(Box::new(TracingSink));

    println!("\n=== FLASHPOINT ===");
    println!("Territorial conquest and combat resolution console");
    println!();
    println!("Commands:");
    println!("  turn / t                          - Advance to the next turn");
    println!("  map / m                           - Show the territory map");
    println!("  nations / n                       - Show nation summaries");
    println!("  templates                         - List unit templates");
    println!("  units <nation>                    - List a nation's units");
    println!("  train <nation> <template> [terr]  - Train a unit from a template");
    println!("  deploy <unit#> <territory>        - Deploy or relocate a unit");
    println!("  move <from> <to> <count>          - Move armies between territories");
    println!("  attack <from> <to> <count>        - Resolve a border conflict");
    println!("  proxy <terr> <sponsor> <opposing> - Resolve a proxy engagement");
    println!("  reinforce <nation> <terr> <count> - Place reinforcement armies");
    println!("  log                               - Show recent engagements");
    println!("  quit / q                          - Exit");
    println!();

    loop {
        display_status(&engine);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        if input == "turn" || input == "t" {
            let next = engine.current_turn() + 1;
            engine.begin_turn(next);
            println!("Turn {} begins.", next);
            continue;
        }

        if input == "map" || input == "m" {
            display_map(&engine);
            continue;
        }

        if input == "nations" || input == "n" {
            display_nations(&engine);
            continue;
        }

        if input == "templates" {
            display_templates(&engine);
            continue;
        }

        if input == "log" {
            display_log(&engine);
            continue;
        }

        let tokens: Vec<&str> = input.split_whitespace().collect();
        match tokens.as_slice() {
            ["units", nation] => {
                let nation = NationId::new(*nation);
                let units = engine.units_owned_by(&nation);
                if units.is_empty() {
                    println!("No units for {}.", nation);
                }
                for unit in units {
                    let location = unit
                        .location
                        .as_ref()
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_else(|| "unassigned".to_string());
                    println!(
                        "  {} - {} at {} (readiness {:.0}, experience {:.0})",
                        unit.id, unit.label, location, unit.readiness, unit.experience
                    );
                }
            }
            ["train", nation, template, rest @ ..] => {
                let nation = NationId::new(*nation);
                let template = TemplateId::new(*template);
                let territory = rest.first().map(|t| TerritoryId::new(*t));
                match engine.train_unit(&nation, &template, territory.as_ref()) {
                    Ok(unit_id) => {
                        let unit = engine.unit(unit_id);
                        let label = unit.map(|u| u.label.as_str()).unwrap_or("unit");
                        println!("Trained {} ({}).", label, unit_id);
                    }
                    Err(e) => println!("Command failed: {}", e),
                }
            }
            ["deploy", unit, territory] => match unit.parse::<u64>() {
                Ok(raw) => {
                    let territory = TerritoryId::new(*territory);
                    match engine.deploy_unit(UnitId(raw), &territory) {
                        Ok(()) => println!("Deployed unit-{} to {}.", raw, territory),
                        Err(e) => println!("Command failed: {}", e),
                    }
                }
                Err(_) => println!("Usage: deploy <unit#> <territory>"),
            },
            ["move", from, to, count] => match count.parse::<u32>() {
                Ok(count) => {
                    let from = TerritoryId::new(*from);
                    let to = TerritoryId::new(*to);
                    match engine.move_armies(&from, &to, count) {
                        Ok(()) => println!("Moved {} armies {} -> {}.", count, from, to),
                        Err(e) => println!("Command failed: {}", e),
                    }
                }
                Err(_) => println!("Usage: move <from> <to> <count>"),
            },
            ["attack", from, to, count] => match count.parse::<u32>() {
                Ok(count) => {
                    let from = TerritoryId::new(*from);
                    let to = TerritoryId::new(*to);
                    match engine.resolve_border_conflict(&from, &to, count) {
                        Ok(outcome) => {
                            if outcome.unopposed {
                                println!("{} annexed unopposed.", outcome.target);
                            } else if outcome.territory_captured {
                                println!(
                                    "{} captured in {} rounds (losses {} / {}).",
                                    outcome.target,
                                    outcome.rounds.len(),
                                    outcome.attacker_losses,
                                    outcome.defender_losses
                                );
                            } else {
                                println!(
                                    "Attack repelled after {} rounds (losses {} / {}).",
                                    outcome.rounds.len(),
                                    outcome.attacker_losses,
                                    outcome.defender_losses
                                );
                            }
                        }
                        Err(e) => println!("Command failed: {}", e),
                    }
                }
                Err(_) => println!("Usage: attack <from> <to> <count>"),
            },
            ["proxy", territory, sponsor, opposing] => {
                let territory = TerritoryId::new(*territory);
                let sponsor = NationId::new(*sponsor);
                let opposing = NationId::new(*opposing);
                match engine.resolve_proxy_engagement(&territory, &sponsor, &opposing) {
                    Ok(outcome) => {
                        let verdict = if outcome.success { "succeeds" } else { "fails" };
                        println!(
                            "Proxy engagement in {} {} (odds were {:.0}%).",
                            outcome.territory,
                            verdict,
                            outcome.odds * 100.0
                        );
                    }
                    Err(e) => println!("Command failed: {}", e),
                }
            }
            ["reinforce", nation, territory, count] => match count.parse::<u32>() {
                Ok(count) => {
                    let nation = NationId::new(*nation);
                    let territory = TerritoryId::new(*territory);
                    match engine.place_reinforcements(&nation, &territory, count) {
                        Ok(()) => println!(
                            "Placed {} armies in {} ({} left in pool).",
                            count,
                            territory,
                            engine.reinforcement_budget(&nation)
                        ),
                        Err(e) => println!("Command failed: {}", e),
                    }
                }
                Err(_) => println!("Usage: reinforce <nation> <territory> <count>"),
            },
            _ => println!("Unknown command. Type a listed command or 'quit'."),
        }
    }

    println!(
        "\nGoodbye! Final state: turn {}, {} engagements logged.",
        engine.current_turn(),
        engine.engagement_log().len()
    );
    Ok(())
}

/// Brief one-line-per-nation summary between prompts
fn display_status(engine: &ConquestEngine) {
    println!();
    println!("--- Turn {} ---", engine.current_turn());
    for nation in nation_ids(engine) {
        let territories = engine.territories_owned_by(&nation);
        let armies: u32 = territories.iter().map(|t| t.armies).sum();
        println!(
            "  {} - {} territories, {} armies, {} reinforcements available",
            nation,
            territories.len(),
            armies,
            engine.reinforcement_budget(&nation)
        );
    }
    println!();
}

fn display_map(engine: &ConquestEngine) {
    println!();
    println!("=== Territories (Turn {}) ===", engine.current_turn());
    let mut territories: Vec<_> = engine.territories().collect();
    territories.sort_by(|a, b| a.id.cmp(&b.id));
    for t in territories {
        let controller = t
            .controller
            .as_ref()
            .map(|n| n.as_str().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<16} {:<8} {:>3} armies (g{}/n{}/a{}/u{})  risk {:.2}  {}",
            t.id.as_str(),
            controller,
            t.armies,
            t.composition.ground,
            t.composition.naval,
            t.composition.air,
            t.composition.unmanned,
            t.conflict_risk,
            if t.contested_by.is_empty() {
                String::new()
            } else {
                format!("contested by {:?}", t.contested_by)
            }
        );
    }
    println!();
}

fn display_nations(engine: &ConquestEngine) {
    println!();
    for id in nation_ids(engine) {
        let units = engine.units_owned_by(&id);
        println!("{}", id);
        println!("  {} deployed units", units.len());
        for territory in engine.territories_owned_by(&id) {
            println!(
                "  controls {} ({} armies)",
                territory.id.as_str(),
                territory.armies
            );
        }
    }
    println!();
}

fn display_templates(engine: &ConquestEngine) {
    println!();
    for template in engine.templates() {
        let research = template
            .research_requirement
            .as_deref()
            .map(|r| format!(" [requires {}]", r))
            .unwrap_or_default();
        println!(
            "  {:<26} {:<8} atk {:>4.1} def {:>4.1} sup {:>4.1}  {} armies{}",
            template.id.as_str(),
            template.force_type.to_string(),
            template.attack,
            template.defense,
            template.support,
            template.armies_value,
            research
        );
    }
    println!();
}

fn display_log(engine: &ConquestEngine) {
    println!();
    if engine.engagement_log().is_empty() {
        println!("No engagements logged yet.");
    }
    for record in engine.engagement_log().iter() {
        let casualties: Vec<String> = record
            .casualties
            .iter()
            .map(|(nation, lost)| format!("{} -{}", nation, lost))
            .collect();
        println!(
            "  turn {:>3}  {:?} at {} -> {:?}  [{}]",
            record.turn,
            record.kind,
            record.territory,
            record.outcome,
            casualties.join(", ")
        );
    }
    println!();
}

/// Controllers present on the map, sorted for stable output
fn nation_ids(engine: &ConquestEngine) -> Vec<NationId> {
    let mut ids: Vec<NationId> = engine
        .territories()
        .filter_map(|t| t.controller.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
