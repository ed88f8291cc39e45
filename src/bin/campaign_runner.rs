//! Headless Campaign Runner
//!
//! Drives a scripted multi-nation campaign on the default world and
//! outputs JSON statistics for balance tuning.

use clap::Parser;
use serde::Serialize;

use flashpoint::core::types::{NationId, TemplateId, TerritoryId};
use flashpoint::engine::{ConquestEngine, EngineConfig};
use flashpoint::log::EngagementKind;
use flashpoint::nations::registry::InMemoryRegistry;

/// Headless Campaign Runner - scripted conquest for balance tuning
#[derive(Parser, Debug)]
#[command(name = "campaign_runner")]
#[command(about = "Run a scripted campaign and output statistics")]
struct Args {
    /// Number of turns to simulate
    #[arg(long, default_value_t = 20)]
    turns: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Resolve a proxy engagement every n turns (0 disables)
    #[arg(long, default_value_t = 4)]
    proxy_cadence: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable per-turn event logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct NationStanding {
    nation: String,
    territories: usize,
    armies: u32,
    deployed_units: usize,
}

/// JSON output structure
#[derive(Serialize)]
struct CampaignResult {
    turns: u64,
    seed: u64,
    attacks: u32,
    captures: u32,
    repelled: u32,
    annexations: u32,
    proxy_engagements: u32,
    units_trained: u32,
    reinforcements_placed: u32,
    standings: Vec<NationStanding>,
}

fn main() {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let registry = Box::new(InMemoryRegistry::with_default_nations());
    let mut engine = ConquestEngine::with_default_world(
        registry,
        EngineConfig {
            seed,
            starting_turn: 1,
        },
    );

    let mut attacks = 0u32;
    let mut captures = 0u32;
    let mut repelled = 0u32;
    let mut annexations = 0u32;
    let mut proxy_engagements = 0u32;
    let mut units_trained = 0u32;
    let mut reinforcements_placed = 0u32;

    for turn in 2..=(args.turns + 1) {
        engine.begin_turn(turn);
        let nations = controllers(&engine);

        for nation in &nations {
            // Shore up the most exposed territory first
            let budget = engine.reinforcement_budget(nation);
            if budget > 0 {
                if let Some(target) = most_at_risk(&engine, nation) {
                    if engine.place_reinforcements(nation, &target, budget).is_ok() {
                        reinforcements_placed += budget;
                        if args.verbose {
                            eprintln!("[{}] {} reinforces {} (+{})", turn, nation, target, budget);
                        }
                    }
                }
            }

            // Train whatever the treasury can afford this turn
            let buildable: Vec<TemplateId> = engine
                .templates()
                .iter()
                .filter(|t| t.research_requirement.is_none())
                .map(|t| t.id.clone())
                .collect();
            for template in buildable {
                if engine.train_unit(nation, &template, None).is_ok() {
                    units_trained += 1;
                    if args.verbose {
                        eprintln!("[{}] {} trains {}", turn, nation, template);
                    }
                    break;
                }
            }

            // One opportunistic attack per nation per turn
            if let Some((from, to, count)) = pick_attack(&engine, nation) {
                match engine.resolve_border_conflict(&from, &to, count) {
                    Ok(outcome) => {
                        attacks += 1;
                        if outcome.unopposed {
                            annexations += 1;
                        } else if outcome.territory_captured {
                            captures += 1;
                        } else {
                            repelled += 1;
                        }
                        if args.verbose {
                            eprintln!(
                                "[{}] {} attacks {} -> {} ({})",
                                turn,
                                nation,
                                from,
                                to,
                                if outcome.territory_captured {
                                    "captured"
                                } else {
                                    "repelled"
                                }
                            );
                        }
                    }
                    Err(e) => {
                        if args.verbose {
                            eprintln!("[{}] {} attack failed: {}", turn, nation, e);
                        }
                    }
                }
            }
        }

        // Periodic flashpoint between the two leading powers
        if args.proxy_cadence > 0 && turn % args.proxy_cadence == 0 && nations.len() >= 2 {
            if let Some(flashpoint) = hottest_neutral(&engine) {
                if engine
                    .resolve_proxy_engagement(&flashpoint, &nations[0], &nations[1])
                    .is_ok()
                {
                    proxy_engagements += 1;
                }
            }
        }
    }

    let standings = controllers(&engine)
        .into_iter()
        .map(|nation| {
            let territories = engine.territories_owned_by(&nation);
            NationStanding {
                armies: territories.iter().map(|t| t.armies).sum(),
                territories: territories.len(),
                deployed_units: engine.units_owned_by(&nation).len(),
                nation: nation.to_string(),
            }
        })
        .collect();

    let result = CampaignResult {
        turns: args.turns,
        seed,
        attacks,
        captures,
        repelled,
        annexations,
        proxy_engagements,
        units_trained,
        reinforcements_placed,
        standings,
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
        "text" => {
            println!("Campaign Result");
            println!("===============");
            println!("Turns: {}", result.turns);
            println!(
                "Attacks: {} ({} captures, {} repelled, {} annexations)",
                result.attacks, result.captures, result.repelled, result.annexations
            );
            println!("Proxy engagements: {}", result.proxy_engagements);
            println!("Units trained: {}", result.units_trained);
            println!("Reinforcements placed: {}", result.reinforcements_placed);
            println!();
            for standing in &result.standings {
                println!(
                    "  {:<10} {} territories, {} armies, {} units",
                    standing.nation, standing.territories, standing.armies, standing.deployed_units
                );
            }
            println!();
            println!("Seed: {}", result.seed);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
    }

    // Tail of the engagement log for quick inspection
    if args.verbose {
        for record in engine.engagement_log().iter() {
            eprintln!(
                "  [turn {}] {:?} at {} -> {:?}",
                record.turn, record.kind, record.territory, record.outcome
            );
        }
        let movements = engine
            .engagement_log()
            .iter()
            .filter(|r| r.kind == EngagementKind::Movement)
            .count();
        eprintln!("  ({} movement entries retained)", movements);
    }
}

/// Map controllers in stable order
fn controllers(engine: &ConquestEngine) -> Vec<NationId> {
    let mut ids: Vec<NationId> = engine
        .territories()
        .filter_map(|t| t.controller.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Owned territory with the highest conflict risk
fn most_at_risk(engine: &ConquestEngine, nation: &NationId) -> Option<TerritoryId> {
    engine
        .territories_owned_by(nation)
        .into_iter()
        .max_by(|a, b| {
            a.conflict_risk
                .partial_cmp(&b.conflict_risk)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|t| t.id.clone())
}

/// First adjacent target the nation can hit with 2:1 odds, committing
/// half the source garrison
fn pick_attack(
    engine: &ConquestEngine,
    nation: &NationId,
) -> Option<(TerritoryId, TerritoryId, u32)> {
    let owned: Vec<_> = engine
        .territories_owned_by(nation)
        .into_iter()
        .cloned()
        .collect();
    for from in &owned {
        if from.armies < 4 {
            continue;
        }
        for neighbor in &from.adjacent {
            let Some(target) = engine.territory(neighbor) else {
                continue;
            };
            let hostile = target.controller.as_ref() != Some(nation);
            if hostile && target.armies * 2 < from.armies {
                return Some((from.id.clone(), neighbor.clone(), from.armies / 2));
            }
        }
    }
    None
}

/// Uncontrolled territory with the highest conflict risk
fn hottest_neutral(engine: &ConquestEngine) -> Option<TerritoryId> {
    engine
        .territories()
        .filter(|t| t.controller.is_none())
        .max_by(|a, b| {
            a.conflict_risk
                .partial_cmp(&b.conflict_risk)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|t| t.id.clone())
}
