//! Atlas - default campaign map and TOML map loading
//!
//! The default world is a 16-territory abstraction of the northern
//! hemisphere. Custom maps load from TOML with the same schema as
//! `data/atlas.toml`.

use serde::Deserialize;

use crate::core::types::{GeoPoint, NationId, TerrainKind, TerritoryId};
use crate::map::store::MapStore;
use crate::map::territory::{ForceComposition, Region, Territory};

/// Symmetric adjacency pairs of the default world. Both directions are
/// applied when the store is built.
const DEFAULT_ADJACENCY: &[(&str, &str)] = &[
    ("alaska", "canadian_shield"),
    ("alaska", "north_pacific"),
    ("alaska", "arctic_circle"),
    ("alaska", "east_siberia"),
    ("continental_us", "canadian_shield"),
    ("continental_us", "north_pacific"),
    ("continental_us", "north_atlantic"),
    ("canadian_shield", "greenland"),
    ("canadian_shield", "arctic_circle"),
    ("greenland", "north_atlantic"),
    ("greenland", "arctic_circle"),
    ("north_atlantic", "western_europe"),
    ("north_atlantic", "scandinavia"),
    ("western_europe", "scandinavia"),
    ("western_europe", "eastern_europe"),
    ("western_europe", "levant"),
    ("scandinavia", "eastern_europe"),
    ("scandinavia", "arctic_circle"),
    ("eastern_europe", "west_siberia"),
    ("eastern_europe", "levant"),
    ("west_siberia", "east_siberia"),
    ("west_siberia", "north_china"),
    ("west_siberia", "persian_gulf"),
    ("east_siberia", "arctic_circle"),
    ("east_siberia", "north_pacific"),
    ("east_siberia", "north_china"),
    ("north_china", "coastal_china"),
    ("coastal_china", "north_pacific"),
    ("levant", "persian_gulf"),
];

struct TerritorySeed {
    id: &'static str,
    name: &'static str,
    terrain: TerrainKind,
    region: Region,
    anchor: (f32, f32),
    strategic_value: f32,
    production_bonus: f32,
    instability_modifier: f32,
    conflict_risk: f32,
    controller: Option<&'static str>,
    garrison: (u32, u32, u32, u32),
}

// Uncontrolled territories start empty: unowned armies exist only
// transiently while an attack resolves.
const DEFAULT_TERRITORIES: &[TerritorySeed] = &[
    TerritorySeed {
        id: "alaska",
        name: "Alaska",
        terrain: TerrainKind::Land,
        region: Region::NorthAmerica,
        anchor: (64.0, -150.0),
        strategic_value: 4.0,
        production_bonus: 3.0,
        instability_modifier: 1.0,
        conflict_risk: 0.05,
        controller: Some("usa"),
        garrison: (3, 0, 0, 0),
    },
    TerritorySeed {
        id: "continental_us",
        name: "Continental United States",
        terrain: TerrainKind::Land,
        region: Region::NorthAmerica,
        anchor: (39.0, -98.0),
        strategic_value: 10.0,
        production_bonus: 10.0,
        instability_modifier: 1.0,
        conflict_risk: 0.0,
        controller: Some("usa"),
        garrison: (3, 0, 1, 0),
    },
    TerritorySeed {
        id: "canadian_shield",
        name: "Canadian Shield",
        terrain: TerrainKind::Land,
        region: Region::NorthAmerica,
        anchor: (56.0, -96.0),
        strategic_value: 3.0,
        production_bonus: 3.0,
        instability_modifier: 1.0,
        conflict_risk: 0.0,
        controller: Some("usa"),
        garrison: (3, 0, 0, 0),
    },
    TerritorySeed {
        id: "greenland",
        name: "Greenland",
        terrain: TerrainKind::Land,
        region: Region::Arctic,
        anchor: (72.0, -40.0),
        strategic_value: 2.0,
        production_bonus: 1.0,
        instability_modifier: 1.0,
        conflict_risk: 0.05,
        controller: None,
        garrison: (0, 0, 0, 0),
    },
    TerritorySeed {
        id: "arctic_circle",
        name: "Arctic Circle",
        terrain: TerrainKind::Land,
        region: Region::Arctic,
        anchor: (85.0, 0.0),
        strategic_value: 3.0,
        production_bonus: 1.0,
        instability_modifier: 2.0,
        conflict_risk: 0.2,
        controller: None,
        garrison: (0, 0, 0, 0),
    },
    TerritorySeed {
        id: "north_atlantic",
        name: "North Atlantic",
        terrain: TerrainKind::Sea,
        region: Region::NorthAtlantic,
        anchor: (45.0, -35.0),
        strategic_value: 3.0,
        production_bonus: 2.0,
        instability_modifier: 0.0,
        conflict_risk: 0.05,
        controller: None,
        garrison: (0, 0, 0, 0),
    },
    TerritorySeed {
        id: "north_pacific",
        name: "North Pacific",
        terrain: TerrainKind::Sea,
        region: Region::NorthPacific,
        anchor: (40.0, -170.0),
        strategic_value: 3.0,
        production_bonus: 2.0,
        instability_modifier: 0.0,
        conflict_risk: 0.1,
        controller: None,
        garrison: (0, 0, 0, 0),
    },
    TerritorySeed {
        id: "western_europe",
        name: "Western Europe",
        terrain: TerrainKind::Land,
        region: Region::Europe,
        anchor: (48.0, 5.0),
        strategic_value: 8.0,
        production_bonus: 9.0,
        instability_modifier: 1.0,
        conflict_risk: 0.05,
        controller: Some("europa"),
        garrison: (3, 0, 0, 0),
    },
    TerritorySeed {
        id: "scandinavia",
        name: "Scandinavia",
        terrain: TerrainKind::Land,
        region: Region::Europe,
        anchor: (62.0, 15.0),
        strategic_value: 4.0,
        production_bonus: 5.0,
        instability_modifier: 1.0,
        conflict_risk: 0.05,
        controller: Some("europa"),
        garrison: (3, 1, 0, 0),
    },
    TerritorySeed {
        id: "eastern_europe",
        name: "Eastern Europe",
        terrain: TerrainKind::Land,
        region: Region::Europe,
        anchor: (52.0, 25.0),
        strategic_value: 6.0,
        production_bonus: 6.0,
        instability_modifier: 3.0,
        conflict_risk: 0.25,
        controller: Some("russia"),
        garrison: (3, 0, 0, 0),
    },
    TerritorySeed {
        id: "west_siberia",
        name: "West Siberia",
        terrain: TerrainKind::Land,
        region: Region::Siberia,
        anchor: (60.0, 75.0),
        strategic_value: 6.0,
        production_bonus: 8.0,
        instability_modifier: 1.0,
        conflict_risk: 0.05,
        controller: Some("russia"),
        garrison: (3, 0, 1, 0),
    },
    TerritorySeed {
        id: "east_siberia",
        name: "East Siberia",
        terrain: TerrainKind::Land,
        region: Region::Siberia,
        anchor: (65.0, 125.0),
        strategic_value: 5.0,
        production_bonus: 4.0,
        instability_modifier: 2.0,
        conflict_risk: 0.15,
        controller: Some("russia"),
        garrison: (3, 0, 0, 0),
    },
    TerritorySeed {
        id: "north_china",
        name: "North China",
        terrain: TerrainKind::Land,
        region: Region::EastAsia,
        anchor: (40.0, 110.0),
        strategic_value: 7.0,
        production_bonus: 8.0,
        instability_modifier: 1.0,
        conflict_risk: 0.1,
        controller: Some("china"),
        garrison: (3, 0, 0, 0),
    },
    TerritorySeed {
        id: "coastal_china",
        name: "Coastal China",
        terrain: TerrainKind::Land,
        region: Region::EastAsia,
        anchor: (28.0, 115.0),
        strategic_value: 8.0,
        production_bonus: 10.0,
        instability_modifier: 1.0,
        conflict_risk: 0.1,
        controller: Some("china"),
        garrison: (3, 1, 0, 0),
    },
    TerritorySeed {
        id: "levant",
        name: "Levant",
        terrain: TerrainKind::Land,
        region: Region::MiddleEast,
        anchor: (33.0, 36.0),
        strategic_value: 6.0,
        production_bonus: 5.0,
        instability_modifier: 4.0,
        conflict_risk: 0.35,
        controller: None,
        garrison: (0, 0, 0, 0),
    },
    TerritorySeed {
        id: "persian_gulf",
        name: "Persian Gulf",
        terrain: TerrainKind::Land,
        region: Region::MiddleEast,
        anchor: (27.0, 50.0),
        strategic_value: 7.0,
        production_bonus: 12.0,
        instability_modifier: 3.0,
        conflict_risk: 0.3,
        controller: None,
        garrison: (0, 0, 0, 0),
    },
];

/// Build the default campaign world
pub fn default_world() -> MapStore {
    let mut store = MapStore::default();
    for seed in DEFAULT_TERRITORIES {
        let mut t = Territory::new(seed.id, seed.name, seed.region);
        t.terrain = seed.terrain;
        t.anchor = GeoPoint::new(seed.anchor.0, seed.anchor.1);
        t.strategic_value = seed.strategic_value;
        t.production_bonus = seed.production_bonus;
        t.instability_modifier = seed.instability_modifier;
        t.conflict_risk = seed.conflict_risk;
        t.controller = seed.controller.map(NationId::from);
        let (ground, naval, air, unmanned) = seed.garrison;
        t.composition = ForceComposition::new(ground, naval, air, unmanned);
        t.armies = t.composition.total();
        store.insert(t);
    }
    link_pairs(&mut store, DEFAULT_ADJACENCY);
    store
}

fn link_pairs(store: &mut MapStore, pairs: &[(&str, &str)]) {
    for (a, b) in pairs {
        let (a, b) = (TerritoryId::new(*a), TerritoryId::new(*b));
        if let Some(t) = store.get_mut(&a) {
            if !t.adjacent.contains(&b) {
                t.adjacent.push(b.clone());
            }
        }
        if let Some(t) = store.get_mut(&b) {
            if !t.adjacent.contains(&a) {
                t.adjacent.push(a);
            }
        }
    }
}

/// Error type for atlas loading
#[derive(Debug, Clone)]
pub enum AtlasLoadError {
    IoError(String),
    ParseError(String),
    InvalidTerrain(String),
    InvalidRegion(String),
    UnknownNeighbor { territory: String, neighbor: String },
    AsymmetricAdjacency { territory: String, neighbor: String },
}

impl std::fmt::Display for AtlasLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasLoadError::IoError(e) => write!(f, "IO error: {}", e),
            AtlasLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            AtlasLoadError::InvalidTerrain(e) => write!(f, "Invalid terrain: {}", e),
            AtlasLoadError::InvalidRegion(e) => write!(f, "Invalid region: {}", e),
            AtlasLoadError::UnknownNeighbor {
                territory,
                neighbor,
            } => write!(f, "{} lists unknown neighbor {}", territory, neighbor),
            AtlasLoadError::AsymmetricAdjacency {
                territory,
                neighbor,
            } => write!(
                f,
                "{} lists {} as neighbor but not the reverse",
                territory, neighbor
            ),
        }
    }
}

impl std::error::Error for AtlasLoadError {}

/// Load a map from a TOML file
pub fn load_from_toml(path: &std::path::Path) -> Result<MapStore, AtlasLoadError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| AtlasLoadError::IoError(e.to_string()))?;
    parse_toml(&content)
}

/// Parse a map from TOML string
pub fn parse_toml(content: &str) -> Result<MapStore, AtlasLoadError> {
    let toml_data: TomlAtlas =
        toml::from_str(content).map_err(|e| AtlasLoadError::ParseError(e.to_string()))?;

    let mut store = MapStore::default();
    for t in toml_data.territories {
        store.insert(t.into_territory()?);
    }
    validate_adjacency(&store)?;
    Ok(store)
}

/// Every listed neighbor must exist and must list the territory back
fn validate_adjacency(store: &MapStore) -> Result<(), AtlasLoadError> {
    for t in store.iter() {
        for n in &t.adjacent {
            let Some(neighbor) = store.get(n) else {
                return Err(AtlasLoadError::UnknownNeighbor {
                    territory: t.id.to_string(),
                    neighbor: n.to_string(),
                });
            };
            if !neighbor.is_adjacent_to(&t.id) {
                return Err(AtlasLoadError::AsymmetricAdjacency {
                    territory: t.id.to_string(),
                    neighbor: n.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// TOML representation of a map file
#[derive(Debug, Deserialize)]
struct TomlAtlas {
    territories: Vec<TomlTerritory>,
}

/// TOML representation of a single territory
#[derive(Debug, Deserialize)]
struct TomlTerritory {
    id: String,
    name: String,
    terrain: String,
    region: String,
    #[serde(default)]
    lat: f32,
    #[serde(default)]
    lon: f32,
    #[serde(default = "default_strategic_value")]
    strategic_value: f32,
    #[serde(default)]
    production_bonus: f32,
    #[serde(default)]
    instability_modifier: f32,
    #[serde(default)]
    conflict_risk: f32,
    controller: Option<String>,
    #[serde(default)]
    ground: u32,
    #[serde(default)]
    naval: u32,
    #[serde(default)]
    air: u32,
    #[serde(default)]
    unmanned: u32,
    #[serde(default)]
    adjacent: Vec<String>,
}

fn default_strategic_value() -> f32 {
    1.0
}

impl TomlTerritory {
    fn into_territory(self) -> Result<Territory, AtlasLoadError> {
        let terrain = match self.terrain.to_lowercase().as_str() {
            "land" => TerrainKind::Land,
            "sea" => TerrainKind::Sea,
            _ => return Err(AtlasLoadError::InvalidTerrain(self.terrain)),
        };

        let region = match self.region.to_lowercase().as_str() {
            "north_america" => Region::NorthAmerica,
            "europe" => Region::Europe,
            "siberia" => Region::Siberia,
            "east_asia" => Region::EastAsia,
            "middle_east" => Region::MiddleEast,
            "arctic" => Region::Arctic,
            "north_atlantic" => Region::NorthAtlantic,
            "north_pacific" => Region::NorthPacific,
            _ => return Err(AtlasLoadError::InvalidRegion(self.region)),
        };

        let composition = ForceComposition::new(self.ground, self.naval, self.air, self.unmanned);
        Ok(Territory {
            id: TerritoryId::new(self.id),
            name: self.name,
            terrain,
            region,
            anchor: GeoPoint::new(self.lat, self.lon),
            adjacent: self.adjacent.into_iter().map(TerritoryId::new).collect(),
            strategic_value: self.strategic_value,
            production_bonus: self.production_bonus,
            instability_modifier: self.instability_modifier,
            conflict_risk: self.conflict_risk,
            controller: self.controller.map(NationId::new),
            contested_by: Vec::new(),
            armies: composition.total(),
            composition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_world_has_sixteen_territories() {
        let world = default_world();
        assert_eq!(world.len(), 16);
    }

    #[test]
    fn test_default_world_adjacency_is_symmetric() {
        let world = default_world();
        for t in world.iter() {
            for n in &t.adjacent {
                let neighbor = world.get(n).expect("neighbor exists");
                assert!(
                    neighbor.is_adjacent_to(&t.id),
                    "{} -> {} has no reverse edge",
                    t.id,
                    n
                );
            }
        }
    }

    #[test]
    fn test_default_world_starting_positions() {
        let world = default_world();
        let usa = NationId::new("usa");
        let russia = NationId::new("russia");
        assert_eq!(world.controlled_count(&usa), 3);
        assert_eq!(world.controlled_count(&russia), 3);
        // Full home region at start
        assert_eq!(world.region_bonus_total(&usa), 3);

        let bering = world.get(&TerritoryId::new("alaska")).unwrap();
        assert!(bering.is_adjacent_to(&TerritoryId::new("east_siberia")));
    }

    #[test]
    fn test_default_world_sea_zones_unoccupied() {
        let world = default_world();
        for id in ["north_atlantic", "north_pacific"] {
            let zone = world.get(&TerritoryId::new(id)).unwrap();
            assert_eq!(zone.terrain, TerrainKind::Sea);
            assert!(zone.controller.is_none());
            assert_eq!(zone.armies, 0);
        }
    }

    #[test]
    fn test_default_world_neutral_territories_start_empty() {
        let world = default_world();
        for t in world.iter() {
            if t.controller.is_none() {
                assert_eq!(t.armies, 0, "{} is neutral but garrisoned", t.id);
                assert!(t.composition.is_empty());
            }
        }
    }

    #[test]
    fn test_atlas_toml_parsing() {
        let toml_content = r#"
[[territories]]
id = "iberia"
name = "Iberia"
terrain = "Land"
region = "Europe"
lat = 40.0
lon = -4.0
strategic_value = 5.0
production_bonus = 4.0
controller = "europa"
ground = 2
unmanned = 1
adjacent = ["maghreb"]

[[territories]]
id = "maghreb"
name = "Maghreb"
terrain = "Land"
region = "Middle_East"
instability_modifier = 2.0
conflict_risk = 0.4
adjacent = ["iberia"]
"#;
        let store = parse_toml(toml_content).expect("Failed to parse TOML");
        assert_eq!(store.len(), 2);

        let iberia = store.get(&TerritoryId::new("iberia")).expect("iberia");
        assert_eq!(iberia.region, Region::Europe);
        assert_eq!(iberia.controller, Some(NationId::new("europa")));
        assert_eq!(iberia.armies, 3);
        assert_eq!(iberia.composition.unmanned, 1);

        let maghreb = store.get(&TerritoryId::new("maghreb")).expect("maghreb");
        assert!(maghreb.controller.is_none());
        assert_eq!(maghreb.armies, 0);
        assert!((maghreb.conflict_risk - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_atlas_toml_rejects_invalid_region() {
        let toml_content = r#"
[[territories]]
id = "atlantis"
name = "Atlantis"
terrain = "Sea"
region = "Lemuria"
"#;
        match parse_toml(toml_content) {
            Err(AtlasLoadError::InvalidRegion(r)) => assert_eq!(r, "Lemuria"),
            other => panic!("Expected InvalidRegion, got {:?}", other),
        }
    }

    #[test]
    fn test_atlas_toml_rejects_asymmetric_adjacency() {
        let toml_content = r#"
[[territories]]
id = "a"
name = "A"
terrain = "Land"
region = "Europe"
adjacent = ["b"]

[[territories]]
id = "b"
name = "B"
terrain = "Land"
region = "Europe"
"#;
        match parse_toml(toml_content) {
            Err(AtlasLoadError::AsymmetricAdjacency {
                territory,
                neighbor,
            }) => {
                assert_eq!(territory, "a");
                assert_eq!(neighbor, "b");
            }
            other => panic!("Expected AsymmetricAdjacency, got {:?}", other),
        }
    }

    #[test]
    fn test_load_atlas_from_file() {
        use std::path::Path;

        let store = load_from_toml(Path::new("data/atlas.toml"))
            .expect("Should load map from data/atlas.toml");
        assert_eq!(store.len(), 16);
        assert!(store.get(&TerritoryId::new("levant")).is_some());
        assert!(store.are_adjacent(
            &TerritoryId::new("alaska"),
            &TerritoryId::new("east_siberia")
        ));
    }
}
