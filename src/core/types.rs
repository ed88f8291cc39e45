//! Core type definitions used throughout the engine

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Turn counter (simulation time unit)
pub type Turn = u64;

/// Unique identifier for nations ("usa", "russia", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NationId(pub String);

impl NationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for territories ("alaska", "west_siberia", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub String);

impl TerritoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TerritoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TerritoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for unit templates ("armored_corps", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TemplateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for deployed units, allocated sequentially by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Force branch classification for templates, units, and garrison composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceType {
    Ground,
    Naval,
    Air,
    Unmanned,
}

impl ForceType {
    pub const ALL: [ForceType; 4] = [
        ForceType::Ground,
        ForceType::Naval,
        ForceType::Air,
        ForceType::Unmanned,
    ];

    /// Terrain a unit of this branch is stationed on by default
    pub fn preferred_terrain(&self) -> TerrainKind {
        match self {
            ForceType::Naval => TerrainKind::Sea,
            _ => TerrainKind::Land,
        }
    }
}

impl fmt::Display for ForceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForceType::Ground => "ground",
            ForceType::Naval => "naval",
            ForceType::Air => "air",
            ForceType::Unmanned => "unmanned",
        };
        write!(f, "{}", s)
    }
}

/// Terrain classification of a territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Land,
    Sea,
}

/// Strategic resources tracked in nation balances and template costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Production,
    Intelligence,
    FissileMaterial,
    Oil,
    RareEarth,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Production,
        Resource::Intelligence,
        Resource::FissileMaterial,
        Resource::Oil,
        Resource::RareEarth,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resource::Production => "production",
            Resource::Intelligence => "intelligence",
            Resource::FissileMaterial => "fissile_material",
            Resource::Oil => "oil",
            Resource::RareEarth => "rare_earth",
        };
        write!(f, "{}", s)
    }
}

/// Geographic anchor of a territory (display data, not a pathfinding input)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }
}
