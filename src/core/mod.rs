pub mod error;
pub mod types;

pub use error::{FlashpointError, Result};
pub use types::{
    ForceType, GeoPoint, NationId, Resource, TemplateId, TerrainKind, TerritoryId, Turn, UnitId,
};
