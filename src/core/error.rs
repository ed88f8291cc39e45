use thiserror::Error;

use crate::core::types::{NationId, Resource, TemplateId, TerritoryId, Turn, UnitId};

#[derive(Error, Debug)]
pub enum FlashpointError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(TemplateId),

    #[error("Unknown nation: {0}")]
    UnknownNation(NationId),

    #[error("Template {template} requires research: {tech}")]
    ResearchLocked { template: TemplateId, tech: String },

    #[error("Insufficient {resource}: required {required}, available {available}")]
    InsufficientResources {
        resource: Resource,
        required: f32,
        available: f32,
    },

    #[error("Nation {0} controls no territory")]
    NoTerritory(NationId),

    #[error("Unknown territory: {0}")]
    UnknownTerritory(TerritoryId),

    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    #[error("Territories are not adjacent: {from} -> {to}")]
    NotAdjacent { from: TerritoryId, to: TerritoryId },

    #[error("Insufficient armies in {territory}: requested {requested}, available {available}")]
    InsufficientArmies {
        territory: TerritoryId,
        requested: u32,
        available: u32,
    },

    #[error("Truce with {nation} is active until turn {expires}")]
    TruceActive { nation: NationId, expires: Turn },

    #[error("Nations {0} and {1} are allied")]
    AlliedNations(NationId, NationId),

    #[error("Territory {territory} is not controlled by {}", .nation.as_ref().map(|n| n.as_str()).unwrap_or("any nation"))]
    NotOwner {
        nation: Option<NationId>,
        territory: TerritoryId,
    },

    #[error("Reinforcement pool exhausted for {nation}: requested {requested}, remaining {remaining}")]
    PoolExhausted {
        nation: NationId,
        requested: u32,
        remaining: u32,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlashpointError>;
