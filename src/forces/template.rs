//! Unit templates - what a nation can train, at what cost

use serde::{Deserialize, Serialize};

use crate::core::types::{ForceType, NationId, Resource, TemplateId};

/// A trainable unit design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Unique identifier
    pub id: TemplateId,
    /// Human-readable name
    pub name: String,
    /// Force branch
    pub force_type: ForceType,
    /// Base combat ratings
    pub attack: f32,
    pub defense: f32,
    pub support: f32,
    /// Resources consumed per trained unit; absent resources cost zero
    pub cost: Vec<(Resource, f32)>,
    /// National readiness debit when trained
    pub readiness_impact: f32,
    /// Research id that must be completed before training
    pub research_requirement: Option<String>,
    /// Abstract army-points one unit adds to a garrison
    pub armies_value: u32,
}

impl UnitTemplate {
    /// Convert an externally designed division into a trainable template.
    ///
    /// Force type is fixed to ground; combat ratings come from a fixed
    /// linear transform of the division stat bundle.
    pub fn from_division(id: TemplateId, stats: &DivisionProfile) -> Self {
        let attack = (stats.soft_attack + stats.hard_attack) / 20.0
            + stats.breakthrough / 30.0
            + stats.reconnaissance / 40.0;
        let defense = stats.defense / 20.0
            + stats.armor / 40.0
            + stats.piercing / 30.0
            + stats.recovery / 40.0;
        let support = stats.organization / 50.0 + stats.suppression / 40.0;

        let name = id.as_str().replace('_', " ");
        Self {
            id,
            name,
            force_type: ForceType::Ground,
            attack,
            defense,
            support,
            cost: vec![(Resource::Production, 100.0), (Resource::Oil, 10.0)],
            readiness_impact: 10.0,
            research_requirement: None,
            armies_value: 2,
        }
    }
}

/// Stat bundle of an externally designed division
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DivisionProfile {
    pub soft_attack: f32,
    pub hard_attack: f32,
    pub breakthrough: f32,
    pub reconnaissance: f32,
    pub defense: f32,
    pub armor: f32,
    pub piercing: f32,
    pub recovery: f32,
    pub organization: f32,
    pub suppression: f32,
}

/// External division-designer subsystem. Supplies stat bundles for template
/// ids the built-in catalogue does not know.
pub trait DivisionDesigner {
    fn division_stats(&self, nation: &NationId, template: &TemplateId) -> Option<DivisionProfile>;
}
