//! Template catalogue - built-in designs plus TOML-defined extensions
//!
//! Resolution falls back from the catalogue to the external division
//! designer; converted division templates are persisted back into the
//! catalogue on first successful training.

use serde::Deserialize;

use crate::core::types::{ForceType, NationId, Resource, TemplateId};
use crate::forces::template::{DivisionDesigner, UnitTemplate};

/// Catalog of all trainable templates
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<UnitTemplate>,
}

/// Outcome of looking a template up across both sources
#[derive(Debug, Clone)]
pub enum TemplateResolution {
    /// Present in the catalogue
    Found(UnitTemplate),
    /// Derived from an external division design; not yet in the catalogue
    Converted(UnitTemplate),
    NotFound,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in conventional arsenal
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.add(UnitTemplate {
            id: "armored_corps".into(),
            name: "Armored Corps".into(),
            force_type: ForceType::Ground,
            attack: 7.0,
            defense: 5.0,
            support: 2.0,
            cost: vec![(Resource::Production, 120.0), (Resource::Oil, 40.0)],
            readiness_impact: 12.0,
            research_requirement: None,
            armies_value: 3,
        });

        catalog.add(UnitTemplate {
            id: "mechanized_infantry".into(),
            name: "Mechanized Infantry".into(),
            force_type: ForceType::Ground,
            attack: 5.0,
            defense: 6.0,
            support: 3.0,
            cost: vec![(Resource::Production, 80.0), (Resource::Oil, 20.0)],
            readiness_impact: 8.0,
            research_requirement: None,
            armies_value: 2,
        });

        catalog.add(UnitTemplate {
            id: "carrier_battlegroup".into(),
            name: "Carrier Battlegroup".into(),
            force_type: ForceType::Naval,
            attack: 8.0,
            defense: 7.0,
            support: 5.0,
            cost: vec![
                (Resource::Production, 300.0),
                (Resource::Oil, 120.0),
                (Resource::RareEarth, 30.0),
            ],
            readiness_impact: 20.0,
            research_requirement: Some("conventional_carrier_battlegroups".into()),
            armies_value: 3,
        });

        catalog.add(UnitTemplate {
            id: "destroyer_flotilla".into(),
            name: "Destroyer Flotilla".into(),
            force_type: ForceType::Naval,
            attack: 5.0,
            defense: 6.0,
            support: 3.0,
            cost: vec![(Resource::Production, 140.0), (Resource::Oil, 60.0)],
            readiness_impact: 10.0,
            research_requirement: None,
            armies_value: 2,
        });

        catalog.add(UnitTemplate {
            id: "strike_wing".into(),
            name: "Strike Wing".into(),
            force_type: ForceType::Air,
            attack: 8.0,
            defense: 3.0,
            support: 4.0,
            cost: vec![
                (Resource::Production, 160.0),
                (Resource::Oil, 80.0),
                (Resource::RareEarth, 20.0),
            ],
            readiness_impact: 12.0,
            research_requirement: None,
            armies_value: 2,
        });

        catalog.add(UnitTemplate {
            id: "drone_swarm".into(),
            name: "Drone Swarm".into(),
            force_type: ForceType::Unmanned,
            attack: 6.0,
            defense: 2.0,
            support: 4.0,
            cost: vec![
                (Resource::Production, 90.0),
                (Resource::Intelligence, 30.0),
                (Resource::RareEarth, 40.0),
            ],
            readiness_impact: 6.0,
            research_requirement: None,
            armies_value: 2,
        });

        catalog.add(UnitTemplate {
            id: "theater_missile_battery".into(),
            name: "Theater Missile Battery".into(),
            force_type: ForceType::Ground,
            attack: 9.0,
            defense: 2.0,
            support: 1.0,
            cost: vec![
                (Resource::Production, 200.0),
                (Resource::FissileMaterial, 10.0),
                (Resource::RareEarth, 15.0),
            ],
            readiness_impact: 10.0,
            research_requirement: None,
            armies_value: 2,
        });

        catalog
    }

    /// Add a template to the catalogue
    pub fn add(&mut self, template: UnitTemplate) {
        self.templates.push(template);
    }

    /// Get a template by id
    pub fn get(&self, id: &str) -> Option<&UnitTemplate> {
        self.templates.iter().find(|t| t.id.as_str() == id)
    }

    /// All templates of one force branch
    pub fn for_force(&self, force_type: ForceType) -> impl Iterator<Item = &UnitTemplate> {
        self.templates
            .iter()
            .filter(move |t| t.force_type == force_type)
    }

    /// All templates
    pub fn all(&self) -> &[UnitTemplate] {
        &self.templates
    }

    /// Resolve a template id: catalogue first, then the division designer
    pub fn resolve(
        &self,
        id: &TemplateId,
        nation: &NationId,
        designer: Option<&dyn DivisionDesigner>,
    ) -> TemplateResolution {
        if let Some(t) = self.get(id.as_str()) {
            return TemplateResolution::Found(t.clone());
        }
        if let Some(designer) = designer {
            if let Some(stats) = designer.division_stats(nation, id) {
                return TemplateResolution::Converted(UnitTemplate::from_division(
                    id.clone(),
                    &stats,
                ));
            }
        }
        TemplateResolution::NotFound
    }

    /// Load templates from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, TemplateLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TemplateLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse templates from TOML string
    pub fn parse_toml(content: &str) -> Result<Self, TemplateLoadError> {
        let toml_data: TomlTemplates =
            toml::from_str(content).map_err(|e| TemplateLoadError::ParseError(e.to_string()))?;

        let mut catalog = Self::new();
        for template in toml_data.templates {
            catalog.add(template.into_template()?);
        }
        Ok(catalog)
    }
}

/// Error type for template loading
#[derive(Debug, Clone)]
pub enum TemplateLoadError {
    IoError(String),
    ParseError(String),
    InvalidForceType(String),
    InvalidResource(String),
}

impl std::fmt::Display for TemplateLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateLoadError::IoError(e) => write!(f, "IO error: {}", e),
            TemplateLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            TemplateLoadError::InvalidForceType(e) => write!(f, "Invalid force type: {}", e),
            TemplateLoadError::InvalidResource(e) => write!(f, "Invalid resource: {}", e),
        }
    }
}

impl std::error::Error for TemplateLoadError {}

/// TOML representation of a templates file
#[derive(Debug, Deserialize)]
struct TomlTemplates {
    templates: Vec<TomlTemplate>,
}

/// TOML representation of a single template
#[derive(Debug, Deserialize)]
struct TomlTemplate {
    id: String,
    name: String,
    force_type: String,
    attack: f32,
    defense: f32,
    support: f32,
    #[serde(default)]
    cost: Vec<TomlResourceCost>,
    readiness_impact: f32,
    research_requirement: Option<String>,
    #[serde(default = "default_armies_value")]
    armies_value: u32,
}

fn default_armies_value() -> u32 {
    1
}

/// TOML representation of one cost entry
#[derive(Debug, Deserialize)]
struct TomlResourceCost {
    resource: String,
    amount: f32,
}

impl TomlTemplate {
    fn into_template(self) -> Result<UnitTemplate, TemplateLoadError> {
        let force_type = match self.force_type.to_lowercase().as_str() {
            "ground" => ForceType::Ground,
            "naval" => ForceType::Naval,
            "air" => ForceType::Air,
            "unmanned" => ForceType::Unmanned,
            _ => return Err(TemplateLoadError::InvalidForceType(self.force_type)),
        };

        let cost = self
            .cost
            .into_iter()
            .map(|c| c.into_cost())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UnitTemplate {
            id: TemplateId::new(self.id),
            name: self.name,
            force_type,
            attack: self.attack,
            defense: self.defense,
            support: self.support,
            cost,
            readiness_impact: self.readiness_impact,
            research_requirement: self.research_requirement,
            armies_value: self.armies_value,
        })
    }
}

impl TomlResourceCost {
    fn into_cost(self) -> Result<(Resource, f32), TemplateLoadError> {
        let resource = match self.resource.to_lowercase().as_str() {
            "production" => Resource::Production,
            "intelligence" => Resource::Intelligence,
            "fissile_material" => Resource::FissileMaterial,
            "oil" => Resource::Oil,
            "rare_earth" => Resource::RareEarth,
            _ => return Err(TemplateLoadError::InvalidResource(self.resource)),
        };
        Ok((resource, self.amount))
    }
}
