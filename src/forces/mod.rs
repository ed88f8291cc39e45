//! Armed forces layer - templates, the catalogue, and deployed units

pub mod catalog;
pub mod template;
pub mod unit;

pub use catalog::{TemplateCatalog, TemplateLoadError, TemplateResolution};
pub use template::{DivisionDesigner, DivisionProfile, UnitTemplate};
pub use unit::{DeployedUnit, UnitRoster, UnitStatus};
