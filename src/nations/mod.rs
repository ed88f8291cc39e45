//! Nation layer - profiles, treaties, resources, and the registry interface

pub mod profile;
pub mod registry;
pub mod resources;

pub use profile::{ConventionalProfile, Treaty};
pub use registry::{allied, truce_between, InMemoryRegistry, NationRegistry, NationState};
pub use resources::ResourceLedger;
