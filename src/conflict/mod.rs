//! Combat resolution: border attacks, proxy engagements, movement

pub mod border;
pub mod movement;
pub mod proxy;
pub mod strength;

pub use border::ConflictOutcome;
pub use proxy::ProxyOutcome;
pub use strength::{CombatProfile, CompositionBonus, ExchangeResult};
