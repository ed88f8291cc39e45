//! Flashpoint - Territorial Conquest & Combat Resolution Engine

pub mod conflict;
pub mod core;
pub mod effects;
pub mod engine;
pub mod forces;
pub mod log;
pub mod logistics;
pub mod map;
pub mod nations;
pub mod reinforce;
