//! Conventional-forces profile and diplomatic treaty records

use serde::{Deserialize, Serialize};

use crate::core::types::{ForceType, Turn, UnitId};

/// A nation's conventional military posture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConventionalProfile {
    /// 0-100, spent by military action, regenerated passively each turn
    pub readiness: f32,
    /// Manpower available for new units and mobilization
    pub reserves: u32,
    /// 0-100, professional-army lean
    pub professionalism: f32,
    /// 0-100, institutional-tradition lean
    pub tradition: f32,
    pub focus: ForceType,
    pub deployed_units: Vec<UnitId>,
}

impl Default for ConventionalProfile {
    fn default() -> Self {
        Self {
            readiness: 70.0,
            reserves: 100,
            professionalism: 50.0,
            tradition: 50.0,
            focus: ForceType::Ground,
            deployed_units: Vec::new(),
        }
    }
}

impl ConventionalProfile {
    pub fn debit_readiness(&mut self, amount: f32) {
        self.readiness = (self.readiness - amount).clamp(0.0, 100.0);
    }

    pub fn regen_readiness(&mut self, amount: f32) {
        self.readiness = (self.readiness + amount).clamp(0.0, 100.0);
    }

    /// Cost of standing up a new unit: readiness and reserves down,
    /// professionalism up (scaled by the recruitment climate), tradition
    /// nudged down by the churn.
    pub fn training_fatigue(
        &mut self,
        readiness_impact: f32,
        armies_value: u32,
        recruitment_multiplier: f32,
    ) {
        self.debit_readiness(readiness_impact);
        self.reserves = self.reserves.saturating_sub(armies_value);
        self.professionalism = (self.professionalism + 0.4 * recruitment_multiplier).clamp(0.0, 100.0);
        self.tradition = (self.tradition - 0.2).clamp(0.0, 100.0);
    }

    /// Mass mobilization: the opposite trade of `training_fatigue`
    pub fn mobilization_effect(&mut self, count: u32) {
        let ct = count as f32;
        self.regen_readiness(0.5 * ct);
        self.professionalism = (self.professionalism - 0.3 * ct).clamp(0.0, 100.0);
        self.tradition = (self.tradition + 0.4 * ct).clamp(0.0, 100.0);
        self.reserves += count;
    }
}

/// One nation's standing agreement with another
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treaty {
    /// Remaining truce duration in turns; positive means active
    pub truce_turns: u32,
    /// Absolute turn the truce lapses, if tracked that way instead
    pub truce_expiry_turn: Option<Turn>,
    pub alliance: bool,
}

impl Treaty {
    pub fn truce(turns: u32) -> Self {
        Self {
            truce_turns: turns,
            ..Default::default()
        }
    }

    pub fn truce_until(turn: Turn) -> Self {
        Self {
            truce_expiry_turn: Some(turn),
            ..Default::default()
        }
    }

    pub fn alliance() -> Self {
        Self {
            alliance: true,
            ..Default::default()
        }
    }

    /// A truce is live if it has turns on the clock or an expiry still ahead
    pub fn truce_active(&self, current_turn: Turn) -> bool {
        self.truce_turns > 0
            || self
                .truce_expiry_turn
                .map(|expiry| expiry > current_turn)
                .unwrap_or(false)
    }
}
