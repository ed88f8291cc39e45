//! Resource ledger - national strategic-resource balances

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Resource;

/// Balance sheet of one nation's strategic resources.
/// Missing entries read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    balances: AHashMap<Resource, f32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current balance of a resource
    pub fn get(&self, resource: Resource) -> f32 {
        self.balances.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, resource: Resource, amount: f32) {
        self.balances.insert(resource, amount.max(0.0));
    }

    pub fn add(&mut self, resource: Resource, amount: f32) {
        *self.balances.entry(resource).or_insert(0.0) += amount;
    }

    /// Signed adjustment, clamping the balance at zero
    pub fn adjust(&mut self, resource: Resource, delta: f32) {
        let entry = self.balances.entry(resource).or_insert(0.0);
        *entry = (*entry + delta).max(0.0);
    }

    /// First cost entry the ledger cannot cover, as (resource, required, available)
    pub fn first_shortfall(&self, cost: &[(Resource, f32)]) -> Option<(Resource, f32, f32)> {
        cost.iter()
            .find(|(res, amount)| self.get(*res) < *amount)
            .map(|(res, amount)| (*res, *amount, self.get(*res)))
    }

    /// Check the full cost vector against current balances
    pub fn can_afford(&self, cost: &[(Resource, f32)]) -> bool {
        self.first_shortfall(cost).is_none()
    }

    /// Check then debit the full cost vector; spends nothing on failure
    pub fn debit(&mut self, cost: &[(Resource, f32)]) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (res, amount) in cost {
            self.adjust(*res, -amount);
        }
        true
    }
}
