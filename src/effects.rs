//! Side-effect dispatcher
//!
//! State-changing operations queue their second-order effects while they
//! run, then flush the queue to the registered sink only after the store
//! mutation has committed. Failed operations drop the queue unfired.
//! Delivery order is fixed: production consumption, display refresh,
//! tension shift, relationship deltas.

use tracing::debug;

use crate::core::types::NationId;

/// Notifier callbacks consumed by external subsystems. All optional,
/// best-effort; default impls do nothing.
pub trait EffectSink {
    fn production_consumed(&mut self, _nation: &NationId, _amount: f32) {}
    fn display_refresh(&mut self) {}
    fn tension_shift(&mut self, _delta: i32) {}
    fn relationship_delta(&mut self, _a: &NationId, _b: &NationId, _delta: f32, _reason: &str) {}
}

/// Effects accumulated during one operation, awaiting commit
#[derive(Debug, Default)]
pub struct PendingEffects {
    production: Vec<(NationId, f32)>,
    refresh: bool,
    tension: Vec<i32>,
    relationships: Vec<(NationId, NationId, f32, String)>,
}

impl PendingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume_production(&mut self, nation: &NationId, amount: f32) {
        self.production.push((nation.clone(), amount));
    }

    pub fn request_refresh(&mut self) {
        self.refresh = true;
    }

    pub fn shift_tension(&mut self, delta: i32) {
        self.tension.push(delta);
    }

    pub fn adjust_relationship(
        &mut self,
        a: &NationId,
        b: &NationId,
        delta: f32,
        reason: impl Into<String>,
    ) {
        self.relationships
            .push((a.clone(), b.clone(), delta, reason.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.production.is_empty()
            && !self.refresh
            && self.tension.is_empty()
            && self.relationships.is_empty()
    }

    /// Deliver everything queued, in the fixed order, then reset
    pub fn flush(&mut self, sink: Option<&mut (dyn EffectSink + '_)>) {
        let Some(sink) = sink else {
            self.discard();
            return;
        };
        for (nation, amount) in self.production.drain(..) {
            sink.production_consumed(&nation, amount);
        }
        if std::mem::take(&mut self.refresh) {
            sink.display_refresh();
        }
        for delta in self.tension.drain(..) {
            sink.tension_shift(delta);
        }
        for (a, b, delta, reason) in self.relationships.drain(..) {
            sink.relationship_delta(&a, &b, delta, &reason);
        }
    }

    /// Drop everything queued without firing (operation failed)
    pub fn discard(&mut self) {
        self.production.clear();
        self.refresh = false;
        self.tension.clear();
        self.relationships.clear();
    }
}

/// Sink that forwards every effect to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingSink;

impl EffectSink for TracingSink {
    fn production_consumed(&mut self, nation: &NationId, amount: f32) {
        debug!(nation = %nation, amount, "production consumed");
    }

    fn display_refresh(&mut self) {
        debug!("display refresh requested");
    }

    fn tension_shift(&mut self, delta: i32) {
        debug!(delta, "global tension shift");
    }

    fn relationship_delta(&mut self, a: &NationId, b: &NationId, delta: f32, reason: &str) {
        debug!(a = %a, b = %b, delta, reason, "relationship delta");
    }
}
