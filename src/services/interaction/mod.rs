use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::config::{InteractionConfig, InteractionWeights};
use crate::models::{InteractionKind, InteractionRecord};

const SECONDS_PER_DAY: f32 = 86_400.0;

/// Time-decayed preference score for one (user, item) counter row.
///
/// Weighted counter sum, multiplied by a continuous exponential decay on
/// the days since the last interaction, multiplied by the caller-supplied
/// event weight. The decay depends on "now", so the score must be
/// recomputed at read time rather than cached indefinitely.
pub fn preference_score(
    weights: &InteractionWeights,
    decay_rate_per_day: f32,
    view_count: u32,
    cart_add_count: u32,
    search_count: u32,
    last_interaction_at: DateTime<Utc>,
    weight: f32,
    now: DateTime<Utc>,
) -> f32 {
    let weighted_sum = view_count as f32 * weights.view
        + cart_add_count as f32 * weights.cart_add
        + search_count as f32 * weights.search;

    let days_since = (now - last_interaction_at)
        .num_seconds()
        .max(0) as f32
        / SECONDS_PER_DAY;

    weighted_sum * (-decay_rate_per_day * days_since).exp() * weight
}

/// In-memory (user, item) counter table fed by the ingestion boundary.
/// Rows are created on first interaction, incremented on repeats, and
/// never deleted. Every write recomputes the score from the NEW counter
/// totals, not from the single event's weight.
pub struct InteractionLedger {
    records: DashMap<(Uuid, Uuid), InteractionRecord>,
    weights: InteractionWeights,
    decay_rate_per_day: f32,
}

impl InteractionLedger {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            records: DashMap::new(),
            weights: config.weights.clone(),
            decay_rate_per_day: config.decay_rate_per_day,
        }
    }

    /// Record one interaction event with the default event weight.
    pub fn record(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> InteractionRecord {
        self.record_weighted(user_id, item_id, kind, 1.0, now)
    }

    /// Record one interaction event, giving it `weight` times the usual
    /// influence. Upsert: the counter for `kind` is incremented (the
    /// others stay put), the timestamp advances, and the score is
    /// recomputed from the full row state.
    pub fn record_weighted(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        kind: InteractionKind,
        weight: f32,
        now: DateTime<Utc>,
    ) -> InteractionRecord {
        let mut entry = self
            .records
            .entry((user_id, item_id))
            .or_insert_with(|| {
                // First-ever interaction: placeholder score from the
                // triggering event alone, replaced by the recompute below.
                let mut record = InteractionRecord::new(user_id, item_id, now);
                record.preference_score = weight * self.weights.base_weight(kind);
                record
            });

        entry.apply(kind);
        entry.last_interaction_at = now;
        let recomputed = preference_score(
            &self.weights,
            self.decay_rate_per_day,
            entry.view_count,
            entry.cart_add_count,
            entry.search_count,
            entry.last_interaction_at,
            weight,
            now,
        );
        entry.preference_score = recomputed;

        debug!(
            user_id = %user_id,
            item_id = %item_id,
            kind = ?kind,
            score = entry.preference_score,
            "interaction recorded"
        );

        entry.clone()
    }

    /// Current score for one row, recomputed against `now`.
    pub fn score_for(&self, user_id: Uuid, item_id: Uuid, now: DateTime<Utc>) -> Option<f32> {
        self.records.get(&(user_id, item_id)).map(|record| {
            preference_score(
                &self.weights,
                self.decay_rate_per_day,
                record.view_count,
                record.cart_add_count,
                record.search_count,
                record.last_interaction_at,
                1.0,
                now,
            )
        })
    }

    /// All rows for one user, scores refreshed against `now`.
    pub fn user_history(&self, user_id: Uuid, now: DateTime<Utc>) -> Vec<InteractionRecord> {
        let mut rows: Vec<InteractionRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| self.refreshed(entry.value(), now))
            .collect();
        rows.sort_by_key(|r| r.item_id);
        rows
    }

    /// Every row in the ledger, scores refreshed against `now`, in a
    /// deterministic (user, item) order.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<InteractionRecord> {
        let mut rows: Vec<InteractionRecord> = self
            .records
            .iter()
            .map(|entry| self.refreshed(entry.value(), now))
            .collect();
        rows.sort_by_key(|r| (r.user_id, r.item_id));
        rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn refreshed(&self, record: &InteractionRecord, now: DateTime<Utc>) -> InteractionRecord {
        let mut row = record.clone();
        row.preference_score = preference_score(
            &self.weights,
            self.decay_rate_per_day,
            row.view_count,
            row.cart_add_count,
            row.search_count,
            row.last_interaction_at,
            1.0,
            now,
        );
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Duration;

    fn ledger() -> InteractionLedger {
        InteractionLedger::new(&Config::default().interaction)
    }

    #[test]
    fn test_first_interaction_inserts_counters() {
        let ledger = ledger();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();

        let record = ledger.record(user, item, InteractionKind::CartAdd, now);

        assert_eq!(record.view_count, 0);
        assert_eq!(record.cart_add_count, 1);
        assert_eq!(record.search_count, 0);
        assert_eq!(record.last_interaction_at, now);
        // Fresh interaction: decay factor is 1, score equals the cart weight.
        assert!((record.preference_score - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_recomputed_from_new_totals() {
        let ledger = ledger();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();

        ledger.record(user, item, InteractionKind::View, now);
        ledger.record(user, item, InteractionKind::Search, now);
        let record = ledger.record(user, item, InteractionKind::View, now);

        assert_eq!(record.view_count, 2);
        assert_eq!(record.search_count, 1);
        // 2 views * 1.0 + 1 search * 2.0, no decay.
        assert!((record.preference_score - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_decay_reduces_score_over_time() {
        let ledger = ledger();
        let then = Utc::now() - Duration::days(10);
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();

        ledger.record(user, item, InteractionKind::View, then);

        let fresh = ledger.score_for(user, item, then).unwrap();
        let stale = ledger.score_for(user, item, then + Duration::days(10)).unwrap();

        assert!((fresh - 1.0).abs() < 1e-6);
        let expected = (-0.1f32 * 10.0).exp();
        assert!((stale - expected).abs() < 1e-4);
        assert!(stale < fresh);
    }

    #[test]
    fn test_event_weight_scales_score() {
        let ledger = ledger();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();

        let record = ledger.record_weighted(user, item, InteractionKind::View, 2.5, now);
        assert!((record.preference_score - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_derived_kinds_share_counters() {
        let ledger = ledger();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();

        ledger.record(user, item, InteractionKind::MenuView, now);
        let record = ledger.record(user, item, InteractionKind::MenuItemCartAdd, now);

        assert_eq!(record.view_count, 1);
        assert_eq!(record.cart_add_count, 1);
    }

    #[test]
    fn test_user_history_and_snapshot() {
        let ledger = ledger();
        let now = Utc::now();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let item = Uuid::new_v4();

        ledger.record(alice, item, InteractionKind::View, now);
        ledger.record(bob, item, InteractionKind::Search, now);

        assert_eq!(ledger.user_history(alice, now).len(), 1);
        assert_eq!(ledger.snapshot(now).len(), 2);
        assert_eq!(ledger.len(), 2);
    }
}
