use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::algorithms::HybridRanker;
use crate::config::Config;
use crate::models::{InteractionRecord, MenuItem, Rating, RecommendationResponse};
use crate::services::interaction::InteractionLedger;
use crate::utils::validation;

/// Row source implemented by the surrounding CRUD layer. The engine only
/// ever sees already-fetched in-memory rows; fetch failures propagate to
/// the caller as-is.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn menu_items(&self) -> Result<Vec<MenuItem>>;
    async fn ratings(&self) -> Result<Vec<Rating>>;
    async fn interactions(&self) -> Result<Vec<InteractionRecord>>;
}

/// Reference store backed by process memory, used by tests and demos.
pub struct InMemoryStore {
    items: RwLock<Vec<MenuItem>>,
    ratings: RwLock<HashMap<(Uuid, Uuid), Rating>>,
    ledger: Arc<InteractionLedger>,
}

impl InMemoryStore {
    pub fn new(ledger: Arc<InteractionLedger>) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            ratings: RwLock::new(HashMap::new()),
            ledger,
        }
    }

    pub async fn add_menu_item(&self, item: MenuItem) {
        self.items.write().await.push(item);
    }

    /// Insert-or-overwrite: at most one rating per (user, item).
    pub async fn upsert_rating(&self, rating: Rating) -> Result<()> {
        validation::validate_rating(&rating)?;
        self.ratings
            .write()
            .await
            .insert((rating.user_id, rating.item_id), rating);
        Ok(())
    }

    pub fn ledger(&self) -> &InteractionLedger {
        &self.ledger
    }
}

#[async_trait]
impl RecommendationStore for InMemoryStore {
    async fn menu_items(&self) -> Result<Vec<MenuItem>> {
        Ok(self.items.read().await.clone())
    }

    async fn ratings(&self) -> Result<Vec<Rating>> {
        let mut rows: Vec<Rating> = self.ratings.read().await.values().cloned().collect();
        rows.sort_by_key(|r| (r.user_id, r.item_id));
        Ok(rows)
    }

    async fn interactions(&self) -> Result<Vec<InteractionRecord>> {
        Ok(self.ledger.snapshot(Utc::now()))
    }
}

/// Per-request orchestration: fetch rows, validate at the boundary, run
/// the ranker, log the outcome. No state survives between requests: the
/// rating and similarity matrices are rebuilt from scratch every call.
pub struct RecommendationService {
    store: Arc<dyn RecommendationStore>,
    ranker: HybridRanker,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn RecommendationStore>, config: Arc<Config>) -> Self {
        Self {
            ranker: HybridRanker::new(&config),
            store,
            config,
        }
    }

    pub async fn recommend(&self, user_id: Uuid) -> Result<RecommendationResponse> {
        let (catalog, ratings, interactions) = self.fetch_rows().await?;

        let response = self
            .ranker
            .rank(user_id, &catalog, &interactions, &ratings)?;

        info!(
            user_id = %user_id,
            kind = ?response.kind,
            count = response.items.len(),
            "recommendations generated"
        );

        Ok(response)
    }

    pub async fn recommend_collaborative(&self, user_id: Uuid) -> Result<RecommendationResponse> {
        let (catalog, ratings, _) = self.fetch_rows().await?;

        let response = self
            .ranker
            .recommend_collaborative(user_id, &catalog, &ratings)?;

        info!(
            user_id = %user_id,
            kind = ?response.kind,
            count = response.items.len(),
            "collaborative recommendations generated"
        );

        Ok(response)
    }

    async fn fetch_rows(&self) -> Result<(Vec<MenuItem>, Vec<Rating>, Vec<InteractionRecord>)> {
        let (catalog, ratings, interactions) = futures::try_join!(
            self.store.menu_items(),
            self.store.ratings(),
            self.store.interactions()
        )?;

        // The similarity build is O(items^2 x users); refuse catalogs the
        // configured ceiling says are too large to score synchronously.
        if catalog.len() > self.config.catalog.max_items {
            bail!(
                "catalog has {} items, over the configured ceiling of {}",
                catalog.len(),
                self.config.catalog.max_items
            );
        }

        for item in &catalog {
            validation::validate_menu_item(item)?;
        }
        for rating in &ratings {
            validation::validate_rating(rating)?;
        }
        for record in &interactions {
            validation::validate_interaction_record(record)?;
        }

        Ok((catalog, ratings, interactions))
    }
}
