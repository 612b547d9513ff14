//! Background analysis workers.
//!
//! The `artwork_analyses` table doubles as the job queue: workers claim
//! `pending` rows with `SKIP LOCKED`, so any number of them can share it.

use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::ai_data::AiAnalysisData;
use super::dto::AnalysisRecord;
use super::repo;
use crate::artworks::dto::ArtworkRecord;
use crate::catalog::CatalogIndex;
use crate::state::AppState;
use crate::vision::VisionClient;

/// Fixed attempt count with linear backoff (`attempt × step`).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Run `op` until it succeeds or attempts run out; returns the last error.
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> anyhow::Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    warn!(attempt, max = self.max_attempts, error = %e, "attempt failed; retrying");
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
            }
        }
    }
}

pub struct WorkerPool {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(state: AppState) -> Self {
        let cancel = CancellationToken::new();
        let concurrency = state.config.worker.concurrency.max(1);
        info!(concurrency, "starting analysis workers");

        let handles = (0..concurrency)
            .map(|worker_id| tokio::spawn(run_worker(worker_id, state.clone(), cancel.clone())))
            .collect();
        Self { cancel, handles }
    }

    /// Signal every worker and wait for in-flight jobs to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task panicked");
            }
        }
        info!("analysis workers stopped");
    }
}

async fn run_worker(worker_id: usize, state: AppState, cancel: CancellationToken) {
    let idle = Duration::from_millis(state.config.worker.poll_interval_ms);
    debug!(worker_id, "worker started");

    while !cancel.is_cancelled() {
        match repo::claim_next(&state.db).await {
            Ok(Some(record)) => process_record(&state, record).await,
            Ok(None) => wait_or_stop(idle, &cancel).await,
            Err(e) => {
                error!(worker_id, error = %e, "failed to claim analysis job");
                wait_or_stop(idle, &cancel).await;
            }
        }
    }
    debug!(worker_id, "worker exiting");
}

async fn wait_or_stop(idle: Duration, cancel: &CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep(idle) => {}
        _ = cancel.cancelled() => {}
    }
}

/// Record writes the worker makes while processing one job.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn record_attempt(&self, id: Uuid, attempt: u32) -> anyhow::Result<()>;
    async fn record_source(
        &self,
        id: Uuid,
        image_url: &str,
        title: &str,
        studio_name: &str,
    ) -> anyhow::Result<()>;
    async fn mark_done(&self, id: Uuid, data: &AiAnalysisData) -> anyhow::Result<()>;
    async fn mark_failed(&self, id: Uuid, error: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl JobStore for PgPool {
    async fn record_attempt(&self, id: Uuid, attempt: u32) -> anyhow::Result<()> {
        repo::record_attempt(self, id, attempt).await
    }

    async fn record_source(
        &self,
        id: Uuid,
        image_url: &str,
        title: &str,
        studio_name: &str,
    ) -> anyhow::Result<()> {
        repo::record_source(self, id, image_url, title, studio_name).await
    }

    async fn mark_done(&self, id: Uuid, data: &AiAnalysisData) -> anyhow::Result<()> {
        repo::mark_done(self, id, data).await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> anyhow::Result<()> {
        repo::mark_failed(self, id, error).await
    }
}

#[instrument(skip(state, record), fields(analysis_id = %record.id, artwork_id = %record.artwork_id))]
async fn process_record(state: &AppState, record: AnalysisRecord) {
    process_job(
        &state.db,
        state.catalog.as_ref(),
        state.vision.as_ref(),
        RetryPolicy::default(),
        record.id,
        &record.artwork_id,
    )
    .await;
}

/// Run one job to a terminal state. Storing the result is part of each
/// attempt, so a failed save is retried and ends in `failed`, never stuck.
pub async fn process_job(
    store: &dyn JobStore,
    catalog: &dyn CatalogIndex,
    vision: &dyn VisionClient,
    policy: RetryPolicy,
    id: Uuid,
    artwork_id: &str,
) -> bool {
    let outcome = policy
        .run(|attempt| analyze_attempt(store, catalog, vision, id, artwork_id, attempt))
        .await;

    match outcome {
        Ok(()) => {
            info!("artwork analysed");
            true
        }
        Err(e) => {
            error!(error = %e, "analysis failed permanently");
            if let Err(store_err) = store.mark_failed(id, &e.to_string()).await {
                error!(error = %store_err, "failed to mark analysis failed");
            }
            false
        }
    }
}

async fn analyze_attempt(
    store: &dyn JobStore,
    catalog: &dyn CatalogIndex,
    vision: &dyn VisionClient,
    id: Uuid,
    artwork_id: &str,
    attempt: u32,
) -> anyhow::Result<()> {
    store.record_attempt(id, attempt).await?;

    let (artwork, image_url) = resolve_source(catalog, artwork_id).await?;
    store
        .record_source(id, &image_url, &artwork.title, &artwork.creator)
        .await?;

    let data = vision.analyze_artwork(&image_url, &artwork).await?;
    store.mark_done(id, &data).await
}

/// The catalog entry and the image that will be sent to the model.
pub async fn resolve_source(
    catalog: &dyn CatalogIndex,
    artwork_id: &str,
) -> anyhow::Result<(ArtworkRecord, String)> {
    let artwork = catalog
        .get(artwork_id)
        .await?
        .ok_or_else(|| anyhow!("Artwork {} not found in catalog", artwork_id))?;
    let image_url = artwork
        .image_urls
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("No image URL found for artwork {}", artwork_id))?;
    Ok((artwork, image_url))
}
