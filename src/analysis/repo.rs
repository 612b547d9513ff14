use anyhow::Context;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::ai_data::AiAnalysisData;
use super::dto::{AnalysisRecord, AnalysisStatus};

#[derive(Debug, FromRow)]
struct AnalysisRow {
    id: Uuid,
    artwork_id: String,
    status: String,
    analysis_date: OffsetDateTime,
    image_url: String,
    title: String,
    studio_name: String,
    ai_data: Option<serde_json::Value>,
    error: Option<String>,
    attempts: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = anyhow::Error;

    fn try_from(r: AnalysisRow) -> anyhow::Result<Self> {
        let status = r.status.parse::<AnalysisStatus>().map_err(anyhow::Error::msg)?;
        Ok(Self {
            id: r.id,
            artwork_id: r.artwork_id,
            status,
            analysis_date: r.analysis_date,
            image_url: r.image_url,
            title: r.title,
            studio_name: r.studio_name,
            ai_data: r.ai_data,
            error: r.error,
            attempts: r.attempts,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const COLUMNS: &str = "id, artwork_id, status, analysis_date, image_url, title, studio_name, \
     ai_data, error, attempts, created_at, updated_at";

fn into_records(rows: Vec<AnalysisRow>) -> anyhow::Result<Vec<AnalysisRecord>> {
    rows.into_iter().map(AnalysisRecord::try_from).collect()
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<AnalysisRecord>> {
    let row = sqlx::query_as::<_, AnalysisRow>(&format!(
        "SELECT {} FROM artwork_analyses WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find analysis by id")?;
    row.map(AnalysisRecord::try_from).transpose()
}

pub async fn find_by_artwork(
    db: &PgPool,
    artwork_id: &str,
) -> anyhow::Result<Option<AnalysisRecord>> {
    let row = sqlx::query_as::<_, AnalysisRow>(&format!(
        "SELECT {} FROM artwork_analyses WHERE artwork_id = $1",
        COLUMNS
    ))
    .bind(artwork_id)
    .fetch_optional(db)
    .await
    .context("find analysis by artwork")?;
    row.map(AnalysisRecord::try_from).transpose()
}

/// Queue an artwork for analysis.
///
/// Returns the record id, or `None` when the artwork is already analysed.
pub async fn enqueue(db: &PgPool, artwork_id: &str) -> anyhow::Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO artwork_analyses (artwork_id, status, source, analysis_version)
        VALUES ($1, 'pending', 'catalog', 1)
        ON CONFLICT (artwork_id) DO UPDATE
           SET status = 'pending', error = NULL, attempts = 0, updated_at = now()
         WHERE artwork_analyses.status <> 'done'
        RETURNING id
        "#,
    )
    .bind(artwork_id)
    .fetch_optional(db)
    .await
    .with_context(|| format!("enqueue analysis for {}", artwork_id))?;
    Ok(id)
}

/// Put a record back in the queue regardless of its state.
pub async fn reset_to_pending(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE artwork_analyses
           SET status = 'pending', error = NULL, attempts = 0, updated_at = now()
         WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await
    .context("reset analysis to pending")?;
    Ok(res.rows_affected() > 0)
}

/// Claim the oldest pending record for processing. Safe across concurrent workers.
pub async fn claim_next(db: &PgPool) -> anyhow::Result<Option<AnalysisRecord>> {
    let row = sqlx::query_as::<_, AnalysisRow>(&format!(
        r#"
        UPDATE artwork_analyses
           SET status = 'processing', updated_at = now()
         WHERE id = (
                SELECT id FROM artwork_analyses
                 WHERE status = 'pending'
                 ORDER BY updated_at ASC
                 FOR UPDATE SKIP LOCKED
                 LIMIT 1)
        RETURNING {}
        "#,
        COLUMNS
    ))
    .fetch_optional(db)
    .await
    .context("claim next analysis")?;
    row.map(AnalysisRecord::try_from).transpose()
}

/// Records left in `processing` by a previous run go back to the queue.
pub async fn requeue_stale(db: &PgPool) -> anyhow::Result<u64> {
    let res = sqlx::query(
        "UPDATE artwork_analyses SET status = 'pending', updated_at = now() WHERE status = 'processing'",
    )
    .execute(db)
    .await
    .context("requeue stale analyses")?;
    Ok(res.rows_affected())
}

pub async fn record_attempt(db: &PgPool, id: Uuid, attempt: u32) -> anyhow::Result<()> {
    sqlx::query(
        "UPDATE artwork_analyses SET status = 'processing', attempts = $2, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(attempt as i32)
    .execute(db)
    .await
    .context("record analysis attempt")?;
    Ok(())
}

pub async fn record_source(
    db: &PgPool,
    id: Uuid,
    image_url: &str,
    title: &str,
    studio_name: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE artwork_analyses
           SET image_url = $2, title = $3, studio_name = $4, updated_at = now()
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(image_url)
    .bind(title)
    .bind(studio_name)
    .execute(db)
    .await
    .context("record analysis source")?;
    Ok(())
}

pub async fn mark_done(db: &PgPool, id: Uuid, data: &AiAnalysisData) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE artwork_analyses
           SET status = 'done', ai_data = $2, error = NULL,
               analysis_date = now(), updated_at = now()
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Json(data))
    .execute(db)
    .await
    .context("mark analysis done")?;
    Ok(())
}

pub async fn mark_failed(db: &PgPool, id: Uuid, error: &str) -> anyhow::Result<()> {
    sqlx::query(
        "UPDATE artwork_analyses SET status = 'failed', error = $2, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(error)
    .execute(db)
    .await
    .context("mark analysis failed")?;
    Ok(())
}

pub async fn count_by_status(db: &PgPool) -> anyhow::Result<Vec<(AnalysisStatus, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM artwork_analyses GROUP BY status",
    )
    .fetch_all(db)
    .await
    .context("count analyses by status")?;

    rows.into_iter()
        .map(|(s, n)| Ok((s.parse::<AnalysisStatus>().map_err(anyhow::Error::msg)?, n)))
        .collect()
}

pub async fn list(
    db: &PgPool,
    status: Option<AnalysisStatus>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<(Vec<AnalysisRecord>, i64)> {
    let status = status.map(AnalysisStatus::as_str);

    let rows = sqlx::query_as::<_, AnalysisRow>(&format!(
        r#"
        SELECT {} FROM artwork_analyses
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#,
        COLUMNS
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list analyses")?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM artwork_analyses WHERE ($1::text IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(db)
    .await
    .context("count analyses")?;

    Ok((into_records(rows)?, total))
}

pub async fn list_done(db: &PgPool) -> anyhow::Result<Vec<AnalysisRecord>> {
    let rows = sqlx::query_as::<_, AnalysisRow>(&format!(
        "SELECT {} FROM artwork_analyses WHERE status = 'done' ORDER BY created_at DESC",
        COLUMNS
    ))
    .fetch_all(db)
    .await
    .context("list done analyses")?;
    into_records(rows)
}

/// `(artwork_id, ai_data)` for completed analyses that carry data.
pub async fn list_done_with_data(
    db: &PgPool,
    limit: i64,
) -> anyhow::Result<Vec<(String, serde_json::Value)>> {
    let rows: Vec<(String, serde_json::Value)> = sqlx::query_as(
        r#"
        SELECT artwork_id, ai_data FROM artwork_analyses
         WHERE status = 'done' AND ai_data IS NOT NULL
         ORDER BY analysis_date DESC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
    .context("list analysed artworks")?;
    Ok(rows)
}
