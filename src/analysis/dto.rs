use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Done,
    Failed,
}

impl AnalysisStatus {
    pub const ALL: [AnalysisStatus; 4] = [
        AnalysisStatus::Pending,
        AnalysisStatus::Processing,
        AnalysisStatus::Done,
        AnalysisStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Done => "done",
            AnalysisStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown analysis status: {}", s))
    }
}

/// Stored analysis record as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub artwork_id: String,
    pub status: AnalysisStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub analysis_date: OffsetDateTime,
    pub image_url: String,
    pub title: String,
    pub studio_name: String,
    pub ai_data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub attempts: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAnalysis {
    pub id: Uuid,
    pub artwork_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub analysis_date: OffsetDateTime,
    pub image_url: String,
    pub title: String,
    pub studio_name: String,
    pub ai_data: Option<serde_json::Value>,
}

impl From<AnalysisRecord> for ExportedAnalysis {
    fn from(r: AnalysisRecord) -> Self {
        Self {
            id: r.id,
            artwork_id: r.artwork_id,
            analysis_date: r.analysis_date,
            image_url: r.image_url,
            title: r.title,
            studio_name: r.studio_name,
            ai_data: r.ai_data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueRequest {
    pub artwork_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub success: bool,
    pub enqueued: usize,
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub done: i64,
    pub failed: i64,
    pub success_rate: f64,
}

impl AnalysisStats {
    pub fn from_counts(counts: impl IntoIterator<Item = (AnalysisStatus, i64)>) -> Self {
        let mut stats = Self::default();
        for (status, n) in counts {
            match status {
                AnalysisStatus::Pending => stats.pending += n,
                AnalysisStatus::Processing => stats.processing += n,
                AnalysisStatus::Done => stats.done += n,
                AnalysisStatus::Failed => stats.failed += n,
            }
        }
        stats.total = stats.pending + stats.processing + stats.done + stats.failed;
        if stats.total > 0 {
            let rate = stats.done as f64 / stats.total as f64 * 100.0;
            stats.success_rate = (rate * 100.0).round() / 100.0;
        }
        stats
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 50 }

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub results: Vec<AnalysisRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
