use serde::Serialize;

use super::criteria::MatchCriteria;
use super::scorer::{score, Confidence};
use crate::analysis::ai_data::AiAnalysisData;
use crate::artworks::dto::ArtworkRecord;

/// One catalog artwork paired with its analysis, if it has completed one.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub artwork: ArtworkRecord,
    pub analysis: Option<AiAnalysisData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub artwork_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub confidence: Confidence,
    pub artwork: ArtworkRecord,
    pub analysis: Option<AiAnalysisData>,
}

impl MatchResult {
    pub fn build(
        artwork: ArtworkRecord,
        analysis: Option<AiAnalysisData>,
        criteria: &MatchCriteria,
    ) -> Self {
        let scored = score(&artwork, analysis.as_ref(), criteria);
        Self {
            artwork_id: artwork.id.clone(),
            score: scored.score,
            reasons: scored.reasons,
            confidence: Confidence::from_score(scored.score),
            artwork,
            analysis,
        }
    }
}

/// Score every analysed candidate and return the best `limit`, highest first.
///
/// Candidates without analysis are dropped, not zero-scored. Equal scores keep
/// their input order.
pub fn rank(
    criteria: &MatchCriteria,
    candidates: impl IntoIterator<Item = Candidate>,
    limit: usize,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = candidates
        .into_iter()
        .filter(|c| c.analysis.is_some())
        .map(|c| MatchResult::build(c.artwork, c.analysis, criteria))
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);
    results
}
