use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::analysis::{repo, validate::validate_value};
use crate::artworks::dto::ArtworkRecord;
use crate::matching::{rank, Candidate, MatchCriteria, MatchResult};
use crate::state::AppState;

/// Load analysed artworks and rank them against `criteria`.
pub async fn get_matched_artworks(
    state: &AppState,
    criteria: &MatchCriteria,
    limit: usize,
) -> anyhow::Result<Vec<MatchResult>> {
    // over-fetch; some analyses will not resolve to a catalog entry
    let analyses = repo::list_done_with_data(&state.db, (limit * 2) as i64).await?;
    let ids: Vec<String> = analyses.iter().map(|(id, _)| id.clone()).collect();

    let artworks = match state.catalog.get_many(&ids).await {
        Ok(a) => a,
        Err(e) => {
            error!(error = ?e, "failed to fetch artworks from catalog");
            Vec::new()
        }
    };

    Ok(match_candidates(criteria, analyses, artworks, limit))
}

/// Pair stored analyses with their artworks and rank them.
///
/// Analyses whose artwork is missing, or whose stored data no longer
/// validates, are skipped. Candidate order follows `analyses`.
pub fn match_candidates(
    criteria: &MatchCriteria,
    analyses: Vec<(String, Value)>,
    artworks: Vec<ArtworkRecord>,
    limit: usize,
) -> Vec<MatchResult> {
    let mut by_id: HashMap<String, ArtworkRecord> =
        artworks.into_iter().map(|a| (a.id.clone(), a)).collect();

    let candidates: Vec<Candidate> = analyses
        .into_iter()
        .filter_map(|(artwork_id, data)| {
            let Some(artwork) = by_id.remove(&artwork_id) else {
                debug!(%artwork_id, "analysed artwork missing from catalog");
                return None;
            };
            match validate_value(data) {
                Ok(analysis) => Some(Candidate {
                    artwork,
                    analysis: Some(analysis),
                }),
                Err(e) => {
                    warn!(%artwork_id, error = %e, "stored analysis is invalid; skipping");
                    None
                }
            }
        })
        .collect();

    rank(criteria, candidates, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ai_data::fixtures::sample_analysis;
    use crate::artworks::dto::fixtures::artwork;
    use crate::matching::criteria::{fixtures::room, RoomSize};
    use crate::matching::TextQueryCriteria;
    use serde_json::json;

    fn stored(id: &str, style: &str) -> (String, Value) {
        let mut a = sample_analysis();
        a.style_and_genre.style = style.into();
        (id.to_string(), serde_json::to_value(a).unwrap())
    }

    fn abstract_room() -> MatchCriteria {
        let mut r = room("modern", "", RoomSize::Medium);
        r.suitable_art_styles = vec!["abstract".into()];
        MatchCriteria::Room(r)
    }

    #[test]
    fn drops_missing_artworks_and_invalid_data() {
        let analyses = vec![
            stored("a1", "Figurative"),
            stored("ghost", "Abstract"),
            ("bad".to_string(), json!({ "tags": [] })),
            stored("a2", "Abstract"),
        ];
        let artworks = vec![
            artwork("a2", 60.0, 60.0),
            artwork("bad", 60.0, 60.0),
            artwork("a1", 60.0, 60.0),
        ];

        let results = match_candidates(&abstract_room(), analyses, artworks, 10);
        let ids: Vec<_> = results.iter().map(|r| r.artwork_id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
        assert!(results[0].score > results[1].score);
        assert!(results.iter().all(|r| r.analysis.is_some()));
    }

    #[test]
    fn respects_limit() {
        let analyses = vec![stored("a1", "Abstract"), stored("a2", "Abstract")];
        let artworks = vec![artwork("a1", 60.0, 60.0), artwork("a2", 60.0, 60.0)];
        let results = match_candidates(
            &MatchCriteria::Text(TextQueryCriteria::default()),
            analyses,
            artworks,
            1,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].artwork_id, "a1");
    }

    #[test]
    fn empty_store_yields_nothing() {
        assert!(match_candidates(&abstract_room(), vec![], vec![artwork("a1", 1.0, 1.0)], 5).is_empty());
    }
}
