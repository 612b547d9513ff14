//! Compatibility scoring between one artwork and a search context.
//!
//! The score is a weighted blend of five sub-scores, each in `[0, 1]`, reported
//! on a 0–100 scale. Matching is case-folded substring containment throughout;
//! reason strings quote the literal token that matched.

use serde::{Deserialize, Serialize};

use super::criteria::{MatchCriteria, RoomSize};
use crate::analysis::ai_data::{AiAnalysisData, Level};
use crate::artworks::dto::ArtworkRecord;

pub const NO_ANALYSIS_REASON: &str = "No analysis data available";
pub const MAX_REASONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Style,
    Color,
    Mood,
    Size,
    Psychological,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Bucket a 0–100 score. Total over `f64`; NaN lands in `Low`.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Confidence::High
        } else if score >= 50.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubScore {
    pub value: f64,
    pub reason: Option<String>,
}

impl SubScore {
    fn hit(value: f64, reason: impl Into<String>) -> Self {
        Self { value, reason: Some(reason.into()) }
    }

    fn fallback(value: f64) -> Self {
        Self { value, reason: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub weight: f64,
    pub score: SubScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored {
    pub score: f64,
    pub reasons: Vec<String>,
}

struct Inputs<'a> {
    artwork: &'a ArtworkRecord,
    analysis: &'a AiAnalysisData,
    criteria: &'a MatchCriteria,
}

type SubScorer = fn(&Inputs<'_>) -> SubScore;

/// Evaluation order matters: reasons are kept in this order, not by magnitude.
const SCORERS: [(Dimension, f64, SubScorer); 5] = [
    (Dimension::Style, 0.25, style_score),
    (Dimension::Color, 0.30, color_score),
    (Dimension::Mood, 0.20, mood_score),
    (Dimension::Size, 0.15, size_score),
    (Dimension::Psychological, 0.10, psychological_score),
];

/// Per-dimension breakdown in evaluation order.
pub fn evaluate(
    artwork: &ArtworkRecord,
    analysis: &AiAnalysisData,
    criteria: &MatchCriteria,
) -> Vec<DimensionScore> {
    let inputs = Inputs { artwork, analysis, criteria };
    SCORERS
        .iter()
        .map(|(dimension, weight, scorer)| DimensionScore {
            dimension: *dimension,
            weight: *weight,
            score: scorer(&inputs),
        })
        .collect()
}

pub fn score(
    artwork: &ArtworkRecord,
    analysis: Option<&AiAnalysisData>,
    criteria: &MatchCriteria,
) -> Scored {
    let Some(analysis) = analysis else {
        return Scored {
            score: 0.0,
            reasons: vec![NO_ANALYSIS_REASON.to_string()],
        };
    };

    let breakdown = evaluate(artwork, analysis, criteria);
    let total: f64 = breakdown.iter().map(|d| d.score.value * d.weight).sum();
    let reasons = breakdown
        .into_iter()
        .filter_map(|d| d.score.reason)
        .take(MAX_REASONS)
        .collect();

    Scored {
        score: round2(total * 100.0),
        reasons,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Either string contains the other.
fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

fn lowered(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn any_overlap(left: &[String], right: &[String]) -> bool {
    left.iter().any(|l| right.iter().any(|r| overlaps(l, r)))
}

fn style_score(i: &Inputs<'_>) -> SubScore {
    let style = &i.analysis.style_and_genre.style;
    let artwork_style = style.to_lowercase();
    let artwork_genre = i.analysis.style_and_genre.genre.to_lowercase();
    let matches = |wanted: &str| overlaps(&artwork_style, wanted) || overlaps(&artwork_genre, wanted);

    if let Some(room) = i.criteria.room() {
        if lowered(&room.suitable_art_styles).iter().any(|s| matches(s.as_str())) {
            return SubScore::hit(1.0, format!("{} style matches your {} room", style, room.style));
        }
    }

    if let Some(text) = i.criteria.text() {
        if let Some(first) = text.styles.first() {
            if lowered(&text.styles).iter().any(|s| matches(s.as_str())) {
                return SubScore::hit(0.9, format!("Matches your {} style preference", first));
            }
        }
    }

    SubScore::fallback(0.3)
}

fn color_score(i: &Inputs<'_>) -> SubScore {
    let visual = &i.analysis.basic_visual_properties;
    let artwork_colors = lowered(&visual.dominant_colors);
    let temperature = visual.color_temperature;

    if let Some(room) = i.criteria.room() {
        if room.palette_temperature == Some(temperature) {
            let room_colors: Vec<String> =
                room.colors.iter().map(|c| c.name.to_lowercase()).collect();
            if any_overlap(&artwork_colors, &room_colors) {
                return SubScore::hit(
                    1.0,
                    format!("{} tones complement your room's color palette", temperature.as_str()),
                );
            }
            return SubScore::hit(
                0.8,
                format!("{} color temperature matches your room", temperature.as_str()),
            );
        }
    }

    if let Some(text) = i.criteria.text() {
        if let Some(first) = text.colors.first() {
            if any_overlap(&artwork_colors, &lowered(&text.colors)) {
                return SubScore::hit(0.9, format!("Features {} tones you requested", first));
            }
        }
    }

    SubScore::fallback(0.4)
}

fn mood_score(i: &Inputs<'_>) -> SubScore {
    let artwork_moods = lowered(&i.analysis.psychological_impact.mood);

    if let Some(room) = i.criteria.room() {
        let room_mood = room.mood.to_lowercase();
        if artwork_moods.iter().any(|m| overlaps(m, &room_mood)) {
            return SubScore::hit(
                1.0,
                format!("Creates a {} atmosphere matching your space", room_mood),
            );
        }
    }

    if let Some(text) = i.criteria.text() {
        if !text.mood.is_empty() {
            let query_mood = text.mood.to_lowercase();
            if artwork_moods.iter().any(|m| overlaps(m, &query_mood)) {
                return SubScore::hit(
                    0.9,
                    format!("Delivers the {} mood you're looking for", query_mood),
                );
            }
        }
    }

    SubScore::fallback(0.5)
}

fn size_score(i: &Inputs<'_>) -> SubScore {
    let artwork_size = i.analysis.space_and_display.size_recommendations.to_lowercase();
    let area = i.artwork.dimensions.area_m2();

    if let Some(room) = i.criteria.room() {
        let recommended = lowered(&room.recommended_sizes);
        if recommended.iter().any(|s| overlaps(&artwork_size, s)) {
            return SubScore::hit(
                1.0,
                format!("Perfect size for your {} room", room.room_size.as_str()),
            );
        }

        match &room.room_size {
            RoomSize::Small if area < 0.5 => {
                return SubScore::hit(0.9, "Compact size fits smaller spaces");
            }
            RoomSize::Medium if (0.5..1.5).contains(&area) => {
                return SubScore::hit(0.9, "Medium size balances your space");
            }
            RoomSize::Large if area >= 1.5 => {
                return SubScore::hit(0.9, "Large format makes a statement");
            }
            _ => {}
        }
    }

    if let Some(text) = i.criteria.text() {
        if !text.size.is_empty() {
            let query_size = text.size.to_lowercase();
            if overlaps(&artwork_size, &query_size) {
                return SubScore::hit(0.9, format!("Matches your {} size preference", query_size));
            }
        }
    }

    SubScore::fallback(0.6)
}

fn psychological_score(i: &Inputs<'_>) -> SubScore {
    let energy = i.analysis.psychological_impact.energy_level;

    if let Some(room) = i.criteria.room() {
        let room_mood = room.mood.to_lowercase();
        let calming = room_mood.contains("calm") || room_mood.contains("peaceful");
        let energetic = room_mood.contains("energetic") || room_mood.contains("vibrant");

        if calming && energy == Level::Low {
            return SubScore::hit(1.0, "Low energy creates a serene atmosphere");
        }
        if energetic && energy == Level::High {
            return SubScore::hit(1.0, "High energy adds vibrancy to your space");
        }
    }

    SubScore::fallback(0.7)
}
