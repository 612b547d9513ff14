use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::analysis::ai_data::ColorTemperature;

/// Room size as reported by the vision model. Anything outside the three
/// known sizes keeps the model's own wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomSize {
    Small,
    Medium,
    Large,
    Other(String),
}

impl RoomSize {
    pub fn as_str(&self) -> &str {
        match self {
            RoomSize::Small => "small",
            RoomSize::Medium => "medium",
            RoomSize::Large => "large",
            RoomSize::Other(raw) => raw,
        }
    }
}

impl From<String> for RoomSize {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "small" => RoomSize::Small,
            "medium" => RoomSize::Medium,
            "large" => RoomSize::Large,
            _ => RoomSize::Other(raw),
        }
    }
}

impl From<RoomSize> for String {
    fn from(size: RoomSize) -> Self {
        match size {
            RoomSize::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomColor {
    pub name: String,
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub pct: f64,
}

/// What the vision model saw in the user's room photo.
///
/// Every field tolerates absence: room analyses are not schema-checked the way
/// artwork analyses are, so a sparse answer degrades to fallback scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAnalysis {
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub colors: Vec<RoomColor>,
    #[serde(default)]
    pub lighting: String,
    #[serde(default = "unknown_room_size")]
    pub room_size: RoomSize,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub suitable_art_styles: Vec<String>,
    #[serde(default)]
    pub recommended_sizes: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_temperature",
        skip_serializing_if = "Option::is_none"
    )]
    pub palette_temperature: Option<ColorTemperature>,
}

fn unknown_room_size() -> RoomSize {
    RoomSize::Other("unknown".into())
}

fn lenient_temperature<'de, D>(deserializer: D) -> Result<Option<ColorTemperature>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ColorTemperature::parse))
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

/// Structured reading of a free-text search phrase.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextQueryCriteria {
    pub styles: Vec<String>,
    pub colors: Vec<String>,
    pub mood: String,
    pub size: String,
    pub medium: String,
    pub price_range: PriceRange,
    pub context: String,
}

#[derive(Debug, Error)]
#[error("either roomAnalysis or textCriteria must be provided")]
pub struct EmptyCriteria;

/// Search context for one scoring pass. At least one side is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatchCriteriaParts", into = "MatchCriteriaParts")]
pub enum MatchCriteria {
    Room(RoomAnalysis),
    Text(TextQueryCriteria),
    Both {
        room: RoomAnalysis,
        text: TextQueryCriteria,
    },
}

impl MatchCriteria {
    pub fn from_parts(
        room: Option<RoomAnalysis>,
        text: Option<TextQueryCriteria>,
    ) -> Option<Self> {
        match (room, text) {
            (Some(room), Some(text)) => Some(MatchCriteria::Both { room, text }),
            (Some(room), None) => Some(MatchCriteria::Room(room)),
            (None, Some(text)) => Some(MatchCriteria::Text(text)),
            (None, None) => None,
        }
    }

    pub fn room(&self) -> Option<&RoomAnalysis> {
        match self {
            MatchCriteria::Room(room) | MatchCriteria::Both { room, .. } => Some(room),
            MatchCriteria::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&TextQueryCriteria> {
        match self {
            MatchCriteria::Text(text) | MatchCriteria::Both { text, .. } => Some(text),
            MatchCriteria::Room(_) => None,
        }
    }
}

/// Wire shape of [`MatchCriteria`]: two independently optional halves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCriteriaParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_analysis: Option<RoomAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_criteria: Option<TextQueryCriteria>,
}

impl TryFrom<MatchCriteriaParts> for MatchCriteria {
    type Error = EmptyCriteria;

    fn try_from(parts: MatchCriteriaParts) -> Result<Self, Self::Error> {
        MatchCriteria::from_parts(parts.room_analysis, parts.text_criteria).ok_or(EmptyCriteria)
    }
}

impl From<MatchCriteria> for MatchCriteriaParts {
    fn from(criteria: MatchCriteria) -> Self {
        match criteria {
            MatchCriteria::Room(room) => Self {
                room_analysis: Some(room),
                text_criteria: None,
            },
            MatchCriteria::Text(text) => Self {
                room_analysis: None,
                text_criteria: Some(text),
            },
            MatchCriteria::Both { room, text } => Self {
                room_analysis: Some(room),
                text_criteria: Some(text),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_parts_requires_one_side() {
        assert!(MatchCriteria::from_parts(None, None).is_none());

        let text = MatchCriteria::from_parts(None, Some(TextQueryCriteria::default())).unwrap();
        assert!(text.room().is_none());
        assert!(text.text().is_some());

        let both = MatchCriteria::from_parts(
            Some(fixtures::room("modern", "calm", RoomSize::Small)),
            Some(TextQueryCriteria::default()),
        )
        .unwrap();
        assert!(both.room().is_some() && both.text().is_some());
    }

    #[test]
    fn deserialize_rejects_empty_object() {
        let err = serde_json::from_value::<MatchCriteria>(json!({})).unwrap_err();
        assert!(err.to_string().contains("either roomAnalysis or textCriteria"));
    }

    #[test]
    fn serializes_only_present_halves() {
        let criteria = MatchCriteria::Text(TextQueryCriteria {
            styles: vec!["abstract".into()],
            ..Default::default()
        });
        let json = serde_json::to_value(&criteria).unwrap();
        assert!(json.get("roomAnalysis").is_none());
        assert_eq!(json["textCriteria"]["styles"][0], "abstract");
    }

    #[test]
    fn room_analysis_tolerates_unexpected_values() {
        let room: RoomAnalysis = serde_json::from_value(json!({
            "style": "industrial",
            "roomSize": "enormous",
            "paletteTemperature": "lukewarm",
            "colors": [{"name": "grey", "hex": "#888888", "pct": 60}]
        }))
        .unwrap();
        assert_eq!(room.room_size, RoomSize::Other("enormous".into()));
        assert_eq!(room.room_size.as_str(), "enormous");
        assert_eq!(room.palette_temperature, None);
        assert_eq!(room.colors[0].name, "grey");
        assert!(room.suitable_art_styles.is_empty());
    }

    #[test]
    fn room_analysis_parses_model_output() {
        let room: RoomAnalysis = serde_json::from_value(json!({
            "style": "modern",
            "colors": [{"name": "Red", "hex": "#f00", "pct": 40}],
            "lighting": "bright",
            "roomSize": "large",
            "mood": "energetic",
            "suitableArtStyles": ["abstract"],
            "recommendedSizes": ["large"],
            "paletteTemperature": "Warm"
        }))
        .unwrap();
        assert_eq!(room.room_size, RoomSize::Large);
        assert_eq!(room.palette_temperature, Some(ColorTemperature::Warm));
    }

    #[test]
    fn room_size_round_trips_raw_wording() {
        let room: RoomAnalysis = serde_json::from_value(json!({"roomSize": " Medium "})).unwrap();
        assert_eq!(room.room_size, RoomSize::Medium);

        let room: RoomAnalysis = serde_json::from_value(json!({"style": "loft"})).unwrap();
        assert_eq!(room.room_size.as_str(), "unknown");

        let json = serde_json::to_value(RoomSize::Other("open plan".into())).unwrap();
        assert_eq!(json, "open plan");
        assert_eq!(serde_json::to_value(RoomSize::Large).unwrap(), "large");
    }

    #[test]
    fn text_criteria_fills_missing_fields() {
        let text: TextQueryCriteria =
            serde_json::from_value(json!({"mood": "calm", "priceRange": {"max": 500}})).unwrap();
        assert_eq!(text.mood, "calm");
        assert!(text.styles.is_empty());
        assert_eq!(text.price_range, PriceRange { min: 0.0, max: 500.0 });
    }
}
