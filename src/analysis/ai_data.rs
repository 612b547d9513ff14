use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTemperature {
    Warm,
    Cool,
    Neutral,
}

impl ColorTemperature {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorTemperature::Warm => "warm",
            ColorTemperature::Cool => "cool",
            ColorTemperature::Neutral => "neutral",
        }
    }

    /// Case-insensitive parse; anything outside the three literals is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "warm" => Some(ColorTemperature::Warm),
            "cool" => Some(ColorTemperature::Cool),
            "neutral" => Some(ColorTemperature::Neutral),
            _ => None,
        }
    }
}

/// Shared low/medium/high scale used by energy level and collectibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicVisualProperties {
    pub dominant_colors: Vec<String>,
    pub secondary_colors: Vec<String>,
    pub color_temperature: ColorTemperature,
    pub color_palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureAnalysis {
    pub texture_type: String,
    pub texture_description: String,
    pub surface_quality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAndGenre {
    pub style: String,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMatter {
    pub primary_subject: String,
    pub secondary_subjects: Vec<String>,
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediumAndTechnique {
    pub medium: String,
    pub technique: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub layout: String,
    pub focal_point: String,
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceAndDisplay {
    pub recommended_room_types: Vec<String>,
    pub recommended_wall_color: Vec<String>,
    pub lighting_recommendations: Vec<String>,
    pub size_recommendations: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologicalImpact {
    pub mood: Vec<String>,
    pub energy_level: Level,
    pub emotional_tone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub target_audience: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    pub collectibility: Level,
}

/// Descriptive metadata produced once per artwork by the vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisData {
    pub basic_visual_properties: BasicVisualProperties,
    pub texture_analysis: TextureAnalysis,
    pub style_and_genre: StyleAndGenre,
    pub subject_matter: SubjectMatter,
    pub medium_and_technique: MediumAndTechnique,
    pub composition: Composition,
    pub space_and_display: SpaceAndDisplay,
    pub psychological_impact: PsychologicalImpact,
    pub market_analysis: MarketAnalysis,
    pub tags: Vec<String>,
}
