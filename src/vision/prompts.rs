use crate::artworks::dto::ArtworkRecord;

pub const ROOM_SYSTEM: &str = r##"You are an expert interior designer and art consultant. Analyze room photos and extract structured data about the space. Return ONLY valid JSON matching this schema:
{
  "style": "modern|traditional|minimalist|industrial|etc",
  "colors": [{"name": "color name", "hex": "#hexcode", "pct": 0-100}],
  "lighting": "bright|dim|natural|artificial",
  "roomSize": "small|medium|large",
  "mood": "calming|energetic|cozy|sophisticated|etc",
  "suitableArtStyles": ["abstract", "contemporary", "etc"],
  "recommendedSizes": ["small", "medium", "large"],
  "paletteTemperature": "warm|cool|neutral"
}"##;

pub const ROOM_USER: &str =
    "Analyze this room photo and extract the room characteristics in JSON format.";

pub const TEXT_QUERY_SYSTEM: &str = r#"You are an art recommendation assistant. Extract search criteria from user queries. Return ONLY valid JSON matching this schema:
{
  "styles": ["abstract", "contemporary", "etc"],
  "colors": ["blue", "red", "etc"],
  "mood": "calming|energetic|etc",
  "size": "small|medium|large",
  "medium": "painting|print|photography|etc",
  "priceRange": {"min": 0, "max": 10000},
  "context": "office|living room|bedroom|etc"
}"#;

const ARTWORK_SCHEMA: &str = r#"{
  "basicVisualProperties": {
    "dominantColors": ["color1", "color2"],
    "secondaryColors": ["color1", "color2"],
    "colorTemperature": "warm" | "cool" | "neutral",
    "colorPalette": ["color1", "color2"]
  },
  "textureAnalysis": {
    "textureType": "description",
    "textureDescription": "detailed description",
    "surfaceQuality": "description"
  },
  "styleAndGenre": {
    "style": "art style",
    "genre": "genre",
    "movement": "art movement (optional)",
    "period": "time period (optional)"
  },
  "subjectMatter": {
    "primarySubject": "main subject",
    "secondarySubjects": ["subject1", "subject2"],
    "themes": ["theme1", "theme2"],
    "narrative": "narrative description (optional)"
  },
  "mediumAndTechnique": {
    "medium": "medium type",
    "technique": "technique used",
    "materials": ["material1", "material2"]
  },
  "composition": {
    "layout": "layout description",
    "focalPoint": "focal point description",
    "balance": "balance description",
    "perspective": "perspective (optional)"
  },
  "spaceAndDisplay": {
    "recommendedRoomTypes": ["room1", "room2"],
    "recommendedWallColor": ["color1", "color2"],
    "lightingRecommendations": ["recommendation1"],
    "sizeRecommendations": "size recommendation"
  },
  "psychologicalImpact": {
    "mood": ["mood1", "mood2"],
    "energyLevel": "low" | "medium" | "high",
    "emotionalTone": "emotional tone description"
  },
  "marketAnalysis": {
    "targetAudience": ["audience1", "audience2"],
    "priceRange": "price range (optional)",
    "collectibility": "low" | "medium" | "high"
  },
  "tags": ["tag1", "tag2", "tag3"]
}"#;

pub fn artwork_prompt(artwork: &ArtworkRecord) -> String {
    let title = non_empty_or(&artwork.title, "Unknown");
    let creator = non_empty_or(&artwork.creator, "Unknown");
    format!(
        "Analyze this artwork image and provide a comprehensive analysis in JSON format. \
         The artwork title is \"{title}\" by \"{creator}\".\n\n\
         Return a JSON object with the following structure:\n{ARTWORK_SCHEMA}\n\n\
         Be thorough and detailed in your analysis. Return ONLY valid JSON, no markdown formatting."
    )
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artworks::dto::fixtures::artwork;

    #[test]
    fn room_prompt_carries_full_schema() {
        assert!(ROOM_SYSTEM.contains(r##""hex": "#hexcode""##));
        assert!(ROOM_SYSTEM.contains("\"paletteTemperature\""));
        assert!(ROOM_SYSTEM.ends_with('}'));
        assert!(TEXT_QUERY_SYSTEM.contains("\"priceRange\""));
    }

    #[test]
    fn artwork_prompt_names_the_piece() {
        let prompt = artwork_prompt(&artwork("p1", 10.0, 10.0));
        assert!(prompt.contains("\"Untitled p1\" by \"Studio Nord\""));
        assert!(prompt.contains("\"energyLevel\""));
    }

    #[test]
    fn artwork_prompt_handles_blank_metadata() {
        let mut art = artwork("p2", 10.0, 10.0);
        art.title = "  ".into();
        art.creator.clear();
        assert!(artwork_prompt(&art).contains("\"Unknown\" by \"Unknown\""));
    }
}
