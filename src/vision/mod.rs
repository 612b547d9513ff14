//! Vision/text model seam: turns room photos, search phrases and artwork
//! images into structured data.

mod openai;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

use crate::analysis::ai_data::AiAnalysisData;
use crate::analysis::validate::AnalysisDataError;
use crate::artworks::dto::ArtworkRecord;
use crate::matching::{RoomAnalysis, TextQueryCriteria};

pub use openai::OpenAiVision;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("OPENAI_API_KEY is required for AI features")]
    MissingApiKey,
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("no response from AI")]
    EmptyResponse,
    #[error("failed to parse AI response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    InvalidAnalysis(#[from] AnalysisDataError),
}

/// Image handed to the model, either by URL or inline.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(String),
    Base64Jpeg(String),
}

impl ImageSource {
    /// URL form accepted by chat-completions image parts.
    pub fn to_url(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Base64Jpeg(data) => format!("data:image/jpeg;base64,{}", data),
        }
    }
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn analyze_room(&self, image: &ImageSource) -> Result<RoomAnalysis, VisionError>;
    async fn analyze_text_query(&self, query: &str) -> Result<TextQueryCriteria, VisionError>;
    async fn analyze_artwork(
        &self,
        image_url: &str,
        artwork: &ArtworkRecord,
    ) -> Result<AiAnalysisData, VisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_images_become_data_urls() {
        assert_eq!(
            ImageSource::Base64Jpeg("AAAA".into()).to_url(),
            "data:image/jpeg;base64,AAAA"
        );
        assert_eq!(
            ImageSource::Url("https://x.test/room.jpg".into()).to_url(),
            "https://x.test/room.jpg"
        );
    }
}
