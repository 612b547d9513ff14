use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::{MatchCriteria, MatchResult, RoomAnalysis, TextQueryCriteria};
use crate::vision::ImageSource;

fn is_valid_url(url: &str) -> bool {
    lazy_static! {
        static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/?#]+[^\s]*$").unwrap();
    }
    URL_RE.is_match(url)
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct TextSearchRequest {
    #[serde(default)]
    pub query: String,
}

impl TextSearchRequest {
    pub fn query(&self) -> Result<&str, String> {
        let q = self.query.trim();
        if q.is_empty() {
            return Err("query must not be empty".into());
        }
        Ok(q)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSearchRequest {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
}

impl ImageSearchRequest {
    /// The image to analyse; inline data wins over a URL when both are given.
    /// `Ok(None)` when the request carries no image at all.
    pub fn image(&self) -> Result<Option<ImageSource>, String> {
        if let Some(url) = non_blank(&self.image_url) {
            if !is_valid_url(url) {
                return Err("imageUrl must be a valid http(s) URL".into());
            }
        }
        if let Some(data) = non_blank(&self.image_base64) {
            return Ok(Some(ImageSource::Base64Jpeg(data.to_string())));
        }
        Ok(non_blank(&self.image_url).map(|url| ImageSource::Url(url.to_string())))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSearchRequest {
    pub query: Option<String>,
    #[serde(flatten)]
    pub image: ImageSearchRequest,
}

impl CombinedSearchRequest {
    pub fn query(&self) -> Option<&str> {
        non_blank(&self.query)
    }
}

#[derive(Debug, Serialize)]
pub struct TextSearchResponse {
    pub success: bool,
    pub criteria: TextQueryCriteria,
    pub results: Vec<MatchResult>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSearchResponse {
    pub success: bool,
    pub room_analysis: RoomAnalysis,
    pub results: Vec<MatchResult>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CombinedSearchResponse {
    pub success: bool,
    pub criteria: MatchCriteria,
    pub results: Vec<MatchResult>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_check() {
        assert!(is_valid_url("https://cdn.example.com/room.jpg"));
        assert!(is_valid_url("http://localhost:9000/a?b=c"));
        assert!(!is_valid_url("ftp://example.com/x"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("https://"));
    }

    #[test]
    fn text_query_must_have_content() {
        let req: TextSearchRequest = serde_json::from_str(r#"{"query":"  "}"#).unwrap();
        assert!(req.query().is_err());
        let req: TextSearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query().is_err());
        let req: TextSearchRequest =
            serde_json::from_str(r#"{"query":" calm blue abstract "}"#).unwrap();
        assert_eq!(req.query().unwrap(), "calm blue abstract");
    }

    #[test]
    fn image_prefers_inline_data() {
        let req = ImageSearchRequest {
            image_url: Some("https://img.example.com/room.jpg".into()),
            image_base64: Some("AAAA".into()),
        };
        assert_eq!(req.image().unwrap(), Some(ImageSource::Base64Jpeg("AAAA".into())));

        let req = ImageSearchRequest {
            image_url: Some("https://img.example.com/room.jpg".into()),
            image_base64: None,
        };
        assert_eq!(
            req.image().unwrap(),
            Some(ImageSource::Url("https://img.example.com/room.jpg".into()))
        );

        assert_eq!(ImageSearchRequest::default().image().unwrap(), None);
    }

    #[test]
    fn invalid_url_is_rejected_even_with_inline_data() {
        let req = ImageSearchRequest {
            image_url: Some("room.jpg".into()),
            image_base64: Some("AAAA".into()),
        };
        assert!(req.image().is_err());
    }

    #[test]
    fn combined_request_flattens_image_fields() {
        let req: CombinedSearchRequest = serde_json::from_str(
            r#"{"query":"","imageUrl":"https://img.example.com/r.jpg"}"#,
        )
        .unwrap();
        assert_eq!(req.query(), None);
        assert!(matches!(req.image.image(), Ok(Some(ImageSource::Url(_)))));
    }
}
