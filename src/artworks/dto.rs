use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Dimensions {
    /// Surface in square meters.
    pub fn area_m2(&self) -> f64 {
        self.width_cm * self.height_cm / 10_000.0
    }
}

/// Catalog entry as exposed by the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkRecord {
    #[serde(rename = "objectID")]
    pub id: String,
    pub title: String,
    #[serde(rename = "studioName")]
    pub creator: String,
    pub image_urls: Vec<String>,
    pub price: f64,
    pub currency: String,
    pub dimensions: Dimensions,
    pub techniques: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_text: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSearchQuery {
    pub q: Option<String>,
    pub artist: Option<String>,
    pub availability: Option<String>,
    pub technique: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_hits_per_page")]
    pub hits_per_page: i64,
}
fn default_page() -> i64 { 1 }
fn default_hits_per_page() -> i64 { 20 }

pub const MAX_HITS_PER_PAGE: i64 = 100;

impl ArtworkSearchQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be a positive integer".into());
        }
        if !(1..=MAX_HITS_PER_PAGE).contains(&self.hits_per_page) {
            return Err(format!("hitsPerPage must be between 1 and {}", MAX_HITS_PER_PAGE));
        }
        if (self.page - 1).checked_mul(self.hits_per_page).is_none() {
            return Err("page is out of range".into());
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.hits_per_page)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSearchResponse {
    pub hits: Vec<ArtworkRecord>,
    pub nb_hits: i64,
    pub page: i64,
    pub nb_pages: i64,
    pub hits_per_page: i64,
}

impl ArtworkSearchResponse {
    pub fn new(hits: Vec<ArtworkRecord>, nb_hits: i64, query: &ArtworkSearchQuery) -> Self {
        let per_page = query.hits_per_page.max(1);
        Self {
            hits,
            nb_hits,
            page: query.page,
            nb_pages: (nb_hits + per_page - 1) / per_page,
            hits_per_page: query.hits_per_page,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, hits_per_page: i64) -> ArtworkSearchQuery {
        ArtworkSearchQuery {
            q: None,
            artist: None,
            availability: None,
            technique: None,
            page,
            hits_per_page,
        }
    }

    #[test]
    fn area_is_square_meters() {
        let d = Dimensions { width_cm: 200.0, height_cm: 150.0 };
        assert!((d.area_m2() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn record_uses_index_field_names() {
        let json = serde_json::to_value(fixtures::artwork("a1", 50.0, 40.0)).unwrap();
        assert_eq!(json["objectID"], "a1");
        assert_eq!(json["studioName"], "Studio Nord");
        assert_eq!(json["dimensions"]["widthCm"], 50.0);
        assert!(json.get("infoText").is_none());
    }

    #[test]
    fn search_query_defaults() {
        let q: ArtworkSearchQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.hits_per_page, 20);
        assert_eq!(q.offset(), 0);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn search_query_bounds() {
        assert!(query(0, 20).validate().is_err());
        assert!(query(1, 0).validate().is_err());
        assert!(query(1, 101).validate().is_err());
        assert!(query(3, 100).validate().is_ok());
        assert_eq!(query(3, 25).offset(), 50);
    }

    #[test]
    fn huge_page_is_rejected_and_offset_never_overflows() {
        let q = query(i64::MAX, 100);
        assert_eq!(q.validate(), Err("page is out of range".to_string()));
        assert_eq!(q.offset(), i64::MAX);
        assert_eq!(query(3, 20).offset(), 40);
    }

    #[test]
    fn page_count_rounds_up() {
        let q = query(1, 20);
        assert_eq!(ArtworkSearchResponse::new(vec![], 0, &q).nb_pages, 0);
        assert_eq!(ArtworkSearchResponse::new(vec![], 20, &q).nb_pages, 1);
        assert_eq!(ArtworkSearchResponse::new(vec![], 21, &q).nb_pages, 2);
    }
}
