use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::artworks::dto::{ArtworkRecord, ArtworkSearchQuery, Dimensions};

pub struct CatalogPage {
    pub hits: Vec<ArtworkRecord>,
    pub total: i64,
}

/// Read-only access to the artwork catalog.
#[async_trait]
pub trait CatalogIndex: Send + Sync {
    async fn search(&self, query: &ArtworkSearchQuery) -> anyhow::Result<CatalogPage>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<ArtworkRecord>>;
    /// Unknown ids are silently absent from the result.
    async fn get_many(&self, ids: &[String]) -> anyhow::Result<Vec<ArtworkRecord>>;
}

#[derive(Debug, FromRow)]
struct ArtworkRow {
    id: String,
    title: String,
    studio_name: String,
    image_urls: Vec<String>,
    price: f64,
    currency: String,
    width_cm: f64,
    height_cm: f64,
    techniques: Vec<String>,
    year: Option<i32>,
    info_text: Option<String>,
    status: String,
}

impl From<ArtworkRow> for ArtworkRecord {
    fn from(r: ArtworkRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            creator: r.studio_name,
            image_urls: r.image_urls,
            price: r.price,
            currency: r.currency,
            dimensions: Dimensions {
                width_cm: r.width_cm,
                height_cm: r.height_cm,
            },
            techniques: r.techniques,
            year: r.year,
            info_text: r.info_text,
            status: r.status,
        }
    }
}

const ARTWORK_COLUMNS: &str = "id, title, studio_name, image_urls, price, currency, \
     width_cm, height_cm, techniques, year, info_text, status";

// $1 free text, $2 artist, $3 availability, $4 technique
const SEARCH_FILTER: &str = r#"
    WHERE ($1::text IS NULL
           OR position(lower($1) in lower(title)) > 0
           OR position(lower($1) in lower(studio_name)) > 0
           OR position(lower($1) in lower(coalesce(info_text, ''))) > 0)
      AND ($2::text IS NULL OR studio_name = $2)
      AND ($3::text IS NULL OR status = $3)
      AND ($4::text IS NULL OR $4 = ANY(techniques))
"#;

#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn blank_to_none(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[async_trait]
impl CatalogIndex for PgCatalog {
    async fn search(&self, query: &ArtworkSearchQuery) -> anyhow::Result<CatalogPage> {
        let q = blank_to_none(&query.q);
        let artist = blank_to_none(&query.artist);
        let availability = blank_to_none(&query.availability);
        let technique = blank_to_none(&query.technique);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM artworks {}", SEARCH_FILTER))
            .bind(q)
            .bind(artist)
            .bind(availability)
            .bind(technique)
            .fetch_one(&self.db)
            .await
            .context("count artworks")?;

        let rows = sqlx::query_as::<_, ArtworkRow>(&format!(
            "SELECT {} FROM artworks {} ORDER BY title ASC, id ASC LIMIT $5 OFFSET $6",
            ARTWORK_COLUMNS, SEARCH_FILTER
        ))
        .bind(q)
        .bind(artist)
        .bind(availability)
        .bind(technique)
        .bind(query.hits_per_page)
        .bind(query.offset())
        .fetch_all(&self.db)
        .await
        .context("search artworks")?;

        Ok(CatalogPage {
            hits: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<ArtworkRecord>> {
        let row = sqlx::query_as::<_, ArtworkRow>(&format!(
            "SELECT {} FROM artworks WHERE id = $1",
            ARTWORK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("get artwork {}", id))?;
        Ok(row.map(Into::into))
    }

    async fn get_many(&self, ids: &[String]) -> anyhow::Result<Vec<ArtworkRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ArtworkRow>(&format!(
            "SELECT {} FROM artworks WHERE id = ANY($1)",
            ARTWORK_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("get artworks by id")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_maps_to_record() {
        let record: ArtworkRecord = ArtworkRow {
            id: "a1".into(),
            title: "Dune".into(),
            studio_name: "Atelier Sud".into(),
            image_urls: vec!["https://img.test/a1.jpg".into()],
            price: 900.0,
            currency: "EUR".into(),
            width_cm: 70.0,
            height_cm: 50.0,
            techniques: vec!["acrylic".into()],
            year: None,
            info_text: Some("sand tones".into()),
            status: "available".into(),
        }
        .into();
        assert_eq!(record.creator, "Atelier Sud");
        assert_eq!(record.dimensions, Dimensions { width_cm: 70.0, height_cm: 50.0 });
        assert_eq!(record.info_text.as_deref(), Some("sand tones"));
    }

    #[test]
    fn blank_filters_are_ignored() {
        assert_eq!(blank_to_none(&None), None);
        assert_eq!(blank_to_none(&Some("   ".into())), None);
        assert_eq!(blank_to_none(&Some(" oil ".into())), Some("oil"));
    }
}
