use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::ApiError;

#[derive(Debug, Serialize, FromRow)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PageSection {
    pub id: i64,
    pub page_id: i64,
    pub section_type: String,
    pub data: Value,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vista pública de una sección: solo lo que el frontend necesita pintar
#[derive(Debug, Serialize)]
pub struct PublicSection {
    pub id: i64,
    pub section_type: String,
    pub section_type_label: &'static str,
    pub data: Value,
    pub sort_order: i32,
}

impl From<PageSection> for PublicSection {
    fn from(s: PageSection) -> Self {
        PublicSection {
            section_type_label: section_type_label(&s.section_type),
            id: s.id,
            section_type: s.section_type,
            data: s.data,
            sort_order: s.sort_order,
        }
    }
}

// Vista pública de listado: sin timestamps internos
#[derive(Debug, Serialize)]
pub struct PublicPageItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

impl From<Page> for PublicPageItem {
    fn from(p: Page) -> Self {
        PublicPageItem {
            id: p.id,
            title: p.title,
            slug: p.slug,
            seo_title: p.seo_title,
            seo_description: p.seo_description,
        }
    }
}

// Página pública con sus secciones activas ya ordenadas
#[derive(Debug, Serialize)]
pub struct PublicPage {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub sections: Vec<PublicSection>,
}

impl PublicPage {
    pub fn new(page: Page, sections: Vec<PageSection>) -> Self {
        PublicPage {
            id: page.id,
            title: page.title,
            slug: page.slug,
            seo_title: page.seo_title,
            seo_description: page.seo_description,
            sections: sections.into_iter().map(PublicSection::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePageSchema {
    pub title: String,
    pub slug: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageSchema {
    pub title: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSectionSchema {
    pub page_id: i64,
    pub section_type: String,
    pub data: Value,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSectionSchema {
    pub section_type: Option<String>,
    pub data: Option<Value>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

pub const SECTION_TYPES: [&str; 5] = ["hero", "slider", "article_list", "banner", "html"];

pub fn section_type_label(section_type: &str) -> &'static str {
    match section_type {
        "hero" => "Hero Section",
        "slider" => "Slider",
        "article_list" => "Article List",
        "banner" => "Banner",
        "html" => "HTML Content",
        _ => "",
    }
}

// Payloads tipados por section_type. El JSON se guarda tal cual en la
// columna JSONB, pero antes de persistir lo validamos contra la forma
// declarada; así una sección "hero" sin título no entra nunca a la base.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // solo se deserializa para validar la forma
struct HeroData {
    title: String,
    subtitle: Option<String>,
    cta_text: Option<String>,
    cta_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct SliderData {
    title: Option<String>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ArticleListData {
    title: String,
    category: Option<String>,
    limit: Option<u32>,
    featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct BannerData {
    image: String,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HtmlData {
    html: String,
}

pub fn validate_section_data(section_type: &str, data: &Value) -> Result<(), ApiError> {
    let result = match section_type {
        "hero" => serde_json::from_value::<HeroData>(data.clone()).map(|_| ()),
        "slider" => serde_json::from_value::<SliderData>(data.clone()).map(|_| ()),
        "article_list" => serde_json::from_value::<ArticleListData>(data.clone()).map(|_| ()),
        "banner" => serde_json::from_value::<BannerData>(data.clone()).map(|_| ()),
        "html" => serde_json::from_value::<HtmlData>(data.clone()).map(|_| ()),
        other => {
            return Err(ApiError::validation(
                "section_type",
                format!(
                    "unknown section type '{other}', must be one of: {}",
                    SECTION_TYPES.join(", ")
                ),
            ))
        }
    };
    result.map_err(|e| ApiError::validation("data", format!("invalid {section_type} payload: {e}")))
}

pub fn validate_sort_order(sort_order: i32) -> Result<(), ApiError> {
    if sort_order < 0 {
        Err(ApiError::validation("sort_order", "must be non-negative"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hero_requires_title() {
        assert!(validate_section_data("hero", &json!({ "title": "Bienvenidos" })).is_ok());
        assert!(validate_section_data("hero", &json!({ "subtitle": "sin título" })).is_err());
    }

    #[test]
    fn article_list_accepts_optional_fields() {
        let ok = json!({ "title": "Últimas noticias", "category": "deportes", "limit": 6, "featured": true });
        assert!(validate_section_data("article_list", &ok).is_ok());
        assert!(validate_section_data("article_list", &json!({ "title": "Solo título" })).is_ok());
        assert!(validate_section_data("article_list", &json!({ "limit": 6 })).is_err());
    }

    #[test]
    fn html_requires_html_field() {
        assert!(validate_section_data("html", &json!({ "html": "<p>hola</p>" })).is_ok());
        assert!(validate_section_data("html", &json!({})).is_err());
    }

    #[test]
    fn banner_requires_image() {
        assert!(validate_section_data("banner", &json!({ "image": "banners/a.jpg" })).is_ok());
        assert!(validate_section_data("banner", &json!({ "link": "/promo" })).is_err());
    }

    #[test]
    fn unknown_section_type_is_rejected() {
        let err = validate_section_data("carousel", &json!({}));
        assert!(matches!(err, Err(ApiError::Validation { .. })));
    }

    #[test]
    fn public_page_item_omits_internal_fields() {
        let now = Utc::now();
        let page = Page {
            id: 1,
            title: "Quiénes somos".into(),
            slug: "about-us".into(),
            seo_title: None,
            seo_description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(PublicPageItem::from(page)).unwrap();
        assert_eq!(value["slug"], "about-us");
        assert!(value.get("created_at").is_none());
        assert!(value.get("updated_at").is_none());
        assert!(value.get("is_active").is_none());
    }

    #[test]
    fn negative_sort_order_is_rejected() {
        assert!(validate_sort_order(0).is_ok());
        assert!(validate_sort_order(-1).is_err());
    }
}
