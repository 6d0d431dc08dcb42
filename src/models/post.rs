use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;
use crate::utils::media::resolve_media_url;

// Estados del flujo editorial de un post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Pending,
    Scheduled,
    Published,
}

impl PostStatus {
    pub fn parse(s: &str) -> Option<PostStatus> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "pending" => Some(PostStatus::Pending),
            "scheduled" => Some(PostStatus::Scheduled),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Pending => "Pending Review",
            PostStatus::Scheduled => "Scheduled",
            PostStatus::Published => "Published",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Hi,
}

impl Language {
    pub fn parse(s: &str) -> Option<Language> {
        match s {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }

    pub fn label_for(code: &str) -> &'static str {
        Language::parse(code).map(|l| l.label()).unwrap_or("")
    }
}

// Fila completa de la tabla posts, más los nombres denormalizados de
// categoría y autor (vienen de un LEFT JOIN en las queries del panel).
#[derive(Debug, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub video: Option<String>,
    pub video_url: Option<String>,
    pub category_id: Option<i32>,
    pub author_id: Option<i64>,
    pub language: String,
    pub status: String,
    pub is_featured: bool,
    pub is_slider: bool,
    pub is_breaking: bool,
    pub is_recommended: bool,
    pub publish_at: Option<DateTime<Utc>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub author_name: Option<String>,
}

impl Post {
    // Predicado de visibilidad pública. Se evalúa SIEMPRE en el momento de
    // la lectura: un post "scheduled" se vuelve visible con el paso del
    // reloj, sin que ocurra ninguna escritura.
    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        is_publicly_visible(&self.status, self.publish_at, now)
    }
}

pub fn is_publicly_visible(
    status: &str,
    publish_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status == PostStatus::Published.as_str() && publish_at.is_some_and(|t| t <= now)
}

// Regla de sellado automático: si el estado resultante es "published" y no
// hay publish_at, se estampa el instante actual. Único efecto cruzado
// estado↔tiempo de todo el flujo.
pub fn stamp_publish_at(
    status: &str,
    publish_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if status == PostStatus::Published.as_str() && publish_at.is_none() {
        Some(now)
    } else {
        publish_at
    }
}

// La operación "approve" solo es legal desde "pending"
pub fn ensure_approvable(status: &str) -> Result<(), ApiError> {
    if status == PostStatus::Pending.as_str() {
        Ok(())
    } else {
        Err(ApiError::InvalidState("post is not pending approval"))
    }
}

// Vista del panel editorial: todo el contenido más etiquetas legibles y
// si el post está visible al público en este instante
#[derive(Debug, Serialize)]
pub struct AdminPostView {
    #[serde(flatten)]
    pub post: Post,
    pub status_label: &'static str,
    pub language_label: &'static str,
    pub featured_image_url: Option<String>,
    pub is_publicly_visible: bool,
}

impl From<Post> for AdminPostView {
    fn from(post: Post) -> Self {
        let status_label = PostStatus::parse(&post.status).map(|s| s.label()).unwrap_or("");
        let language_label = Language::label_for(&post.language);
        let featured_image_url = resolve_media_url(&post.featured_image);
        let visible = post.is_publicly_visible(Utc::now());
        AdminPostView {
            post,
            status_label,
            language_label,
            featured_image_url,
            is_publicly_visible: visible,
        }
    }
}

// Vista pública de listado: sin content, sin autor, sin timestamps internos
#[derive(Debug, Serialize)]
pub struct PublicPostItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub featured_image_url: Option<String>,
    pub video_url: Option<String>,
    pub language: String,
    pub is_featured: bool,
    pub is_slider: bool,
    pub is_breaking: bool,
    pub publish_at: Option<DateTime<Utc>>,
    pub views_count: i64,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

impl From<Post> for PublicPostItem {
    fn from(p: Post) -> Self {
        PublicPostItem {
            featured_image_url: resolve_media_url(&p.featured_image),
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            category_name: p.category_name,
            category_slug: p.category_slug,
            video_url: p.video_url,
            language: p.language,
            is_featured: p.is_featured,
            is_slider: p.is_slider,
            is_breaking: p.is_breaking,
            publish_at: p.publish_at,
            views_count: p.views_count,
            seo_title: p.seo_title,
            seo_description: p.seo_description,
        }
    }
}

// Vista pública de detalle: igual que el listado pero con el contenido
#[derive(Debug, Serialize)]
pub struct PublicPostDetail {
    #[serde(flatten)]
    pub item: PublicPostItem,
    pub content: String,
}

impl From<Post> for PublicPostDetail {
    fn from(p: Post) -> Self {
        let content = p.content.clone();
        PublicPostDetail {
            item: PublicPostItem::from(p),
            content,
        }
    }
}

// Lo que recibimos del panel al crear un post
#[derive(Debug, Deserialize)]
pub struct CreatePostSchema {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub video: Option<String>,
    pub video_url: Option<String>,
    pub category_id: Option<i32>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub is_featured: Option<bool>,
    pub is_slider: Option<bool>,
    pub is_breaking: Option<bool>,
    pub is_recommended: Option<bool>,
    pub publish_at: Option<DateTime<Utc>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostSchema {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub video: Option<String>,
    pub video_url: Option<String>,
    pub category_id: Option<i32>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub is_featured: Option<bool>,
    pub is_slider: Option<bool>,
    pub is_breaking: Option<bool>,
    pub is_recommended: Option<bool>,
    pub publish_at: Option<DateTime<Utc>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

// Validaciones compartidas entre create, update y carga masiva
pub fn validate_status(status: &str) -> Result<(), ApiError> {
    if PostStatus::parse(status).is_some() {
        Ok(())
    } else {
        Err(ApiError::validation(
            "status",
            "must be one of: draft, pending, scheduled, published",
        ))
    }
}

pub fn validate_language(language: &str) -> Result<(), ApiError> {
    if Language::parse(language).is_some() {
        Ok(())
    } else {
        Err(ApiError::validation("language", "must be 'en' or 'hi'"))
    }
}

pub fn validate_post_fields(
    title: &str,
    excerpt: &Option<String>,
    seo_title: &Option<String>,
    seo_description: &Option<String>,
) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title", "is required"));
    }
    if title.chars().count() > 300 {
        return Err(ApiError::validation("title", "must be at most 300 characters"));
    }
    if excerpt.as_deref().is_some_and(|e| e.chars().count() > 500) {
        return Err(ApiError::validation("excerpt", "must be at most 500 characters"));
    }
    validate_seo(seo_title, seo_description)
}

pub fn validate_seo(
    seo_title: &Option<String>,
    seo_description: &Option<String>,
) -> Result<(), ApiError> {
    if seo_title.as_deref().is_some_and(|s| s.chars().count() > 70) {
        return Err(ApiError::validation("seo_title", "must be at most 70 characters"));
    }
    if seo_description
        .as_deref()
        .is_some_and(|s| s.chars().count() > 160)
    {
        return Err(ApiError::validation(
            "seo_description",
            "must be at most 160 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn draft_and_pending_are_never_public() {
        let now = Utc::now();
        assert!(!is_publicly_visible("draft", Some(now - Duration::hours(1)), now));
        assert!(!is_publicly_visible("pending", Some(now - Duration::hours(1)), now));
    }

    #[test]
    fn published_without_publish_at_is_not_public() {
        assert!(!is_publicly_visible("published", None, Utc::now()));
    }

    #[test]
    fn scheduled_future_becomes_visible_by_clock_alone() {
        let now = Utc::now();
        let publish_at = Some(now + Duration::hours(2));
        // Antes de la hora programada: invisible
        assert!(!is_publicly_visible("published", publish_at, now));
        // Mismo registro, sin escritura, pasada la hora: visible
        assert!(is_publicly_visible("published", publish_at, now + Duration::hours(3)));
    }

    #[test]
    fn stamp_sets_publish_at_only_when_published_and_empty() {
        let now = Utc::now();
        assert_eq!(stamp_publish_at("published", None, now), Some(now));
        assert_eq!(stamp_publish_at("draft", None, now), None);

        let already = Some(now - Duration::days(1));
        // Nunca re-estampamos una fecha existente
        assert_eq!(stamp_publish_at("published", already, now), already);
    }

    #[test]
    fn approve_only_from_pending() {
        assert!(ensure_approvable("pending").is_ok());
        assert!(matches!(
            ensure_approvable("draft"),
            Err(ApiError::InvalidState(_))
        ));
        assert!(matches!(
            ensure_approvable("published"),
            Err(ApiError::InvalidState(_))
        ));
    }

    #[test]
    fn status_roundtrip_and_labels() {
        assert_eq!(PostStatus::parse("scheduled"), Some(PostStatus::Scheduled));
        assert_eq!(PostStatus::parse("archived"), None);
        assert_eq!(PostStatus::Pending.label(), "Pending Review");
        assert_eq!(Language::label_for("hi"), "Hindi");
        assert_eq!(Language::label_for("xx"), "");
    }

    #[test]
    fn title_and_excerpt_limits_are_enforced() {
        assert!(validate_post_fields("Titular", &Some("x".repeat(500)), &None, &None).is_ok());
        assert!(validate_post_fields("Titular", &Some("x".repeat(501)), &None, &None).is_err());
        assert!(validate_post_fields(&"x".repeat(301), &None, &None, &None).is_err());
        assert!(validate_post_fields("   ", &None, &None, &None).is_err());
    }

    #[test]
    fn seo_limits_are_enforced() {
        assert!(validate_seo(&Some("x".repeat(70)), &None).is_ok());
        assert!(validate_seo(&Some("x".repeat(71)), &None).is_err());
        assert!(validate_seo(&None, &Some("x".repeat(161))).is_err());
    }
}
