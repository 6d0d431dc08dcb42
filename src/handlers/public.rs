use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    db::DbPool,
    error::ApiError,
    handlers::menus::MENU_SELECT,
    handlers::posts::POST_SELECT,
    models::category::{Category, PublicCategory},
    models::menu::{Menu, PublicMenuItem},
    models::page::{Page, PageSection, PublicPage, PublicPageItem},
    models::post::{Language, Post, PublicPostDetail, PublicPostItem},
    utils::query::flag,
};

// Predicado de visibilidad pública. Se evalúa en CADA lectura contra el
// reloj de la base: un post programado aparece solo con el paso del
// tiempo, sin ninguna escritura de por medio.
pub const PUBLIC_POST_PREDICATE: &str = "p.status = 'published' AND p.publish_at <= NOW()";

// Un código de idioma desconocido no es error: simplemente no filtra
pub fn normalize_lang(lang: Option<String>) -> Option<String> {
    lang.filter(|l| Language::parse(l).is_some())
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PublicPostFilters {
    pub lang: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub slider: Option<String>,
    pub breaking: Option<String>,
    pub recommended: Option<String>,
}

pub async fn fetch_public_posts(
    pool: &DbPool,
    opts: &PublicPostFilters,
    limit: i64,
) -> Result<Vec<PublicPostItem>, ApiError> {
    let sql = format!(
        "{POST_SELECT} \
         WHERE {PUBLIC_POST_PREDICATE} \
           AND ($1::text IS NULL OR p.language = $1) \
           AND ($2::text IS NULL OR c.slug = $2) \
           AND ($3::text IS NULL OR (p.title ILIKE '%' || $3 || '%' OR p.content ILIKE '%' || $3 || '%')) \
           AND ($4::bool IS NULL OR p.is_featured = $4) \
           AND ($5::bool IS NULL OR p.is_slider = $5) \
           AND ($6::bool IS NULL OR p.is_breaking = $6) \
           AND ($7::bool IS NULL OR p.is_recommended = $7) \
         ORDER BY p.publish_at DESC \
         LIMIT $8"
    );

    let posts = sqlx::query_as::<_, Post>(&sql)
        .bind(normalize_lang(opts.lang.clone()))
        .bind(&opts.category)
        .bind(&opts.search)
        .bind(flag(&opts.featured))
        .bind(flag(&opts.slider))
        .bind(flag(&opts.breaking))
        .bind(flag(&opts.recommended))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(posts.into_iter().map(PublicPostItem::from).collect())
}

// GET /api/public/posts - últimas noticias visibles (máximo 20)
pub async fn list_public_posts_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<PublicPostFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();
    let posts = fetch_public_posts(&pool, &opts, 20).await?;
    Ok((StatusCode::OK, Json(posts)))
}

// GET /api/public/posts/featured
pub async fn featured_posts_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<PublicPostFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut opts = opts.map(|Query(o)| o).unwrap_or_default();
    opts.featured = Some("true".into());
    let posts = fetch_public_posts(&pool, &opts, 10).await?;
    Ok((StatusCode::OK, Json(posts)))
}

// GET /api/public/posts/slider
pub async fn slider_posts_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<PublicPostFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut opts = opts.map(|Query(o)| o).unwrap_or_default();
    opts.slider = Some("true".into());
    let posts = fetch_public_posts(&pool, &opts, 10).await?;
    Ok((StatusCode::OK, Json(posts)))
}

// GET /api/public/posts/breaking
pub async fn breaking_posts_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<PublicPostFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut opts = opts.map(|Query(o)| o).unwrap_or_default();
    opts.breaking = Some("true".into());
    let posts = fetch_public_posts(&pool, &opts, 10).await?;
    Ok((StatusCode::OK, Json(posts)))
}

// GET /api/public/posts/:slug - detalle de una noticia.
// Un post que no pasa el predicado es "not found" para el público, nunca
// "forbidden": no revelamos que existe contenido sin publicar.
pub async fn get_public_post_handler(
    Path(slug): Path<String>,
    State(pool): State<DbPool>,
) -> Result<impl IntoResponse, ApiError> {
    // Incremento atómico en la misma sentencia: lecturas concurrentes del
    // mismo post no pierden actualizaciones
    let updated: Option<i64> = sqlx::query_scalar(
        "UPDATE posts p SET views_count = views_count + 1 \
         WHERE p.slug = $1 AND p.status = 'published' AND p.publish_at <= NOW() \
         RETURNING p.id",
    )
    .bind(&slug)
    .fetch_optional(&pool)
    .await?;

    let id = updated.ok_or(ApiError::NotFound("post"))?;

    let post = sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_one(&pool)
        .await?;

    Ok((StatusCode::OK, Json(PublicPostDetail::from(post))))
}

#[derive(Debug, Deserialize, Default)]
pub struct PublicCategoryFilters {
    pub lang: Option<String>,
}

// GET /api/public/categories
pub async fn list_public_categories_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<PublicCategoryFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories \
         WHERE is_active AND ($1::text IS NULL OR language = $1) \
         ORDER BY menu_order, name",
    )
    .bind(normalize_lang(opts.lang))
    .fetch_all(&pool)
    .await?;

    let items: Vec<PublicCategory> = categories.into_iter().map(PublicCategory::from).collect();
    Ok((StatusCode::OK, Json(items)))
}

// GET /api/public/categories/:slug
pub async fn get_public_category_handler(
    Path(slug): Path<String>,
    State(pool): State<DbPool>,
) -> Result<impl IntoResponse, ApiError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE slug = $1 AND is_active ORDER BY language LIMIT 1",
    )
    .bind(&slug)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::NotFound("category"))?;

    Ok((StatusCode::OK, Json(PublicCategory::from(category))))
}

// GET /api/public/pages
pub async fn list_public_pages_handler(
    State(pool): State<DbPool>,
) -> Result<impl IntoResponse, ApiError> {
    let pages = sqlx::query_as::<_, Page>(
        "SELECT * FROM pages WHERE is_active ORDER BY title",
    )
    .fetch_all(&pool)
    .await?;

    let items: Vec<PublicPageItem> = pages.into_iter().map(PublicPageItem::from).collect();
    Ok((StatusCode::OK, Json(items)))
}

// GET /api/public/pages/:slug - página con sus secciones activas en orden
pub async fn get_public_page_handler(
    Path(slug): Path<String>,
    State(pool): State<DbPool>,
) -> Result<impl IntoResponse, ApiError> {
    let page = fetch_public_page(&pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("page"))?;

    Ok((StatusCode::OK, Json(page)))
}

// Compartido con el agregador de portada
pub async fn fetch_public_page(pool: &DbPool, slug: &str) -> Result<Option<PublicPage>, ApiError> {
    let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1 AND is_active")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    let page = match page {
        Some(p) => p,
        None => return Ok(None),
    };

    let sections = sqlx::query_as::<_, PageSection>(
        "SELECT * FROM page_sections \
         WHERE page_id = $1 AND is_active \
         ORDER BY sort_order, created_at",
    )
    .bind(page.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(PublicPage::new(page, sections)))
}

#[derive(Debug, Deserialize, Default)]
pub struct PublicMenuFilters {
    pub menu_type: Option<String>,
}

// GET /api/public/menus
pub async fn list_public_menus_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<PublicMenuFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    let menus = sqlx::query_as::<_, Menu>(&format!(
        "{MENU_SELECT} \
         WHERE m.is_active AND ($1::text IS NULL OR m.menu_type = $1) \
         ORDER BY m.menu_type, m.sort_order, m.title"
    ))
    .bind(&opts.menu_type)
    .fetch_all(&pool)
    .await?;

    let items: Vec<PublicMenuItem> = menus.into_iter().map(PublicMenuItem::from).collect();
    Ok((StatusCode::OK, Json(items)))
}
