use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::DbPool,
    error::ApiError,
    models::page::{
        validate_section_data, validate_sort_order, CreatePageSchema, CreateSectionSchema, Page,
        PageSection, UpdatePageSchema, UpdateSectionSchema,
    },
    models::post::validate_seo,
    models::user::Claims,
    utils::permissions::{Action, Principal},
    utils::slug::{self, fallback_slug, slugify, MAX_SLUG_ATTEMPTS},
};

async fn unique_page_slug(pool: &DbPool, base: &str) -> Result<String, ApiError> {
    for n in 0..MAX_SLUG_ATTEMPTS {
        let candidate = slug::suffixed(base, n);
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pages WHERE slug = $1)")
            .bind(&candidate)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Ok(candidate);
        }
    }
    Err(ApiError::validation("slug", "could not derive a unique slug"))
}

fn require_page_manager(claims: &Claims) -> Result<Principal, ApiError> {
    let principal = Principal::from_claims(claims);
    if !principal.can(Action::ManagePages) {
        return Err(ApiError::Forbidden("only editors and admins can manage pages"));
    }
    Ok(principal)
}

fn require_section_manager(claims: &Claims) -> Result<Principal, ApiError> {
    let principal = Principal::from_claims(claims);
    if !principal.can(Action::ManageSections) {
        return Err(ApiError::Forbidden("only editors and admins can manage sections"));
    }
    Ok(principal)
}

#[derive(Debug, Deserialize, Default)]
pub struct PageFilters {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// GET /api/cms/pages
pub async fn list_pages_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    opts: Option<Query<PageFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    require_page_manager(&claims)?;
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    let pages = sqlx::query_as::<_, Page>(
        "SELECT * FROM pages \
         WHERE ($1::bool IS NULL OR is_active = $1) \
           AND ($2::text IS NULL OR (title ILIKE '%' || $2 || '%' OR slug ILIKE '%' || $2 || '%')) \
         ORDER BY title",
    )
    .bind(opts.is_active)
    .bind(&opts.search)
    .fetch_all(&pool)
    .await?;

    Ok((StatusCode::OK, Json(pages)))
}

// GET /api/cms/pages/:id - la página con TODAS sus secciones (activas o no)
pub async fn get_page_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_page_manager(&claims)?;

    let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::NotFound("page"))?;

    // Empates de orden se rompen por fecha de creación
    let sections = sqlx::query_as::<_, PageSection>(
        "SELECT * FROM page_sections WHERE page_id = $1 ORDER BY sort_order, created_at",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "page": page, "sections": sections })),
    ))
}

// POST /api/cms/pages
pub async fn create_page_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreatePageSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_page_manager(&claims)?;

    if body.title.trim().is_empty() {
        return Err(ApiError::validation("title", "is required"));
    }
    if body.title.chars().count() > 200 {
        return Err(ApiError::validation("title", "must be at most 200 characters"));
    }
    validate_seo(&body.seo_title, &body.seo_description)?;

    let slug = match body.slug {
        Some(s) if !s.is_empty() => s,
        _ => {
            let mut base = slugify(&body.title);
            if base.is_empty() {
                base = fallback_slug("page");
            }
            unique_page_slug(&pool, &base).await?
        }
    };

    let page = sqlx::query_as::<_, Page>(
        "INSERT INTO pages (title, slug, seo_title, seo_description, is_active) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(body.title.trim())
    .bind(&slug)
    .bind(&body.seo_title)
    .bind(&body.seo_description)
    .bind(body.is_active.unwrap_or(true))
    .fetch_one(&pool)
    .await
    .map_err(|e| ApiError::on_unique(e, "slug", "slug already in use"))?;

    Ok((StatusCode::CREATED, Json(page)))
}

// PUT /api/cms/pages/:id
pub async fn update_page_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdatePageSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_page_manager(&claims)?;
    validate_seo(&body.seo_title, &body.seo_description)?;

    let page = sqlx::query_as::<_, Page>(
        "UPDATE pages SET \
            title = COALESCE($1, title), \
            seo_title = COALESCE($2, seo_title), \
            seo_description = COALESCE($3, seo_description), \
            is_active = COALESCE($4, is_active), \
            updated_at = NOW() \
         WHERE id = $5 \
         RETURNING *",
    )
    .bind(&body.title)
    .bind(&body.seo_title)
    .bind(&body.seo_description)
    .bind(body.is_active)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::NotFound("page"))?;

    Ok((StatusCode::OK, Json(page)))
}

// DELETE /api/cms/pages/:id - las secciones caen en cascada con la página
pub async fn delete_page_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_page_manager(&claims)?;

    let result = sqlx::query("DELETE FROM pages WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("page"));
    }

    Ok((StatusCode::OK, Json(json!({ "message": "page deleted" }))))
}

// --- Secciones --------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct SectionFilters {
    pub page_id: Option<i64>,
    pub section_type: Option<String>,
    pub is_active: Option<bool>,
}

// GET /api/cms/sections
pub async fn list_sections_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    opts: Option<Query<SectionFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    require_section_manager(&claims)?;
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    let sections = sqlx::query_as::<_, PageSection>(
        "SELECT * FROM page_sections \
         WHERE ($1::bigint IS NULL OR page_id = $1) \
           AND ($2::text IS NULL OR section_type = $2) \
           AND ($3::bool IS NULL OR is_active = $3) \
         ORDER BY page_id, sort_order, created_at",
    )
    .bind(opts.page_id)
    .bind(&opts.section_type)
    .bind(opts.is_active)
    .fetch_all(&pool)
    .await?;

    Ok((StatusCode::OK, Json(sections)))
}

// POST /api/cms/sections - el payload se valida contra el section_type
// declarado ANTES de persistir (una sección hero sin título nunca entra)
pub async fn create_section_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateSectionSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_section_manager(&claims)?;

    validate_section_data(&body.section_type, &body.data)?;
    let sort_order = body.sort_order.unwrap_or(0);
    validate_sort_order(sort_order)?;

    // La página dueña tiene que existir
    let page_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pages WHERE id = $1)")
        .bind(body.page_id)
        .fetch_one(&pool)
        .await?;
    if !page_exists {
        return Err(ApiError::NotFound("page"));
    }

    let section = sqlx::query_as::<_, PageSection>(
        "INSERT INTO page_sections (page_id, section_type, data, sort_order, is_active) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(body.page_id)
    .bind(&body.section_type)
    .bind(&body.data)
    .bind(sort_order)
    .bind(body.is_active.unwrap_or(true))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

// PUT /api/cms/sections/:id - si cambia el tipo o el payload, se vuelve a
// validar la combinación resultante
pub async fn update_section_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateSectionSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_section_manager(&claims)?;

    let existing = sqlx::query_as::<_, PageSection>("SELECT * FROM page_sections WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::NotFound("section"))?;

    let section_type = body.section_type.as_deref().unwrap_or(&existing.section_type);
    let data = body.data.as_ref().unwrap_or(&existing.data);
    validate_section_data(section_type, data)?;

    if let Some(sort_order) = body.sort_order {
        validate_sort_order(sort_order)?;
    }

    let section = sqlx::query_as::<_, PageSection>(
        "UPDATE page_sections SET \
            section_type = COALESCE($1, section_type), \
            data = COALESCE($2, data), \
            sort_order = COALESCE($3, sort_order), \
            is_active = COALESCE($4, is_active), \
            updated_at = NOW() \
         WHERE id = $5 \
         RETURNING *",
    )
    .bind(&body.section_type)
    .bind(&body.data)
    .bind(body.sort_order)
    .bind(body.is_active)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::OK, Json(section)))
}

// DELETE /api/cms/sections/:id
pub async fn delete_section_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_section_manager(&claims)?;

    let result = sqlx::query("DELETE FROM page_sections WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("section"));
    }

    Ok((StatusCode::OK, Json(json!({ "message": "section deleted" }))))
}
