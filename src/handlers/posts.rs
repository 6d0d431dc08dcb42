use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    db::DbPool,
    error::ApiError,
    models::post::{
        ensure_approvable, stamp_publish_at, validate_language, validate_post_fields,
        validate_status, AdminPostView, CreatePostSchema, Post, PostStatus, UpdatePostSchema,
    },
    models::user::Claims,
    utils::permissions::{Action, Principal},
    utils::query::flag,
    utils::slug::{self, fallback_slug, slugify, MAX_SLUG_ATTEMPTS},
};

// Query base del panel: la fila completa más nombres denormalizados
pub const POST_SELECT: &str = "SELECT p.*, \
     c.name AS category_name, c.slug AS category_slug, u.username AS author_name \
     FROM posts p \
     LEFT JOIN categories c ON c.id = p.category_id \
     LEFT JOIN users u ON u.id = p.author_id";

// El slug se asigna UNA vez, al crear; nunca se recalcula aunque cambie el
// título (permalinks estables). La unicidad es global y las colisiones se
// resuelven con sufijos -1, -2, ...
async fn unique_post_slug(pool: &DbPool, base: &str) -> Result<String, ApiError> {
    for n in 0..MAX_SLUG_ATTEMPTS {
        let candidate = slug::suffixed(base, n);
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)")
            .bind(&candidate)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Ok(candidate);
        }
    }
    Err(ApiError::validation("slug", "could not derive a unique slug"))
}

#[derive(Debug, Deserialize, Default)]
pub struct CmsPostFilters {
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub language: Option<String>,
    pub author_id: Option<i64>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub slider: Option<String>,
    pub breaking: Option<String>,
    pub recommended: Option<String>,
}

// GET /api/cms/posts
pub async fn list_posts_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    opts: Option<Query<CmsPostFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();
    let principal = Principal::from_claims(&claims);

    // El writer solo ve sus propias filas; editor/admin ven todo
    let author_filter = principal.post_author_filter().or(opts.author_id);

    let sql = format!(
        "{POST_SELECT} \
         WHERE ($1::text IS NULL OR p.status = $1) \
           AND ($2::int IS NULL OR p.category_id = $2) \
           AND ($3::text IS NULL OR p.language = $3) \
           AND ($4::bigint IS NULL OR p.author_id = $4) \
           AND ($5::text IS NULL OR (p.title ILIKE '%' || $5 || '%' OR p.content ILIKE '%' || $5 || '%')) \
           AND ($6::bool IS NULL OR p.is_featured = $6) \
           AND ($7::bool IS NULL OR p.is_slider = $7) \
           AND ($8::bool IS NULL OR p.is_breaking = $8) \
           AND ($9::bool IS NULL OR p.is_recommended = $9) \
         ORDER BY p.created_at DESC"
    );

    let posts = sqlx::query_as::<_, Post>(&sql)
        .bind(&opts.status)
        .bind(opts.category_id)
        .bind(&opts.language)
        .bind(author_filter)
        .bind(&opts.search)
        .bind(flag(&opts.featured))
        .bind(flag(&opts.slider))
        .bind(flag(&opts.breaking))
        .bind(flag(&opts.recommended))
        .fetch_all(&pool)
        .await?;

    let views: Vec<AdminPostView> = posts.into_iter().map(AdminPostView::from).collect();
    Ok((StatusCode::OK, Json(views)))
}

// GET /api/cms/posts/:id
pub async fn get_post_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);

    let post = sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::NotFound("post"))?;

    if !principal.can_edit_post(post.author_id) {
        return Err(ApiError::Forbidden("you can only access your own posts"));
    }

    Ok((StatusCode::OK, Json(AdminPostView::from(post))))
}

// POST /api/cms/posts
pub async fn create_post_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreatePostSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    if !principal.can(Action::CreatePost) {
        return Err(ApiError::Forbidden("your role cannot create posts"));
    }

    validate_post_fields(&body.title, &body.excerpt, &body.seo_title, &body.seo_description)?;

    let status = body.status.unwrap_or_else(|| "draft".to_string());
    validate_status(&status)?;
    let language = body.language.unwrap_or_else(|| "en".to_string());
    validate_language(&language)?;

    // Regla de auto-sellado: publicar sin fecha estampa "ahora"
    let publish_at = stamp_publish_at(&status, body.publish_at, Utc::now());

    let mut base = slugify(&body.title);
    if base.is_empty() {
        // Títulos en hindi no producen ASCII: usamos un slug aleatorio
        base = fallback_slug("post");
    }
    let slug = unique_post_slug(&pool, &base).await?;

    let post = sqlx::query_as::<_, Post>(
        "INSERT INTO posts ( \
            title, slug, content, excerpt, featured_image, video, video_url, \
            category_id, author_id, language, status, is_featured, is_slider, \
            is_breaking, is_recommended, publish_at, seo_title, seo_description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         RETURNING *, NULL::text AS category_name, NULL::text AS category_slug, NULL::text AS author_name",
    )
    .bind(&body.title)
    .bind(&slug)
    .bind(&body.content)
    .bind(&body.excerpt)
    .bind(&body.featured_image)
    .bind(&body.video)
    .bind(&body.video_url)
    .bind(body.category_id)
    .bind(claims.user_id)
    .bind(&language)
    .bind(&status)
    .bind(body.is_featured.unwrap_or(false))
    .bind(body.is_slider.unwrap_or(false))
    .bind(body.is_breaking.unwrap_or(false))
    .bind(body.is_recommended.unwrap_or(false))
    .bind(publish_at)
    .bind(&body.seo_title)
    .bind(&body.seo_description)
    .fetch_one(&pool)
    .await
    .map_err(|e| ApiError::on_unique(e, "slug", "slug already in use"))?;

    Ok((StatusCode::CREATED, Json(AdminPostView::from(post))))
}

// PUT /api/cms/posts/:id
pub async fn update_post_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdatePostSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);

    // Verificamos si existe primero para no dar falsos positivos
    let existing = sqlx::query_as::<_, ExistingPost>(
        "SELECT author_id, status, publish_at FROM posts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::NotFound("post"))?;

    // Autorización a nivel de fila: el writer solo toca lo suyo
    if !principal.can_edit_post(existing.author_id) {
        return Err(ApiError::Forbidden("you can only edit your own posts"));
    }

    if let Some(title) = &body.title {
        validate_post_fields(title, &body.excerpt, &body.seo_title, &body.seo_description)?;
    } else {
        crate::models::post::validate_seo(&body.seo_title, &body.seo_description)?;
    }
    if let Some(status) = &body.status {
        validate_status(status)?;
    }
    if let Some(language) = &body.language {
        validate_language(language)?;
    }

    // Estado y fecha resultantes de la edición; sobre ellos se aplica la
    // regla de auto-sellado, venga de donde venga la transición
    let status = body.status.clone().unwrap_or(existing.status);
    let publish_at = stamp_publish_at(
        &status,
        body.publish_at.or(existing.publish_at),
        Utc::now(),
    );

    // COALESCE($n, col): si no envían el campo, se queda el valor actual.
    // El slug NO se toca jamás: los permalinks son estables.
    let post = sqlx::query_as::<_, Post>(
        "UPDATE posts SET \
            title = COALESCE($1, title), \
            content = COALESCE($2, content), \
            excerpt = COALESCE($3, excerpt), \
            featured_image = COALESCE($4, featured_image), \
            video = COALESCE($5, video), \
            video_url = COALESCE($6, video_url), \
            category_id = COALESCE($7, category_id), \
            language = COALESCE($8, language), \
            status = $9, \
            is_featured = COALESCE($10, is_featured), \
            is_slider = COALESCE($11, is_slider), \
            is_breaking = COALESCE($12, is_breaking), \
            is_recommended = COALESCE($13, is_recommended), \
            publish_at = $14, \
            seo_title = COALESCE($15, seo_title), \
            seo_description = COALESCE($16, seo_description), \
            updated_at = NOW() \
         WHERE id = $17 \
         RETURNING *, NULL::text AS category_name, NULL::text AS category_slug, NULL::text AS author_name",
    )
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.excerpt)
    .bind(&body.featured_image)
    .bind(&body.video)
    .bind(&body.video_url)
    .bind(body.category_id)
    .bind(&body.language)
    .bind(&status)
    .bind(body.is_featured)
    .bind(body.is_slider)
    .bind(body.is_breaking)
    .bind(body.is_recommended)
    .bind(publish_at)
    .bind(&body.seo_title)
    .bind(&body.seo_description)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::OK, Json(AdminPostView::from(post))))
}

#[derive(sqlx::FromRow)]
struct ExistingPost {
    author_id: Option<i64>,
    status: String,
    publish_at: Option<DateTime<Utc>>,
}

// DELETE /api/cms/posts/:id
pub async fn delete_post_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);

    let existing = sqlx::query_as::<_, ExistingPost>(
        "SELECT author_id, status, publish_at FROM posts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::NotFound("post"))?;

    if !principal.can_edit_post(existing.author_id) {
        return Err(ApiError::Forbidden("you can only delete your own posts"));
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "message": "post deleted" }))))
}

// POST /api/cms/posts/:id/approve - aprobar un post pendiente (editor/admin)
pub async fn approve_post_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    if !principal.can(Action::ApprovePost) {
        return Err(ApiError::Forbidden("only editors and admins can approve posts"));
    }

    let existing = sqlx::query_as::<_, ExistingPost>(
        "SELECT author_id, status, publish_at FROM posts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::NotFound("post"))?;

    // Solo es legal aprobar desde "pending"; reintentar sobre un post ya
    // publicado falla limpio y no re-estampa la fecha
    ensure_approvable(&existing.status)?;

    let publish_at = stamp_publish_at(PostStatus::Published.as_str(), existing.publish_at, Utc::now());

    // El UPDATE se guarda a sí mismo contra la carrera de dos approve
    // simultáneos: si otro ya publicó entre la lectura y la escritura, no
    // tocamos la fila (y sobre todo no re-estampamos publish_at)
    let updated = sqlx::query(
        "UPDATE posts SET status = $1, publish_at = $2, updated_at = NOW() \
         WHERE id = $3 AND status = 'pending'",
    )
    .bind(PostStatus::Published.as_str())
    .bind(publish_at)
    .bind(id)
    .execute(&pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidState("post is not pending approval"));
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "post approved and published" })),
    ))
}

// --- Carga masiva -----------------------------------------------------------
// Cada fila se procesa de forma aislada: un error en una fila se anota y
// el lote continúa. El parseo tabular (CSV) ocurre fuera; aquí ya llegan
// filas estructuradas.

#[derive(Debug, Deserialize)]
pub struct BulkPostRow {
    pub title: String,
    pub content: String,
    pub category: String,
    pub language: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub success: bool,
    pub created: usize,
    pub errors: Vec<String>,
    pub created_ids: Vec<i64>,
}

// POST /api/cms/posts/bulk (admin/editor)
pub async fn bulk_create_posts_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(rows): Json<Vec<BulkPostRow>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    if !principal.can(Action::BulkImportPosts) {
        return Err(ApiError::Forbidden("only admins and editors can bulk import"));
    }

    let mut errors = Vec::new();
    let mut created_ids = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        match create_bulk_row(&pool, claims.user_id, row).await {
            Ok(id) => created_ids.push(id),
            Err(e) => errors.push(format!("Row {row_number}: {e}")),
        }
    }

    let created = created_ids.len();
    created_ids.truncate(10); // Devolvemos solo los primeros 10 ids

    Ok((
        StatusCode::OK,
        Json(BulkResult {
            success: true,
            created,
            errors,
            created_ids,
        }),
    ))
}

async fn create_bulk_row(
    pool: &DbPool,
    author_id: i64,
    row: &BulkPostRow,
) -> Result<i64, ApiError> {
    // Mismos límites de título y extracto que el alta normal
    validate_post_fields(&row.title, &row.excerpt, &None, &None)?;
    if row.content.trim().is_empty() {
        return Err(ApiError::validation("content", "is required"));
    }
    if row.category.trim().is_empty() {
        return Err(ApiError::validation("category", "is required"));
    }

    // La categoría llega por nombre (insensible a mayúsculas)
    let category_id: Option<i32> =
        sqlx::query_scalar("SELECT id FROM categories WHERE name ILIKE $1")
            .bind(row.category.trim())
            .fetch_optional(pool)
            .await?;
    let category_id = category_id.ok_or_else(|| {
        ApiError::validation("category", format!("category '{}' not found", row.category))
    })?;

    let mut status = row.status.clone().unwrap_or_else(|| "draft".to_string());
    validate_status(&status)?;
    let language = row.language.clone().unwrap_or_else(|| "en".to_string());
    validate_language(&language)?;

    let now = Utc::now();
    // Una fecha futura fuerza el estado "scheduled"
    if row.publish_at.is_some_and(|t| t > now) {
        status = PostStatus::Scheduled.as_str().to_string();
    }
    let publish_at = stamp_publish_at(&status, row.publish_at, now);

    let mut base = slugify(&row.title);
    if base.is_empty() {
        base = fallback_slug("post");
    }
    let slug = unique_post_slug(pool, &base).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO posts (title, slug, content, excerpt, category_id, author_id, \
                            language, status, publish_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(row.title.trim())
    .bind(&slug)
    .bind(row.content.trim())
    .bind(&row.excerpt)
    .bind(category_id)
    .bind(author_id)
    .bind(&language)
    .bind(&status)
    .bind(publish_at)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::on_unique(e, "slug", "slug already in use"))?;

    Ok(id)
}
