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
    models::category::{Category, CreateCategorySchema, UpdateCategorySchema},
    models::post::validate_language,
    models::user::Claims,
    utils::permissions::{Action, Principal},
    utils::slug::{self, fallback_slug, slugify, MAX_SLUG_ATTEMPTS},
};

// A diferencia de posts, la unicidad del slug de categoría es POR IDIOMA:
// puede existir "deportes" en 'en' y "deportes" en 'hi' a la vez.
async fn unique_category_slug(
    pool: &DbPool,
    base: &str,
    language: &str,
) -> Result<String, ApiError> {
    for n in 0..MAX_SLUG_ATTEMPTS {
        let candidate = slug::suffixed(base, n);
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND language = $2)",
        )
        .bind(&candidate)
        .bind(language)
        .fetch_one(pool)
        .await?;
        if !exists {
            return Ok(candidate);
        }
    }
    Err(ApiError::validation("slug", "could not derive a unique slug"))
}

#[derive(Debug, Deserialize, Default)]
pub struct CategoryFilters {
    pub language: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// GET /api/cms/categories
pub async fn list_categories_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<CategoryFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories \
         WHERE ($1::text IS NULL OR language = $1) \
           AND ($2::bool IS NULL OR is_active = $2) \
           AND ($3::text IS NULL OR (name ILIKE '%' || $3 || '%' OR slug ILIKE '%' || $3 || '%')) \
         ORDER BY menu_order, name",
    )
    .bind(&opts.language)
    .bind(opts.is_active)
    .bind(&opts.search)
    .fetch_all(&pool)
    .await?;

    Ok((StatusCode::OK, Json(categories)))
}

// GET /api/cms/categories/:id
pub async fn get_category_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
) -> Result<impl IntoResponse, ApiError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::NotFound("category"))?;

    Ok((StatusCode::OK, Json(category)))
}

// POST /api/cms/categories (cualquier rol autenticado: el writer la
// necesita para poder clasificar sus posts)
pub async fn create_category_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateCategorySchema>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    if !principal.can(Action::CreateCategory) {
        return Err(ApiError::Forbidden("your role cannot create categories"));
    }

    if body.name.trim().is_empty() {
        return Err(ApiError::validation("name", "is required"));
    }
    if body.name.chars().count() > 200 {
        return Err(ApiError::validation("name", "must be at most 200 characters"));
    }
    let language = body.language.unwrap_or_else(|| "en".to_string());
    validate_language(&language)?;

    // Slug explícito: se respeta tal cual y una colisión es error del
    // caller. Slug derivado: se resuelve con sufijos numéricos.
    let slug = match body.slug {
        Some(s) if !s.is_empty() => s,
        _ => {
            let mut base = slugify(&body.name);
            if base.is_empty() {
                base = fallback_slug("category");
            }
            unique_category_slug(&pool, &base, &language).await?
        }
    };

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, slug, language, show_in_menu, menu_order, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(body.name.trim())
    .bind(&slug)
    .bind(&language)
    .bind(body.show_in_menu.unwrap_or(true))
    .bind(body.menu_order.unwrap_or(0))
    .bind(body.is_active.unwrap_or(true))
    .fetch_one(&pool)
    .await
    .map_err(|e| ApiError::on_unique(e, "slug", "slug already in use for this language"))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// PUT /api/cms/categories/:id (solo admin/editor)
pub async fn update_category_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateCategorySchema>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    if !principal.can(Action::ManageCategories) {
        return Err(ApiError::Forbidden("only editors and admins can modify categories"));
    }

    if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("name", "cannot be empty"));
    }

    // El slug y el idioma no se tocan después de crear
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET \
            name = COALESCE($1, name), \
            show_in_menu = COALESCE($2, show_in_menu), \
            menu_order = COALESCE($3, menu_order), \
            is_active = COALESCE($4, is_active), \
            updated_at = NOW() \
         WHERE id = $5 \
         RETURNING *",
    )
    .bind(&body.name)
    .bind(body.show_in_menu)
    .bind(body.menu_order)
    .bind(body.is_active)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::NotFound("category"))?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/cms/categories/:id (solo admin/editor). Los posts de la
// categoría quedan con category_id NULL, no se borran en cascada.
pub async fn delete_category_handler(
    Path(id): Path<i32>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    if !principal.can(Action::ManageCategories) {
        return Err(ApiError::Forbidden("only editors and admins can delete categories"));
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("category"));
    }

    Ok((StatusCode::OK, Json(json!({ "message": "category deleted" }))))
}
