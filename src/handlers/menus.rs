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
    models::menu::{
        validate_link_type, validate_menu_type, validate_title, CreateMenuSchema, Menu,
        UpdateMenuSchema,
    },
    models::user::Claims,
    utils::permissions::{Action, Principal},
};

// Query base: la fila más los slugs de los destinos para resolver la URL
pub const MENU_SELECT: &str = "SELECT m.*, c.slug AS category_slug, p.slug AS page_slug \
     FROM menus m \
     LEFT JOIN categories c ON c.id = m.category_id \
     LEFT JOIN pages p ON p.id = m.page_id";

fn require_menu_manager(claims: &Claims) -> Result<Principal, ApiError> {
    let principal = Principal::from_claims(claims);
    if !principal.can(Action::ManageMenus) {
        return Err(ApiError::Forbidden("only editors and admins can manage menus"));
    }
    Ok(principal)
}

#[derive(Debug, Deserialize, Default)]
pub struct MenuFilters {
    pub menu_type: Option<String>,
    pub is_active: Option<bool>,
}

// GET /api/cms/menus (cualquier rol autenticado, solo lectura)
pub async fn list_menus_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<MenuFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    let menus = sqlx::query_as::<_, Menu>(&format!(
        "{MENU_SELECT} \
         WHERE ($1::text IS NULL OR m.menu_type = $1) \
           AND ($2::bool IS NULL OR m.is_active = $2) \
         ORDER BY m.menu_type, m.sort_order, m.title"
    ))
    .bind(&opts.menu_type)
    .bind(opts.is_active)
    .fetch_all(&pool)
    .await?;

    // El panel también recibe la URL ya resuelta, como campo de solo lectura
    let items: Vec<_> = menus
        .into_iter()
        .map(|m| {
            let url = m.resolve_url();
            json!({ "menu": m, "url": url })
        })
        .collect();

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/cms/menus. Ojo: no validamos la coherencia entre link_type y
// el destino adjunto; el resolver devuelve "#" si no cuadran (heredado).
pub async fn create_menu_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateMenuSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_menu_manager(&claims)?;

    validate_title(&body.title)?;
    validate_menu_type(&body.menu_type)?;
    validate_link_type(&body.link_type)?;
    let sort_order = body.sort_order.unwrap_or(0);
    if sort_order < 0 {
        return Err(ApiError::validation("sort_order", "must be non-negative"));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menus (title, menu_type, link_type, category_id, page_id, \
                            external_url, sort_order, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(body.title.trim())
    .bind(&body.menu_type)
    .bind(&body.link_type)
    .bind(body.category_id)
    .bind(body.page_id)
    .bind(&body.external_url)
    .bind(sort_order)
    .bind(body.is_active.unwrap_or(true))
    .fetch_one(&pool)
    .await?;

    let menu = sqlx::query_as::<_, Menu>(&format!("{MENU_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_one(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(menu)))
}

// PUT /api/cms/menus/:id
pub async fn update_menu_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateMenuSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_menu_manager(&claims)?;

    if let Some(title) = &body.title {
        validate_title(title)?;
    }
    if let Some(menu_type) = &body.menu_type {
        validate_menu_type(menu_type)?;
    }
    if let Some(link_type) = &body.link_type {
        validate_link_type(link_type)?;
    }
    if body.sort_order.is_some_and(|o| o < 0) {
        return Err(ApiError::validation("sort_order", "must be non-negative"));
    }

    let updated = sqlx::query(
        "UPDATE menus SET \
            title = COALESCE($1, title), \
            menu_type = COALESCE($2, menu_type), \
            link_type = COALESCE($3, link_type), \
            category_id = COALESCE($4, category_id), \
            page_id = COALESCE($5, page_id), \
            external_url = COALESCE($6, external_url), \
            sort_order = COALESCE($7, sort_order), \
            is_active = COALESCE($8, is_active), \
            updated_at = NOW() \
         WHERE id = $9",
    )
    .bind(&body.title)
    .bind(&body.menu_type)
    .bind(&body.link_type)
    .bind(body.category_id)
    .bind(body.page_id)
    .bind(&body.external_url)
    .bind(body.sort_order)
    .bind(body.is_active)
    .bind(id)
    .execute(&pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("menu"));
    }

    let menu = sqlx::query_as::<_, Menu>(&format!("{MENU_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_one(&pool)
        .await?;

    Ok((StatusCode::OK, Json(menu)))
}

// DELETE /api/cms/menus/:id
pub async fn delete_menu_handler(
    Path(id): Path<i64>,
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_menu_manager(&claims)?;

    let result = sqlx::query("DELETE FROM menus WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("menu"));
    }

    Ok((StatusCode::OK, Json(json!({ "message": "menu deleted" }))))
}
