use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Serialize;

use crate::{
    db::DbPool,
    error::ApiError,
    models::user::Claims,
    utils::permissions::Principal,
};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_posts: i64,
    pub published_posts: i64,
    pub pending_posts: i64,
    pub draft_posts: i64,
    pub scheduled_posts: i64,
    pub featured_posts: i64,
    pub slider_posts: i64,
    pub breaking_posts: i64,
    pub total_views: i64,
    pub total_categories: i64,
    pub total_pages: i64,
}

// GET /api/cms/dashboard - contadores del panel. El writer solo ve los
// números de sus propios posts; editor/admin ven el total.
pub async fn dashboard_stats_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = Principal::from_claims(&claims);
    let author_filter = principal.post_author_filter();

    // Un solo viaje a la base con agregación condicional
    let row: (i64, i64, i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE status = 'published'), \
                COUNT(*) FILTER (WHERE status = 'pending'), \
                COUNT(*) FILTER (WHERE status = 'draft'), \
                COUNT(*) FILTER (WHERE status = 'scheduled'), \
                COUNT(*) FILTER (WHERE is_featured), \
                COUNT(*) FILTER (WHERE is_slider), \
                COUNT(*) FILTER (WHERE is_breaking), \
                COALESCE(SUM(views_count), 0)::bigint \
         FROM posts \
         WHERE ($1::bigint IS NULL OR author_id = $1)",
    )
    .bind(author_filter)
    .fetch_one(&pool)
    .await?;

    let total_categories: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE is_active")
            .fetch_one(&pool)
            .await?;
    let total_pages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE is_active")
        .fetch_one(&pool)
        .await?;

    let stats = DashboardStats {
        total_posts: row.0,
        published_posts: row.1,
        pending_posts: row.2,
        draft_posts: row.3,
        scheduled_posts: row.4,
        featured_posts: row.5,
        slider_posts: row.6,
        breaking_posts: row.7,
        total_views: row.8,
        total_categories,
        total_pages,
    };

    Ok((StatusCode::OK, Json(stats)))
}
