use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};

use crate::{
    db::DbPool,
    error::ApiError,
    models::site_settings::{SiteSettings, UpdateSiteSettingsSchema},
    models::user::Claims,
    utils::permissions::{Action, Principal},
};

fn require_settings_manager(claims: &Claims) -> Result<(), ApiError> {
    let principal = Principal::from_claims(claims);
    if !principal.can(Action::ManageSettings) {
        return Err(ApiError::Forbidden("only admins can manage site settings"));
    }
    Ok(())
}

// GET /api/cms/settings - la fila se crea con defaults si aún no existe
pub async fn get_settings_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_settings_manager(&claims)?;

    let settings = SiteSettings::get_or_init(&pool).await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/cms/settings - actualización parcial
pub async fn update_settings_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateSiteSettingsSchema>,
) -> Result<impl IntoResponse, ApiError> {
    require_settings_manager(&claims)?;

    if body.site_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("site_name", "cannot be empty"));
    }
    if body.posts_per_page.is_some_and(|n| n < 1) {
        return Err(ApiError::validation("posts_per_page", "must be at least 1"));
    }

    // Garantiza que la fila exista antes del UPDATE
    SiteSettings::get_or_init(&pool).await?;

    let settings = sqlx::query_as::<_, SiteSettings>(
        "UPDATE site_settings SET \
            site_name = COALESCE($1, site_name), \
            site_tagline = COALESCE($2, site_tagline), \
            site_logo = COALESCE($3, site_logo), \
            contact_email = COALESCE($4, contact_email), \
            contact_phone = COALESCE($5, contact_phone), \
            contact_address = COALESCE($6, contact_address), \
            facebook_url = COALESCE($7, facebook_url), \
            twitter_url = COALESCE($8, twitter_url), \
            instagram_url = COALESCE($9, instagram_url), \
            youtube_url = COALESCE($10, youtube_url), \
            default_seo_title = COALESCE($11, default_seo_title), \
            default_seo_description = COALESCE($12, default_seo_description), \
            posts_per_page = COALESCE($13, posts_per_page), \
            maintenance_mode = COALESCE($14, maintenance_mode), \
            updated_at = NOW() \
         WHERE singleton \
         RETURNING *",
    )
    .bind(&body.site_name)
    .bind(&body.site_tagline)
    .bind(&body.site_logo)
    .bind(&body.contact_email)
    .bind(&body.contact_phone)
    .bind(&body.contact_address)
    .bind(&body.facebook_url)
    .bind(&body.twitter_url)
    .bind(&body.instagram_url)
    .bind(&body.youtube_url)
    .bind(&body.default_seo_title)
    .bind(&body.default_seo_description)
    .bind(body.posts_per_page)
    .bind(body.maintenance_mode)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::OK, Json(settings)))
}
