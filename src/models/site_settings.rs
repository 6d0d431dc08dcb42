use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::DbPool;

// Configuración global del sitio: una única fila, siempre accedida a
// través de get_or_init (nunca por un id mágico desde los handlers).
#[derive(Debug, Serialize, FromRow)]
pub struct SiteSettings {
    #[serde(skip)]
    pub singleton: bool,
    pub site_name: String,
    pub site_tagline: Option<String>,
    pub site_logo: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_address: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub default_seo_title: Option<String>,
    pub default_seo_description: Option<String>,
    pub posts_per_page: i32,
    pub maintenance_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteSettings {
    // Crea la fila con los defaults si todavía no existe y la devuelve
    pub async fn get_or_init(pool: &DbPool) -> Result<SiteSettings, sqlx::Error> {
        sqlx::query("INSERT INTO site_settings (singleton) VALUES (TRUE) ON CONFLICT (singleton) DO NOTHING")
            .execute(pool)
            .await?;

        sqlx::query_as::<_, SiteSettings>("SELECT * FROM site_settings WHERE singleton")
            .fetch_one(pool)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSiteSettingsSchema {
    pub site_name: Option<String>,
    pub site_tagline: Option<String>,
    pub site_logo: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_address: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub default_seo_title: Option<String>,
    pub default_seo_description: Option<String>,
    pub posts_per_page: Option<i32>,
    pub maintenance_mode: Option<bool>,
}
