use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::post::Language;

#[derive(Debug, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub language: String,
    pub show_in_menu: bool,
    pub menu_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vista pública: sin timestamps internos, con etiqueta de idioma legible
#[derive(Debug, Serialize)]
pub struct PublicCategory {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub language: String,
    pub language_label: &'static str,
    pub show_in_menu: bool,
    pub menu_order: i32,
}

impl From<Category> for PublicCategory {
    fn from(c: Category) -> Self {
        PublicCategory {
            language_label: Language::label_for(&c.language),
            id: c.id,
            name: c.name,
            slug: c.slug,
            language: c.language,
            show_in_menu: c.show_in_menu,
            menu_order: c.menu_order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCategorySchema {
    pub name: String,
    pub slug: Option<String>,
    pub language: Option<String>,
    pub show_in_menu: Option<bool>,
    pub menu_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategorySchema {
    pub name: Option<String>,
    pub show_in_menu: Option<bool>,
    pub menu_order: Option<i32>,
    pub is_active: Option<bool>,
}
