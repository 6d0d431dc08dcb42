use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;

pub const MENU_TYPES: [&str; 2] = ["navbar", "footer"];
pub const LINK_TYPES: [&str; 3] = ["category", "page", "url"];

// Fila de menú con los slugs de sus destinos ya resueltos por LEFT JOIN;
// solo uno de los tres destinos importa según link_type.
#[derive(Debug, Serialize, FromRow)]
pub struct Menu {
    pub id: i64,
    pub title: String,
    pub menu_type: String,
    pub link_type: String,
    pub category_id: Option<i32>,
    pub page_id: Option<i64>,
    pub external_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_slug: Option<String>,
    pub page_slug: Option<String>,
}

impl Menu {
    // Resolución defensiva en lectura: si el destino que pide link_type no
    // está, devolvemos "#" en vez de fallar. No validamos la coherencia
    // link_type/destino al escribir (comportamiento heredado, ver DESIGN.md).
    pub fn resolve_url(&self) -> String {
        match self.link_type.as_str() {
            "category" => match &self.category_slug {
                Some(slug) => format!("/category/{}/", slug),
                None => "#".to_string(),
            },
            "page" => match &self.page_slug {
                Some(slug) => format!("/page/{}/", slug),
                None => "#".to_string(),
            },
            "url" => match &self.external_url {
                Some(url) if !url.is_empty() => url.clone(),
                _ => "#".to_string(),
            },
            _ => "#".to_string(),
        }
    }
}

// Vista pública: título, tipo y URL ya resuelta
#[derive(Debug, Serialize)]
pub struct PublicMenuItem {
    pub id: i64,
    pub title: String,
    pub menu_type: String,
    pub url: String,
    pub sort_order: i32,
}

impl From<Menu> for PublicMenuItem {
    fn from(m: Menu) -> Self {
        PublicMenuItem {
            url: m.resolve_url(),
            id: m.id,
            title: m.title,
            menu_type: m.menu_type,
            sort_order: m.sort_order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuSchema {
    pub title: String,
    pub menu_type: String,
    pub link_type: String,
    pub category_id: Option<i32>,
    pub page_id: Option<i64>,
    pub external_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuSchema {
    pub title: Option<String>,
    pub menu_type: Option<String>,
    pub link_type: Option<String>,
    pub category_id: Option<i32>,
    pub page_id: Option<i64>,
    pub external_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title", "is required"));
    }
    if title.chars().count() > 200 {
        return Err(ApiError::validation("title", "must be at most 200 characters"));
    }
    Ok(())
}

pub fn validate_menu_type(menu_type: &str) -> Result<(), ApiError> {
    if MENU_TYPES.contains(&menu_type) {
        Ok(())
    } else {
        Err(ApiError::validation("menu_type", "must be 'navbar' or 'footer'"))
    }
}

pub fn validate_link_type(link_type: &str) -> Result<(), ApiError> {
    if LINK_TYPES.contains(&link_type) {
        Ok(())
    } else {
        Err(ApiError::validation(
            "link_type",
            "must be 'category', 'page' or 'url'",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(link_type: &str) -> Menu {
        let now = Utc::now();
        Menu {
            id: 1,
            title: "Deportes".into(),
            menu_type: "navbar".into(),
            link_type: link_type.into(),
            category_id: None,
            page_id: None,
            external_url: None,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            category_slug: None,
            page_slug: None,
        }
    }

    #[test]
    fn category_link_resolves_to_category_path() {
        let mut m = menu("category");
        m.category_slug = Some("deportes".into());
        assert_eq!(m.resolve_url(), "/category/deportes/");
    }

    #[test]
    fn page_link_resolves_to_page_path() {
        let mut m = menu("page");
        m.page_slug = Some("about-us".into());
        assert_eq!(m.resolve_url(), "/page/about-us/");
    }

    #[test]
    fn url_link_is_returned_verbatim() {
        let mut m = menu("url");
        m.external_url = Some("https://example.com".into());
        assert_eq!(m.resolve_url(), "https://example.com");
    }

    #[test]
    fn missing_target_falls_back_to_hash() {
        // link_type pide página pero no hay página adjunta
        assert_eq!(menu("page").resolve_url(), "#");
        assert_eq!(menu("category").resolve_url(), "#");
        assert_eq!(menu("url").resolve_url(), "#");
    }

    #[test]
    fn menu_title_length_is_limited() {
        assert!(validate_title("Deportes").is_ok());
        assert!(validate_title(&"x".repeat(200)).is_ok());
        assert!(validate_title(&"x".repeat(201)).is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn mismatched_target_is_ignored() {
        // Hay una categoría adjunta pero link_type dice "url": gana link_type
        let mut m = menu("url");
        m.category_slug = Some("deportes".into());
        assert_eq!(m.resolve_url(), "#");
    }
}
