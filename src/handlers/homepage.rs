use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::DbPool,
    error::ApiError,
    handlers::public::{fetch_public_page, fetch_public_posts, normalize_lang, PublicPostFilters},
    models::category::{Category, PublicCategory},
    models::menu::{Menu, PublicMenuItem},
    models::page::PublicPage,
    models::post::PublicPostItem,
};

use crate::handlers::menus::MENU_SELECT;

// Slug reservado de la página de portada; que no exista NO es un error
const HOMEPAGE_SLUG: &str = "home";

#[derive(Debug, Serialize)]
pub struct HomepageMenus {
    pub navbar: Vec<PublicMenuItem>,
    pub footer: Vec<PublicMenuItem>,
}

#[derive(Debug, Serialize)]
pub struct HomepageResponse {
    pub menus: HomepageMenus,
    pub categories: Vec<PublicCategory>,
    pub featured_posts: Vec<PublicPostItem>,
    pub slider_posts: Vec<PublicPostItem>,
    pub breaking_posts: Vec<PublicPostItem>,
    pub latest_posts: Vec<PublicPostItem>,
    pub homepage_page: Option<PublicPage>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HomepageFilters {
    pub lang: Option<String>,
}

// GET /api/public/homepage - composición de solo lectura de toda la
// portada en una sola respuesta. Las queries son independientes: no hay
// garantía de consistencia entre ellas (un leve sesgo temporal es
// aceptable para una portada).
pub async fn homepage_handler(
    State(pool): State<DbPool>,
    opts: Option<Query<HomepageFilters>>,
) -> Result<impl IntoResponse, ApiError> {
    let opts = opts.map(|Query(o)| o).unwrap_or_default();

    // Menús activos, agrupados por tipo y ordenados por orden y título
    let menus = sqlx::query_as::<_, Menu>(&format!(
        "{MENU_SELECT} WHERE m.is_active ORDER BY m.menu_type, m.sort_order, m.title"
    ))
    .fetch_all(&pool)
    .await?;

    let mut navbar = Vec::new();
    let mut footer = Vec::new();
    for menu in menus {
        let item = PublicMenuItem::from(menu);
        if item.menu_type == "footer" {
            footer.push(item);
        } else {
            navbar.push(item);
        }
    }

    // Categorías activas elegibles para menú, con filtro opcional de idioma
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories \
         WHERE is_active AND show_in_menu \
           AND ($1::text IS NULL OR language = $1) \
         ORDER BY menu_order, name",
    )
    .bind(normalize_lang(opts.lang.clone()))
    .fetch_all(&pool)
    .await?;

    // Cuatro franjas de posts, todas bajo el predicado público y en orden
    // de publicación descendente, cada una con su tope fijo
    let lang_filter = PublicPostFilters {
        lang: opts.lang.clone(),
        ..Default::default()
    };
    let featured = PublicPostFilters {
        featured: Some("true".into()),
        ..lang_filter.clone()
    };
    let slider = PublicPostFilters {
        slider: Some("true".into()),
        ..lang_filter.clone()
    };
    let breaking = PublicPostFilters {
        breaking: Some("true".into()),
        ..lang_filter.clone()
    };

    let featured_posts = fetch_public_posts(&pool, &featured, 6).await?;
    let slider_posts = fetch_public_posts(&pool, &slider, 10).await?;
    let breaking_posts = fetch_public_posts(&pool, &breaking, 5).await?;
    let latest_posts = fetch_public_posts(&pool, &lang_filter, 20).await?;

    // La página "home" es opcional: si no está, el campo queda vacío
    let homepage_page = fetch_public_page(&pool, HOMEPAGE_SLUG).await?;

    let response = HomepageResponse {
        menus: HomepageMenus { navbar, footer },
        categories: categories.into_iter().map(PublicCategory::from).collect(),
        featured_posts,
        slider_posts,
        breaking_posts,
        latest_posts,
        homepage_page,
    };

    Ok((StatusCode::OK, Json(response)))
}
