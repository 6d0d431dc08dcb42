use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::{
    db::DbPool,
    handlers::{auth, categories, dashboard, homepage, menus, pages, posts, public, settings},
    utils::jwt::auth_middleware,
};

pub fn create_routes(pool: DbPool) -> Router {
    // 1. Superficie pública (anónima): solo contenido aprobado y liberado
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/public/homepage", get(homepage::homepage_handler))
        .route("/api/public/posts", get(public::list_public_posts_handler))
        .route("/api/public/posts/featured", get(public::featured_posts_handler))
        .route("/api/public/posts/slider", get(public::slider_posts_handler))
        .route("/api/public/posts/breaking", get(public::breaking_posts_handler))
        .route("/api/public/posts/:slug", get(public::get_public_post_handler))
        .route("/api/public/categories", get(public::list_public_categories_handler))
        .route("/api/public/categories/:slug", get(public::get_public_category_handler))
        .route("/api/public/pages", get(public::list_public_pages_handler))
        .route("/api/public/pages/:slug", get(public::get_public_page_handler))
        .route("/api/public/menus", get(public::list_public_menus_handler))
        .nest_service("/uploads", ServeDir::new("uploads"));

    // 2. Panel editorial: requiere identidad; los permisos finos por rol
    // se deciden dentro de cada handler con la tabla de capacidades
    let cms_routes = Router::new()
        .route("/api/cms/dashboard", get(dashboard::dashboard_stats_handler))
        .route(
            "/api/cms/posts",
            get(posts::list_posts_handler).post(posts::create_post_handler),
        )
        .route("/api/cms/posts/bulk", post(posts::bulk_create_posts_handler))
        .route(
            "/api/cms/posts/:id",
            get(posts::get_post_handler)
                .put(posts::update_post_handler)
                .delete(posts::delete_post_handler),
        )
        .route("/api/cms/posts/:id/approve", post(posts::approve_post_handler))
        .route(
            "/api/cms/categories",
            get(categories::list_categories_handler).post(categories::create_category_handler),
        )
        .route(
            "/api/cms/categories/:id",
            get(categories::get_category_handler)
                .put(categories::update_category_handler)
                .delete(categories::delete_category_handler),
        )
        .route(
            "/api/cms/pages",
            get(pages::list_pages_handler).post(pages::create_page_handler),
        )
        .route(
            "/api/cms/pages/:id",
            get(pages::get_page_handler)
                .put(pages::update_page_handler)
                .delete(pages::delete_page_handler),
        )
        .route(
            "/api/cms/sections",
            get(pages::list_sections_handler).post(pages::create_section_handler),
        )
        .route(
            "/api/cms/sections/:id",
            put(pages::update_section_handler).delete(pages::delete_section_handler),
        )
        .route(
            "/api/cms/menus",
            get(menus::list_menus_handler).post(menus::create_menu_handler),
        )
        .route(
            "/api/cms/menus/:id",
            put(menus::update_menu_handler).delete(menus::delete_menu_handler),
        )
        .route(
            "/api/cms/settings",
            get(settings::get_settings_handler).put(settings::update_settings_handler),
        )
        .route_layer(middleware::from_fn(auth_middleware));

    // Fusionamos todo
    Router::new()
        .merge(public_routes)
        .merge(cms_routes)
        .with_state(pool)
}
