pub mod category;
pub mod menu;
pub mod page;
pub mod post;
pub mod site_settings;
pub mod user;
