pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod homepage;
pub mod menus;
pub mod pages;
pub mod posts;
pub mod public;
pub mod settings;
