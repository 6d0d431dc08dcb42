pub mod jwt;
pub mod media;
pub mod permissions;
pub mod query;
pub mod security;
pub mod slug;
