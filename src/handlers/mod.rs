pub mod auth;
pub mod chat;
pub mod files;
pub mod projects;
pub mod users;
