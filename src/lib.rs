pub mod auth;
pub mod billing;
pub mod config;
pub mod dataroom;
pub mod db;
pub mod error;
pub mod flash;
pub mod google_oauth;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use error::DataroomError;
