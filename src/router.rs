use axum::{
    Router, middleware,
    extract::FromRef,
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::Key;
use base64::Engine;
use tracing::warn;

use crate::billing::Billing;
use crate::config::CONFIG;
use crate::dataroom::Dataroom;
use crate::db::store::Storage;
use crate::handlers::{auth, chat, files, projects, users};
use crate::middleware::route_guard;

#[derive(Clone)]
pub struct AppState {
    pub store: Storage,
    pub dataroom: Dataroom,
    pub billing: Billing,
    pub http: reqwest::Client,
    key: Key,
}

impl AppState {
    pub fn new(
        store: Storage,
        dataroom: Dataroom,
        billing: Billing,
        http: reqwest::Client,
        key: Key,
    ) -> Self {
        Self {
            store,
            dataroom,
            billing,
            http,
            key,
        }
    }
}

// PrivateCookieJar pulls its encryption key out of the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

/// Private-jar key from config, or a fresh per-process key when unset (OAuth
/// flows in progress will not survive a restart in that case).
pub fn cookie_key() -> Key {
    match CONFIG.cookie_key.as_deref() {
        Some(encoded) => match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) if bytes.len() >= 64 => Key::from(&bytes),
            _ => {
                warn!("DATAROOM_COOKIE_KEY is not valid base64 of >= 64 bytes; generating one");
                Key::generate()
            }
        },
        None => Key::generate(),
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/google", get(auth::google_entry))
        .route("/api/auth/google/callback", get(auth::google_callback))
        .route("/api/auth/token", post(auth::token_login))
        .route("/api/logout", get(auth::logout))
        .route("/api/me", get(auth::me))
        .route(
            "/api/users",
            get(users::list_users).delete(users::delete_users),
        )
        .route(
            "/api/users/allowed",
            get(users::list_allowed)
                .post(users::add_allowed)
                .delete(users::delete_allowed),
        )
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/api/projects/{name}", delete(projects::delete_project))
        .route("/api/files/upload", post(files::upload_files))
        .route("/api/files/{project}/{name}", get(files::get_result_file))
        .route("/chat", post(chat::chat))
        .layer(middleware::from_fn(route_guard))
        .with_state(state)
}
