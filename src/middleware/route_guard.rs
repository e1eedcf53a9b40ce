//! Route protection: unauthenticated requests to non-public paths are sent
//! back to the landing page.
//!
//! This gate checks cookie *presence* only; destination handlers re-validate
//! the session against the store.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::SESSION_COOKIE;

const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/news",
    "/privacy-policy",
    "/terms-and-conditions",
    "/about",
];

const PUBLIC_PREFIXES: &[&str] = &["/api/auth/"];

const ASSET_PREFIXES: &[&str] = &["/assets/", "/static/"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
        || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
        || ASSET_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub async fn route_guard(jar: CookieJar, req: Request, next: Next) -> Response {
    if !is_public_path(req.uri().path()) && jar.get(SESSION_COOKIE).is_none() {
        return Redirect::temporary("/").into_response();
    }
    next.run(req).await
}
