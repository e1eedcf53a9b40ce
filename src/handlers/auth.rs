use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, PrivateCookieJar, SameSite};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::info;

use crate::auth::{LoginRequest, SESSION_COOKIE, get_or_create_session};
use crate::config::CONFIG;
use crate::db::models::{Session, UserRole, now_ms};
use crate::error::DataroomError;
use crate::flash::{Flash, flash_redirect, flash_see_other, take_flash};
use crate::google_oauth::{GoogleOauthEndpoints, IdClaims};
use crate::router::AppState;

const CSRF_COOKIE: &str = "oauth_csrf_token";
const PKCE_COOKIE: &str = "oauth_pkce_verifier";

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenLoginForm {
    #[serde(rename = "access-token")]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: Option<UserInfo>,
    pub flash: Option<Flash>,
}

/// GET /api/auth/google -> redirect to Google's consent page, parking the
/// CSRF token and PKCE verifier in private cookies.
pub async fn google_entry(jar: PrivateCookieJar) -> Result<impl IntoResponse, DataroomError> {
    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    let (auth_url, csrf_token) = GoogleOauthEndpoints::build_authorize_url(challenge)?;

    let jar = store_oauth_cookies(jar, &csrf_token, verifier.secret());

    info!("Dispatching OAuth redirect");
    Ok((jar, Redirect::temporary(auth_url.as_ref())))
}

/// GET /api/auth/google/callback -> exchange the code, resolve the login and
/// set the session cookie. Every failure lands on `/` with a flash message.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<AuthCallbackQuery>,
    private_jar: PrivateCookieJar,
    jar: CookieJar,
) -> Response {
    let (pkce_verifier, csrf_cookie, private_jar) = match load_oauth_session(private_jar) {
        Ok(data) => data,
        Err((private_jar, msg)) => return oauth_failure(private_jar, jar, msg),
    };

    let state_param = match query.state.as_deref() {
        Some(s) => s,
        None => return oauth_failure(private_jar, jar, "Failed to get access token"),
    };
    if state_param != csrf_cookie {
        return oauth_failure(private_jar, jar, "Failed to get access token");
    }

    let code = match query.code.as_deref() {
        Some(code) => code,
        None => return oauth_failure(private_jar, jar, "Failed to get access token"),
    };

    let token_response = match GoogleOauthEndpoints::exchange_authorization_code(
        AuthorizationCode::new(code.to_owned()),
        PkceCodeVerifier::new(pkce_verifier),
        state.http.clone(),
    )
    .await
    {
        Ok(res) => res,
        Err(_) => return oauth_failure(private_jar, jar, "Failed to get access token"),
    };

    let claims = IdClaims::from_token_response(&token_response);
    let (oauth_id, name, email) = match claims {
        Some(IdClaims {
            sub,
            email: Some(email),
            name: Some(name),
        }) => (sub, name, email),
        _ => return oauth_failure(private_jar, jar, "Failed to get access token"),
    };

    match get_or_create_session(
        &state.store,
        &state.billing,
        LoginRequest::oauth(oauth_id, name, email),
    )
    .await
    {
        Ok(session) => {
            let jar = jar.add(session_cookie(&session));
            info!(session_id = %session.id, "OAuth login complete");
            (private_jar, jar, Redirect::temporary("/dashboard")).into_response()
        }
        Err(err) => oauth_failure(private_jar, jar, &err.to_string()),
    }
}

/// POST /api/auth/token -> manual access-token login. In the dev environment
/// the admin user's token is used instead of the form field. Redirects are
/// 303 so the browser re-requests the target with GET.
pub async fn token_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<TokenLoginForm>,
) -> Response {
    // already logged in with a live session: straight to the dashboard
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && matches!(state.store.validate_session(cookie.value()).await, Ok(true))
    {
        return Redirect::to("/dashboard").into_response();
    }

    let access_token = if CONFIG.env == "dev" {
        match state.store.user_by_email(&CONFIG.admin_email).await {
            Ok(user) => user.and_then(|u| u.access_token),
            Err(err) => return flash_see_other(jar, "/", Flash::error(err.to_string())),
        }
    } else {
        form.access_token
    };

    let Some(access_token) = access_token else {
        return flash_see_other(
            jar,
            "/",
            Flash::error("Access token not found in request."),
        );
    };

    match get_or_create_session(&state.store, &state.billing, LoginRequest::token(access_token))
        .await
    {
        Ok(session) => {
            let jar = jar.add(session_cookie(&session));
            (jar, Redirect::to("/dashboard")).into_response()
        }
        Err(err) => flash_see_other(jar, "/", Flash::error(err.to_string())),
    }
}

/// GET /api/logout -> drop the session row and the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, DataroomError> {
    let jar = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let session_id = cookie.value().to_owned();
        state.store.delete_session(&session_id).await?;
        jar.remove(clear_cookie(SESSION_COOKIE))
    } else {
        jar
    };
    Ok((jar, Redirect::temporary("/")).into_response())
}

/// GET /api/me -> the logged-in user (or null) plus the one-shot flash
/// message, which is consumed here.
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, DataroomError> {
    let (flash, jar) = take_flash(jar);

    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            let session_id = cookie.value().to_owned();
            match state.store.get_session(&session_id).await? {
                Some(_) => state.store.user_by_session_id(&session_id).await?,
                None => None,
            }
        }
        None => None,
    };

    let body = MeResponse {
        user: user.map(|u| UserInfo {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }),
        flash,
    };
    Ok((jar, Json(body)).into_response())
}

/// Session cookie pinned to the session's absolute expiry: max-age is the
/// remaining lifetime, not the raw epoch value.
fn session_cookie(session: &Session) -> Cookie<'static> {
    let remaining_ms = (session.expires_at - now_ms()).max(0);
    Cookie::build(Cookie::new(SESSION_COOKIE, session.id.clone()))
        .path("/")
        .http_only(true)
        .secure(CONFIG.is_production())
        .same_site(SameSite::Lax)
        .max_age(Duration::milliseconds(remaining_ms))
        .build()
}

fn store_oauth_cookies(
    jar: PrivateCookieJar,
    csrf: &CsrfToken,
    pkce_verifier: &str,
) -> PrivateCookieJar {
    jar.add(build_oauth_cookie(CSRF_COOKIE, csrf.secret().to_string()))
        .add(build_oauth_cookie(PKCE_COOKIE, pkce_verifier.to_string()))
}

fn load_oauth_session(
    jar: PrivateCookieJar,
) -> Result<(String, String, PrivateCookieJar), (PrivateCookieJar, &'static str)> {
    let Some(csrf_cookie) = jar.get(CSRF_COOKIE).map(|c| c.value().to_owned()) else {
        let jar = clear_oauth_cookies(jar);
        return Err((jar, "Failed to get access token"));
    };

    let Some(pkce_cookie) = jar.get(PKCE_COOKIE).map(|c| c.value().to_owned()) else {
        let jar = clear_oauth_cookies(jar);
        return Err((jar, "Failed to get access token"));
    };

    let jar = clear_oauth_cookies(jar);

    Ok((pkce_cookie, csrf_cookie, jar))
}

fn clear_oauth_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(CSRF_COOKIE))
        .remove(clear_cookie(PKCE_COOKIE))
}

fn build_oauth_cookie(name: &str, value: String) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(15))
        .build()
}

fn clear_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn oauth_failure(private_jar: PrivateCookieJar, jar: CookieJar, message: &str) -> Response {
    (private_jar, flash_redirect(jar, "/", Flash::error(message))).into_response()
}
