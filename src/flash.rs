//! One-shot flash messages carried in a short-lived cookie, consumed by the
//! next page load.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::config::CONFIG;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(rename = "type")]
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Store a flash message on the jar. Serialization of the fixed shape cannot
/// fail, so a failure is reduced to skipping the cookie.
pub fn set_flash(jar: CookieJar, flash: &Flash) -> CookieJar {
    match serde_json::to_string(flash) {
        Ok(value) => jar.add(
            Cookie::build(Cookie::new(FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .secure(CONFIG.is_production())
                .same_site(SameSite::Lax)
                .max_age(Duration::seconds(10))
                .build(),
        ),
        Err(_) => jar,
    }
}

/// Read-and-delete: the message is gone from the jar after this call.
pub fn take_flash(jar: CookieJar) -> (Option<Flash>, CookieJar) {
    let Some(value) = jar.get(FLASH_COOKIE).map(|c| c.value().to_owned()) else {
        return (None, jar);
    };
    let flash = serde_json::from_str(&value).ok();
    let jar = jar.remove(Cookie::build(Cookie::new(FLASH_COOKIE, "")).path("/").build());
    (flash, jar)
}

/// Redirect carrying a flash message, the error surface for auth handlers.
pub fn flash_redirect(jar: CookieJar, to: &str, flash: Flash) -> Response {
    let jar = set_flash(jar, &flash);
    (jar, Redirect::temporary(to)).into_response()
}

/// 303 variant for POST handlers, so the browser follows up with a GET
/// instead of replaying the form body at the target.
pub fn flash_see_other(jar: CookieJar, to: &str, flash: Flash) -> Response {
    let jar = set_flash(jar, &flash);
    (jar, Redirect::to(to)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_round_trips_through_cookie_json() {
        let flash = Flash::error("Account denied. Please request access.");
        let encoded = serde_json::to_string(&flash).unwrap();
        assert!(encoded.contains(r#""type":"error""#));
        let decoded: Flash = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, flash);
    }

    #[test]
    fn take_flash_consumes_the_cookie() {
        let jar = CookieJar::new();
        let jar = set_flash(jar, &Flash::success("Users deleted"));
        let (flash, jar) = take_flash(jar);
        assert_eq!(flash, Some(Flash::success("Users deleted")));
        // a second read finds nothing
        let (flash, _) = take_flash(jar);
        assert_eq!(flash, None);
    }
}
