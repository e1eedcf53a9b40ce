//! Identity claims pulled from Google's `id_token`.
//!
//! The payload is decoded without signature verification: the token arrives
//! over the direct token-endpoint exchange, not from the browser.

use base64::Engine;
use serde::Deserialize;

use super::endpoints::GoogleTokenResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct IdClaims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl IdClaims {
    /// Decode the JWT payload segment of the response's `id_token`.
    pub fn from_token_response(response: &GoogleTokenResponse) -> Option<Self> {
        let id_token = response.extra_fields().id_token.as_deref()?;
        Self::from_id_token(id_token)
    }

    pub fn from_id_token(id_token: &str) -> Option<Self> {
        let payload_b64 = id_token.split('.').nth(1)?;
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload_b64)
            .ok()?;
        serde_json::from_slice(&decoded).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn fake_jwt(payload: &str) -> String {
        let b64 = |s: &str| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(s);
        format!("{}.{}.{}", b64(r#"{"alg":"none"}"#), b64(payload), b64("sig"))
    }

    #[test]
    fn decodes_claims_from_payload_segment() {
        let token = fake_jwt(r#"{"sub":"g1","email":"a@x.com","name":"A"}"#);
        let claims = IdClaims::from_id_token(&token).unwrap();
        assert_eq!(claims.sub, "g1");
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.name.as_deref(), Some("A"));
    }

    #[test]
    fn malformed_token_yields_none() {
        assert!(IdClaims::from_id_token("not-a-jwt").is_none());
        assert!(IdClaims::from_id_token("a.!!!.c").is_none());
    }
}
