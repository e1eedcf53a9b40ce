use crate::config::{CONFIG, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URI};
use crate::error::DataroomError;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, ExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

/// Stateless Google OAuth endpoints for the authorization-code + PKCE flow.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Consent-page URL with PKCE challenge and a fresh CSRF token.
    pub fn build_authorize_url(
        challenge: PkceCodeChallenge,
    ) -> Result<(Url, CsrfToken), DataroomError> {
        let client = build_oauth2_client()?;
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(challenge)
            .url();
        Ok((auth_url, csrf_token))
    }

    /// Exchange the callback code for tokens.
    pub async fn exchange_authorization_code(
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
        http_client: reqwest::Client,
    ) -> Result<GoogleTokenResponse, DataroomError> {
        let client = build_oauth2_client()?;
        let token_response: GoogleTokenResponse = client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(&http_client)
            .await?;
        info!("exchanged authorization code for tokens");
        Ok(token_response)
    }
}

/// Build the Google OAuth2 client from configuration; fails cleanly when the
/// Google credentials are not configured.
fn build_oauth2_client() -> Result<GoogleOauth2Client, DataroomError> {
    let (Some(client_id), Some(client_secret), Some(redirect_uri)) = (
        CONFIG.google_client_id.as_ref(),
        CONFIG.google_client_secret.as_ref(),
        CONFIG.google_redirect_uri.as_ref(),
    ) else {
        return Err(DataroomError::OauthFlow(
            "Google OAuth is not configured".to_string(),
        ));
    };

    let client = OAuth2Client::new(ClientId::new(client_id.clone()))
        .set_client_secret(ClientSecret::new(client_secret.clone()))
        .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string())?)
        .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URI.to_string())?)
        .set_redirect_uri(RedirectUrl::new(redirect_uri.as_str().to_string())?);
    Ok(client)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleTokenField {
    #[serde(rename = "id_token")]
    pub id_token: Option<String>,
}
impl ExtraTokenFields for GoogleTokenField {}

pub type GoogleTokenResponse = StandardTokenResponse<GoogleTokenField, BasicTokenType>;

pub type GoogleOauth2Client = OAuth2Client<
    BasicErrorResponse,
    GoogleTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;
