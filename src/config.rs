use std::path::PathBuf;
use std::sync::LazyLock;

use figment::{Figment, providers::Env};
use serde::Deserialize;
use url::Url;

pub static GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub static GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Process-wide configuration, loaded once from `DATAROOM_*` environment
/// variables. Read-only after startup.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    let mut config: Config = Figment::new()
        .merge(Env::prefixed("DATAROOM_"))
        .extract()
        .expect("FATAL: invalid DATAROOM_* environment configuration");
    ensure_trailing_slash(&mut config.openai_base_url);
    config
});

/// `Url::join` resolves relative to the last `/`; a base configured without
/// one would lose its final path segment on every join.
fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Deployment environment; cookies are only marked `Secure` in production.
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_dataroom_path")]
    pub dataroom_path: PathBuf,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Backend API notified before a project directory is removed.
    #[serde(default)]
    pub api_url: Option<Url>,

    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub google_client_secret: Option<String>,
    #[serde(default)]
    pub google_redirect_uri: Option<Url>,

    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: Url,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    /// Base64 key for the private cookie jar; a fresh key is generated per
    /// process when unset (OAuth flows then break across restarts).
    #[serde(default)]
    pub cookie_key: Option<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            bind: default_bind(),
            database_url: default_database_url(),
            dataroom_path: default_dataroom_path(),
            loglevel: default_loglevel(),
            admin_name: default_admin_name(),
            admin_email: default_admin_email(),
            api_url: None,
            google_client_id: None,
            google_client_secret: None,
            google_redirect_uri: None,
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            stripe_secret_key: None,
            cookie_key: None,
        }
    }
}

fn default_env() -> String {
    "dev".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite:dataroom.sqlite".to_string()
}

fn default_dataroom_path() -> PathBuf {
    PathBuf::from("dataroom")
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_openai_base_url() -> Url {
    Url::parse("https://api.openai.com/v1/").expect("static URL")
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path_on_join() {
        let mut url = Url::parse("https://llm.internal/v1").unwrap();
        ensure_trailing_slash(&mut url);
        assert_eq!(url.as_str(), "https://llm.internal/v1/");
        assert_eq!(
            url.join("chat/completions").unwrap().as_str(),
            "https://llm.internal/v1/chat/completions"
        );
    }

    #[test]
    fn base_url_with_trailing_slash_is_untouched() {
        let mut url = default_openai_base_url();
        ensure_trailing_slash(&mut url);
        assert_eq!(url.as_str(), "https://api.openai.com/v1/");
    }
}
