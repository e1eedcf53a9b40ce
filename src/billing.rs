//! Thin billing-provider client: one customer record per created user.

use serde_json::Value;
use tracing::info;

use crate::error::DataroomError;

const STRIPE_CUSTOMERS_URL: &str = "https://api.stripe.com/v1/customers";

#[derive(Clone)]
pub struct Billing {
    client: reqwest::Client,
    secret_key: Option<String>,
}

impl Billing {
    pub fn new(client: reqwest::Client, secret_key: Option<String>) -> Self {
        Self { client, secret_key }
    }

    /// A billing client that provisions nothing; user rows keep a NULL
    /// customer id. Used when no secret key is configured, and in tests.
    pub fn disabled(client: reqwest::Client) -> Self {
        Self {
            client,
            secret_key: None,
        }
    }

    /// Create a customer record, returning its id. `Ok(None)` when billing is
    /// not configured.
    pub async fn create_customer(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<String>, DataroomError> {
        let Some(key) = self.secret_key.as_deref() else {
            return Ok(None);
        };

        let payload: Value = self
            .client
            .post(STRIPE_CUSTOMERS_URL)
            .bearer_auth(key)
            .form(&[("name", name), ("email", email)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let id = payload
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        info!(email = %email, customer = %id.as_deref().unwrap_or("<none>"), "created billing customer");
        Ok(id)
    }
}
