use reqwest::Client;
use serde_json::json;

use crate::config::Config;

/// Admin client for the identity provider. The provider shares its account
/// ids with the `usuarios` collection, so deleting by UID is enough.
pub struct IdentityService;

impl IdentityService {
    fn client() -> Client {
        Client::new()
    }

    fn api_url() -> Result<String, String> {
        Config::identity_api_url()
            .ok_or_else(|| "IDENTITY_API_URL not configured".to_string())
    }

    fn api_key() -> Result<String, String> {
        Config::identity_api_key()
            .ok_or_else(|| "IDENTITY_API_KEY not configured".to_string())
    }

    /// Delete the account with the given UID from the identity provider.
    pub async fn delete_user(uid: &str) -> Result<(), String> {
        if !Config::is_identity_enabled() {
            return Err("Identity provider is not enabled".to_string());
        }

        let url = format!("{}/accounts:delete", Self::api_url()?);

        let body = json!({
            "localId": uid,
        });

        let res = Self::client()
            .post(&url)
            .bearer_auth(Self::api_key()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Identity provider request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(res
                .text()
                .await
                .unwrap_or_else(|_| "Identity provider error".to_string()));
        }

        Ok(())
    }
}
