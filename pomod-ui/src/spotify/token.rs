//! Token refresher
//!
//! Lazily renews an expired bearer credential before an authenticated
//! request context is built. Renewal never returns an error: a failed
//! exchange (or an absent refresh token) yields the credential tagged
//! with the refresh-failure marker, and the caller decides what to
//! surface. Exactly one outbound call per invocation when expired,
//! none when the credential is still valid.
//!
//! Refresh is deliberately not guarded against concurrent invocation:
//! racing refreshes each produce a valid credential and the session
//! store keeps the last write.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use pomod_common::api::types::StoredCredential;
use pomod_common::time::epoch_secs;

/// Default timeout for token endpoint requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Renews credentials at the provider token endpoint
pub struct TokenRefresher {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Providers are not required to rotate the refresh token
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime of the new access token in seconds
    expires_in: i64,
}

impl TokenRefresher {
    /// Create a refresher for the given token endpoint and OAuth client
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Return a usable credential, renewing it if expired
    ///
    /// - Still valid: returned unchanged, no network call.
    /// - Expired with a refresh token: exchanged at the token endpoint;
    ///   the refresh token is kept unless the provider rotated it.
    /// - Expired without a refresh token, or exchange failed: the
    ///   credential comes back tagged with the refresh-failure marker.
    pub async fn ensure_valid(&self, credential: StoredCredential) -> StoredCredential {
        let now = epoch_secs();
        if !credential.is_expired(now) {
            return credential;
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            warn!("Credential expired and no refresh token stored");
            return credential.with_refresh_error();
        };

        match self.exchange(&refresh_token).await {
            Ok(response) => {
                debug!("Access token renewed, expires in {}s", response.expires_in);
                StoredCredential {
                    access_token: response.access_token,
                    refresh_token: response.refresh_token.or(credential.refresh_token),
                    expires_at: now + response.expires_in,
                    error: None,
                }
            }
            Err(reason) => {
                warn!("Token exchange failed: {}", reason);
                credential.with_refresh_error()
            }
        }
    }

    /// One refresh-token grant against the token endpoint
    async fn exchange(&self, refresh_token: &str) -> Result<TokenResponse, String> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| format!("token endpoint unreachable: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("token endpoint returned {}: {}", status, body));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| format!("malformed token response: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresher() -> TokenRefresher {
        // Unroutable endpoint: any attempted exchange fails fast, and
        // the no-network cases never touch it
        TokenRefresher::new("http://127.0.0.1:1/token", "client-id", "client-secret")
    }

    #[tokio::test]
    async fn test_valid_credential_is_returned_unchanged() {
        let credential = StoredCredential {
            access_token: "tok".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: epoch_secs() + 3600,
            error: None,
        };

        let result = refresher().ensure_valid(credential.clone()).await;
        assert_eq!(result.access_token, credential.access_token);
        assert_eq!(result.expires_at, credential.expires_at);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_is_tagged_without_network() {
        let credential = StoredCredential {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: epoch_secs() - 10,
            error: None,
        };

        let result = refresher().ensure_valid(credential).await;
        assert!(result.error.is_some());
        assert_eq!(result.access_token, "tok");
    }

    #[tokio::test]
    async fn test_failed_exchange_tags_credential() {
        let credential = StoredCredential {
            access_token: "tok".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: epoch_secs() - 10,
            error: None,
        };

        // The unroutable endpoint makes the exchange fail
        let result = refresher().ensure_valid(credential).await;
        assert!(result.error.is_some());
        // The refresh token is retained for a later manual retry
        assert_eq!(result.refresh_token.as_deref(), Some("refresh"));
    }
}
