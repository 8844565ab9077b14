// GitHub authorization flow helpers.
// Builds the authorize URL, trades the returned code for a token, and stores the session.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::github::GitHubClient;
use crate::session::{self, AuthSession};
use crate::storage::Storage;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const SCOPE: &str = "repo";
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
}

/// URL that starts the interactive authorization handshake.
pub fn authorize_url(config: &Config, redirect_uri: &str) -> Result<String> {
    if config.oauth_client_id.is_empty() {
        return Err(SyncError::Validation(
            "oauth_client_id is not configured".to_string(),
        ));
    }

    let query = [
        ("client_id", config.oauth_client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("scope", SCOPE),
    ]
    .into_iter()
    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
    .collect::<Vec<_>>()
    .join("&");

    Ok(format!("{}?{}", AUTHORIZE_URL, query))
}

/// Pull the authorization code out of the URL the handshake redirected to.
pub fn code_from_redirect(redirect: &str) -> Result<String> {
    let parsed = url::Url::parse(redirect)
        .map_err(|e| SyncError::Authorization(format!("invalid redirect URL: {}", e)))?;

    parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| SyncError::Authorization("No code returned".to_string()))
}

/// Exchange an authorization code for an access token through the relay.
pub async fn exchange_code(config: &Config, code: &str, redirect_uri: &str) -> Result<String> {
    if config.backend_url.is_empty() {
        return Err(SyncError::Validation(
            "backend_url is not configured".to_string(),
        ));
    }

    let response = Client::new()
        .post(format!(
            "{}/exchange",
            config.backend_url.trim_end_matches('/')
        ))
        .json(&ExchangeRequest { code, redirect_uri })
        .timeout(EXCHANGE_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(SyncError::Authorization(format!(
            "exchange failed with status {}: {}",
            status, text
        )));
    }

    let body: ExchangeResponse = response.json().await?;
    body.access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SyncError::Authorization("No token".to_string()))
}

/// Resolve the token's login and persist `{token, login}`.
pub async fn store_token(
    config: &Config,
    storage: &dyn Storage,
    token: &str,
) -> Result<AuthSession> {
    let client = GitHubClient::with_base(token, &config.api_base)?;
    let user = client.get_current_user().await?;
    if user.login.is_empty() {
        return Err(SyncError::Authorization("No login".to_string()));
    }

    let session = session::store_login(storage, token, &user.login)?;
    info!(login = %session.login, "authorized");
    Ok(session)
}

/// Full handshake completion: code, token, login, stored session.
pub async fn complete_login(
    config: &Config,
    storage: &dyn Storage,
    code: &str,
    redirect_uri: &str,
) -> Result<AuthSession> {
    let token = exchange_code(config, code, redirect_uri).await?;
    store_token(config, storage, &token).await
}
