//! Coin shop HTTP client implementation.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{ApiErrorResponse, AuthRequest, AuthResponse, InfoView, SendCoinRequest};

/// Message the service uses for insufficient balance failures.
const INSUFFICIENT_BALANCE: &str = "insufficient balance";

/// Coin shop API client.
///
/// Call [`CoinShopClient::authenticate`] (or [`CoinShopClient::set_token`])
/// before the protected calls. Clones share the connection pool and carry
/// their own copy of the token.
#[derive(Debug, Clone)]
pub struct CoinShopClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CoinShopClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the coin shop service (e.g., `"http://localhost:8080"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .pool_max_idle_per_host(options.max_idle_connections)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// The current bearer token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Use an existing bearer token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Authenticate (registering on first use) and keep the token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the password does not match, or another
    /// error if the request fails.
    pub async fn authenticate(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/api/auth", self.base_url);
        let request = AuthRequest {
            username: username.into(),
            password: password.into(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let body: AuthResponse = handle_response(response).await?.json().await?;

        tracing::debug!(username = %request.username, "Authenticated");
        self.token = Some(body.token.clone());
        Ok(body.token)
    }

    /// Get balance, inventory and coin history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn info(&self) -> Result<InfoView, ClientError> {
        let url = format!("{}/api/info", self.base_url);

        let response = self.authorized(self.client.get(&url))?.send().await?;

        Ok(handle_response(response).await?.json().await?)
    }

    /// Send coins to another user.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if the balance does not cover `amount`,
    /// or another error if the request fails.
    pub async fn send_coin(
        &self,
        to_user: impl Into<String>,
        amount: i64,
    ) -> Result<(), ClientError> {
        let url = format!("{}/api/sendCoin", self.base_url);
        let request = SendCoinRequest {
            to_user: to_user.into(),
            amount,
        };

        let response = self
            .authorized(self.client.post(&url).json(&request))?
            .send()
            .await?;

        handle_response(response).await?;
        Ok(())
    }

    /// Buy one unit of `item`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if the balance does not cover the price,
    /// or another error if the request fails.
    pub async fn buy(&self, item: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/buy/{item}", self.base_url);

        let response = self.authorized(self.client.get(&url))?.send().await?;

        handle_response(response).await?;
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

/// Pass successful responses through and convert errors.
async fn handle_response(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiErrorResponse>().await {
        Ok(body) => body.errors,
        Err(_) => format!("HTTP {status}"),
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized { message },
        StatusCode::BAD_REQUEST => ClientError::BadRequest { message },
        StatusCode::INTERNAL_SERVER_ERROR if message == INSUFFICIENT_BALANCE => {
            ClientError::InsufficientBalance
        }
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Idle connections kept per host (default: 100).
    pub max_idle_connections: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_connections: 100,
        }
    }
}
