// Home Assistant REST repository implementation
use crate::application::state_repository::StateRepository;
use crate::domain::entity::{EntityState, HostStates};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum HaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication with Home Assistant failed")]
    AuthenticationFailed,
    #[error("Home Assistant returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid client configuration: {0}")]
    Config(String),
}

#[derive(Clone)]
pub struct HaStateRepository {
    base_url: String,
    token: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HaStateRepository {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, HaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HaError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let token = token.into();
        if token.is_empty() {
            warn!("No Home Assistant token configured; requests will be rejected");
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, HaError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut attempts = 0;
        let mut delay = self.retry_delay;
        loop {
            attempts += 1;
            match self.client.get(&url).bearer_auth(&self.token).send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request to {} failed after {} attempts: {}", url, attempts, e);
                    return Err(HaError::Http(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, HaError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(HaError::AuthenticationFailed),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(HaError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    pub async fn fetch_states(&self) -> Result<Vec<EntityState>, HaError> {
        let response = Self::check(self.get("/api/states").await?).await?;
        let states = response.json::<Vec<EntityState>>().await?;
        debug!("Fetched {} entity states", states.len());
        Ok(states)
    }
}

#[async_trait]
impl StateRepository for HaStateRepository {
    async fn list_states(&self) -> anyhow::Result<HostStates> {
        Ok(HostStates::new(self.fetch_states().await?))
    }
}
