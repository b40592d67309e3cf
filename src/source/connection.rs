use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::endpoints::{rows_into_recipes, PreferenceRequestBody, RecipeRow, RECIPES_PATH, RECOMMENDATIONS_PATH};
use super::CandidateSource;
use crate::recipe::{Recipe, ScoreVector};

#[derive(Debug)]
pub enum SourceError {
    NotConfigured(String),
    Unavailable(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotConfigured(what) => write!(f, "Recipe source not configured: {}", what),
            SourceError::Unavailable(reason) => write!(f, "Recipe source unavailable: {}", reason),
            SourceError::NetworkError(err) => write!(f, "Network error: {}", err),
            SourceError::SerializationError(err) => write!(f, "Serialization error: {}", err),
            SourceError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SourceError::NetworkError(err) => Some(err),
            SourceError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::NetworkError(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::SerializationError(err)
    }
}

/// Live recipe backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRecipeSource {
    client: Client,
    base_url: String,
}

impl HttpRecipeSource {
    /// `timeout` bounds every fetch; it is the only timeout around the
    /// candidate-fetch step.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SourceError::NotConfigured("empty base URL".to_string()));
        }
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_rows(&self, response: reqwest::Response) -> Result<Vec<Recipe>, SourceError> {
        if response.status().is_success() {
            let body = response.text().await?;
            let rows: Vec<RecipeRow> = serde_json::from_str(&body)?;
            let recipes = rows_into_recipes(rows);
            debug!(count = recipes.len(), base_url = %self.base_url, "fetched recipes");
            Ok(recipes)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(SourceError::ApiError { status, error_body })
        }
    }
}

#[async_trait]
impl CandidateSource for HttpRecipeSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_all(&self) -> Result<Vec<Recipe>, SourceError> {
        let url = format!("{}{}", self.base_url, RECIPES_PATH);
        let response = self.client.get(&url).send().await?;
        self.read_rows(response).await
    }

    async fn fetch_by_preference_proximity(
        &self,
        preferences: &ScoreVector,
    ) -> Result<Vec<Recipe>, SourceError> {
        let url = format!("{}{}", self.base_url, RECOMMENDATIONS_PATH);
        let response = self
            .client
            .post(&url)
            .json(&PreferenceRequestBody::from(preferences))
            .send()
            .await?;
        self.read_rows(response).await
    }
}
