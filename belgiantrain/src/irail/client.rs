//! iRail HTTP client.
//!
//! Provides the production [`IrailApi`] implementation. Handles query
//! parameters, concurrency limiting, status mapping and conversion to
//! domain types.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{
    Composition, ConnectionResult, Disturbance, LiveboardResult, Station, StationId, VehicleInfo,
};

use super::api::{ApiResult, IrailApi};
use super::convert;
use super::error::IrailError;
use super::types::{
    CompositionResponse, ConnectionsResponse, DisturbancesResponse, LiveboardResponse,
    StationsResponse, VehicleResponse,
};

/// Default base URL for the iRail API.
const DEFAULT_BASE_URL: &str = "https://api.irail.be";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// iRail asks clients to identify themselves.
const DEFAULT_USER_AGENT: &str = concat!("belgiantrain/", env!("CARGO_PKG_VERSION"));

/// Configuration for the iRail client.
#[derive(Debug, Clone)]
pub struct IrailConfig {
    /// Base URL for the API (defaults to production iRail)
    pub base_url: String,
    /// Response language (`en`, `nl`, `fr` or `de`)
    pub language: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl IrailConfig {
    /// Create a config pointing at production iRail.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the response language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for IrailConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// iRail API client.
///
/// Uses a semaphore to limit concurrent requests; iRail rate limits
/// aggressive clients.
#[derive(Debug, Clone)]
pub struct IrailClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
    semaphore: Arc<Semaphore>,
}

impl IrailClient {
    /// Create a new iRail client with the given configuration.
    pub fn new(config: IrailConfig) -> Result<Self, IrailError> {
        if config.max_concurrent == 0 {
            return Err(IrailError::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| IrailError::InvalidConfig("invalid user agent".to_string()))?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Issue a GET request and decode the JSON body.
    ///
    /// A 404 or an empty/`null` body is reported as `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| IrailError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}/", self.base_url, endpoint);
        debug!(%url, ?params, "iRail request");

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("lang", self.language.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(IrailError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IrailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| IrailError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })
    }
}

#[async_trait]
impl IrailApi for IrailClient {
    async fn get_stations(&self) -> ApiResult<Vec<Station>> {
        let resp: Option<StationsResponse> = self.get_json("stations", &[]).await?;
        Ok(resp.map(|r| convert::convert_stations(&r)))
    }

    async fn get_connections(
        &self,
        from: &StationId,
        to: &StationId,
    ) -> ApiResult<ConnectionResult> {
        let params = [
            ("from", from.as_str().to_string()),
            ("to", to.as_str().to_string()),
        ];
        let resp: Option<ConnectionsResponse> = self.get_json("connections", &params).await?;
        Ok(resp.map(|r| convert::convert_connections(&r)))
    }

    async fn get_liveboard(&self, station: &StationId) -> ApiResult<LiveboardResult> {
        let params = [("id", station.as_str().to_string())];
        let resp: Option<LiveboardResponse> = self.get_json("liveboard", &params).await?;
        Ok(resp.map(|r| convert::convert_liveboard(&r)))
    }

    async fn get_disturbances(
        &self,
        line_break_character: Option<&str>,
    ) -> ApiResult<Vec<Disturbance>> {
        let params: Vec<(&str, String)> = line_break_character
            .map(|c| ("lineBreakCharacter", c.to_string()))
            .into_iter()
            .collect();
        let resp: Option<DisturbancesResponse> = self.get_json("disturbances", &params).await?;
        Ok(resp.map(|r| convert::convert_disturbances(&r)))
    }

    async fn get_vehicle(
        &self,
        vehicle_id: &str,
        date: Option<NaiveDate>,
        alerts: bool,
    ) -> ApiResult<VehicleInfo> {
        let mut params = vec![
            ("id", vehicle_id.to_string()),
            ("alerts", alerts.to_string()),
        ];
        if let Some(date) = date {
            // iRail expects ddmmyy
            params.push(("date", date.format("%d%m%y").to_string()));
        }
        let resp: Option<VehicleResponse> = self.get_json("vehicle", &params).await?;
        Ok(resp.map(|r| convert::convert_vehicle(&r, vehicle_id)))
    }

    async fn get_composition(&self, train_id: &str) -> ApiResult<Composition> {
        let params = [("id", train_id.to_string())];
        let resp: Option<CompositionResponse> = self.get_json("composition", &params).await?;
        Ok(resp.map(|r| convert::convert_composition(&r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = IrailConfig::new()
            .with_base_url("http://localhost:8080")
            .with_language("nl")
            .with_max_concurrent(10)
            .with_timeout(60)
            .with_user_agent("test/1.0");

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.language, "nl");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.user_agent, "test/1.0");
    }

    #[test]
    fn config_defaults() {
        let config = IrailConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.language, "en");
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("belgiantrain/"));
    }

    #[test]
    fn client_creation() {
        let client = IrailClient::new(IrailConfig::new().with_base_url("http://localhost/"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "http://localhost");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let result = IrailClient::new(IrailConfig::new().with_max_concurrent(0));
        assert!(matches!(result, Err(IrailError::InvalidConfig(_))));
    }
}
