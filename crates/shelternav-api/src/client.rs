//! HTTP client for the assistant backend.
//!
//! Wraps `reqwest` with typed response deserialization and context-carrying
//! errors. The backend is a proxy over the intent classifier and the
//! pedestrian routing service; this client only shapes requests and parses
//! responses, it does not interpret them.

use std::time::Duration;

use reqwest::{Client, Url};

use shelternav_core::Coordinate;

use crate::error::ApiError;
use crate::types::{
    ExtractRequest, ExtractResponse, FeatureCollection, NearestResponse, StatusResponse,
    WireShelter,
};

/// Client for the assistant backend API.
///
/// Use [`AssistantClient::new`] against a deployed backend or
/// [`AssistantClient::with_timeout`] to point at a mock server in tests.
pub struct AssistantClient {
    client: Client,
    base_url: Url,
}

impl AssistantClient {
    /// Creates a client with a 30 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] for a malformed URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, 30)
    }

    /// Creates a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] for a malformed URL.
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shelternav/0.1 (shelter-assistant)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Checks backend availability and LLM status.
    ///
    /// Callers treat any error as "backend unreachable" and drop into the
    /// degraded local mode.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on network failure or a non-2xx status,
    /// [`ApiError::Deserialize`] on an unexpected body.
    pub async fn status(&self) -> Result<StatusResponse, ApiError> {
        let url = self.build_url("api/status", &[]);
        self.get_json(url).await
    }

    /// Classifies a free-text query and extracts a location plus candidate
    /// shelters.
    ///
    /// A `success: false` payload is a domain outcome (no match, ambiguous
    /// text), not an error; only transport and shape failures error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on network failure or a non-2xx status,
    /// [`ApiError::Deserialize`] on an unexpected body.
    pub async fn extract_location(
        &self,
        query: &str,
        use_llm: bool,
    ) -> Result<ExtractResponse, ApiError> {
        let url = self.build_url("api/location/extract", &[]);
        let response = self
            .client
            .post(url.clone())
            .json(&ExtractRequest { query, use_llm })
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Fetches the `k` nearest shelter candidates to `origin` (unranked —
    /// ranking is the caller's responsibility).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on network failure or a non-2xx status,
    /// [`ApiError::Deserialize`] on an unexpected body.
    pub async fn nearest_shelters(
        &self,
        origin: Coordinate,
        k: usize,
    ) -> Result<Vec<WireShelter>, ApiError> {
        let url = self.build_url(
            "api/shelters/nearest",
            &[
                ("lat", &origin.lat().to_string()),
                ("lon", &origin.lon().to_string()),
                ("k", &k.to_string()),
            ],
        );
        let body: NearestResponse = self.get_json(url).await?;
        Ok(body.shelters)
    }

    /// Fetches pedestrian route geometry from `origin` to `destination`.
    ///
    /// The routing service takes endpoints in `lon,lat` order; internal
    /// coordinates are transposed here on the way out and by
    /// [`crate::parse_route`] on the way back.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on network failure or a non-2xx status,
    /// [`ApiError::Deserialize`] on an unexpected body.
    pub async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<FeatureCollection, ApiError> {
        let url = self.build_url(
            "api/directions",
            &[
                ("origin", &format!("{},{}", origin.lon(), origin.lat())),
                (
                    "destination",
                    &format!("{},{}", destination.lon(), destination.lat()),
                ),
            ],
        );
        self.get_json(url).await
    }

    /// Builds a full request URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self
            .base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone());
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
