//! HTTP client for the Google Maps geocoding and directions web services.
//!
//! Wraps `reqwest` with API key handling, status checking, retry on transient
//! failures and typed response decoding. The client implements the session's
//! [`Geocoder`] and [`RouteProvider`] capabilities.

use std::time::Duration;

use nursemap_core::{AppConfig, Point};
use nursemap_session::{GeocodeError, Geocoder, Route, RouteProvider, RoutingError, TravelMode};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::MapsError;
use crate::polyline;
use crate::retry::retry_with_backoff;
use crate::types::{DirectionsResponse, DirectionsRoute, GeocodeResponse, Leg, TextValue};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

const GEOCODE_ENDPOINT: &str = "geocode/json";
const DIRECTIONS_ENDPOINT: &str = "directions/json";
const LANGUAGE: &str = "ja";

/// Client for the Google Maps web services.
///
/// Use [`GoogleMapsClient::from_config`] in the binary, or
/// [`GoogleMapsClient::with_base_url`] to point at a mock server in tests.
/// Clones share the underlying connection pool.
#[derive(Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    geocode_prefix: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GoogleMapsClient {
    /// Creates a client pointed at the production API with retries disabled
    /// and no geocode prefix.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, MapsError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout_secs, user_agent)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MapsError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, MapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Endpoints are joined relative to the base, which only keeps the last
        // path segment when the base ends with a slash.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MapsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            geocode_prefix: String::new(),
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::MissingApiKey`] when no API key is configured, or
    /// any error from [`GoogleMapsClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, MapsError> {
        let api_key = config
            .maps_api_key
            .as_deref()
            .ok_or(MapsError::MissingApiKey)?;
        Ok(Self::with_base_url(
            api_key,
            &config.maps_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_geocode_prefix(&config.geocode_prefix)
        .with_retry(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Text prepended (with a space) to every geocoding query, e.g. the
    /// municipality the search is confined to.
    #[must_use]
    pub fn with_geocode_prefix(mut self, prefix: &str) -> Self {
        prefix.trim().clone_into(&mut self.geocode_prefix);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Resolves an address to coordinates. `Ok(None)` means the API had no
    /// match (`ZERO_RESULTS` or an empty result list).
    ///
    /// # Errors
    ///
    /// - [`MapsError::Status`] for any other non-`OK` status.
    /// - [`MapsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`MapsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn geocode_address(&self, query: &str) -> Result<Option<Point>, MapsError> {
        let address = self.prefixed(query);
        let url = self.build_url(
            GEOCODE_ENDPOINT,
            &[("address", &address), ("language", LANGUAGE)],
        )?;

        let response = match self.fetch::<GeocodeResponse>(&url, &address).await {
            Ok(response) => response,
            Err(MapsError::Status { status, .. }) if status == "ZERO_RESULTS" => {
                tracing::debug!(address = %address, "geocoder found no match");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let point = response.results.first().map(|r| {
            let location = r.geometry.location;
            Point::new(location.lat, location.lng)
        });
        tracing::debug!(
            address = %address,
            matches = response.results.len(),
            "geocoded address"
        );
        Ok(point)
    }

    /// Fetches a walking route. `Ok(None)` means the API found no route
    /// (`ZERO_RESULTS`, `NOT_FOUND`, or an empty route list).
    ///
    /// # Errors
    ///
    /// - [`MapsError::Status`] for any other non-`OK` status.
    /// - [`MapsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`MapsError::Deserialize`] if the response does not match the
    ///   expected shape.
    /// - [`MapsError::Polyline`] if the overview polyline is malformed.
    pub async fn walking_route(
        &self,
        origin: Point,
        destination: Point,
    ) -> Result<Option<Route>, MapsError> {
        let origin_param = origin.to_string();
        let destination_param = destination.to_string();
        let url = self.build_url(
            DIRECTIONS_ENDPOINT,
            &[
                ("origin", &origin_param),
                ("destination", &destination_param),
                ("mode", TravelMode::Walking.as_str()),
                ("language", LANGUAGE),
            ],
        )?;
        let context = format!("{origin_param} -> {destination_param}");

        let response = match self.fetch::<DirectionsResponse>(&url, &context).await {
            Ok(response) => response,
            Err(MapsError::Status { status, .. })
                if status == "ZERO_RESULTS" || status == "NOT_FOUND" =>
            {
                tracing::debug!(route = %context, status = %status, "no walking route");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        response.routes.first().map(to_route).transpose()
    }

    fn prefixed(&self, query: &str) -> String {
        let query = query.trim();
        if self.geocode_prefix.is_empty() {
            query.to_owned()
        } else {
            format!("{} {query}", self.geocode_prefix)
        }
    }

    /// Builds the endpoint URL with percent-encoded query parameters and the
    /// API key appended last.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, MapsError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| MapsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// GETs `url` with retry, checks the API status and decodes the body.
    async fn fetch<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, MapsError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_checked(url)
        })
        .await?;
        serde_json::from_value(body).map_err(|e| MapsError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    async fn request_checked(&self, url: &Url) -> Result<serde_json::Value, MapsError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| MapsError::Deserialize {
                context: url.path().to_owned(),
                source: e,
            })?;
        check_status(&value)?;
        Ok(value)
    }
}

/// Returns [`MapsError::Status`] unless the top-level `"status"` is `"OK"`.
fn check_status(body: &serde_json::Value) -> Result<(), MapsError> {
    let status = body
        .get("status")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("MISSING_STATUS");
    if status == "OK" {
        return Ok(());
    }
    let message = body
        .get("error_message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    Err(MapsError::Status {
        status: status.to_owned(),
        message,
    })
}

#[allow(clippy::cast_precision_loss)]
fn to_route(route: &DirectionsRoute) -> Result<Route, MapsError> {
    let path = polyline::decode(&route.overview_polyline.points)?;
    let distance = sum_legs(&route.legs, |l| l.distance.as_ref());
    let duration = sum_legs(&route.legs, |l| l.duration.as_ref());
    Ok(Route {
        path,
        distance_meters: distance.map(|m| m as f64),
        duration_secs: duration,
    })
}

/// Sum of per-leg values; `None` when there are no legs or any leg lacks one.
fn sum_legs(legs: &[Leg], field: impl Fn(&Leg) -> Option<&TextValue>) -> Option<u64> {
    if legs.is_empty() {
        return None;
    }
    legs.iter().map(|leg| field(leg).map(|v| v.value)).sum()
}

impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Point, GeocodeError> {
        match self.geocode_address(address).await {
            Ok(Some(point)) => Ok(point),
            Ok(None) => Err(GeocodeError::NotFound {
                query: address.to_owned(),
            }),
            Err(e) => Err(GeocodeError::Provider(e.to_string())),
        }
    }
}

impl RouteProvider for GoogleMapsClient {
    async fn route(
        &self,
        origin: Point,
        destination: Point,
        mode: TravelMode,
    ) -> Result<Route, RoutingError> {
        let outcome = match mode {
            TravelMode::Walking => self.walking_route(origin, destination).await,
        };
        match outcome {
            Ok(Some(route)) => Ok(route),
            Ok(None) => Err(RoutingError::NoRoute),
            Err(e) => Err(RoutingError::Provider(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
