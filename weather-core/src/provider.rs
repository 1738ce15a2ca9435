use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, Lookup, PlaceSuggestion},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

pub mod openweather;

/// Minimum query length, in characters, before autocomplete hits the network.
pub const MIN_SUGGESTION_QUERY: usize = 2;

/// Maximum number of autocomplete candidates requested from the provider.
pub const SUGGESTION_LIMIT: usize = 5;

/// The three provider operations the search controller relies on.
///
/// Implementations swallow every failure: callers only ever see `Lookup::NotFound`
/// or an empty suggestion list.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch_by_coordinates(&self, coords: Coordinates) -> Lookup;

    async fn fetch_by_name(&self, query: &str) -> Lookup;

    async fn fetch_suggestions(&self, query: &str) -> Vec<PlaceSuggestion>;
}

/// Raw HTTP reply: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// One GET with query parameters. Split out so that clients can run against a
/// stub provider.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, FetchError> {
        let res = self.http.get(url).query(query).send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(HttpReply { status, body })
    }
}

/// Construct the production client from config.
pub fn client_from_config(config: &Config) -> OpenWeatherClient<ReqwestTransport> {
    if !config.has_api_key() {
        log::warn!(
            "No API key configured; every lookup will come back as not found.\n\
             Hint: run `weather configure` or set {}.",
            crate::config::API_KEY_ENV
        );
    }

    OpenWeatherClient::new(
        ReqwestTransport::new(),
        config.api_base(),
        config.api_key_or_empty().to_owned(),
    )
}
