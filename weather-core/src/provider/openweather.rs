use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;

use crate::{
    error::{FetchError, SkipReason},
    model::{Coordinates, Lookup, PlaceSuggestion, WeatherCondition, WeatherSnapshot},
};

use super::{MIN_SUGGESTION_QUERY, SUGGESTION_LIMIT, Transport, WeatherApi};

const CURRENT_PATH: &str = "/data/2.5/weather";
const GEOCODING_PATH: &str = "/geo/1.0/direct";

/// OpenWeather client: current weather by coordinates or by name, plus direct
/// geocoding for autocomplete. No caching; identical queries re-fetch.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient<T> {
    transport: T,
    base_url: String,
    api_key: String,
}

impl<T: Transport> OpenWeatherClient<T> {
    pub fn new(transport: T, base_url: &str, api_key: String) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn get_ok(&self, path: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url} {:?}", redact(query));

        let reply = self.transport.get(&url, query).await?;

        if reply.status != 200 {
            return Err(FetchError::Provider {
                status: reply.status,
                body: truncate_body(&reply.body),
            });
        }

        Ok(reply.body)
    }

    async fn fetch_current(
        &self,
        mut query: Vec<(&str, String)>,
    ) -> Result<WeatherSnapshot, FetchError> {
        query.push(("units", "Metric".to_string()));
        query.push(("appid", self.api_key.clone()));

        let body = self.get_ok(CURRENT_PATH, &query).await?;
        parse_current(&body)
    }

    async fn fetch_geocoding(&self, q: &str) -> Result<Vec<PlaceSuggestion>, FetchError> {
        let query = [
            ("q", q.to_string()),
            ("limit", SUGGESTION_LIMIT.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let body = self.get_ok(GEOCODING_PATH, &query).await?;
        parse_geocoding(&body)
    }
}

#[async_trait]
impl<T: Transport> WeatherApi for OpenWeatherClient<T> {
    async fn fetch_by_coordinates(&self, coords: Coordinates) -> Lookup {
        let query = vec![
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
        ];

        into_lookup(self.fetch_current(query).await)
    }

    async fn fetch_by_name(&self, name: &str) -> Lookup {
        into_lookup(self.fetch_current(vec![("q", name.to_string())]).await)
    }

    async fn fetch_suggestions(&self, query: &str) -> Vec<PlaceSuggestion> {
        if query.chars().count() < MIN_SUGGESTION_QUERY {
            let reason = SkipReason::QueryTooShort {
                min: MIN_SUGGESTION_QUERY,
            };
            debug!("Skipping autocomplete for {query:?}: {reason}");
            return Vec::new();
        }

        match self.fetch_geocoding(query).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!("Autocomplete for {query:?} failed: {err}");
                Vec::new()
            }
        }
    }
}

fn into_lookup(result: Result<WeatherSnapshot, FetchError>) -> Lookup {
    match result {
        Ok(snapshot) => Lookup::Found(snapshot),
        Err(err) => {
            warn!("Weather lookup failed: {err}");
            Lookup::NotFound
        }
    }
}

/// `cod` is a number on success and a string on most errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCod {
    Number(i64),
    Text(String),
}

impl OwCod {
    fn code(&self) -> Option<i64> {
        match self {
            OwCod::Number(n) => Some(*n),
            OwCod::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
}

fn parse_current(body: &str) -> Result<WeatherSnapshot, FetchError> {
    let status: OwStatusOnly = serde_json::from_str(body)?;
    match status.cod.as_ref().map(OwCod::code) {
        Some(Some(200)) => {}
        Some(code) => {
            return Err(FetchError::Provider {
                status: code.and_then(|c| u16::try_from(c).ok()).unwrap_or(0),
                body: truncate_body(body),
            });
        }
        None => return Err(FetchError::MissingStatus),
    }

    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let condition = parsed
        .weather
        .first()
        .map(|w| WeatherCondition::parse(&w.main))
        .unwrap_or_else(|| WeatherCondition::Other("Unknown".to_string()));

    debug!("Parsed current weather for {}", parsed.name);

    Ok(WeatherSnapshot {
        location_name: parsed.name,
        country_code: parsed.sys.country,
        condition,
        temperature_c: parsed.main.temp,
        humidity_pct: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
    })
}

/// Peeks at `cod` before the full parse so that error payloads with a 200
/// transport status are reported as provider errors rather than parse errors.
/// A payload without `cod` is rejected.
#[derive(Debug, Deserialize)]
struct OwStatusOnly {
    #[serde(default)]
    cod: Option<OwCod>,
}

fn parse_geocoding(body: &str) -> Result<Vec<PlaceSuggestion>, FetchError> {
    let entries: Vec<OwGeoEntry> = serde_json::from_str(body)?;

    Ok(entries
        .into_iter()
        .map(|e| {
            let coordinates = Coordinates::new(e.lat, e.lon);
            PlaceSuggestion::new(e.name, e.country, e.state, coordinates)
        })
        .collect())
}

fn redact<'a>(query: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
    query
        .iter()
        .map(|(k, v)| match *k {
            "appid" => (*k, "***"),
            _ => (*k, v.as_str()),
        })
        .collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::HttpReply;
    use std::sync::Mutex;

    const PARIS: &str = r#"{
        "cod": 200,
        "name": "Paris",
        "main": {"temp": 18.7, "humidity": 60},
        "wind": {"speed": 3.2},
        "weather": [{"main": "Clear"}],
        "sys": {"country": "FR"}
    }"#;

    #[derive(Debug)]
    struct StubTransport {
        reply: Result<HttpReply, String>,
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(HttpReply {
                    status,
                    body: body.to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("connection refused".into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(
            &self,
            url: &str,
            query: &[(&str, String)],
        ) -> Result<HttpReply, FetchError> {
            self.calls.lock().unwrap().push((
                url.to_string(),
                query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
            self.reply.clone().map_err(FetchError::Transport)
        }
    }

    fn client(transport: StubTransport) -> OpenWeatherClient<StubTransport> {
        OpenWeatherClient::new(transport, "http://stub/", "KEY".into())
    }

    fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn by_name_maps_payload() {
        let c = client(StubTransport::replying(200, PARIS));

        let lookup = c.fetch_by_name("Paris").await;
        let snapshot = lookup.snapshot().expect("found");

        assert_eq!(snapshot.location_name, "Paris");
        assert_eq!(snapshot.country_code, "FR");
        assert_eq!(snapshot.condition, WeatherCondition::Clear);
        assert_eq!(snapshot.temperature_c, 18.7);
        assert_eq!(snapshot.humidity_pct, 60);
        assert_eq!(snapshot.wind_speed, 3.2);

        let calls = c.transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "http://stub/data/2.5/weather");
        assert_eq!(param(&calls[0].1, "q"), Some("Paris"));
        assert_eq!(param(&calls[0].1, "units"), Some("Metric"));
        assert_eq!(param(&calls[0].1, "appid"), Some("KEY"));
    }

    #[tokio::test]
    async fn by_coordinates_sends_lat_lon() {
        let c = client(StubTransport::replying(200, PARIS));

        let lookup = c.fetch_by_coordinates(Coordinates::new(48.85, 2.35)).await;
        assert!(lookup.is_found());

        let calls = c.transport.calls();
        assert_eq!(param(&calls[0].1, "lat"), Some("48.85"));
        assert_eq!(param(&calls[0].1, "lon"), Some("2.35"));
        assert_eq!(param(&calls[0].1, "q"), None);
    }

    #[tokio::test]
    async fn non_success_status_is_not_found() {
        for status in [401, 404, 500] {
            let body = r#"{"cod":"404","message":"city not found"}"#;
            let c = client(StubTransport::replying(status, body));

            assert_eq!(c.fetch_by_name("Atlantis").await, Lookup::NotFound);
            assert_eq!(
                c.fetch_by_coordinates(Coordinates::new(0.0, 0.0)).await,
                Lookup::NotFound
            );
        }
    }

    #[tokio::test]
    async fn error_cod_in_payload_is_not_found() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        let c = client(StubTransport::replying(200, body));
        assert_eq!(c.fetch_by_name("Atlantis").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn other_success_statuses_are_not_found() {
        for status in [201, 203, 204] {
            let c = client(StubTransport::replying(status, PARIS));
            assert_eq!(c.fetch_by_name("Paris").await, Lookup::NotFound);
        }
    }

    #[tokio::test]
    async fn payload_without_cod_is_not_found() {
        let body = r#"{"name":"Paris","main":{"temp":18.7,"humidity":60},"wind":{"speed":3.2}}"#;
        let c = client(StubTransport::replying(200, body));
        assert_eq!(c.fetch_by_name("Paris").await, Lookup::NotFound);
        let err = parse_current(body).unwrap_err();
        assert!(matches!(err, FetchError::MissingStatus));
    }

    #[test]
    fn string_cod_200_is_found() {
        let body = PARIS.replace(r#""cod": 200"#, r#""cod": "200""#);
        assert!(parse_current(&body).is_ok());
    }

    #[tokio::test]
    async fn transport_error_is_not_found() {
        let c = client(StubTransport::failing());
        assert_eq!(c.fetch_by_name("Paris").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn garbage_payload_is_not_found() {
        let c = client(StubTransport::replying(200, "<html>oops</html>"));
        assert_eq!(c.fetch_by_name("Paris").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn short_query_skips_network() {
        let c = client(StubTransport::replying(200, "[]"));

        assert!(c.fetch_suggestions("").await.is_empty());
        assert!(c.fetch_suggestions("P").await.is_empty());
        assert!(c.fetch_suggestions("é").await.is_empty());
        assert!(c.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn suggestions_keep_provider_order() {
        let body = r#"[
            {"name": "Alexandria", "lat": 31.2, "lon": 29.9, "country": "EG",
             "state": "Al Iskandariyah"},
            {"name": "Alexandria", "lat": 38.8, "lon": -77.0, "country": "US", "state": "Virginia"},
            {"name": "Alexandria", "lat": 43.9, "lon": 25.3, "country": "RO"}
        ]"#;
        let c = client(StubTransport::replying(200, body));

        let suggestions = c.fetch_suggestions("Alex").await;
        let names: Vec<_> = suggestions
            .iter()
            .map(|s| s.display_name.as_str())
            .collect();

        assert_eq!(
            names,
            [
                "Alexandria, Al Iskandariyah, EG",
                "Alexandria, Virginia, US",
                "Alexandria, RO",
            ]
        );

        let calls = c.transport.calls();
        assert_eq!(calls[0].0, "http://stub/geo/1.0/direct");
        assert_eq!(param(&calls[0].1, "limit"), Some("5"));
        assert_eq!(param(&calls[0].1, "q"), Some("Alex"));
    }

    #[tokio::test]
    async fn failed_suggestions_are_empty() {
        let c = client(StubTransport::failing());
        assert!(c.fetch_suggestions("Alex").await.is_empty());

        let c = client(StubTransport::replying(401, r#"{"cod":401}"#));
        assert!(c.fetch_suggestions("Alex").await.is_empty());
    }

    #[test]
    fn missing_weather_array_is_unknown_condition() {
        let body = r#"{"cod":200,"name":"X","main":{"temp":1.0,"humidity":5},"wind":{"speed":0}}"#;
        let snapshot = parse_current(body).expect("parses");
        let unknown = WeatherCondition::Other("Unknown".into());
        assert_eq!(snapshot.condition, unknown);
        assert_eq!(snapshot.country_code, "");
    }

    #[test]
    fn redact_hides_key() {
        let q = [("q", "Paris".to_string()), ("appid", "SECRET".to_string())];
        assert_eq!(redact(&q), vec![("q", "Paris"), ("appid", "***")]);
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(500);
        assert_eq!(truncate_body(&body).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
