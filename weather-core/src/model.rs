use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A geocoding candidate offered while the user types a location name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub coordinates: Coordinates,
    pub display_name: String,
}

impl PlaceSuggestion {
    pub fn new(
        name: String,
        country: String,
        state: Option<String>,
        coordinates: Coordinates,
    ) -> Self {
        let display_name = display_name(&name, state.as_deref(), &country);
        Self {
            name,
            country,
            state,
            coordinates,
            display_name,
        }
    }
}

/// `name[, state], country`. An empty state counts as absent.
pub fn display_name(name: &str, state: Option<&str>, country: &str) -> String {
    match state.filter(|s| !s.is_empty()) {
        Some(state) => format!("{name}, {state}, {country}"),
        None => format!("{name}, {country}"),
    }
}

/// Main weather group as reported by the provider (`weather[0].main`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Haze,
    Mist,
    Fog,
    Smoke,
    Dust,
    Other(String),
}

impl WeatherCondition {
    pub fn parse(main: &str) -> Self {
        match main {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Thunderstorm" => Self::Thunderstorm,
            "Snow" => Self::Snow,
            "Haze" => Self::Haze,
            "Mist" => Self::Mist,
            "Fog" => Self::Fog,
            "Smoke" => Self::Smoke,
            "Dust" => Self::Dust,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Haze => "Haze",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Smoke => "Smoke",
            Self::Dust => "Dust",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions for one location at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country_code: String,
    pub condition: WeatherCondition,
    /// Raw provider value; flooring happens only when rendering.
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
}

/// Outcome of a weather fetch. Transport failures and genuine misses both end up
/// as `NotFound`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(WeatherSnapshot),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            Lookup::Found(snapshot) => Some(snapshot),
            Lookup::NotFound => None,
        }
    }
}
