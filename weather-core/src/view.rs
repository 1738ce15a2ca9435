//! What the front end draws, derived from [`SearchState`] alone.

use std::fmt;

use crate::{
    controller::SearchState,
    model::{Lookup, WeatherCondition, WeatherSnapshot},
};

pub const NOT_FOUND_MESSAGE: &str = "No location found";
pub const LOADING_MESSAGE: &str = "Loading...";

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub header: String,
    pub search: SearchBox,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchBox {
    pub query: String,
    /// Empty unless the dropdown is open.
    pub dropdown: Vec<DropdownRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropdownRow {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Loading,
    NotFound,
    Summary(WeatherSummary),
    /// No result yet and nothing in flight.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    pub icon: &'static str,
    pub condition: String,
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
    pub date: String,
}

/// `date` is the pre-formatted current date, see [`crate::format::today`].
pub fn render(state: &SearchState, date: &str) -> Screen {
    Screen {
        header: header(state.result()),
        search: search_box(state),
        body: body(state, date),
    }
}

pub fn summarize(snapshot: &WeatherSnapshot, date: &str) -> WeatherSummary {
    WeatherSummary {
        icon: condition_icon(&snapshot.condition),
        condition: snapshot.condition.to_string(),
        temperature: format_temperature(snapshot.temperature_c),
        humidity: format!("{}%", snapshot.humidity_pct),
        wind: format!("{} km/h", snapshot.wind_speed),
        date: date.to_string(),
    }
}

/// Glyph shown next to the condition name.
pub fn condition_icon(condition: &WeatherCondition) -> &'static str {
    match condition {
        WeatherCondition::Clear => "☀",
        WeatherCondition::Clouds => "☁",
        WeatherCondition::Rain => "🌧",
        WeatherCondition::Drizzle => "🌦",
        WeatherCondition::Thunderstorm => "⛈",
        WeatherCondition::Snow => "❄",
        WeatherCondition::Haze
        | WeatherCondition::Mist
        | WeatherCondition::Fog
        | WeatherCondition::Smoke
        | WeatherCondition::Dust => "🌫",
        WeatherCondition::Other(_) => "🌡",
    }
}

/// Whole degrees, floored: 18.7 -> `18°`, -0.5 -> `-1°`.
pub fn format_temperature(celsius: f64) -> String {
    format!("{}°", celsius.floor() as i64)
}

fn header(result: Option<&Lookup>) -> String {
    match result {
        Some(Lookup::NotFound) => NOT_FOUND_MESSAGE.to_string(),
        Some(Lookup::Found(s)) if s.country_code.is_empty() => s.location_name.clone(),
        Some(Lookup::Found(s)) => format!("{}, {}", s.location_name, s.country_code),
        None => LOADING_MESSAGE.to_string(),
    }
}

fn search_box(state: &SearchState) -> SearchBox {
    let dropdown = if state.dropdown_open() {
        state
            .suggestions()
            .iter()
            .enumerate()
            .map(|(i, s)| DropdownRow {
                label: s.display_name.clone(),
                selected: state.selected_index() == Some(i),
            })
            .collect()
    } else {
        Vec::new()
    };

    SearchBox {
        query: state.query_text().to_string(),
        dropdown,
    }
}

fn body(state: &SearchState, date: &str) -> Body {
    if state.loading() {
        return Body::Loading;
    }

    match state.result() {
        Some(Lookup::NotFound) => Body::NotFound,
        Some(Lookup::Found(snapshot)) => Body::Summary(summarize(snapshot, date)),
        None => Body::Empty,
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@ {}", self.header)?;

        if !self.search.query.is_empty() {
            writeln!(f, "Search: {}", self.search.query)?;
        }
        for row in &self.search.dropdown {
            let marker = if row.selected { '>' } else { ' ' };
            writeln!(f, " {marker} {}", row.label)?;
        }

        match &self.body {
            Body::Loading => writeln!(f, "{LOADING_MESSAGE}"),
            Body::NotFound => writeln!(f, "{NOT_FOUND_MESSAGE}"),
            Body::Summary(s) => {
                writeln!(f, "{} {}  {}", s.icon, s.condition, s.temperature)?;
                writeln!(f, "{}", s.date)?;
                writeln!(f, "Humidity {}   Wind {}", s.humidity, s.wind)
            }
            Body::Empty => Ok(()),
        }
    }
}
