//! Core library for the `weather` lookup widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client (current weather, autocomplete)
//! - Device position lookup with a fallback location
//! - The search controller: a pure state machine plus an async driver
//! - The view model the front end renders
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod view;

pub use app::WeatherApp;
pub use config::Config;
pub use controller::{Action, Effect, FetchOrigin, NavKey, SearchState};
pub use geolocation::{Geolocator, Located, PositionOptions};
pub use model::{Coordinates, Lookup, PlaceSuggestion, WeatherCondition, WeatherSnapshot};
pub use provider::{HttpReply, Transport, WeatherApi};
pub use view::{Body, Screen};
