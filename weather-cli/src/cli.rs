use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_core::{
    Action, Config, Coordinates, WeatherApp,
    geolocation::{CachedGeolocator, FixedPosition},
    provider::{ReqwestTransport, client_from_config, openweather::OpenWeatherClient},
};

use crate::interactive;

pub type App = WeatherApp<OpenWeatherClient<ReqwestTransport>>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default location.
    Configure,

    /// Show current weather once and exit.
    Show {
        /// Location name. If absent, uses the device position or the default location.
        location: Option<String>,

        #[command(flatten)]
        position: PositionArgs,
    },

    /// Search interactively with autocomplete.
    Search {
        #[command(flatten)]
        position: PositionArgs,
    },
}

/// Device position to use instead of the configured `home`.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct PositionArgs {
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn or_home(self, config: &Config) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => config.home,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, position } => {
                let mut app = build_app(position)?;
                match location {
                    Some(location) => {
                        app.dispatch(Action::TextChanged(location)).await;
                        app.dispatch(Action::SubmitSearch).await;
                    }
                    None => app.mount().await,
                }
                print!("{}", app.screen());
                Ok(())
            }
            Command::Search { position } => {
                let mut app = build_app(position)?;
                app.mount().await;
                interactive::run(&mut app).await
            }
        }
    }
}

fn build_app(position: PositionArgs) -> anyhow::Result<App> {
    let config = Config::load()?.with_env();
    let client = client_from_config(&config);

    let app = WeatherApp::new(client, config.default_location());
    let Some(coords) = position.or_home(&config) else {
        return Ok(app);
    };
    let geolocator = CachedGeolocator::new(FixedPosition(coords));
    Ok(app.with_geolocator(geolocator))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_location = Text::new("Default location:")
        .with_default(config.default_location())
        .prompt()
        .context("Failed to read default location")?;

    config.api_key = Some(api_key.trim().to_string());
    config.default_location = Some(default_location.trim().to_string());
    config.save()?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
