use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use std::{fmt, sync::Arc};
use weather_core::{
    App, Config, Coordinates, FlowPhase, LocationQuery, services_from_config,
    storage::{FileStore, KeyValueStore, MemoryStore},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for your location or any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather for the configured device location (default).
    Here,

    /// Show weather for a city and remember it.
    Search {
        /// City name, e.g. "Paris".
        #[arg(required = true)]
        city: Vec<String>,
    },

    /// List recent searches, newest first.
    Recent,

    /// Interactive session with search, history and refresh.
    Interactive,

    /// Configure the location used by `weather here`.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Here);

        if matches!(command, Command::Configure) {
            return configure();
        }

        let mut app = open_app()?;

        match command {
            Command::Here => {
                let phase = app.run(&LocationQuery::CurrentDevice).await;
                finish(&mut app, phase);
            }
            Command::Search { city } => {
                let phase = app.run(&LocationQuery::TextSearch(city.join(" "))).await;
                finish(&mut app, phase);
            }
            Command::Recent => {
                for (i, entry) in app.state().recent.entries().iter().enumerate() {
                    println!("{}. {}", i + 1, entry);
                }
            }
            Command::Interactive => interactive(app).await?,
            Command::Configure => {}
        }

        Ok(())
    }
}

fn open_app() -> anyhow::Result<App> {
    let config = Config::load()?;
    let services = services_from_config(&config)?;

    let store: Arc<dyn KeyValueStore> = match Config::storage_file_path() {
        Ok(path) => Arc::new(FileStore::new(path)),
        Err(e) => {
            tracing::warn!("Recent searches will not be saved: {:#}", e);
            Arc::new(MemoryStore::default())
        }
    };

    Ok(App::new(services, store))
}

fn finish(app: &mut App, phase: FlowPhase) {
    if phase != FlowPhase::Idle {
        println!("{}", render::screen(app.state()));
    }
    if let Some(message) = app.take_alert() {
        eprintln!("Error: {message}");
    }
}

enum MenuItem {
    Search,
    Recent(String),
    Refresh,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Search => f.write_str("Search city"),
            MenuItem::Recent(entry) => write!(f, "Recent: {entry}"),
            MenuItem::Refresh => f.write_str("Refresh current location"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

/// Treat Esc / Ctrl-C as "leave", everything else as an error.
fn cancelled<T>(res: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Prompt failed"),
    }
}

async fn interactive(mut app: App) -> anyhow::Result<()> {
    let _clock = app.start_clock();
    let phase = app.refresh().await;
    finish(&mut app, phase);

    loop {
        app.sync();
        let mut items = vec![MenuItem::Search];
        items.extend(app.state().recent.entries().iter().cloned().map(MenuItem::Recent));
        items.push(MenuItem::Refresh);
        items.push(MenuItem::Quit);

        let choice = tokio::task::spawn_blocking(move || Select::new("What next?", items).prompt())
            .await
            .context("Prompt task failed")?;

        let phase = match cancelled(choice)? {
            None | Some(MenuItem::Quit) => break,
            Some(MenuItem::Search) => {
                let text = tokio::task::spawn_blocking(|| {
                    Text::new("City:").with_placeholder("Enter city name...").prompt()
                })
                .await
                .context("Prompt task failed")?;

                let Some(text) = cancelled(text)? else {
                    continue;
                };
                app.set_search_text(text);
                app.submit_search(None).await
            }
            Some(MenuItem::Recent(entry)) => app.submit_search(Some(&entry)).await,
            Some(MenuItem::Refresh) => app.refresh().await,
        };

        finish(&mut app, phase);
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let enable = cancelled(
        Confirm::new("Use a fixed location for `weather here`?")
            .with_default(config.location.enabled)
            .prompt(),
    )?;

    match enable {
        None => return Ok(()),
        Some(false) => config.disable_location(),
        Some(true) => {
            let Some(latitude) = cancelled(
                CustomType::<f64>::new("Latitude:")
                    .with_validator(range_validator(-90.0, 90.0))
                    .prompt(),
            )?
            else {
                return Ok(());
            };

            let Some(longitude) = cancelled(
                CustomType::<f64>::new("Longitude:")
                    .with_validator(range_validator(-180.0, 180.0))
                    .prompt(),
            )?
            else {
                return Ok(());
            };

            config.set_location(Coordinates::new(latitude, longitude));
        }
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn range_validator(
    min: f64,
    max: f64,
) -> impl Fn(&f64) -> Result<inquire::validator::Validation, inquire::CustomUserError> + Clone {
    use inquire::validator::Validation;

    move |value: &f64| {
        if (min..=max).contains(value) {
            Ok(Validation::Valid)
        } else {
            Ok(Validation::Invalid(
                format!("Must be between {min} and {max}").into(),
            ))
        }
    }
}
