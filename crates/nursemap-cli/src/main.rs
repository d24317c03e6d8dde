mod backend;
mod render;
mod script;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use nursemap_core::{AgeClass, AppConfig, Dataset, DatasetSource, Point};
use nursemap_session::{Effect, FixedPosition, Navigator, Session, SessionView};
use tracing_subscriber::EnvFilter;

use crate::backend::MapsBackend;
use crate::script::ScriptCommand;

#[derive(Debug, Parser)]
#[command(name = "nursemap")]
#[command(about = "Find nearby nurseries with open places for an age class")]
struct Cli {
    /// Dataset path or http(s) URL (overrides `NURSEMAP_DATASET`)
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// Print the final view as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the nearest facilities with a vacancy for an age class
    Nearby {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Show the walking route to one of the nearby facilities
    Route {
        #[command(flatten)]
        search: SearchArgs,

        /// Result position to route to, as listed by `nearby`
        #[arg(long, default_value_t = 1)]
        pick: usize,
    },
    /// Run a session script from a file, or stdin when no file is given
    Session {
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Age class, 0 to 5
    #[arg(long)]
    age: AgeClass,

    /// Search radius in meters, 300 to 1500
    #[arg(long)]
    radius: Option<u32>,

    /// Search center as LAT,LNG
    #[arg(long, conflicts_with = "address", allow_hyphen_values = true)]
    at: Option<Point>,

    /// Address to geocode as the search center
    #[arg(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = nursemap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let source = cli
        .dataset
        .as_deref()
        .map_or_else(|| config.dataset.clone(), DatasetSource::parse);

    match cli.command {
        Some(Commands::Nearby { search }) => {
            run_search(&config, &source, &search, None, cli.json).await?;
        }
        Some(Commands::Route { search, pick }) => {
            run_search(&config, &source, &search, Some(pick), cli.json).await?;
        }
        Some(Commands::Session { script }) => {
            run_session(&config, &source, script.as_deref(), cli.json).await?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}

/// Load the dataset, falling back to an empty one so the session still works.
async fn load_dataset_or_empty(source: &DatasetSource, config: &AppConfig) -> Dataset {
    let result = match source {
        DatasetSource::File(path) => {
            nursemap_core::load_dataset(path).map_err(anyhow::Error::from)
        }
        DatasetSource::Url(url) => nursemap_maps::fetch_dataset(url, config)
            .await
            .map_err(anyhow::Error::from),
    };
    match result {
        Ok(dataset) => {
            tracing::info!(
                source = %source,
                facilities = dataset.len(),
                skipped = dataset.skipped(),
                "dataset loaded"
            );
            dataset
        }
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "dataset unavailable, continuing without facilities");
            Dataset::empty()
        }
    }
}

async fn build_navigator(
    config: &AppConfig,
    source: &DatasetSource,
) -> anyhow::Result<Navigator<MapsBackend, MapsBackend>> {
    let dataset = load_dataset_or_empty(source, config).await;
    let backend = MapsBackend::from_config(config)?;
    let session = Session::new(dataset, config.default_radius);
    Ok(Navigator::new(session, backend.clone(), backend))
}

fn print_view(session: &Session, default_center: Point, json: bool) -> anyhow::Result<()> {
    let view = SessionView::build(session, default_center);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", render::render_view(&view));
    }
    Ok(())
}

/// One-shot search: set the filter, pick a center, optionally route, print.
async fn run_search(
    config: &AppConfig,
    source: &DatasetSource,
    search: &SearchArgs,
    pick: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let mut navigator = build_navigator(config, source).await?;

    if let Some(radius) = search.radius {
        navigator.session_mut().set_radius(radius)?;
    }
    navigator.session_mut().set_age_class(Some(search.age));

    if let Some(point) = search.at {
        navigator.session_mut().map_clicked(point);
    } else if let Some(address) = search.address.as_deref() {
        if let Effect::Notice(notice) = navigator.search_address(address).await? {
            anyhow::bail!("{notice}");
        }
    } else {
        navigator.locate(&FixedPosition(config.home)).await;
        if navigator.session().active_point().is_none() {
            anyhow::bail!("no search center: pass --at or --address, or set NURSEMAP_HOME");
        }
    }

    if let Some(pick) = pick {
        let index = pick.checked_sub(1).context("--pick starts at 1")?;
        if let Effect::Notice(notice) = navigator.select_result(index).await? {
            anyhow::bail!("{notice}");
        }
    }

    print_view(navigator.session(), config.default_center, json)
}

async fn run_session(
    config: &AppConfig,
    source: &DatasetSource,
    script_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let mut navigator = build_navigator(config, source).await?;
    if config.home.is_some() {
        navigator.locate(&FixedPosition(config.home)).await;
    }

    let text = match script_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?,
    };

    for (number, line) in text.lines().enumerate() {
        let number = number + 1;
        let command = match script::parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("line {number}: {e:#}");
                continue;
            }
        };
        if command == ScriptCommand::Show {
            print_view(navigator.session(), config.default_center, json)?;
            continue;
        }
        match script::apply(&mut navigator, command).await {
            Ok(effect) => {
                if let Some(message) = render::describe_effect(&effect) {
                    println!("{message}");
                }
            }
            Err(e) => eprintln!("line {number}: {e}"),
        }
    }

    Ok(())
}
