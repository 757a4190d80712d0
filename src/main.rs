use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use cityweather::config::LoggingConfig;
use cityweather::{App, AppConfig, Units};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Look up the current weather for a city
#[derive(Parser, Debug)]
#[command(name = "cityweather", version, about)]
struct Cli {
    /// City to look up (Chinese input is accepted); omit for an interactive prompt
    city: Vec<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Measurement system: metric, imperial or standard
    #[arg(long)]
    units: Option<Units>,

    /// Language for descriptions and localized names, e.g. zh_cn or en
    #[arg(long)]
    lang: Option<String>,

    /// Country code tried when the bare city name is not found
    #[arg(long)]
    country: Option<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

fn load_env_file(env_file: Option<&PathBuf>) {
    if let Some(path) = env_file {
        dotenvy::from_path(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_from_path(cli.config.clone())?;

    if let Some(units) = cli.units {
        config.weather.units = units;
    }
    if let Some(lang) = &cli.lang {
        config.weather.lang = lang.clone();
    }
    if let Some(country) = &cli.country {
        config.weather.country_code = country.clone();
    }
    config.validate()?;

    Ok(config)
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,cityweather={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn render(app: &App) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let mut err = std::io::stderr().lock();
    app.view()
        .render(&mut out, &mut err)
        .context("Failed to write output")
}

async fn run_interactive(app: &mut App) -> Result<()> {
    println!("Enter a city name and press Enter (Ctrl-D to quit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("City> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if app.handle_search(&line).await {
            render(app)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    load_env_file(cli.env_file.as_ref());
    let config = load_config(&cli).context("Failed to load configuration")?;
    init_logging(&config.logging, cli.verbose);

    tracing::debug!(
        "Using config from: {}",
        cli.config
            .clone()
            .or_else(AppConfig::get_config_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );

    let mut app = App::from_config(&config).context("Failed to initialise weather client")?;

    if cli.city.is_empty() {
        run_interactive(&mut app).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let query = cli.city.join(" ");
    if !app.handle_search(&query).await {
        eprintln!("Please enter a city name.");
        return Ok(ExitCode::from(2));
    }
    render(&app)?;

    if app.view().error().is_some() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
