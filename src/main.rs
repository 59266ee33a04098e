use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fare_trends::{
    AppConfig, Capabilities, DirectoryDownloader, ExportFormat, FareApiClient, Field, FixedPrompt,
    InteractionBindings, LogNotifier, SystemClock, UiEvent, ViewController, ViewState,
    ViewSurface,
    terminal::{TerminalChartRenderer, TerminalSurface},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "fare-trends")]
#[command(about = "Filter airline fare data, show trends and insights, export the result")]
struct Args {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Origin city
    #[arg(long)]
    origin: Option<String>,

    /// Destination city
    #[arg(long)]
    destination: Option<String>,

    /// Show the last N days up to today
    #[arg(long, value_name = "DAYS", conflicts_with_all = ["start", "end", "clear"])]
    last: Option<i64>,

    /// Drop all filters
    #[arg(long, conflicts_with_all = ["start", "end", "origin", "destination"])]
    clear: bool,

    /// Download the filtered dataset (csv or json)
    #[arg(long, value_name = "FORMAT")]
    export: Option<ExportFormat>,
}

impl Args {
    fn has_filters(&self) -> bool {
        self.start.is_some()
            || self.end.is_some()
            || self.origin.is_some()
            || self.destination.is_some()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("fare_trends=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let client = FareApiClient::new(&config.backend, &config.network)?;
    tracing::info!("Using backend at {}", config.backend.base_url);

    let surface = Arc::new(TerminalSurface::new());
    let capabilities = Capabilities {
        surface: surface.clone(),
        chart: Arc::new(TerminalChartRenderer),
        downloader: Arc::new(DirectoryDownloader::new(
            config.export.resolved_output_dir(),
        )),
        notifier: Arc::new(LogNotifier),
        clock: Arc::new(SystemClock),
    };

    let controller = ViewController::new(
        client,
        capabilities,
        config.filters.clone(),
        config.export.clone(),
    );
    let prompt = Arc::new(FixedPrompt(args.export.unwrap_or(ExportFormat::Csv)));
    let bindings = InteractionBindings::new(controller, prompt, config.filters.default_range_days);

    if args.clear {
        bindings.dispatch(UiEvent::ClearFilters).await;
    } else if let Some(days) = args.last {
        if let Some(origin) = &args.origin {
            surface.write_field(Field::Origin, origin);
        }
        if let Some(destination) = &args.destination {
            surface.write_field(Field::Destination, destination);
        }
        bindings.dispatch(UiEvent::QuickRange(days)).await;
    } else if args.has_filters() {
        let fields = [
            (Field::StartDate, &args.start),
            (Field::EndDate, &args.end),
            (Field::Origin, &args.origin),
            (Field::Destination, &args.destination),
        ];
        for (field, value) in fields {
            surface.write_field(field, value.as_deref().unwrap_or_default());
        }
        bindings.dispatch(UiEvent::ApplyFilters).await;
    } else {
        bindings.on_load().await;
    }

    if args.export.is_some() {
        bindings.dispatch(UiEvent::ExportData).await;
    }

    match bindings.controller().view_state() {
        ViewState::Error(message) => anyhow::bail!(message),
        _ => Ok(()),
    }
}
