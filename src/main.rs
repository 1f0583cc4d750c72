use anyhow::Context;
use api_client::{DataSource, FixtureSource, YahooClient};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets, Table};
use configuration::{load_config, Config, Labels, Language, Theme, TimeRange};
use engine::{DashboardEngine, RunRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use web_server::AppState;

mod render;

/// The main entry point for the TrendLens dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    // Held until exit so buffered log lines are flushed.
    let _log_guard = init_tracing(cli.log_dir.as_deref())?;

    let config = load_or_default(&cli.config)?;
    let (source, fixed_as_of) = build_source(cli.fixture.as_deref(), &config)?;

    match cli.command {
        Commands::Show(args) => handle_show(source, &config, fixed_as_of, args).await,
        Commands::Watch(args) => handle_watch(source, &config, fixed_as_of, args).await,
        Commands::Serve(args) => handle_serve(source, config, fixed_as_of, args).await,
        Commands::Assets => {
            handle_assets(&config);
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Compare asset price trends, return correlations and a moving-average crossover.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration. Built-in defaults are used if it does not exist.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Replay closing prices from a JSON fixture instead of calling Yahoo Finance.
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Also write logs to daily-rotated files in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print every view.
    Show(DashboardArgs),
    /// Re-run the pipeline on an interval until Ctrl-C.
    Watch(WatchArgs),
    /// Serve the snapshot as a JSON API.
    Serve(ServeArgs),
    /// List the configured symbols and their display names.
    Assets,
}

#[derive(Args, Debug, Clone)]
struct DashboardArgs {
    /// Comma-separated symbols (e.g., "BTC-USD,COIN"). Defaults to the configured selection.
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    /// The lookback window.
    #[arg(long, value_enum)]
    range: Option<TimeRange>,

    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Language of every label.
    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Print the snapshot as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    dashboard: DashboardArgs,

    /// Seconds between refreshes. Defaults to `refresh_interval_secs`.
    #[arg(long)]
    interval: Option<u64>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Startup
// ==============================================================================

fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let guard = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "trendlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Some(guard)
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            None
        }
    };
    Ok(guard)
}

fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        load_config(path).with_context(|| format!("failed to load {}", path.display()))
    } else {
        tracing::info!("{} not found, using built-in defaults", path.display());
        Ok(Config::default())
    }
}

/// Picks the data source. A fixture also pins "today" to its latest date.
fn build_source(
    fixture: Option<&Path>,
    config: &Config,
) -> anyhow::Result<(Arc<dyn DataSource>, Option<NaiveDate>)> {
    match fixture {
        Some(path) => {
            let fixture = FixtureSource::from_file(path)
                .with_context(|| format!("failed to read fixture {}", path.display()))?;
            let as_of = fixture.latest_date();
            let source: Arc<dyn DataSource> = Arc::new(fixture);
            Ok((source, as_of))
        }
        None => {
            let source: Arc<dyn DataSource> = Arc::new(YahooClient::new(&config.provider)?);
            Ok((source, None))
        }
    }
}

/// Command-line overrides applied on top of the configured dashboard.
struct ViewSettings {
    symbols: Vec<String>,
    range: TimeRange,
    theme: Theme,
    labels: Labels,
    json: bool,
}

impl ViewSettings {
    fn resolve(args: DashboardArgs, config: &Config) -> Self {
        let dashboard = &config.dashboard;
        Self {
            symbols: args.symbols.unwrap_or_else(|| dashboard.symbols.clone()),
            range: args.range.unwrap_or(dashboard.range),
            theme: args.theme.unwrap_or(dashboard.theme),
            labels: Labels::for_language(args.lang.unwrap_or(dashboard.language)),
            json: args.json,
        }
    }

    fn request(&self, config: &Config, fixed_as_of: Option<NaiveDate>) -> RunRequest {
        RunRequest::new(
            config.resolve_assets(&self.symbols),
            self.range,
            fixed_as_of.unwrap_or_else(|| Utc::now().date_naive()),
        )
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_show(
    source: Arc<dyn DataSource>,
    config: &Config,
    fixed_as_of: Option<NaiveDate>,
    args: DashboardArgs,
) -> anyhow::Result<()> {
    let view = ViewSettings::resolve(args, config);
    let request = view.request(config, fixed_as_of);

    let mut engine = DashboardEngine::new(source, config.technicals)?;
    let progress_bar = (!view.json).then(|| fetch_progress(request.assets.len()));
    if let Some(pb) = &progress_bar {
        engine = engine.with_progress(pb.clone());
    }

    let result = engine.run(&request).await;
    if let Some(pb) = &progress_bar {
        pb.finish_and_clear();
    }
    print_result(result, &view)
}

async fn handle_watch(
    source: Arc<dyn DataSource>,
    config: &Config,
    fixed_as_of: Option<NaiveDate>,
    args: WatchArgs,
) -> anyhow::Result<()> {
    let secs = args.interval.unwrap_or(config.dashboard.refresh_interval_secs).max(1);
    let view = ViewSettings::resolve(args.dashboard, config);
    let engine = DashboardEngine::new(source, config.technicals)?;

    tracing::info!(interval_secs = secs, "Watching; press Ctrl-C to stop");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let (engine, view) = (&engine, &view);
    let refreshes = refresh_until(Duration::from_secs(secs), shutdown, move || async move {
        // Each refresh recomputes the window so "today" advances.
        let request = view.request(config, fixed_as_of);
        let result = engine.run(&request).await;
        if !view.json {
            print!("\x1B[2J\x1B[H");
        }
        if let Err(e) = print_result(result, view) {
            tracing::error!(error = %e, "Refresh failed");
        }
    })
    .await;

    tracing::info!(refreshes, "Stopping watch");
    Ok(())
}

/// Calls `refresh` once per `period` until `shutdown` resolves.
///
/// A refresh in progress is abandoned as soon as `shutdown` resolves.
/// Returns the number of completed refreshes.
async fn refresh_until<S, R, F>(period: Duration, shutdown: S, mut refresh: R) -> usize
where
    S: Future<Output = ()>,
    R: FnMut() -> F,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(period);
    let mut completed = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => break,
            _ = refresh() => completed += 1,
        }
    }
    completed
}

async fn handle_serve(
    source: Arc<dyn DataSource>,
    config: Config,
    fixed_as_of: Option<NaiveDate>,
    args: ServeArgs,
) -> anyhow::Result<()> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;

    let engine = DashboardEngine::new(source, config.technicals)?;
    web_server::run_server(addr, AppState::new(engine, config, fixed_as_of)).await
}

fn handle_assets(config: &Config) {
    let labels = Labels::for_language(config.dashboard.language);
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_header(vec!["Symbol", labels.asset]);
    for asset in &config.assets {
        table.add_row(vec![asset.symbol.as_str(), asset.name.as_str()]);
    }
    println!("{table}");
}

fn print_result(
    result: Result<engine::Snapshot, engine::EngineError>,
    view: &ViewSettings,
) -> anyhow::Result<()> {
    match result {
        Ok(snapshot) if view.json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Ok(snapshot) => {
            println!("{}", render::render_snapshot(&snapshot, &view.labels, view.theme));
        }
        Err(e) => match render::render_error(&e, &view.labels) {
            Some(message) => println!("{}", message),
            None => return Err(e.into()),
        },
    }
    Ok(())
}

fn fetch_progress(len: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress_bar.set_style(style);
    progress_bar.enable_steady_tick(Duration::from_millis(120));
    progress_bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn shutdown_interrupts_a_stalled_refresh() {
        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            refresh_until(Duration::from_millis(10), shutdown, std::future::pending::<()>),
        )
        .await;
        assert_eq!(finished.unwrap(), 0);
    }

    #[tokio::test]
    async fn refreshes_repeat_until_shutdown() {
        let calls = AtomicUsize::new(0);
        let shutdown = tokio::time::sleep(Duration::from_millis(200));
        let counter = &calls;
        let completed = refresh_until(Duration::from_millis(10), shutdown, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert!(completed >= 2);
        assert!(calls.load(Ordering::SeqCst) >= completed);
    }
}
