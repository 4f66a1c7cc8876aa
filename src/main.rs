mod app;
mod report;
mod state;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::network::NetworkWorker;
use crate::state::refresher::PeriodicRefresher;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use squares_api::client::EspnClient;
use squares_api::feed::GameState;
use squares_api::store::{PoolRow, backfill_documents};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "Environment:
  SQUARES_ESPN_URL      ESPN site API base (default https://site.api.espn.com/apis/site/v2/sports/football)
  SQUARES_LEAGUE        ESPN football league slug (default nfl)
  SQUARES_REFRESH_SECS  Refresh interval for `watch` (default 30)
  RUST_LOG              Log filter, overrides -v";

#[derive(Parser, Debug)]
#[command(name = "squares", version, about = "Football squares pool scorer", after_help = AFTER_HELP)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// ESPN league slug, e.g. nfl or college-football.
    #[arg(long, global = true)]
    league: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a pool once and print the board.
    Score {
        #[arg(long)]
        pool: PathBuf,
        /// Game state JSON saved from the feed, instead of fetching it.
        #[arg(long, conflicts_with = "event")]
        game: Option<PathBuf>,
        /// ESPN event id; defaults to the pool's event_id.
        #[arg(long)]
        event: Option<String>,
        /// Force which side team 1 (rows) is on.
        #[arg(long)]
        team1_home: Option<bool>,
    },
    /// Re-score a pool on every feed refresh until the game is final.
    Watch {
        #[arg(long)]
        pool: PathBuf,
        #[arg(long)]
        event: Option<String>,
        /// Seconds between refreshes.
        #[arg(long)]
        interval: Option<u64>,
        #[arg(long)]
        team1_home: Option<bool>,
    },
    /// Recompute cached quarter winners for exported pool rows.
    Backfill {
        /// JSON array of pool rows.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the updated rows; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Report what would change without writing rows.
        #[arg(long)]
        dry_run: bool,
    },
    /// List today's scoreboard to find an event id.
    Games,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    let mut settings = AppSettings::load();
    settings.set_verbosity(cli.verbose);
    if let Some(league) = cli.league {
        settings.league = league;
    }
    init_logging(&settings);

    match cli.command {
        Command::Score { pool, game, event, team1_home } => {
            score(settings, &pool, game.as_deref(), event, team1_home).await
        }
        Command::Watch { pool, event, interval, team1_home } => {
            if let Some(secs) = interval {
                settings.set_refresh_secs(secs);
            }
            watch(settings, &pool, event, team1_home).await
        }
        Command::Backfill { input, output, dry_run } => {
            run_backfill(&input, output.as_deref(), dry_run)
        }
        Command::Games => games(&settings).await,
    }
}

fn init_logging(settings: &AppSettings) {
    let default_level = settings
        .log_level
        .unwrap_or(log::LevelFilter::Warn)
        .to_string()
        .to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn client_for(settings: &AppSettings) -> EspnClient {
    EspnClient::new()
        .with_base_url(settings.espn_url.clone())
        .with_league(settings.league.clone())
}

fn load_pool(path: &Path) -> anyhow::Result<PoolRow> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read pool file {}", path.display()))?;
    let pool: PoolRow = serde_json::from_str(&content)
        .with_context(|| format!("invalid pool file {}", path.display()))?;
    for (name, axis) in [("x_axis", &pool.x_axis), ("y_axis", &pool.y_axis)] {
        if !axis.is_permutation() {
            warn!("{name} {:?} is not a permutation of 0-9; affected quarters will have no winner", axis.0);
        }
    }
    Ok(pool)
}

async fn score(
    settings: AppSettings,
    pool_path: &Path,
    game_path: Option<&Path>,
    event: Option<String>,
    team1_home: Option<bool>,
) -> anyhow::Result<()> {
    let pool = load_pool(pool_path)?;
    let event = event.or_else(|| pool.event_id.clone());
    let client = client_for(&settings);

    let mut app = App::new(settings, pool);
    app.state.team1_home_override = team1_home;

    if let Some(path) = game_path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read game file {}", path.display()))?;
        app.on_game_state_loaded(GameState::from_json_str(&content));
    } else if let Some(event_id) = event {
        info!("fetching game state for event {event_id}");
        let game = client.fetch_game_state(&event_id).await?;
        app.on_game_state_loaded(game);
    }

    let board = app.board();
    let mut stdout = io::stdout().lock();
    report::render_board(&mut stdout, &app, &board)?;
    Ok(())
}

async fn watch(
    settings: AppSettings,
    pool_path: &Path,
    event: Option<String>,
    team1_home: Option<bool>,
) -> anyhow::Result<()> {
    let pool = load_pool(pool_path)?;
    let Some(event_id) = event.or_else(|| pool.event_id.clone()) else {
        bail!("watch needs an event id: pass --event or set event_id in the pool file");
    };

    let mut app = App::new(settings, pool);
    app.state.team1_home_override = team1_home;

    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(16);
    let (network_resp_tx, mut network_resp_rx) = mpsc::channel::<NetworkResponse>(16);

    let network_worker =
        NetworkWorker::new(client_for(&app.settings), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    let periodic_updater = PeriodicRefresher::new(
        network_req_tx.clone(),
        event_id.clone(),
        app.settings.refresh_interval,
    );
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Initial load; the refresher takes over from its second tick.
    network_req_tx
        .send(NetworkRequest::LoadGameState { event_id })
        .await
        .context("network worker stopped before the first request")?;

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            Some(response) = network_resp_rx.recv() => {
                handle_network_response(response, &mut app);
                let board = app.board();
                let mut stdout = io::stdout().lock();
                if let Err(e) = report::render_board(&mut stdout, &app, &board)
                    .and_then(|_| writeln!(stdout))
                {
                    break Err(e.into());
                }
                if app.is_final() {
                    info!("game is final, stopping");
                    break Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break Ok(());
            }
            else => break Ok(()),
        }
    };

    periodic_task.abort();
    network_task.abort();
    result
}

fn handle_network_response(response: NetworkResponse, app: &mut App) {
    match response {
        NetworkResponse::GameStateLoaded { event_id, game } => {
            info!("event {event_id}: {} (period {:?})", game.phase.label(), game.period);
            app.on_game_state_loaded(game);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.on_error(message);
        }
    }
}

fn run_backfill(input: &Path, output: Option<&Path>, dry_run: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("could not read rows from {}", input.display()))?;
    // Rows are checked one at a time so a single bad row cannot sink the batch.
    let mut rows: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of rows", input.display()))?;

    let report = backfill_documents(&mut rows);
    report::render_backfill(&mut io::stderr(), &report, dry_run)?;
    if dry_run {
        return Ok(());
    }

    let payload = serde_json::to_string_pretty(&rows).context("serialize rows failed")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create dir {} failed", parent.display()))?;
            }
            std::fs::write(path, payload)
                .with_context(|| format!("write rows to {} failed", path.display()))?;
        }
        None => writeln!(io::stdout().lock(), "{payload}")?,
    }
    Ok(())
}

async fn games(settings: &AppSettings) -> anyhow::Result<()> {
    let games = client_for(settings).fetch_scoreboard().await?;
    report::render_scoreboard(&mut io::stdout().lock(), &games)?;
    Ok(())
}
