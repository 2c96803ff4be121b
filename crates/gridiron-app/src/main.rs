// Gridiron draft engine entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Open database
// 4. Load the player pool
// 5. Restore any draft in progress
// 6. Create mpsc channels
// 7. Spawn WebSocket server task
// 8. Spawn app logic task
// 9. Wait for Ctrl+C
// 10. Cleanup on exit

use gridiron_app::app;
use gridiron_app::config;
use gridiron_app::db;
use gridiron_app::projections;
use gridiron_app::ws_server;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Gridiron draft engine starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, picking at slot {}",
        config.league.name,
        config.league.teams(),
        config.league.context.pick_slot
    );

    // 3. Open database
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Load the player pool
    let players = projections::load_pool(&config).context("failed to load player pool")?;
    info!("Loaded {} players", players.len());

    // 5. Restore any draft in progress
    let draft_id = db
        .current_or_new_draft_id()
        .context("failed to resolve draft ID")?;
    info!("Using draft_id={}", draft_id);

    let mut app_state = app::AppState::new(config.clone(), players, db, draft_id);
    match app::recover_from_db(&mut app_state) {
        Ok(true) => info!("Draft state restored from previous session"),
        Ok(false) => info!("Starting fresh draft session"),
        Err(e) => {
            error!("Crash recovery failed: {}", e);
            return Err(e.context("crash recovery failed"));
        }
    }

    // 6. Create mpsc channels
    let (ws_tx, ws_rx) = mpsc::channel(256);
    let (out_tx, out_rx) = mpsc::channel(256);

    // 7. Spawn WebSocket server task
    let ws_port = config.ws_port;
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_server::run(ws_port, ws_tx, out_rx).await {
            error!("WebSocket server error on port {}: {}", ws_port, e);
        }
    });

    // 8. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(ws_rx, out_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 9. Serve until interrupted
    info!("Ready. WebSocket server listening on 127.0.0.1:{}", ws_port);
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Shutdown requested");

    // 10. Cleanup: stop the server first so the app loop sees its channel close
    ws_handle.abort();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Gridiron draft engine shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file under the platform data directory.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = match directories::ProjectDirs::from("", "", "gridiron") {
        Some(dirs) => dirs.data_dir().join("logs"),
        None => std::env::current_dir()?.join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("gridiron.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("gridiron=info,gridiron_app=info,gridiron_core=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
