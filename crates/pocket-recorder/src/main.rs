//! Pocket Recorder: console front end for the voice memo sessions.

mod app;
mod app_command;
mod config;
mod console_input;
mod error;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console_input::ConsoleInput,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use std::{panic::Location, path::Path, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use pocket_recorder_core::{
    Clock, DirectoryMediaLibrary, FileStore, InterruptionCoordinator, KeyValueStore,
    PlaybackSession, RecordingCatalog, RecordingSession, SessionContext, SimulatedPlatform,
    SystemClock, TokioScheduler,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "pocket_recorder=debug,pocket_recorder_core=debug";

/// Blocking stdin reads cannot be cancelled; give them this long on exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Application entry point.
fn main() {
    let log_dir = match Config::log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve log directory: {e}");
            std::process::exit(1);
        }
    };

    // Flushes the file writer when dropped at the end of main.
    let _log_guard = match init_logging(&log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            std::process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        error!(error = ?e, "App error");
    }

    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

/// Console layer on stderr plus a daily JSON log file.
#[track_caller]
fn init_logging(log_dir: &Path) -> AppResult<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "pocket-recorder.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().json().with_writer(file_writer))
        .try_init()
        .map_err(|e| AppError::Logging {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}

/// Build the sessions once and run the app until shutdown.
async fn run(config: Config) -> AppResult<()> {
    tokio::fs::create_dir_all(&config.storage.recordings_dir).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.data_dir).await?);
    let context = SessionContext {
        clock: Arc::clone(&clock),
        scheduler: Arc::new(TokioScheduler),
        store: Arc::clone(&store),
    };

    let platform =
        SimulatedPlatform::with_output_dir(Arc::clone(&clock), &config.storage.recordings_dir);
    let catalog = RecordingCatalog::new(store);

    if config.behavior.reset_catalog_on_launch {
        catalog.clear().await?;
        warn!("Recording catalog reset on launch");
    }

    // Recordings from earlier runs are playable again.
    for saved in catalog.get_all().await? {
        if Path::new(&saved.file_uri).exists() {
            platform.register_asset(
                saved.file_uri.clone(),
                Duration::from_secs(saved.duration_seconds),
            );
        } else {
            warn!(id = %saved.id, uri = %saved.file_uri, "Recording file missing");
        }
    }

    let recording = RecordingSession::new(
        Arc::new(platform.clone()),
        catalog,
        context.clone(),
        config.recording.to_options(),
    );
    if config.behavior.save_to_gallery {
        recording.set_media_library(Arc::new(DirectoryMediaLibrary::new(
            &config.storage.gallery_dir,
        )));
    }
    if recording.recover().await {
        warn!("Discarded an unfinished recording from a previous run");
    }

    let playback = PlaybackSession::new(
        Arc::new(platform),
        context,
        config.playback.to_options(),
    );
    let interruptions = InterruptionCoordinator::new(recording.clone(), clock);

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                let _ = ctrl_c_tx.send(true);
            }
            Err(e) => warn!(error = ?e, "Could not listen for Ctrl-C"),
        }
    });

    let console = ConsoleInput::new(command_tx);
    let app = App {
        recording,
        playback,
        interruptions,
        command_rx,
        shutdown_tx,
    };

    let console_rx = shutdown_rx.clone();
    let (console_result, app_result) =
        tokio::join!(console.run(console_rx), app.run(shutdown_rx));

    if let Err(e) = console_result {
        error!(error = ?e, "Console input error");
    }

    app_result
}
