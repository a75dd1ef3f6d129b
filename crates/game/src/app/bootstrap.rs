use std::path::PathBuf;
use std::sync::Arc;

use room_engine::{
    load_room_catalog, resolve_app_paths, ContentPipelineError, LoopConfig, RoomSession,
    SessionError, StartupError, TracingFeedback,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::chapter;
use super::config::{load_game_config, ConfigError};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load room catalog: {0}")]
    Content(#[from] ContentPipelineError),
    #[error("failed to start session: {0}")]
    Session(#[from] SessionError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: RoomSession,
    pub(crate) asset_root: PathBuf,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Majlis Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        base_content_dir = %app_paths.base_content_dir.display(),
        config_path = %app_paths.config_path.display(),
        "startup"
    );
    let game_config = load_game_config(&app_paths.config_path)?;
    let catalog = Arc::new(load_room_catalog(&app_paths, &game_config.chapter)?);
    let session = RoomSession::new(
        catalog,
        chapter::puzzles_for(&game_config.chapter),
        Box::new(TracingFeedback),
        game_config.session_options(),
    )?;

    Ok(AppWiring {
        config: game_config.loop_config(),
        session,
        asset_root: app_paths.asset_root(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
