use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod feedback;
mod image_keys;
pub mod navigation;
pub mod resolver;
pub mod session;
pub mod state;

pub use app::{
    action_for_key, dispatch_action, dispatch_click, run_app, zone_tint, AppError, InputAction,
    KeypadKey, LoopConfig, LoopSignal, PxRect, Renderer, ScreenLayout,
};
pub use content::{
    compile_room_catalog, load_room_catalog, CatalogIntegrityError, ContentCompileError,
    ContentErrorCode, ContentPipelineError, Direction, RoomCatalog, SourceLocation, WallId,
};
pub use feedback::{FeedbackRecorder, FeedbackSink, TracingFeedback};
pub use image_keys::{validate_image_key, ImageKeyError};
pub use resolver::{
    resolve_zone_click, CodeVerdict, GatedRewardPuzzle, PuzzleRegistry, ZoneOutcome, ZonePuzzle,
};
pub use session::{InputError, RoomSession, SessionError, SessionOptions};
pub use state::{Effect, GameState, Toast, DEFAULT_TOAST_DURATION};

pub const ROOT_ENV_VAR: &str = "MAJLIS_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    pub config_path: PathBuf,
}

impl AppPaths {
    pub fn for_root(root: PathBuf) -> Self {
        Self {
            base_content_dir: root.join("assets").join("base"),
            config_path: root.join("config").join("game.json"),
            root,
        }
    }

    pub fn chapter_path(&self, chapter: &str) -> PathBuf {
        self.base_content_dir
            .join("chapters")
            .join(format!("{chapter}.xml"))
    }

    /// Directory the image keys resolve against.
    pub fn asset_root(&self) -> PathBuf {
        self.root.join("assets")
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "MAJLIS_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/majlis\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::for_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let temp = TempDir::new().expect("temp");
        fs::create_dir_all(temp.path().join("assets")).expect("assets");
        assert!(!is_repo_marker(temp.path()));
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        assert!(is_repo_marker(temp.path()));
        assert!(!is_repo_marker(&temp.path().join("definitely_not_a_marker")));
    }

    #[test]
    fn chapter_and_asset_paths_hang_off_root() {
        let paths = AppPaths::for_root(PathBuf::from("/srv/majlis"));
        assert_eq!(
            paths.chapter_path("majlis"),
            PathBuf::from("/srv/majlis/assets/base/chapters/majlis.xml")
        );
        assert_eq!(paths.asset_root(), PathBuf::from("/srv/majlis/assets"));
        assert_eq!(
            paths.config_path,
            PathBuf::from("/srv/majlis/config/game.json")
        );
    }
}
