use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use room_engine::{LoopConfig, SessionOptions};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const CHAPTER_ENV_VAR: &str = "MAJLIS_CHAPTER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,
    pub chapter: String,
    pub toast_duration_ms: u64,
    pub debug_mode: bool,
    /// `0` disables the frame cap.
    pub max_render_fps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            window_title: "Majlis".to_string(),
            chapter: "majlis".to_string(),
            toast_duration_ms: 3000,
            debug_mode: false,
            max_render_fps: 60,
        }
    }
}

impl GameConfig {
    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            max_render_fps: Some(self.max_render_fps),
            ..LoopConfig::default()
        }
    }

    pub(crate) fn session_options(&self) -> SessionOptions {
        SessionOptions {
            toast_duration: Duration::from_millis(self.toast_duration_ms),
            debug_mode: self.debug_mode,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config '{path}': {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Reads `path` when it exists, otherwise uses defaults. `MAJLIS_CHAPTER`
/// overrides the configured chapter either way.
pub(crate) fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let mut config = match fs::read_to_string(path) {
        Ok(raw) => parse_game_config(path, &raw)?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config_missing_using_defaults");
            GameConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match env::var(CHAPTER_ENV_VAR) {
        Ok(chapter) if !chapter.trim().is_empty() => {
            config.chapter = chapter.trim().to_string();
        }
        Ok(_) | Err(env::VarError::NotPresent) => {}
        Err(error) => {
            warn!(env_var = CHAPTER_ENV_VAR, error = %error, "unable to read chapter env var; using config");
        }
    }
    Ok(config)
}

pub(crate) fn parse_game_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(
        |error| {
            let field = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            }
        },
    )?;
    validate(path, &config)?;
    Ok(config)
}

fn validate(path: &Path, config: &GameConfig) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: message.to_string(),
    };
    if config.window_width == 0 || config.window_height == 0 {
        return Err(invalid("window_width and window_height must be positive"));
    }
    if config.toast_duration_ms == 0 {
        return Err(invalid("toast_duration_ms must be positive"));
    }
    if config.chapter.trim().is_empty() {
        return Err(invalid("chapter must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("config/game.json")
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = parse_game_config(&path(), r#"{ "debug_mode": true }"#).expect("config");
        assert!(config.debug_mode);
        assert_eq!(config.chapter, "majlis");
        assert_eq!(
            config.session_options().toast_duration,
            Duration::from_millis(3000)
        );
        assert_eq!(config.loop_config().window_width, 1280);
    }

    #[test]
    fn parse_error_names_the_field() {
        let err = parse_game_config(&path(), r#"{ "window_width": "wide" }"#).expect_err("err");
        match err {
            ConfigError::Parse { field, .. } => assert_eq!(field, "window_width"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_game_config(&path(), r#"{ "chapters": "x" }"#).expect_err("err");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_toast_duration_is_invalid() {
        let err = parse_game_config(&path(), r#"{ "toast_duration_ms": 0 }"#).expect_err("err");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempfile::TempDir::new().expect("temp");
        let config = load_game_config(&temp.path().join("game.json")).expect("config");
        assert_eq!(config.window_title, "Majlis");
    }

    #[test]
    fn shipped_config_parses() {
        let raw = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/game.json"
        ));
        let config = parse_game_config(&path(), raw).expect("shipped config");
        assert_eq!(config, GameConfig::default());
    }
}
