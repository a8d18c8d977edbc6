use crate::error::AppError;
use crate::model::TaskKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "DOIT_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub const THEMES: [&str; 3] = ["default", "noir", "solarized"];

/// Unknown theme names fall back to the plain palette.
pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    let (accent, muted, reset) = match theme.and_then(canonical_theme_name) {
        Some("noir") => ("\x1b[38;5;208m", "\x1b[38;5;250m", "\x1b[0m"),
        Some("solarized") => ("\x1b[38;5;108m", "\x1b[38;5;250m", "\x1b[0m"),
        _ => ("", "", ""),
    };
    Palette {
        accent,
        muted,
        reset,
    }
}

/// Maps a user-supplied name onto one of [`THEMES`]; `dark` is kept as a
/// spelling of `noir`.
pub fn canonical_theme_name(raw: &str) -> Option<&'static str> {
    let name = raw.trim().to_ascii_lowercase();
    match name.as_str() {
        "" | "default" => Some("default"),
        "noir" | "dark" => Some("noir"),
        "solarized" => Some("solarized"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default = "default_task_kind")]
    pub default_type: TaskKind,
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

fn default_task_kind() -> TaskKind {
    TaskKind::Daily
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            default_type: default_task_kind(),
            store_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub default_type: Option<TaskKind>,
    pub store_dir: Option<PathBuf>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("doit").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("doit")
            .join(CONFIG_FILE_NAME))
    }
}

/// Never fails: a missing file gives defaults, an unreadable one gives
/// defaults plus the error so the caller can mention it.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config
        .theme
        .and_then(|name| canonical_theme_name(&name))
        .map(str::to_string);
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized.to_string());
    }
    if let Some(kind) = overrides.default_type {
        merged.default_type = kind;
    }
    if let Some(dir) = overrides.store_dir.as_ref() {
        merged.store_dir = Some(dir.clone());
    }

    merged
}
