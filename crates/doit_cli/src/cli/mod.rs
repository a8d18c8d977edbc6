use clap::{Parser, Subcommand};
use doit_core::config::ConfigOverrides;
use doit_core::model::TaskKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (theme=default|noir|solarized,
    /// default_type=daily|global, store_dir=PATH)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: doit add Drink water
    /// Example: doit add "File taxes" --type global
    Add {
        text: Vec<String>,
        /// daily or global (defaults to the configured default_type)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: Option<TaskKind>,
    },
    /// Check or uncheck a task without completing it
    ///
    /// Example: doit toggle 1704103200000
    Toggle { id: i64 },
    /// Complete a task and move it into history
    ///
    /// Example: doit done 1704103200000
    Done { id: i64 },
    /// Delete a task without recording it
    ///
    /// Example: doit delete 1704103200000
    Delete { id: i64 },
    /// List tasks
    ///
    /// Example: doit list
    /// Example: doit list daily
    List {
        #[command(subcommand)]
        list: Option<ListCommand>,
    },
    /// Show completion history, newest first
    ///
    /// Example: doit history
    /// Example: doit history delete 1704103200001
    /// Example: doit history clear --yes
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },
    /// Show today's count and the last seven days
    ///
    /// Example: doit stats
    Stats,
    /// Run the daily reset now
    ///
    /// Example: doit reset
    Reset,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    /// List daily tasks
    Daily,
    /// List global tasks
    Global,
    /// List every task
    All,
}

impl ListCommand {
    pub fn kind(self) -> Option<TaskKind> {
        match self {
            Self::Daily => Some(TaskKind::Daily),
            Self::Global => Some(TaskKind::Global),
            Self::All => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Delete one history entry
    Delete { id: i64 },
    /// Delete every history entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DefaultType,
    StoreDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "default_type" | "type" => ConfigOverrideTarget::DefaultType,
        "store_dir" | "store" => ConfigOverrideTarget::StoreDir,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() && target != ConfigOverrideTarget::Theme {
        return Err(format!("override '{canonical_field}' requires a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Fold every `--config-override` flag into one set; later flags win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for item in raw {
        let parsed = parse_config_override(item)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DefaultType => {
                overrides.default_type = Some(parsed.value.parse::<TaskKind>()?);
            }
            ConfigOverrideTarget::StoreDir => {
                overrides.store_dir = Some(PathBuf::from(parsed.value));
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
