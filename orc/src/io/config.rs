//! orc configuration stored at `~/.orc/config.toml`.
//!
//! Every file carries an explicit integer `version`. Loading decodes the
//! file with that version's layout, then upgrades one version at a time
//! until it reaches [`CURRENT_VERSION`]. The version is never guessed from
//! which fields happen to be present.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const CURRENT_VERSION: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config is missing the `version` key")]
    MissingVersion,

    #[error("unsupported config version {0} (newest known is {max})", max = CURRENT_VERSION)]
    UnsupportedVersion(i64),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Current (v3) configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrcConfig {
    pub version: u32,
    pub paths: PathsConfig,
    pub tmux: TmuxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Root under which mission workspaces are materialized.
    pub workspaces: PathBuf,
    /// Root holding the source repositories groves take worktrees of.
    pub repos: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TmuxConfig {
    pub session_prefix: String,
    /// Command sent to the editor pane of a grove window.
    pub editor: String,
    /// Command that starts an IMP in its grove pane.
    pub bootstrap_command: String,
}

impl Default for OrcConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            paths: PathsConfig {
                workspaces: PathBuf::from("~/orc/missions"),
                repos: PathBuf::from("~/src"),
            },
            tmux: TmuxConfig::default(),
        }
    }
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            session_prefix: "orc".to_string(),
            editor: "vim".to_string(),
            bootstrap_command: "orc prime".to_string(),
        }
    }
}

impl OrcConfig {
    /// Replace a leading `~` in both path roots with `home`.
    pub fn with_home(mut self, home: &Path) -> Self {
        self.paths.workspaces = expand_home(&self.paths.workspaces, home);
        self.paths.repos = expand_home(&self.paths.repos, home);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion(i64::from(self.version)));
        }
        if self.paths.workspaces.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("paths.workspaces"));
        }
        if self.paths.repos.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("paths.repos"));
        }
        if self.tmux.session_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyField("tmux.session_prefix"));
        }
        if self.tmux.editor.trim().is_empty() {
            return Err(ConfigError::EmptyField("tmux.editor"));
        }
        if self.tmux.bootstrap_command.trim().is_empty() {
            return Err(ConfigError::EmptyField("tmux.bootstrap_command"));
        }
        Ok(())
    }
}

/// v1: flat layout.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct ConfigV1 {
    workspace_root: PathBuf,
    repos_root: PathBuf,
}

/// v2: grouped paths, tmux prefix only.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct ConfigV2 {
    paths: PathsConfig,
    tmux: TmuxConfigV2,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct TmuxConfigV2 {
    session_prefix: String,
}

fn upgrade_v1(v1: ConfigV1) -> ConfigV2 {
    ConfigV2 {
        paths: PathsConfig {
            workspaces: v1.workspace_root,
            repos: v1.repos_root,
        },
        tmux: TmuxConfigV2 {
            session_prefix: TmuxConfig::default().session_prefix,
        },
    }
}

fn upgrade_v2(v2: ConfigV2) -> OrcConfig {
    let defaults = TmuxConfig::default();
    OrcConfig {
        version: CURRENT_VERSION,
        paths: v2.paths,
        tmux: TmuxConfig {
            session_prefix: v2.tmux.session_prefix,
            editor: defaults.editor,
            bootstrap_command: defaults.bootstrap_command,
        },
    }
}

/// Decode config text of any known version into the current layout.
pub fn parse_config(contents: &str) -> Result<OrcConfig> {
    let raw: toml::Table = toml::from_str(contents).context("parse config toml")?;
    let version = match raw.get("version") {
        None => return Err(ConfigError::MissingVersion.into()),
        Some(value) => value
            .as_integer()
            .context("config `version` must be an integer")?,
    };
    debug!(version, "decoding config");

    let cfg = match version {
        1 => {
            let v1: ConfigV1 = toml::from_str(contents).context("decode v1 config")?;
            upgrade_v2(upgrade_v1(v1))
        }
        2 => {
            let v2: ConfigV2 = toml::from_str(contents).context("decode v2 config")?;
            upgrade_v2(v2)
        }
        3 => toml::from_str(contents).context("decode v3 config")?,
        other => return Err(ConfigError::UnsupportedVersion(other).into()),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `OrcConfig::default()`.
pub fn load_config(path: &Path) -> Result<OrcConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        return Ok(OrcConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("load {}", path.display()))
}

/// Atomically write config to disk (temp file + rename), always at the
/// current version.
pub fn write_config(path: &Path, cfg: &OrcConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Rewrite an older config file in the current layout. Returns the version
/// the file had before.
pub fn migrate_config_file(path: &Path) -> Result<i64> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let raw: toml::Table = toml::from_str(&contents).context("parse config toml")?;
    let before = raw
        .get("version")
        .and_then(toml::Value::as_integer)
        .ok_or(ConfigError::MissingVersion)?;
    let cfg = parse_config(&contents)?;
    write_config(path, &cfg)?;
    debug!(from = before, to = CURRENT_VERSION, "config migrated");
    Ok(before)
}

/// Default location: `~/.orc/config.toml` (`$HOME` must be set).
pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(".orc").join("config.toml")
}

fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
