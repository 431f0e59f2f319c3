//! Configuration loading for engine tuning knobs.
//!
//! Parses an optional `cstitch.toml`, falling back to defaults when the
//! file is absent or unparsable (breadth-first resilience: a malformed
//! config should never stop the engine from running). Unknown fields are
//! ignored so the format can grow without breaking older config files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_history_max")]
    pub history_max: u32,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            history_max: Self::default_history_max(),
        }
    }
}

impl UndoConfig {
    const fn default_history_max() -> u32 {
        10_000
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RouterConfig {
    #[serde(default = "RouterConfig::default_max_heap_pops")]
    pub max_heap_pops: u32,
    #[serde(default = "RouterConfig::default_phase_b_margin")]
    pub phase_b_margin: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_heap_pops: Self::default_max_heap_pops(),
            phase_b_margin: Self::default_phase_b_margin(),
        }
    }
}

impl RouterConfig {
    const fn default_max_heap_pops() -> u32 {
        100_000
    }
    const fn default_phase_b_margin() -> u32 {
        0
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    #[serde(default = "ChannelConfig::default_capacity")]
    pub default_capacity: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            default_capacity: Self::default_capacity(),
        }
    }
}

impl ChannelConfig {
    const fn default_capacity() -> u32 {
        8
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DebugConfig {
    #[serde(default)]
    pub trace_merges: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub undo: UndoConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming), preferring a local working-directory override.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("cstitch.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("cstitch").join("cstitch.toml");
    }
    PathBuf::from("cstitch.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config {
                raw: Some(content),
                file,
            }),
            Err(e) => {
                info!(target: "config", error = %e, path = %path.display(), "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Clamp `channel.default_capacity` to at least 1 - a capacity of zero
    /// would make every channel saturated on its first net. Returns the
    /// effective value and logs when a clamp actually changed it.
    pub fn effective_default_capacity(&self) -> u32 {
        let raw = self.file.channel.default_capacity;
        let clamped = raw.max(1);
        if clamped != raw {
            info!(target: "config", raw, clamped, "channel_default_capacity_clamped");
        }
        clamped
    }

    /// Clamp `router.max_heap_pops` to at least 1 - a budget of zero would
    /// make `process_terminal` abort before it ever pops the start points
    /// themselves. Widened to `u64` to match `shortest_path`'s pop counter.
    pub fn effective_max_heap_pops(&self) -> u64 {
        let raw = self.file.router.max_heap_pops;
        let clamped = raw.max(1);
        if clamped != raw {
            info!(target: "config", raw, clamped, "router_max_heap_pops_clamped");
        }
        u64::from(clamped)
    }

    /// `router.phase_b_margin`, widened to `i64` to match the cost units
    /// `process_terminal` compares it against.
    pub fn effective_phase_b_margin(&self) -> i64 {
        i64::from(self.file.router.phase_b_margin)
    }
}
