//! TOML-based configuration system and environment toggles.
//!
//! Loads settings from a `config.toml` file, falling back to defaults that
//! match the historical hardcoded values. Every struct implements `Default`
//! so a missing or partial config file produces the same behavior as before.
//!
//! ## Config file search order
//!
//! 1. `WPESHELL_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Platform config directory (`$XDG_CONFIG_HOME/wpeshell/config.toml`)
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`
//!
//! ## Environment toggles
//!
//! Three presence-only variables (their value is ignored) flip runtime
//! behavior without touching the config file; see [`EnvToggles`].

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub bundle: BundleConfig,
    pub storage: StorageConfig,
    pub preferences: PreferencesConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// URL loaded when no CLI argument is given.
    pub default_url: String,
    /// Identifier of the single page group.
    pub page_group: String,
}

/// Injected bundle (out-of-process extension) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Library loaded by the engine's content process.
    pub injected_bundle_path: String,
}

/// Engine storage layout under the user cache root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Namespace directory holding local-storage/, disk-cache/ and index-db/.
    pub cache_namespace: String,
}

/// Page preference toggles handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Allow running and displaying mixed (insecure) content.
    pub allow_insecure_content: bool,
    /// Engine-side web security (same-origin policy etc.).
    pub web_security: bool,
    /// Allow pages to enter fullscreen.
    pub fullscreen: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls — match original hardcoded values exactly
// ─────────────────────────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_url: "http://youtube.com/tv".to_string(),
            page_group: "WPEPageGroup".to_string(),
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            injected_bundle_path: "/usr/lib/libWPEInjectedBundle.so".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_namespace: "wpe".to_string(),
        }
    }
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            allow_insecure_content: true,
            web_security: false,
            fullscreen: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment toggles
// ─────────────────────────────────────────────────────────────────────────────

/// Presence-only environment toggles, sampled once at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvToggles {
    /// `WPE_DISPLAY_FPS` — report an average FPS figure every 5 seconds.
    pub display_fps: bool,
    /// `WPE_SHELL_DISABLE_CONSOLE_LOG` — do not forward page console
    /// messages to the system console.
    pub disable_console_log: bool,
    /// `WPE_SHELL_COOKIE_STORAGE` — persist cookies across runs.
    pub cookie_storage: bool,
}

impl EnvToggles {
    /// Reads the three toggles from the process environment.
    /// Only presence matters; the value is ignored.
    pub fn from_env() -> Self {
        Self {
            display_fps: std::env::var_os("WPE_DISPLAY_FPS").is_some(),
            disable_console_log: std::env::var_os("WPE_SHELL_DISABLE_CONSOLE_LOG").is_some(),
            cookie_storage: std::env::var_os("WPE_SHELL_COOKIE_STORAGE").is_some(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads configuration from a TOML file. Never panics — returns defaults
    /// if no file is found or if parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        info!(path = %path.display(), "Configuration loaded");
                        config
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                        Config::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                    Config::default()
                }
            },
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var("WPESHELL_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    // 2. Next to the executable
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. Platform config directory
    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from("config.toml");
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the platform config directory without adding a dependency.
fn platform_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
        .map(|dir| PathBuf::from(dir).join("wpeshell"))
}
