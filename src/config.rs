use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// IPv4 address form.
///
/// Enter or auto-detect an IPv4 address, check its syntax, and look up
/// geolocation metadata for it from a public lookup service.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Endpoint that echoes the caller's public IP as `{"ip": "..."}`
    #[arg(
        long,
        env = "IPFORM_SELF_IP_URL",
        default_value = "https://api.ipify.org?format=json"
    )]
    pub self_ip_url: String,

    /// Base URL of the geolocation service; queried as `{base}/{ip}/json/`
    #[arg(long, env = "IPFORM_LOOKUP_URL", default_value = "https://ipapi.co")]
    pub lookup_url: String,

    /// Request timeout in seconds (transport default if omitted)
    #[arg(long, env = "IPFORM_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// How long a notification stays on screen, in milliseconds
    #[arg(long, env = "IPFORM_TOAST_LIFE_MS", default_value_t = 3000)]
    pub toast_life_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "IPFORM_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "IPFORM_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Write logs to this file; the interactive form is silent without it
    #[arg(long, env = "IPFORM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive form (default)
    Form,
    /// Check whether ADDRESS is a dotted-quad IPv4 address
    Validate { address: String },
    /// Print this machine's public IP address
    Whoami,
    /// Look up geolocation metadata (for this machine if ADDRESS is omitted)
    Lookup {
        address: Option<String>,
        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the effective settings to a TOML config file
    InitConfig { path: Option<PathBuf> },
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn toast_life(&self) -> Duration {
        Duration::from_millis(self.toast_life_ms)
    }
}

// ---------------------------------------------------------------------------
// TOML config file support
// ---------------------------------------------------------------------------

/// Serializable config for TOML file persistence.
/// All fields are optional; only populated values are written.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_ip_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast_life_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl ConfigFile {
    /// Snapshot of the effective settings, for writing back to disk.
    pub fn from_config(config: &Config) -> Self {
        Self {
            self_ip_url: Some(config.self_ip_url.clone()),
            lookup_url: Some(config.lookup_url.clone()),
            timeout: config.timeout,
            toast_life_ms: Some(config.toast_life_ms),
            log_level: Some(config.log_level.clone()),
            log_json: Some(config.log_json),
            log_file: config.log_file.as_ref().map(|p| p.display().to_string()),
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Inject values as environment variables so clap picks them up.
    ///
    /// Only sets variables that are **not** already present in the
    /// environment, preserving the precedence: CLI > env > config file.
    pub fn inject_env(&self) {
        macro_rules! set {
            ($env:expr, $val:expr) => {
                if let Some(ref v) = $val {
                    if std::env::var($env).is_err() {
                        std::env::set_var($env, v.to_string());
                    }
                }
            };
        }
        set!("IPFORM_SELF_IP_URL", self.self_ip_url);
        set!("IPFORM_LOOKUP_URL", self.lookup_url);
        set!("IPFORM_TIMEOUT", self.timeout);
        set!("IPFORM_TOAST_LIFE_MS", self.toast_life_ms);
        set!("IPFORM_LOG_LEVEL", self.log_level);
        set!("IPFORM_LOG_JSON", self.log_json);
        set!("IPFORM_LOG_FILE", self.log_file);
    }
}
