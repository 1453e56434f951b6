//! User configuration.
//!
//! Read from `~/.config/mpvctl/config.json`:
//!
//! ```json
//! {
//!   "library": "/usr/lib/libmpv.so.2",
//!   "options": { "vo": "null", "keep-open": false, "volume": 60 },
//!   "log_level": "warn",
//!   "observe": ["pause", "time-pos"],
//!   "wait_timeout_secs": 1.0
//! }
//! ```
//!
//! `options` are applied before initialization, in file order. Booleans are
//! passed as `yes`/`no`, other scalars in their JSON text form.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::event::LogLevel;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Explicit libmpv path; the default sonames are tried when unset.
    pub library: Option<PathBuf>,
    #[serde(deserialize_with = "ordered_options")]
    pub options: Vec<(String, String)>,
    pub log_level: Option<LogLevel>,
    /// Properties to observe and report.
    pub observe: Vec<String>,
    /// Bound for each event wait; unset waits indefinitely.
    pub wait_timeout_secs: Option<f64>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mpvctl").join("config.json"))
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults; an unreadable or
    /// malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("config: {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let config = Self::parse(&text).map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        log::info!(
            "Loaded config from {} ({} options)",
            path.display(),
            config.options.len()
        );
        Ok(config)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    /// Add or replace an option, keeping first-seen order.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self.options.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.options.push((name, value)),
        }
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn ordered_options<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptionsVisitor;

    impl<'de> Visitor<'de> for OptionsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of option names to scalar values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut options = Vec::new();
            while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Bool(true) => "yes".to_string(),
                    serde_json::Value::Bool(false) => "no".to_string(),
                    serde_json::Value::Number(n) => n.to_string(),
                    other => {
                        return Err(serde::de::Error::custom(format!(
                            "option '{name}' must be a scalar, got {other}"
                        )));
                    }
                };
                options.push((name, value));
            }
            Ok(options)
        }
    }

    deserializer.deserialize_map(OptionsVisitor)
}
