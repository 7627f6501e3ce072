#![forbid(unsafe_code)]

//! Tunables for the drag engine.
//!
//! # Loading
//!
//! With the `board-config` feature, [`DragConfig`] can be loaded from TOML or
//! JSON. Missing keys fall back to the defaults.
//!
//! ```toml
//! # pipeboard.toml
//! cooldown_ms = 150
//! item_height_px = 72
//! ```
//!
//! ```rust,ignore
//! let config = DragConfig::from_toml_file("pipeboard.toml")?;
//! ```

#[cfg(feature = "board-config")]
use std::path::Path;

use web_time::Duration;

/// Upper bound for `cooldown_ms`; anything longer makes the board feel stuck.
pub const MAX_COOLDOWN_MS: u64 = 10_000;

/// Drag engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DragConfig {
    /// Minimum time after a gesture ends before another may start. Default: 100.
    pub cooldown_ms: u64,
    /// Fixed row height used for the placeholder gap. Default: 64.
    pub item_height_px: u32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 100,
            item_height_px: 64,
        }
    }
}

impl DragConfig {
    #[must_use]
    pub fn with_cooldown_ms(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    #[must_use]
    pub fn with_item_height_px(mut self, item_height_px: u32) -> Self {
        self.item_height_px = item_height_px;
        self
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.cooldown_ms > MAX_COOLDOWN_MS {
            errors.push(format!(
                "cooldown_ms must be <= {MAX_COOLDOWN_MS}, got {}",
                self.cooldown_ms
            ));
        }

        if self.item_height_px == 0 {
            errors.push("item_height_px must be > 0".into());
        }

        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "board-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map_err(ConfigError::Toml)?
            .validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "board-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "board-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map_err(ConfigError::Json)?
            .validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "board-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a file, picking the format from the extension (`.json`,
    /// anything else is TOML).
    #[cfg(feature = "board-config")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Return `self` if valid.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Format as a JSONL line for structured logging.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"drag-config-v1","cooldown_ms":{},"item_height_px":{}}}"#,
            self.cooldown_ms, self.item_height_px,
        )
    }
}

/// Errors that can occur when loading a drag configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "board-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "board-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "board-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "board-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "board-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "board-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
