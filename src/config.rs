//! Store configuration.

use std::env;

/// Environment variable consulted by [`Environment::from_env`].
pub const ENV_VAR: &str = "SYNCSTORE_ENV";

/// Execution mode of a store.
///
/// Only affects diagnostics: outside `Production`, [`reset`](crate::SyncStore::reset)
/// logs a warning because resets are usually a testing affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Read the mode from `SYNCSTORE_ENV`, if set.
    ///
    /// `production` and `prod` (any case) select [`Environment::Production`];
    /// any other value selects [`Environment::Development`].
    pub fn from_env() -> Option<Self> {
        env::var(ENV_VAR).ok().map(|value| Self::parse(&value))
    }

    /// `SYNCSTORE_ENV` if set, otherwise inferred from `debug_assertions`.
    pub fn detect() -> Self {
        Self::from_env().unwrap_or(if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        })
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::detect()
    }
}

/// Per-store configuration.
///
/// # Examples
///
/// ```
/// use syncstore::{Environment, StoreConfig};
///
/// let config = StoreConfig::default()
///     .with_label("settings")
///     .with_environment(Environment::Production);
/// assert_eq!(config.label(), Some("settings"));
/// assert!(config.environment.is_production());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Name included in the store's log lines.
    pub label: Option<String>,
    pub environment: Environment,
}

impl StoreConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label used in log lines.
    pub(crate) fn display_label(&self) -> &str {
        self.label().unwrap_or("SyncStore")
    }
}
