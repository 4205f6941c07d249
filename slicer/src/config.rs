//! Slicer configuration.
//!
//! A [`Config`] can be passed explicitly with [`crate::Slicer::with_config`].
//! Otherwise facades read the process-wide configuration in [`global`],
//! which starts out as the default and can be loaded from the
//! environment with [`global::init_from_env`].

use serde::Deserialize;
use serde::Serialize;

/// Environment variable controlling [`Config::default_aliases`].
pub const DEFAULT_ALIASES_ENV: &str = "SLICER_DEFAULT_ALIASES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Generate default aliases when a facade tracks a single value and
    /// no aliases.
    pub default_aliases: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_aliases: true,
        }
    }
}

impl Config {
    /// The default configuration, overridden by whatever is set in the
    /// environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = var(DEFAULT_ALIASES_ENV) {
            match parse_flag(&value) {
                Some(flag) => config.default_aliases = flag,
                None => tracing::warn!(
                    "ignoring {}={:?}: expected a boolean flag",
                    DEFAULT_ALIASES_ENV,
                    value
                ),
            }
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Process-wide configuration.
pub mod global {
    use std::sync::LazyLock;
    use std::sync::RwLock;

    use super::Config;

    static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

    /// A copy of the current global configuration.
    pub fn get() -> Config {
        CONFIG
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(config: Config) {
        *CONFIG
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    /// Reload the global configuration from the environment.
    pub fn init_from_env() {
        let config = Config::from_env();
        tracing::debug!("loaded slicer config from environment: {:?}", config);
        set(config);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_from_vars() {
        assert_eq!(from_vars(&[]), Config::default());
        assert!(!from_vars(&[(DEFAULT_ALIASES_ENV, "0")]).default_aliases);
        assert!(!from_vars(&[(DEFAULT_ALIASES_ENV, "Off")]).default_aliases);
        assert!(from_vars(&[(DEFAULT_ALIASES_ENV, "yes")]).default_aliases);
        // Unparseable values leave the default in place.
        assert!(from_vars(&[(DEFAULT_ALIASES_ENV, "maybe")]).default_aliases);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_global() {
        // Other tests build facades from the global configuration, so
        // only ever store the default here.
        global::set(Config::default());
        assert_eq!(global::get(), Config::default());
    }
}
