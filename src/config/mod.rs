pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{load, save};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

use crate::search::DEFAULT_DEBOUNCE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Settings of the simulated backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Artificial delay added to every response.
    pub latency_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self { latency_ms: 500 }
    }
}

impl BackendSettings {
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiet period before a typed term is searched.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: u64::try_from(DEFAULT_DEBOUNCE.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl SearchSettings {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = loader::parse("").unwrap();
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert_eq!(config.backend.latency(), Duration::from_millis(500));
        assert_eq!(config.search.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_config() {
        let config = loader::parse(
            r#"
            [backend]
            latency_ms = 0

            [keybindings.global]
            quit = "ctrl+q"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.latency(), Duration::ZERO);
        assert_eq!(config.search.debounce_ms, 300);

        let quit = &config.keybindings.global.quit;
        assert!(quit.matches(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(!quit.matches(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        // Untouched bindings in the same section keep their defaults.
        assert_eq!(config.keybindings.global.help.display(), "?");
    }

    #[test]
    fn test_invalid_key_is_an_error() {
        assert!(loader::parse("[keybindings.global]\nquit = \"nope\"").is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed = loader::parse(&text).unwrap();
        assert_eq!(parsed.keybindings.navigation.end.display(), "G/End");
    }
}
