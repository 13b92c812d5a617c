/// Game configuration: pacing delays, seed and content overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Fixed delays used to pace transitions, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// `Loading` → first challenge.
    pub loading_ms: u64,
    /// `Verifying` → next challenge after a pass.
    pub advance_ms: u64,
    /// Taunt received → `FinalFail`.
    pub fail_reveal_ms: u64,
    /// Checkbox ticked → success signal.
    pub confirm_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            loading_ms: 1000,
            advance_ms: 700,
            fail_reveal_ms: 1500,
            confirm_ms: 500,
        }
    }
}

impl Pacing {
    /// All delays zeroed. Transitions still go through the timer protocol.
    pub fn instant() -> Self {
        Self {
            loading_ms: 0,
            advance_ms: 0,
            fail_reveal_ms: 0,
            confirm_ms: 0,
        }
    }

    pub fn loading(&self) -> Duration {
        Duration::from_millis(self.loading_ms)
    }

    pub fn advance(&self) -> Duration {
        Duration::from_millis(self.advance_ms)
    }

    pub fn fail_reveal(&self) -> Duration {
        Duration::from_millis(self.fail_reveal_ms)
    }

    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }
}

/// Top-level settings for a host (terminal player, web view, demo).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub pacing: Pacing,
    /// Replacement challenge list; the embedded one is used when absent.
    pub challenges: Option<PathBuf>,
    /// Replacement taunt grammar; the embedded one is used when absent.
    pub grammar: Option<PathBuf>,
}

impl GameConfig {
    /// Load a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GameConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a config from a RON string. Missing fields take defaults.
    pub fn parse_ron(input: &str) -> Result<GameConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pacing_matches_reference_timings() {
        let p = Pacing::default();
        assert_eq!(p.loading(), Duration::from_millis(1000));
        assert_eq!(p.advance(), Duration::from_millis(700));
        assert_eq!(p.fail_reveal(), Duration::from_millis(1500));
        assert_eq!(p.confirm(), Duration::from_millis(500));
    }

    #[test]
    fn instant_pacing_is_zero() {
        let p = Pacing::instant();
        assert_eq!(p.loading(), Duration::ZERO);
        assert_eq!(p.confirm(), Duration::ZERO);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = GameConfig::parse_ron("(seed: 7, pacing: (advance_ms: 10))").unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.pacing.advance_ms, 10);
        assert_eq!(cfg.pacing.loading_ms, 1000);
        assert!(cfg.challenges.is_none());
    }

    #[test]
    fn empty_config_is_default() {
        let cfg = GameConfig::parse_ron("()").unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn load_fixture_config() {
        let path = std::path::PathBuf::from("tests/fixtures/fast_config.ron");
        let cfg = GameConfig::load_from_ron(&path).unwrap();
        assert_eq!(cfg.seed, 1234);
        assert_eq!(cfg.pacing, Pacing::instant());
    }
}
