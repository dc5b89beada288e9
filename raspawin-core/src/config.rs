use crate::error::{RaspawinError, Result};
use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest scratch surface, in cells (4096 x 4096).
const MAX_SURFACE_CELLS: u64 = 4096 * 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Debited once when a session starts.
    pub entry_cost: Money,
    /// Balance given to a player with no saved snapshot.
    pub starting_balance: Money,
    /// Coverage fraction at which the card reveals itself.
    pub reveal_threshold: f64,
    /// Delay between the reveal and the result being shown.
    pub reveal_delay: Duration,
    pub surface_width: u32,
    pub surface_height: u32,
    pub brush_radius: f64,
    pub history_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            entry_cost: Money::from_units(5),
            starting_balance: Money::from_units(100),
            reveal_threshold: 0.30,
            reveal_delay: Duration::from_millis(500),
            surface_width: 320,
            surface_height: 320,
            brush_radius: 20.0,
            history_limit: 10,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.entry_cost.is_zero() {
            return Err(RaspawinError::config("Entry cost must be greater than 0"));
        }

        if !(self.reveal_threshold > 0.0 && self.reveal_threshold <= 1.0) {
            return Err(RaspawinError::config(format!(
                "Reveal threshold must be in (0, 1], got {}",
                self.reveal_threshold
            )));
        }

        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(RaspawinError::config(
                "Surface dimensions must be greater than 0",
            ));
        }

        let cells = self.surface_width as u64 * self.surface_height as u64;
        if cells > MAX_SURFACE_CELLS {
            return Err(RaspawinError::config(format!(
                "Surface {}x{} has {} cells, at most {} are allowed",
                self.surface_width, self.surface_height, cells, MAX_SURFACE_CELLS
            )));
        }

        if !self.brush_radius.is_finite() || self.brush_radius <= 0.0 {
            return Err(RaspawinError::config("Brush radius must be a positive number"));
        }

        if self.history_limit == 0 {
            return Err(RaspawinError::config("History limit must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entry_cost, Money::from_units(5));
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.reveal_threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.reveal_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.surface_height = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.brush_radius = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.entry_cost = Money::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_surface_size() {
        let mut config = GameConfig::default();
        config.surface_width = 100_000;
        config.surface_height = 100_000;
        assert!(matches!(config.validate(), Err(RaspawinError::Config(_))));

        config.surface_width = 4096;
        config.surface_height = 4096;
        assert!(config.validate().is_ok());

        config.surface_height = 4097;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
