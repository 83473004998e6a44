//! Configuration for the inventory core.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Default values in code
//! 2. Optional file `config/boteco.{toml,yaml,json}`
//! 3. Environment variables with the `BOTECO_` prefix (`__` for nesting)

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

use boteco_core::LocationId;

pub const DEFAULT_CONFIG_FILE: &str = "config/boteco";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoreConfig {
    /// Location that sources replenishment transfers and receives purchases.
    #[serde(default)]
    pub central_hub: Option<LocationId>,

    /// Added to every replenishment shortfall before rounding up.
    pub safety_margin: Decimal,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            central_hub: None,
            safety_margin: Decimal::ZERO,
        }
    }
}

impl CoreConfig {
    /// Load from `config/boteco` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from a specific file stem (extension picked by the `config` crate).
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .set_default("safety_margin", "0")?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("BOTECO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn with_central_hub(mut self, hub: LocationId) -> Self {
        self.central_hub = Some(hub);
        self
    }

    pub fn with_safety_margin(mut self, margin: Decimal) -> Self {
        self.safety_margin = margin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = CoreConfig::load_from("config/does-not-exist").unwrap();
        assert_eq!(config.safety_margin, Decimal::ZERO);
        assert_eq!(config.central_hub, None);
    }

    #[test]
    fn builders_override_defaults() {
        let hub = LocationId::new();
        let config = CoreConfig::default()
            .with_central_hub(hub)
            .with_safety_margin(dec!(2));
        assert_eq!(config.central_hub, Some(hub));
        assert_eq!(config.safety_margin, dec!(2));
    }
}
