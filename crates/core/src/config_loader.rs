use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// Environment variables use the `NEWS_TRADE_` prefix and `__` between
    /// nested keys, e.g. `NEWS_TRADE_TRADING__CASH_AT_RISK=0.25`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed, or if
    /// the merged configuration fails validation.
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file("config/Config.toml"))
            .merge(Env::prefixed("NEWS_TRADE_").split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Loads application configuration from an explicit TOML file on top of defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let config: AppConfig = Self::base()
            .merge(Toml::file(path))
            .merge(Env::prefixed("NEWS_TRADE_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn validate(config: &AppConfig) -> Result<()> {
        config.sentiment.validate()?;
        config.trading.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregationPolicy;
    use figment::Jail;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_toml_and_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                r#"
                [sentiment]
                cache_capacity = 64
                aggregation = "first"

                [trading]
                symbols = ["MSFT"]
                "#,
            )?;
            jail.set_env("NEWS_TRADE_TRADING__CASH_AT_RISK", "0.25");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.sentiment.cache_capacity, 64);
            assert_eq!(config.sentiment.aggregation, AggregationPolicy::First);
            assert_eq!(config.sentiment.max_attempts, 3);
            assert_eq!(config.trading.symbols, vec!["MSFT"]);
            assert_eq!(config.trading.cash_at_risk, dec!(0.25));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[trading]\ncash_at_risk = 2.0\n")?;
            assert!(ConfigLoader::load_from("custom.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = ConfigLoader::load_from("nope.toml").unwrap_err();
            assert!(err.to_string().contains("not found"));
            Ok(())
        });
    }
}
