use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging defaults, the optional TOML file, and
    /// `ARBSCAN_`-prefixed environment variables (nested keys split on
    /// `__`, e.g. `ARBSCAN_DATABASE__URL`).
    ///
    /// # Errors
    /// Returns an error if a file or variable cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/arbscan.toml")
    }

    /// Same as [`load`](Self::load) with an explicit file path.
    ///
    /// # Errors
    /// Returns an error if a file or variable cannot be parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ARBSCAN_").split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ConfigLoader::load_from("does/not/exist.toml").unwrap();
        assert_eq!(config.scrape.max_concurrent_requests, 10);
    }
}
