use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::sponsored::SponsoredItem;

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub debounce_ms: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TickerSettings {
    pub interval_ms: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AlarmSettings {
    pub default_sound: String,
    pub duration_ms: u64,
    pub loop_interval_ms: u64,
    pub terminal_bell: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SponsoredSettings {
    pub enabled: bool,
    pub pool_size: usize,
    pub refresh_secs: u64,
    pub initial_delay_ms: u64,
    #[serde(default)]
    pub items: Vec<SponsoredItem>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NavigationSettings {
    pub swipe_threshold: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub ticker: TickerSettings,
    pub alarm: AlarmSettings,
    pub sponsored: SponsoredSettings,
    pub navigation: NavigationSettings,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl AppSettings {
    /// Defaults, then `appsettings.toml`, `appsettings.local.toml` and
    /// `CENTURION__*` environment variables, later sources winning.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("CENTURION").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::from(path).required(true))
            .build()?;

        settings.try_deserialize()
    }

    #[cfg(test)]
    pub(crate) fn defaults_only() -> Self {
        Self::defaults()
            .and_then(|builder| builder.build())
            .and_then(|settings| settings.try_deserialize())
            .expect("built-in defaults deserialize")
    }

    pub fn timezone(&self) -> Option<chrono_tz::Tz> {
        let name = self.timezone.as_deref()?;
        match name.parse::<chrono_tz::Tz>() {
            Ok(tz) => Some(tz),
            Err(error) => {
                log::warn!(
                    "Unknown timezone in settings, using host local time. [timezone = {}, error = {}]",
                    name,
                    error
                );
                None
            }
        }
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("storage.data_dir", ".centurion")?
            .set_default("storage.debounce_ms", 250)?
            .set_default("ticker.interval_ms", 1000)?
            .set_default("alarm.default_sound", "zen")?
            .set_default("alarm.duration_ms", 5000)?
            .set_default("alarm.loop_interval_ms", 1200)?
            .set_default("alarm.terminal_bell", true)?
            .set_default("sponsored.enabled", true)?
            .set_default("sponsored.pool_size", 10)?
            .set_default("sponsored.refresh_secs", 60)?
            .set_default("sponsored.initial_delay_ms", 2500)?
            .set_default("navigation.swipe_threshold", 50.0)
    }
}
