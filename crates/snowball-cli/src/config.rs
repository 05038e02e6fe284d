//! Environment configuration for the session host.

use std::path::PathBuf;
use std::str::FromStr;

use snowball_game::domain::catalog::ScenarioCatalog;
use snowball_game::domain::config::GameConfig;

use crate::error::AppError;

/// Host configuration read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// YAML catalog to load. The built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Game tuning passed to every command.
    pub game: GameConfig,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut game = GameConfig::default();
        override_with(&lookup, "SNOWBALL_DUAL_DEBOUNCE_SECS", &mut game.dual_debounce_secs)?;
        override_with(
            &lookup,
            "SNOWBALL_REGISTRATION_WINDOW_MS",
            &mut game.registration_window_ms,
        )?;
        override_with(
            &lookup,
            "SNOWBALL_DUAL_WINDOW_EXTENSION_MS",
            &mut game.dual_window_extension_ms,
        )?;
        override_with(&lookup, "SNOWBALL_MIN_SCORE", &mut game.min_score)?;

        if game.registration_window_ms == 0 {
            return Err(AppError::Config(
                "SNOWBALL_REGISTRATION_WINDOW_MS must be greater than zero".to_owned(),
            ));
        }

        let catalog_path = lookup("SNOWBALL_CATALOG")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { catalog_path, game })
    }

    /// Loads the configured catalog, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Catalog` if the catalog cannot be read or is invalid.
    pub fn load_catalog(&self) -> Result<ScenarioCatalog, AppError> {
        let catalog = match &self.catalog_path {
            Some(path) => ScenarioCatalog::from_path(path)?,
            None => ScenarioCatalog::builtin()?,
        };
        Ok(catalog)
    }
}

fn override_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<(), AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}")))?;
    }
    Ok(())
}
