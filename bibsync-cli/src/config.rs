use std::{fs, path::Path};

use eyre::WrapErr;
use serde::Deserialize;

/// Settings required to reach the remote reference database.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// The API integration token.
    pub notion_token: String,
    /// The id of the references database, found in its URL.
    pub database_id: String,
}

impl Config {
    /// Loads the configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// An `Err` is returned when the file cannot be read or when either
    /// required key is missing or malformed.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("unable to read configuration file '{}'", path.display()))?;

        serde_yaml::from_str(&text)
            .wrap_err_with(|| format!("invalid configuration in '{}'", path.display()))
    }
}
