use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use client_core::DEFAULT_API_URL;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "booking.toml";

/// Checked in order; later keys win.
const API_URL_ENV_KEYS: [&str; 2] = ["BOOKING_API_URL", "APP__API_URL"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
}

impl Settings {
    pub fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file: FileSettings = toml::from_str(raw).context("invalid settings file")?;
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        Ok(())
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for key in API_URL_ENV_KEYS {
            if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
                self.api_url = v;
            }
        }
    }
}

/// Defaults, then the settings file, then the environment, then the command line.
///
/// An explicit `config_path` must exist; the default `booking.toml` is optional.
pub fn load_settings(config_path: Option<&Path>, cli_api_url: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            settings
                .apply_file(&raw)
                .with_context(|| format!("failed to load '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                settings
                    .apply_file(&raw)
                    .with_context(|| format!("failed to load '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());

    if let Some(v) = cli_api_url {
        settings.api_url = v.to_string();
    }

    settings.api_url = normalize_api_url(&settings.api_url)?;
    Ok(settings)
}

pub fn normalize_api_url(raw_api_url: &str) -> Result<String> {
    let raw_api_url = raw_api_url.trim();
    let url = Url::parse(raw_api_url)
        .with_context(|| format!("invalid booking API url '{raw_api_url}'"))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("booking API url '{raw_api_url}' must use http or https");
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
