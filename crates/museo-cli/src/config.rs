// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "museo";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_DEBOUNCE: &str = "400ms";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: Catalog::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub base_url: Option<String>,
    pub iiif_base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            base_url: Some(museo_catalog::DEFAULT_BASE_URL.to_owned()),
            iiif_base_url: Some(museo_catalog::DEFAULT_IIIF_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub debounce: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            debounce: Some(DEFAULT_DEBOUNCE.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("MUSEO_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set MUSEO_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [catalog] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(base_url) = &self.catalog.base_url
            && base_url.trim_end_matches('/').is_empty()
        {
            bail!("catalog.base_url in {} must not be empty", path.display());
        }

        if let Some(iiif) = &self.catalog.iiif_base_url
            && iiif.trim_end_matches('/').is_empty()
        {
            bail!(
                "catalog.iiif_base_url in {} must not be empty",
                path.display()
            );
        }

        if let Some(timeout) = &self.catalog.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "catalog.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(debounce) = &self.ui.debounce {
            parse_duration(debounce)?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.catalog
            .base_url
            .as_deref()
            .unwrap_or(museo_catalog::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn iiif_base_url(&self) -> &str {
        self.catalog
            .iiif_base_url
            .as_deref()
            .unwrap_or(museo_catalog::DEFAULT_IIIF_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.catalog.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn debounce(&self) -> Result<Duration> {
        parse_duration(self.ui.debounce.as_deref().unwrap_or(DEFAULT_DEBOUNCE))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# museo config\n# Place this file at: {}\n\nversion = 1\n\n[catalog]\nbase_url = \"{}\"\niiif_base_url = \"{}\"\ntimeout = \"{}\"\n\n[ui]\n# quiet window between the last keystroke and the catalog request\ndebounce = \"{}\"\n",
            path.display(),
            museo_catalog::DEFAULT_BASE_URL,
            museo_catalog::DEFAULT_IIIF_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_DEBOUNCE,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 400ms or 10s)")
}
