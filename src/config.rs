// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Session;
use crate::store::{Backend, SheetsStore, SqliteStore};
use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

static SCRIPT_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://script\.google\.com/\S+$").expect("script url pattern compiles")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Sheets,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Sheets => "sheets",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::db::config_dir()?.join("config.json"))
    }

    /// Missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Read config at {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("Parse config at {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config dir")?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Write config at {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("Replace config at {}", path.display()))?;
        Ok(())
    }

    pub fn use_sheets(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if !SCRIPT_URL_RE.is_match(url) {
            bail!(
                "'{}' is not an Apps Script web app URL (expected https://script.google.com/...)",
                url
            );
        }
        self.backend = BackendKind::Sheets;
        self.script_url = Some(url.to_string());
        Ok(())
    }

    pub fn use_sqlite(&mut self, database: Option<PathBuf>) {
        self.backend = BackendKind::Sqlite;
        if database.is_some() {
            self.database = database;
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(p) => Ok(p.clone()),
            None => crate::db::db_path(),
        }
    }

    /// Open the configured backend.
    pub fn open_backend(&self) -> Result<Box<dyn Backend>> {
        match self.backend {
            BackendKind::Sqlite => {
                let path = self.database_path()?;
                let store = SqliteStore::open(&path)
                    .with_context(|| format!("Open DB at {}", path.display()))?;
                log::debug!("using sqlite backend at {}", path.display());
                Ok(Box::new(store))
            }
            BackendKind::Sheets => {
                let url = self
                    .script_url
                    .as_deref()
                    .context("No Apps Script URL configured; run `rentbook backend use sheets --url ...`")?;
                log::debug!("using sheets backend at {}", url);
                Ok(Box::new(SheetsStore::new(url)?))
            }
        }
    }
}
