// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Rentbook", "rentbook"));

/// Overrides both the data and the config directory when set.
pub const HOME_ENV: &str = "RENTBOOK_HOME";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(HOME_ENV) {
        Some(home) => PathBuf::from(home),
        None => project_dirs()?.data_dir().to_path_buf(),
    };
    fs::create_dir_all(&dir).context("Failed to create data dir")?;
    Ok(dir)
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(HOME_ENV) {
        Some(home) => PathBuf::from(home),
        None => project_dirs()?.config_dir().to_path_buf(),
    };
    fs::create_dir_all(&dir).context("Failed to create config dir")?;
    Ok(dir)
}

pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("rentbook.sqlite"))
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tenants(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        monthly_rent TEXT NOT NULL DEFAULT '0',
        monthly_electricity TEXT NOT NULL DEFAULT '0',
        monthly_water TEXT NOT NULL DEFAULT '0',
        monthly_committee TEXT NOT NULL DEFAULT '0',
        monthly_gas TEXT NOT NULL DEFAULT '0',
        water_meter TEXT NOT NULL DEFAULT '0',
        electricity_meter TEXT NOT NULL DEFAULT '0',
        gas_meter TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_tenants_user ON tenants(user_id);

    -- no foreign key to tenants: payment history outlives deleted tenants
    CREATE TABLE IF NOT EXISTS payments(
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        hebrew_month TEXT NOT NULL,
        hebrew_year TEXT NOT NULL,
        rent_paid TEXT NOT NULL DEFAULT '0',
        electricity_paid TEXT NOT NULL DEFAULT '0',
        water_paid TEXT NOT NULL DEFAULT '0',
        committee_paid TEXT NOT NULL DEFAULT '0',
        gas_paid TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_payments_period
        ON payments(user_id, tenant_id, hebrew_month, hebrew_year);
    "#,
    )
}
