// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{BackendKind, Config};
use crate::utils::pretty_table;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn handle(config: &mut Config, config_path: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(config)?,
        Some(("use", sub)) => {
            match sub.subcommand() {
                Some(("sqlite", s)) => {
                    let db = s.get_one::<String>("db").map(|p| PathBuf::from(p.trim()));
                    config.use_sqlite(db);
                }
                Some(("sheets", s)) => config.use_sheets(s.get_one::<String>("url").unwrap())?,
                _ => return Ok(()),
            }
            // user ids are issued per backend
            config.session = None;
            config.save(config_path)?;
            println!("Backend set to {}; sign in again", config.backend);
        }
        _ => {}
    }
    Ok(())
}

fn show(config: &Config) -> Result<()> {
    let location = match config.backend {
        BackendKind::Sqlite => config.database_path()?.display().to_string(),
        BackendKind::Sheets => config.script_url.clone().unwrap_or_else(|| "(unset)".into()),
    };
    let user = config
        .session
        .as_ref()
        .map(|s| s.email.clone())
        .unwrap_or_else(|| "(not signed in)".into());
    println!(
        "{}",
        pretty_table(
            &["Backend", "Location", "User"],
            vec![vec![config.backend.to_string(), location, user]]
        )
    );
    Ok(())
}
