// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use rentbook::commands::{self, AppContext};
use rentbook::config::{BackendKind, Config};
use rentbook::{cli, utils};

fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config_path = Config::default_path()?;
    let mut config = Config::load(&config_path)?;
    let today = match matches.get_one::<String>("today") {
        Some(s) => utils::parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    log::debug!("config={} today={}", config_path.display(), today);

    // Commands that manage the configuration itself.
    match matches.subcommand() {
        Some(("init", _)) => {
            config.save(&config_path)?;
            match config.backend {
                BackendKind::Sqlite => {
                    config.open_backend()?;
                    println!("Database initialized at {}", config.database_path()?.display());
                }
                BackendKind::Sheets => {
                    println!("Using Apps Script backend; nothing to initialize locally");
                }
            }
            println!("Config written to {}", config_path.display());
            return Ok(());
        }
        Some(("backend", sub)) => {
            return commands::backend::handle(&mut config, &config_path, sub);
        }
        Some(("auth", sub)) => {
            let backend = config.open_backend()?;
            return commands::auth::handle(backend.as_ref(), &mut config, &config_path, sub);
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
            return Ok(());
        }
        _ => {}
    }

    let ctx = AppContext::new(config.open_backend()?, config.session.clone(), today);
    match matches.subcommand() {
        Some(("tenant", sub)) => commands::tenants::handle(&ctx, sub)?,
        Some(("pay", sub)) => commands::payments::handle(&ctx, sub)?,
        Some(("status", sub)) => commands::status::handle(&ctx, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ctx, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&ctx)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
