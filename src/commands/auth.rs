// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::store::Backend;
use anyhow::Result;
use std::path::Path;

pub fn handle(
    backend: &dyn Backend,
    config: &mut Config,
    config_path: &Path,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("signup", sub)) => {
            let (email, password) = credentials(sub);
            let session = backend.sign_up(email, password)?;
            println!("Created account {} on {}", session.email, backend.name());
            config.session = Some(session);
            config.save(config_path)?;
        }
        Some(("signin", sub)) => {
            let (email, password) = credentials(sub);
            let session = backend.sign_in(email, password)?;
            println!("Signed in as {}", session.email);
            config.session = Some(session);
            config.save(config_path)?;
        }
        Some(("signout", _)) => {
            config.session = None;
            config.save(config_path)?;
            println!("Signed out");
        }
        Some(("whoami", _)) => match &config.session {
            Some(s) => println!("{} ({}) on {}", s.email, s.user_id, backend.name()),
            None => println!("Not signed in"),
        },
        _ => {}
    }
    Ok(())
}

fn credentials(sub: &clap::ArgMatches) -> (&str, &str) {
    (
        sub.get_one::<String>("email").unwrap().trim(),
        sub.get_one::<String>("password").unwrap(),
    )
}
