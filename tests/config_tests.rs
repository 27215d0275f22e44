// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rentbook::cli;
use rentbook::commands::{auth, backend};
use rentbook::config::{BackendKind, Config};
use rentbook::models::Session;
use rentbook::store::SqliteStore;
use std::path::PathBuf;
use tempfile::tempdir;

const SCRIPT_URL: &str = "https://script.google.com/macros/s/AKfycbx123/exec";

fn matches(args: &[&str]) -> clap::ArgMatches {
    cli::build_cli().get_matches_from(["rentbook"].into_iter().chain(args.iter().copied()))
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let cfg = Config::load(&dir.path().join("config.json")).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.backend, BackendKind::Sqlite);
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut cfg = Config::default();
    cfg.use_sheets(SCRIPT_URL).unwrap();
    cfg.session = Some(Session {
        user_id: "u1".into(),
        email: "owner@example.com".into(),
    });
    cfg.save(&path).unwrap();

    assert_eq!(Config::load(&path).unwrap(), cfg);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn sheets_url_must_point_at_apps_script() {
    let mut cfg = Config::default();
    assert!(cfg.use_sheets("https://example.com/exec").is_err());
    assert!(cfg.use_sheets("http://script.google.com/macros/s/x/exec").is_err());
    assert_eq!(cfg.backend, BackendKind::Sqlite);
    cfg.use_sheets(&format!("  {}  ", SCRIPT_URL)).unwrap();
    assert_eq!(cfg.script_url.as_deref(), Some(SCRIPT_URL));
}

#[test]
fn switching_backend_signs_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let db = dir.path().join("other.sqlite");
    let mut cfg = Config {
        session: Some(Session {
            user_id: "u1".into(),
            email: "owner@example.com".into(),
        }),
        ..Default::default()
    };

    let m = matches(&["backend", "use", "sqlite", "--db", &db.to_string_lossy()]);
    backend::handle(&mut cfg, &path, m.subcommand().unwrap().1).unwrap();
    assert_eq!(cfg.database, Some(PathBuf::from(&db)));
    assert!(cfg.session.is_none());
    assert_eq!(Config::load(&path).unwrap(), cfg);
}

#[test]
fn sign_up_then_sign_in_persists_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = SqliteStore::in_memory().unwrap();
    let mut cfg = Config::default();

    let m = matches(&["auth", "signup", "--email", "owner@example.com", "--password", "pw1"]);
    auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).unwrap();
    let created = cfg.session.clone().unwrap();

    let m = matches(&["auth", "signout"]);
    auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).unwrap();
    assert!(Config::load(&path).unwrap().session.is_none());

    let m = matches(&["auth", "signin", "--email", "owner@example.com", "--password", "wrong"]);
    assert!(auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).is_err());

    let m = matches(&["auth", "signin", "--email", "owner@example.com", "--password", "pw1"]);
    auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).unwrap();
    assert_eq!(Config::load(&path).unwrap().session, Some(created));
}

#[test]
fn sign_up_rejects_duplicate_and_malformed_email() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = SqliteStore::in_memory().unwrap();
    let mut cfg = Config::default();

    let m = matches(&["auth", "signup", "--email", "owner@example.com", "--password", "pw"]);
    auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).unwrap();
    assert!(auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).is_err());

    let m = matches(&["auth", "signup", "--email", "not-an-email", "--password", "pw"]);
    assert!(auth::handle(&store, &mut cfg, &path, m.subcommand().unwrap().1).is_err());
}
