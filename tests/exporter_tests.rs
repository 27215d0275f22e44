// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rentbook::calendar::{HebrewMonth, Period};
use rentbook::commands::{AppContext, exporter};
use rentbook::ledger::record_payment;
use rentbook::models::{CategoryAmounts, ChargeCategory, TenantDraft};
use rentbook::store::{AuthStore, SqliteStore, TenantStore};
use rentbook::cli;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn base_ctx() -> (AppContext, String) {
    let store = SqliteStore::in_memory().unwrap();
    let session = store.sign_up("owner@example.com", "hunter2").unwrap();
    let tenant = store
        .add_tenant(
            &session,
            &TenantDraft {
                name: "Dana Levi".into(),
                schedule: CategoryAmounts {
                    rent: Decimal::from(3000),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();
    let adar = Period::new(HebrewMonth::Adar, "5786");
    record_payment(
        &session,
        &store,
        &tenant.id,
        &adar,
        ChargeCategory::Rent,
        Decimal::from(3000),
    )
    .unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    (AppContext::new(Box::new(store), Some(session), today), tenant.id)
}

fn export(ctx: &AppContext, format: &str, out: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "rentbook", "export", "report", "--format", format, "--out", out, "--month", "Adar",
        "--year", "5786",
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(ctx, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_report_writes_json_rows() {
    let (ctx, tenant_id) = base_ctx();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("report.json");
    export(&ctx, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "tenant_id": tenant_id,
                "tenant": "Dana Levi",
                "month": "אדר",
                "year": "5786",
                "total_charge": "3000",
                "total_paid": "3000",
                "remaining": "0",
                "previous_debt": "0",
                "grand_remaining": "0",
                "fully_paid": true
            }
        ])
    );
}

#[test]
fn export_report_writes_csv_with_header() {
    let (ctx, _) = base_ctx();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("report.csv");
    export(&ctx, "CSV", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "tenant_id");
    assert_eq!(&headers[9], "fully_paid");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Dana Levi");
    assert_eq!(&rows[0][8], "0");
    assert_eq!(&rows[0][9], "true");
}

#[test]
fn export_report_rejects_unknown_format() {
    let (ctx, _) = base_ctx();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("report.xml");
    assert!(export(&ctx, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
