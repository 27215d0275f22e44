// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rentbook::calendar::{HebrewMonth, Period};
use rentbook::cli;
use rentbook::commands::{AppContext, doctor, payments, status};
use rentbook::models::{CategoryAmounts, TenantDraft};
use rentbook::store::{AuthStore, SqliteStore, TenantStore};
use rust_decimal::Decimal;

fn ctx_with_tenant() -> (AppContext, String) {
    let store = SqliteStore::in_memory().unwrap();
    let session = store.sign_up("owner@example.com", "hunter2").unwrap();
    let tenant = store
        .add_tenant(
            &session,
            &TenantDraft {
                name: "Dana Levi".into(),
                schedule: CategoryAmounts {
                    rent: Decimal::from(3000),
                    electricity: Decimal::from(200),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();
    // 2026-03-10 is the third month of the cycle: Kislev 5787
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    (AppContext::new(Box::new(store), Some(session), today), tenant.id)
}

fn pay(ctx: &AppContext, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli()
        .get_matches_from(["rentbook", "pay"].into_iter().chain(args.iter().copied()));
    let (_, sub) = matches.subcommand().unwrap();
    payments::handle(ctx, sub)
}

fn kislev() -> Period {
    Period::new(HebrewMonth::Kislev, "5787")
}

#[test]
fn record_defaults_to_the_current_month() {
    let (ctx, id) = ctx_with_tenant();
    pay(&ctx, &["record", "--tenant", &id, "--category", "rent", "--amount", "3000"]).unwrap();

    let rec = ctx
        .backend()
        .payment_record(ctx.session().unwrap(), &id, &kislev())
        .unwrap()
        .unwrap();
    assert_eq!(rec.paid.rent, Decimal::from(3000));
    assert_eq!(rec.paid.electricity, Decimal::ZERO);
}

#[test]
fn record_accepts_explicit_month_and_year() {
    let (ctx, id) = ctx_with_tenant();
    pay(
        &ctx,
        &[
            "record", "--tenant", &id, "--category", "Water", "--amount", "90", "--month",
            "Tammuz", "--year", "5785",
        ],
    )
    .unwrap();
    let tammuz = Period::new(HebrewMonth::Tammuz, "5785");
    let rec = ctx
        .backend()
        .payment_record(ctx.session().unwrap(), &id, &tammuz)
        .unwrap()
        .unwrap();
    assert_eq!(rec.paid.water, Decimal::from(90));
}

#[test]
fn record_rejects_bad_input() {
    let (ctx, id) = ctx_with_tenant();
    let id = id.as_str();
    let bad = [
        vec!["record", "--tenant", "ghost", "--category", "rent", "--amount", "1"],
        vec!["record", "--tenant", id, "--category", "parking", "--amount", "1"],
        vec!["record", "--tenant", id, "--category", "rent", "--amount", "-1"],
        vec!["record", "--tenant", id, "--category", "rent", "--amount", "1", "--month", "Octember"],
        vec!["set", "--tenant", id],
        vec!["set", "--tenant", id, "--gas", "-40"],
        vec!["set", "--tenant", id, "--rent", "79228162514264337593543950335"],
    ];
    for args in bad {
        assert!(pay(&ctx, &args).is_err(), "{:?}", args);
    }
    assert!(
        ctx.backend()
            .payments(ctx.session().unwrap())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn set_writes_several_categories() {
    let (ctx, id) = ctx_with_tenant();
    pay(&ctx, &["record", "--tenant", &id, "--category", "rent", "--amount", "1000"]).unwrap();
    pay(&ctx, &["set", "--tenant", &id, "--rent", "3000", "--electricity", "200"]).unwrap();

    let session = ctx.session().unwrap();
    let records = ctx.backend().payments(session).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total_paid(), Decimal::from(3200));
}

#[test]
fn history_is_ordered_by_period() {
    let (ctx, id) = ctx_with_tenant();
    for (month, year) in [("Adar", "5787"), ("Tishrei", "5787"), ("Elul", "5786")] {
        pay(
            &ctx,
            &[
                "record", "--tenant", &id, "--category", "rent", "--amount", "3000", "--month",
                month, "--year", year,
            ],
        )
        .unwrap();
    }
    let history = payments::tenant_history(&ctx, &id).unwrap();
    let order: Vec<String> = history.iter().map(|r| r.period.to_string()).collect();
    assert_eq!(order, vec!["אלול 5786", "תשרי 5787", "אדר 5787"]);
}

#[test]
fn status_carries_previous_month_debt() {
    let (ctx, id) = ctx_with_tenant();
    pay(
        &ctx,
        &[
            "record", "--tenant", &id, "--category", "rent", "--amount", "2000", "--month",
            "Cheshvan", "--year", "5787",
        ],
    )
    .unwrap();

    let rows = status::status_rows(&ctx, Some(id.as_str()), &kislev()).unwrap();
    assert_eq!(rows.len(), 1);
    let (_, r) = &rows[0];
    assert_eq!(r.total_charge, Decimal::from(3200));
    assert_eq!(r.previous_debt, Decimal::from(1200));
    assert_eq!(r.grand_remaining, Decimal::from(4400));

    assert!(status::status_rows(&ctx, Some("ghost"), &kislev()).is_err());
}

#[test]
fn doctor_reports_orphans_and_empty_schedules() {
    let (ctx, id) = ctx_with_tenant();
    let session = ctx.session().unwrap();
    pay(&ctx, &["record", "--tenant", &id, "--category", "rent", "--amount", "3000"]).unwrap();
    ctx.backend()
        .add_tenant(
            session,
            &TenantDraft {
                name: "Empty".into(),
                ..Default::default()
            },
        )
        .unwrap();
    ctx.backend().delete_tenant(session, &id).unwrap();

    let issues = doctor::find_issues(&ctx).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(kinds, vec!["payment_without_tenant", "empty_schedule"]);
    assert_eq!(issues[0].1, id);
}
