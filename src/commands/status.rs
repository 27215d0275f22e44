// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::AppContext;
use crate::calendar::Period;
use crate::models::Tenant;
use crate::reconcile::{ReconciliationResult, reconcile_all, reconcile_tenant, summarize};
use crate::utils::{fmt_money, maybe_print_json, period_arg, pretty_table};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusRow {
    pub tenant: String,
    #[serde(flatten)]
    pub result: ReconciliationResult,
}

/// Reconciliation for one tenant or all of them.
pub fn status_rows(
    ctx: &AppContext,
    tenant: Option<&str>,
    period: &Period,
) -> Result<Vec<(Tenant, ReconciliationResult)>> {
    let session = ctx.session()?;
    match tenant {
        Some(id) => {
            let t = ctx
                .backend()
                .get_tenant(session, id)?
                .with_context(|| format!("Tenant '{}' not found", id))?;
            let r = reconcile_tenant(session, ctx.backend(), &t, period)?;
            Ok(vec![(t, r)])
        }
        None => Ok(reconcile_all(session, ctx.backend(), period)?),
    }
}

pub fn handle(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let period = period_arg(sub, ctx.today)?;
    let tenant = sub.get_one::<String>("tenant").map(|s| s.trim());
    let rows = status_rows(ctx, tenant, &period)?;

    let out: Vec<StatusRow> = rows
        .iter()
        .map(|(t, r)| StatusRow {
            tenant: t.name.clone(),
            result: r.clone(),
        })
        .collect();
    if maybe_print_json(sub, &out)? {
        return Ok(());
    }

    let table_rows = rows
        .iter()
        .map(|(t, r)| {
            let state = if r.credit() > rust_decimal::Decimal::ZERO {
                format!("credit {}", fmt_money(&r.credit()))
            } else if r.is_fully_paid {
                "paid".to_string()
            } else if r.unpaid.is_empty() {
                "previous debt".to_string()
            } else {
                r.unpaid
                    .iter()
                    .map(|c| c.key())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            vec![
                t.name.clone(),
                fmt_money(&r.total_charge),
                fmt_money(&r.total_paid),
                fmt_money(&r.remaining),
                fmt_money(&r.previous_debt),
                fmt_money(&r.grand_remaining),
                state,
            ]
        })
        .collect();
    println!("{} (carry-over from {})", period, period.previous());
    println!(
        "{}",
        pretty_table(
            &[
                "Tenant",
                "Charge",
                "Paid",
                "Remaining",
                "Previous debt",
                "Total due",
                "Status"
            ],
            table_rows
        )
    );
    let s = summarize(&rows);
    println!(
        "{} tenants, {} fully paid; expected {}, collected {}, outstanding {}",
        s.tenants,
        s.fully_paid,
        fmt_money(&s.expected_monthly),
        fmt_money(&s.collected),
        fmt_money(&s.outstanding)
    );
    Ok(())
}
