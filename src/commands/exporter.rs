// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::AppContext;
use super::status::status_rows;
use crate::utils::period_arg;
use anyhow::{Result, bail};
use serde_json::json;

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("report", sub)) => export_report(ctx, sub),
        _ => Ok(()),
    }
}

fn export_report(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let period = period_arg(sub, ctx.today)?;
    let rows = status_rows(ctx, None, &period)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "tenant_id",
                "tenant",
                "month",
                "year",
                "total_charge",
                "total_paid",
                "remaining",
                "previous_debt",
                "grand_remaining",
                "fully_paid",
            ])?;
            for (t, r) in &rows {
                wtr.write_record([
                    t.id.clone(),
                    t.name.clone(),
                    r.period.month_name().to_string(),
                    r.period.year.clone(),
                    r.total_charge.to_string(),
                    r.total_paid.to_string(),
                    r.remaining.to_string(),
                    r.previous_debt.to_string(),
                    r.grand_remaining.to_string(),
                    r.is_fully_paid.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .iter()
                .map(|(t, r)| {
                    json!({
                        "tenant_id": t.id,
                        "tenant": t.name,
                        "month": r.period.month_name(),
                        "year": r.period.year,
                        "total_charge": r.total_charge.to_string(),
                        "total_paid": r.total_paid.to_string(),
                        "remaining": r.remaining.to_string(),
                        "previous_debt": r.previous_debt.to_string(),
                        "grand_remaining": r.grand_remaining.to_string(),
                        "fully_paid": r.is_fully_paid,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} tenants for {} to {}", rows.len(), period, out);
    Ok(())
}
