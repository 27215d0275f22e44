// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::AppContext;
use crate::ledger::{record_payment, record_payments};
use crate::models::{ChargeCategory, PaymentPatch, PaymentRecord};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, period_arg, pretty_table};
use anyhow::{Context, Result};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(ctx, sub)?,
        Some(("set", sub)) => set(ctx, sub)?,
        Some(("show", sub)) => show(ctx, sub)?,
        Some(("history", sub)) => history(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn tenant_arg(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<String> {
    let id = sub.get_one::<String>("tenant").unwrap().trim().to_string();
    ctx.backend()
        .get_tenant(ctx.session()?, &id)?
        .with_context(|| format!("Tenant '{}' not found", id))?;
    Ok(id)
}

fn record(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let tenant_id = tenant_arg(ctx, sub)?;
    let category: ChargeCategory = sub.get_one::<String>("category").unwrap().parse()?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let period = period_arg(sub, ctx.today)?;
    let rec = record_payment(
        ctx.session()?,
        ctx.backend(),
        &tenant_id,
        &period,
        category,
        amount,
    )?;
    println!(
        "Recorded {} {} for {}; paid this month {}",
        category.label(),
        fmt_money(&amount),
        period,
        fmt_money(&rec.total_paid())
    );
    Ok(())
}

fn set(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let tenant_id = tenant_arg(ctx, sub)?;
    let period = period_arg(sub, ctx.today)?;
    let mut patch = PaymentPatch::default();
    for c in ChargeCategory::ALL {
        if let Some(s) = sub.get_one::<String>(c.key()) {
            patch.set(c, parse_amount(s).with_context(|| format!("--{}", c.key()))?);
        }
    }
    let rec = record_payments(ctx.session()?, ctx.backend(), &tenant_id, &period, &patch)?;
    println!(
        "Updated {} categories for {}; paid this month {}",
        patch.fields().count(),
        period,
        fmt_money(&rec.total_paid())
    );
    Ok(())
}

fn show(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let tenant_id = tenant_arg(ctx, sub)?;
    let period = period_arg(sub, ctx.today)?;
    let rec = ctx
        .backend()
        .payment_record(ctx.session()?, &tenant_id, &period)?;
    if maybe_print_json(sub, &rec)? {
        return Ok(());
    }
    match rec {
        Some(rec) => {
            let rows = rec
                .paid
                .iter()
                .map(|(c, v)| vec![c.label().to_string(), fmt_money(&v)])
                .collect();
            println!("{} (updated {})", period, rec.updated_at.format("%Y-%m-%d %H:%M"));
            println!("{}", pretty_table(&["Category", "Paid"], rows));
        }
        None => println!("No payments recorded for {}", period),
    }
    Ok(())
}

/// Records for one tenant, oldest first.
pub fn tenant_history(ctx: &AppContext, tenant_id: &str) -> Result<Vec<PaymentRecord>> {
    let mut records: Vec<PaymentRecord> = ctx
        .backend()
        .payments(ctx.session()?)?
        .into_iter()
        .filter(|r| r.tenant_id == tenant_id)
        .collect();
    records.sort_by(|a, b| {
        a.period
            .year
            .cmp(&b.period.year)
            .then_with(|| a.period.index().cmp(&b.period.index()))
            .then_with(|| a.updated_at.cmp(&b.updated_at))
    });
    Ok(records)
}

fn history(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let tenant_id = tenant_arg(ctx, sub)?;
    let records = tenant_history(ctx, &tenant_id)?;
    if maybe_print_json(sub, &records)? {
        return Ok(());
    }
    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![r.period.to_string()];
            row.extend(r.paid.iter().map(|(_, v)| fmt_money(&v)));
            row.push(fmt_money(&r.total_paid()));
            row
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Period",
                "Rent",
                "Electricity",
                "Water",
                "Committee",
                "Gas",
                "Total"
            ],
            rows
        )
    );
    Ok(())
}
