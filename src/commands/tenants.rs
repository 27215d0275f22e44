// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::AppContext;
use crate::models::{ChargeCategory, Tenant, TenantDraft, TenantPatch};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("show", sub)) => show(ctx, sub)?,
        Some(("update", sub)) => update(ctx, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            ctx.backend().delete_tenant(ctx.session()?, id)?;
            println!("Removed tenant {} (payment history kept)", id);
        }
        _ => {}
    }
    Ok(())
}

fn opt_amount(sub: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    sub.get_one::<String>(name)
        .map(|s| parse_amount(s).with_context(|| format!("--{}", name)))
        .transpose()
}

pub fn draft_from_args(sub: &clap::ArgMatches) -> Result<TenantDraft> {
    let mut draft = TenantDraft {
        name: sub.get_one::<String>("name").unwrap().trim().to_string(),
        ..Default::default()
    };
    for c in ChargeCategory::ALL {
        if let Some(v) = opt_amount(sub, c.key())? {
            draft.schedule.set(c, v);
        }
    }
    draft.meters.water = opt_amount(sub, "water-meter")?.unwrap_or_default();
    draft.meters.electricity = opt_amount(sub, "electricity-meter")?.unwrap_or_default();
    draft.meters.gas = opt_amount(sub, "gas-meter")?.unwrap_or_default();
    Ok(draft)
}

pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TenantPatch> {
    Ok(TenantPatch {
        name: sub.get_one::<String>("name").map(|s| s.trim().to_string()),
        rent: opt_amount(sub, "rent")?,
        electricity: opt_amount(sub, "electricity")?,
        water: opt_amount(sub, "water")?,
        committee: opt_amount(sub, "committee")?,
        gas: opt_amount(sub, "gas")?,
        water_meter: opt_amount(sub, "water-meter")?,
        electricity_meter: opt_amount(sub, "electricity-meter")?,
        gas_meter: opt_amount(sub, "gas-meter")?,
    })
}

fn add(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_args(sub)?;
    let tenant = ctx.backend().add_tenant(ctx.session()?, &draft)?;
    println!(
        "Added tenant '{}' ({}), monthly total {}",
        tenant.name,
        tenant.id,
        fmt_money(&tenant.monthly_total())
    );
    Ok(())
}

fn update(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let patch = patch_from_args(sub)?;
    let tenant = ctx.backend().update_tenant(ctx.session()?, id, &patch)?;
    println!(
        "Updated tenant '{}', monthly total {}",
        tenant.name,
        fmt_money(&tenant.monthly_total())
    );
    Ok(())
}

fn tenant_row(t: &Tenant) -> Vec<String> {
    let mut row = vec![t.id.clone(), t.name.clone()];
    row.extend(t.schedule.iter().map(|(_, v)| fmt_money(&v)));
    row.push(fmt_money(&t.monthly_total()));
    row
}

fn list(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let tenants = ctx.backend().list_tenants(ctx.session()?)?;
    if maybe_print_json(sub, &tenants)? {
        return Ok(());
    }
    let rows = tenants.iter().map(tenant_row).collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Id",
                "Name",
                "Rent",
                "Electricity",
                "Water",
                "Committee",
                "Gas",
                "Monthly"
            ],
            rows
        )
    );
    let expected: Decimal = tenants.iter().map(Tenant::monthly_total).sum();
    println!(
        "{} tenants, expected monthly income {}",
        tenants.len(),
        fmt_money(&expected)
    );
    Ok(())
}

fn show(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let tenant = ctx
        .backend()
        .get_tenant(ctx.session()?, id)?
        .with_context(|| format!("Tenant '{}' not found", id))?;
    if maybe_print_json(sub, &tenant)? {
        return Ok(());
    }
    let mut rows: Vec<Vec<String>> = tenant
        .schedule
        .iter()
        .map(|(c, v)| vec![c.label().to_string(), fmt_money(&v)])
        .collect();
    rows.push(vec!["Monthly total".into(), fmt_money(&tenant.monthly_total())]);
    rows.push(vec!["Water meter".into(), tenant.meters.water.to_string()]);
    rows.push(vec![
        "Electricity meter".into(),
        tenant.meters.electricity.to_string(),
    ]);
    rows.push(vec!["Gas meter".into(), tenant.meters.gas.to_string()]);
    println!("{} ({})", tenant.name, tenant.id);
    println!("{}", pretty_table(&["Item", "Value"], rows));
    Ok(())
}
