// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::AppContext;
use crate::utils::pretty_table;
use anyhow::Result;
use std::collections::{BTreeMap, HashSet};

/// (issue, detail) pairs, grouped by issue kind.
pub fn find_issues(ctx: &AppContext) -> Result<Vec<(String, String)>> {
    let session = ctx.session()?;
    let tenants = ctx.backend().list_tenants(session)?;
    let payments = ctx.backend().payments(session)?;
    let mut issues = Vec::new();

    // 1) More than one record for the same tenant and month
    let mut per_period: BTreeMap<(String, String, usize), usize> = BTreeMap::new();
    for p in &payments {
        *per_period
            .entry((p.tenant_id.clone(), p.period.year.clone(), p.period.index()))
            .or_default() += 1;
    }
    for ((tenant, year, idx), n) in per_period {
        if n > 1 {
            let month = crate::calendar::HebrewMonth::ALL[idx];
            issues.push((
                "duplicate_payment".to_string(),
                format!("{} {} {} ({} records)", tenant, month, year, n),
            ));
        }
    }

    // 2) Payments whose tenant no longer exists
    let known: HashSet<&str> = tenants.iter().map(|t| t.id.as_str()).collect();
    let mut orphans: Vec<&str> = payments
        .iter()
        .map(|p| p.tenant_id.as_str())
        .filter(|id| !known.contains(id))
        .collect();
    orphans.sort_unstable();
    orphans.dedup();
    for id in orphans {
        issues.push(("payment_without_tenant".to_string(), id.to_string()));
    }

    // 3) Tenants that owe nothing
    for t in &tenants {
        if t.monthly_total().is_zero() {
            issues.push(("empty_schedule".to_string(), format!("{} ({})", t.name, t.id)));
        }
    }
    Ok(issues)
}

pub fn handle(ctx: &AppContext) -> Result<()> {
    let issues = find_issues(ctx)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(k, d)| vec![k, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
