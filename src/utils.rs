// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::{Period, current_period};
use crate::models::ensure_amount;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

const UA: &str = concat!(
    "rentbook/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/rentbook)"
);

pub fn http_client() -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s.trim()))
}

/// A money amount in `0..=MAX_AMOUNT`.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    ensure_amount("amount", d)?;
    Ok(d)
}

/// Period from optional `--month/--year` arguments; either one defaults from `today`.
pub fn period_arg(sub: &clap::ArgMatches, today: NaiveDate) -> Result<Period> {
    let current = current_period(today);
    let month = sub.get_one::<String>("month").map(|s| s.trim().to_string());
    let year = sub.get_one::<String>("year").map(|s| s.trim().to_string());
    if month.is_none() && year.is_none() {
        return Ok(current);
    }
    let month = month.unwrap_or_else(|| current.month_name().to_string());
    let year = year.unwrap_or(current.year);
    Ok(Period::parse(&month, &year)?)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("₪{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Print `v` as JSON when `--json` or `--jsonl` was given; returns whether it did.
/// With `--jsonl` an array is printed one element per line.
pub fn maybe_print_json<T: serde::Serialize>(sub: &clap::ArgMatches, v: &T) -> Result<bool> {
    let val = serde_json::to_value(v)?;
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&val)?);
    } else if sub.get_flag("jsonl") {
        match val.as_array() {
            Some(items) => {
                for item in items {
                    println!("{}", serde_json::to_string(item)?);
                }
            }
            None => println!("{}", serde_json::to_string(&val)?),
        }
    } else {
        return Ok(false);
    }
    Ok(true)
}
