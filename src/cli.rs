// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn month_args() -> [Arg; 2] {
    [
        Arg::new("month")
            .long("month")
            .help("Accounting month (Hebrew name or transliteration, e.g. Tishrei); defaults to the current one"),
        Arg::new("year")
            .long("year")
            .help("Year label, e.g. 5786; defaults to the current one"),
    ]
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn charge_args() -> Vec<Arg> {
    [
        ("rent", "Monthly rent"),
        ("electricity", "Monthly electricity"),
        ("water", "Monthly water"),
        ("committee", "Monthly house committee fee"),
        ("gas", "Monthly gas"),
        ("water-meter", "Water meter reading"),
        ("electricity-meter", "Electricity meter reading"),
        ("gas-meter", "Gas meter reading"),
    ]
    .into_iter()
    .map(|(name, help)| amount_arg(name).help(help))
    .collect()
}

fn paid_args() -> Vec<Arg> {
    ["rent", "electricity", "water", "committee", "gas"]
        .into_iter()
        .map(|name| amount_arg(name).help(format!("Amount paid for {}", name)))
        .collect()
}

// Negative values are passed through; `parse_amount` rejects them.
fn amount_arg(name: &'static str) -> Arg {
    Arg::new(name).long(name).allow_negative_numbers(true)
}

fn credentials() -> [Arg; 2] {
    [
        Arg::new("email").long("email").required(true),
        Arg::new("password").long("password").required(true),
    ]
}

fn tenant_id_arg(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help("Tenant id")
}

pub fn build_cli() -> Command {
    Command::new("rentbook")
        .version(crate_version!())
        .about("Tenant charges, monthly payments and carried-over debt")
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .help("Treat this date (YYYY-MM-DD) as today when picking the current month"),
        )
        .subcommand(Command::new("init").about("Create the data directory and database"))
        .subcommand(
            Command::new("backend")
                .about("Choose where tenants and payments are stored")
                .subcommand(Command::new("show").about("Show the active backend"))
                .subcommand(
                    Command::new("use")
                        .about("Switch backend")
                        .subcommand(
                            Command::new("sqlite")
                                .about("Local SQLite database")
                                .arg(Arg::new("db").long("db").help("Database file path")),
                        )
                        .subcommand(
                            Command::new("sheets")
                                .about("Google Sheet through an Apps Script web app")
                                .arg(Arg::new("url").long("url").required(true)),
                        ),
                ),
        )
        .subcommand(
            Command::new("auth")
                .about("Sign in to the active backend")
                .subcommand(Command::new("signup").args(credentials()))
                .subcommand(Command::new("signin").args(credentials()))
                .subcommand(Command::new("signout"))
                .subcommand(Command::new("whoami")),
        )
        .subcommand(
            Command::new("tenant")
                .about("Manage tenants and their monthly charges")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .args(charge_args()),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("show").arg(tenant_id_arg("id")).args(json_args()))
                .subcommand(
                    Command::new("update")
                        .arg(tenant_id_arg("id"))
                        .arg(Arg::new("name").long("name"))
                        .args(charge_args()),
                )
                .subcommand(Command::new("rm").arg(tenant_id_arg("id"))),
        )
        .subcommand(
            Command::new("pay")
                .about("Record and inspect payments")
                .subcommand(
                    Command::new("record")
                        .about("Set the amount paid for one category")
                        .arg(tenant_id_arg("tenant"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .required(true)
                                .help("rent|electricity|water|committee|gas"),
                        )
                        .arg(amount_arg("amount").required(true))
                        .args(month_args()),
                )
                .subcommand(
                    Command::new("set")
                        .about("Set the amounts paid for several categories at once")
                        .arg(tenant_id_arg("tenant"))
                        .args(paid_args())
                        .args(month_args()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(tenant_id_arg("tenant"))
                        .args(month_args())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("history")
                        .arg(tenant_id_arg("tenant"))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Reconcile charges, payments and carried-over debt")
                .arg(Arg::new("tenant").long("tenant").help("Only this tenant"))
                .args(month_args())
                .args(json_args()),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("report")
                        .about("Reconciliation report for every tenant")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .args(month_args()),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
