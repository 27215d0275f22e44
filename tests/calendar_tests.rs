// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rentbook::calendar::{HebrewMonth, Period, YEAR_OFFSET, current_period};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn january_books_into_tishrei() {
    let p = current_period(date(2026, 1, 15));
    assert_eq!(p.month, HebrewMonth::Tishrei);
    assert_eq!(p.year, "5787");
    assert_eq!(p.year, (2026 + YEAR_OFFSET).to_string());
}

#[test]
fn december_books_into_elul() {
    let p = current_period(date(2025, 12, 31));
    assert_eq!(p, Period::new(HebrewMonth::Elul, "5786"));
    assert_eq!(p.month_name(), "אלול");
}

#[test]
fn every_day_of_a_month_maps_to_the_same_period() {
    let first = current_period(date(2026, 2, 1));
    for day in 2..=28 {
        assert_eq!(current_period(date(2026, 2, day)), first);
    }
    assert_eq!(first.month, HebrewMonth::Cheshvan);
}

#[test]
fn previous_twice_walks_back_two_months() {
    let p = Period::new(HebrewMonth::Adar, "5786");
    assert_eq!(
        p.previous().previous(),
        Period::new(HebrewMonth::Tevet, "5786")
    );
}

#[test]
fn previous_wraps_without_changing_year_label() {
    let p = Period::new(HebrewMonth::Cheshvan, "5786");
    let once = p.previous();
    let twice = once.previous();
    assert_eq!(once, Period::new(HebrewMonth::Tishrei, "5786"));
    assert_eq!(twice, Period::new(HebrewMonth::Elul, "5786"));
    assert_eq!(twice.index(), 11);
}

#[test]
fn parse_accepts_hebrew_and_transliterated_names() {
    let a = Period::parse("ניסן", "5786").unwrap();
    let b = Period::parse("nisan", " 5786 ").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "ניסן 5786");
}

#[test]
fn parse_rejects_unknown_month_and_blank_year() {
    assert!(Period::parse("Smarch", "5786").is_err());
    assert!(Period::parse("Av", "  ").is_err());
}
