// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The twelve-month accounting calendar payments are booked against.
//!
//! Months carry Hebrew names and years carry Hebrew year labels, but the
//! mapping from the system clock is positional: Gregorian January books into
//! Tishrei, February into Cheshvan, and so on. Year labels are opaque strings
//! as far as storage is concerned.

use crate::error::{StoreError, StoreResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Offset added to the Gregorian year to obtain the year label.
pub const YEAR_OFFSET: i32 = 3761;

/// Serialized by its Hebrew name, the same spelling storage and exports use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HebrewMonth {
    Tishrei,
    Cheshvan,
    Kislev,
    Tevet,
    Shevat,
    Adar,
    Nisan,
    Iyar,
    Sivan,
    Tammuz,
    Av,
    Elul,
}

impl HebrewMonth {
    pub const ALL: [HebrewMonth; 12] = [
        HebrewMonth::Tishrei,
        HebrewMonth::Cheshvan,
        HebrewMonth::Kislev,
        HebrewMonth::Tevet,
        HebrewMonth::Shevat,
        HebrewMonth::Adar,
        HebrewMonth::Nisan,
        HebrewMonth::Iyar,
        HebrewMonth::Sivan,
        HebrewMonth::Tammuz,
        HebrewMonth::Av,
        HebrewMonth::Elul,
    ];

    /// Zero-based position in the sequence, always in `0..12`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name as stored in payment records.
    pub fn hebrew_name(self) -> &'static str {
        match self {
            HebrewMonth::Tishrei => "תשרי",
            HebrewMonth::Cheshvan => "חשון",
            HebrewMonth::Kislev => "כסלו",
            HebrewMonth::Tevet => "טבת",
            HebrewMonth::Shevat => "שבט",
            HebrewMonth::Adar => "אדר",
            HebrewMonth::Nisan => "ניסן",
            HebrewMonth::Iyar => "אייר",
            HebrewMonth::Sivan => "סיון",
            HebrewMonth::Tammuz => "תמוז",
            HebrewMonth::Av => "אב",
            HebrewMonth::Elul => "אלול",
        }
    }

    pub fn transliteration(self) -> &'static str {
        match self {
            HebrewMonth::Tishrei => "Tishrei",
            HebrewMonth::Cheshvan => "Cheshvan",
            HebrewMonth::Kislev => "Kislev",
            HebrewMonth::Tevet => "Tevet",
            HebrewMonth::Shevat => "Shevat",
            HebrewMonth::Adar => "Adar",
            HebrewMonth::Nisan => "Nisan",
            HebrewMonth::Iyar => "Iyar",
            HebrewMonth::Sivan => "Sivan",
            HebrewMonth::Tammuz => "Tammuz",
            HebrewMonth::Av => "Av",
            HebrewMonth::Elul => "Elul",
        }
    }

    /// Accepts the stored Hebrew spelling or the transliteration in any case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|m| {
            m.hebrew_name() == name || m.transliteration().eq_ignore_ascii_case(name)
        })
    }

    /// The month before this one, wrapping Tishrei back to Elul.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + 11) % 12]
    }
}

impl Serialize for HebrewMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hebrew_name())
    }
}

impl<'de> Deserialize<'de> for HebrewMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        HebrewMonth::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown month '{}'", name)))
    }
}

impl fmt::Display for HebrewMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hebrew_name())
    }
}

/// One accounting month: a month name paired with a year label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub month: HebrewMonth,
    pub year: String,
}

impl Period {
    pub fn new(month: HebrewMonth, year: impl Into<String>) -> Self {
        Self {
            month,
            year: year.into(),
        }
    }

    /// Parse a period from user or storage input.
    pub fn parse(month: &str, year: &str) -> StoreResult<Self> {
        let m = HebrewMonth::from_name(month)
            .ok_or_else(|| StoreError::invalid(format!("Unknown month '{}'", month.trim())))?;
        let y = year.trim();
        if y.is_empty() {
            return Err(StoreError::invalid("Year label must not be empty"));
        }
        Ok(Self::new(m, y))
    }

    pub fn index(&self) -> usize {
        self.month.index()
    }

    pub fn month_name(&self) -> &'static str {
        self.month.hebrew_name()
    }

    /// The preceding accounting month.
    ///
    /// Wrapping from Tishrei to Elul keeps the year label unchanged. Stored
    /// records were written under this rule, so lookups must follow it.
    pub fn previous(&self) -> Self {
        Self {
            month: self.month.previous(),
            year: self.year.clone(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.hebrew_name(), self.year)
    }
}

/// Map a clock date onto the accounting calendar.
pub fn current_period(date: NaiveDate) -> Period {
    let month = HebrewMonth::ALL[date.month0() as usize];
    Period::new(month, (date.year() + YEAR_OFFSET).to_string())
}
