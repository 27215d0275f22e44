// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Period;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeCategory {
    Rent,
    Electricity,
    Water,
    Committee,
    Gas,
}

impl ChargeCategory {
    pub const ALL: [ChargeCategory; 5] = [
        ChargeCategory::Rent,
        ChargeCategory::Electricity,
        ChargeCategory::Water,
        ChargeCategory::Committee,
        ChargeCategory::Gas,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChargeCategory::Rent => "rent",
            ChargeCategory::Electricity => "electricity",
            ChargeCategory::Water => "water",
            ChargeCategory::Committee => "committee",
            ChargeCategory::Gas => "gas",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChargeCategory::Rent => "Rent",
            ChargeCategory::Electricity => "Electricity",
            ChargeCategory::Water => "Water",
            ChargeCategory::Committee => "House committee",
            ChargeCategory::Gas => "Gas",
        }
    }
}

impl fmt::Display for ChargeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ChargeCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChargeCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                StoreError::invalid(format!(
                    "Unknown category '{}', expected one of rent|electricity|water|committee|gas",
                    s
                ))
            })
    }
}

/// One amount per charge category. Absent categories are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAmounts {
    #[serde(default)]
    pub rent: Decimal,
    #[serde(default)]
    pub electricity: Decimal,
    #[serde(default)]
    pub water: Decimal,
    #[serde(default)]
    pub committee: Decimal,
    #[serde(default)]
    pub gas: Decimal,
}

impl CategoryAmounts {
    pub fn get(&self, category: ChargeCategory) -> Decimal {
        match category {
            ChargeCategory::Rent => self.rent,
            ChargeCategory::Electricity => self.electricity,
            ChargeCategory::Water => self.water,
            ChargeCategory::Committee => self.committee,
            ChargeCategory::Gas => self.gas,
        }
    }

    pub fn set(&mut self, category: ChargeCategory, amount: Decimal) {
        let slot = match category {
            ChargeCategory::Rent => &mut self.rent,
            ChargeCategory::Electricity => &mut self.electricity,
            ChargeCategory::Water => &mut self.water,
            ChargeCategory::Committee => &mut self.committee,
            ChargeCategory::Gas => &mut self.gas,
        };
        *slot = amount;
    }

    pub fn total(&self) -> Decimal {
        self.iter().map(|(_, v)| v).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChargeCategory, Decimal)> + '_ {
        ChargeCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn validate(&self) -> StoreResult<()> {
        for (c, v) in self.iter() {
            ensure_amount(c.key(), v)?;
        }
        Ok(())
    }
}

/// Fixed monthly amounts a tenant owes.
pub type ChargeSchedule = CategoryAmounts;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterReadings {
    #[serde(default)]
    pub water: Decimal,
    #[serde(default)]
    pub electricity: Decimal,
    #[serde(default)]
    pub gas: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub schedule: ChargeSchedule,
    pub meters: MeterReadings,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn monthly_total(&self) -> Decimal {
        self.schedule.total()
    }
}

/// Fields needed to create a tenant.
#[derive(Debug, Clone, Default)]
pub struct TenantDraft {
    pub name: String,
    pub schedule: ChargeSchedule,
    pub meters: MeterReadings,
}

impl TenantDraft {
    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::invalid("Tenant name must not be empty"));
        }
        self.schedule.validate()?;
        ensure_amount("water meter", self.meters.water)?;
        ensure_amount("electricity meter", self.meters.electricity)?;
        ensure_amount("gas meter", self.meters.gas)?;
        Ok(())
    }
}

/// Partial tenant update; only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantPatch {
    pub name: Option<String>,
    pub rent: Option<Decimal>,
    pub electricity: Option<Decimal>,
    pub water: Option<Decimal>,
    pub committee: Option<Decimal>,
    pub gas: Option<Decimal>,
    pub water_meter: Option<Decimal>,
    pub electricity_meter: Option<Decimal>,
    pub gas_meter: Option<Decimal>,
}

impl TenantPatch {
    pub fn charge(&self, category: ChargeCategory) -> Option<Decimal> {
        match category {
            ChargeCategory::Rent => self.rent,
            ChargeCategory::Electricity => self.electricity,
            ChargeCategory::Water => self.water,
            ChargeCategory::Committee => self.committee,
            ChargeCategory::Gas => self.gas,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && ChargeCategory::ALL.iter().all(|c| self.charge(*c).is_none())
            && self.water_meter.is_none()
            && self.electricity_meter.is_none()
            && self.gas_meter.is_none()
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.is_empty() {
            return Err(StoreError::invalid("Tenant update sets no fields"));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(StoreError::invalid("Tenant name must not be empty"));
            }
        }
        for c in ChargeCategory::ALL {
            if let Some(v) = self.charge(c) {
                ensure_amount(c.key(), v)?;
            }
        }
        for (what, v) in [
            ("water meter", self.water_meter),
            ("electricity meter", self.electricity_meter),
            ("gas meter", self.gas_meter),
        ] {
            if let Some(v) = v {
                ensure_amount(what, v)?;
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, tenant: &mut Tenant) {
        if let Some(name) = &self.name {
            tenant.name = name.trim().to_string();
        }
        for c in ChargeCategory::ALL {
            if let Some(v) = self.charge(c) {
                tenant.schedule.set(c, v);
            }
        }
        if let Some(v) = self.water_meter {
            tenant.meters.water = v;
        }
        if let Some(v) = self.electricity_meter {
            tenant.meters.electricity = v;
        }
        if let Some(v) = self.gas_meter {
            tenant.meters.gas = v;
        }
    }
}

/// Amounts a tenant paid for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub period: Period,
    pub paid: CategoryAmounts,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn total_paid(&self) -> Decimal {
        self.paid.total()
    }
}

/// Partial update of the paid amounts of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentPatch {
    pub rent: Option<Decimal>,
    pub electricity: Option<Decimal>,
    pub water: Option<Decimal>,
    pub committee: Option<Decimal>,
    pub gas: Option<Decimal>,
}

impl PaymentPatch {
    pub fn single(category: ChargeCategory, amount: Decimal) -> Self {
        let mut p = Self::default();
        p.set(category, amount);
        p
    }

    pub fn get(&self, category: ChargeCategory) -> Option<Decimal> {
        match category {
            ChargeCategory::Rent => self.rent,
            ChargeCategory::Electricity => self.electricity,
            ChargeCategory::Water => self.water,
            ChargeCategory::Committee => self.committee,
            ChargeCategory::Gas => self.gas,
        }
    }

    pub fn set(&mut self, category: ChargeCategory, amount: Decimal) {
        let slot = match category {
            ChargeCategory::Rent => &mut self.rent,
            ChargeCategory::Electricity => &mut self.electricity,
            ChargeCategory::Water => &mut self.water,
            ChargeCategory::Committee => &mut self.committee,
            ChargeCategory::Gas => &mut self.gas,
        };
        *slot = Some(amount);
    }

    /// Categories this patch writes, in display order.
    pub fn fields(&self) -> impl Iterator<Item = (ChargeCategory, Decimal)> + '_ {
        ChargeCategory::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|v| (c, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.is_empty() {
            return Err(StoreError::invalid("Payment update sets no category"));
        }
        for (c, v) in self.fields() {
            ensure_amount(c.key(), v)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, paid: &mut CategoryAmounts) {
        for (c, v) in self.fields() {
            paid.set(c, v);
        }
    }
}

/// The signed-in user on whose behalf every store call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

/// Largest amount accepted for a single charge, payment or meter reading
/// (10^12). Sums of five capped amounts stay far inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Reject negative amounts and amounts above [`MAX_AMOUNT`].
pub fn ensure_amount(what: &str, v: Decimal) -> StoreResult<()> {
    if v.is_sign_negative() && !v.is_zero() {
        return Err(StoreError::invalid(format!(
            "{} must not be negative (got {})",
            what, v
        )));
    }
    if v > MAX_AMOUNT {
        return Err(StoreError::invalid(format!(
            "{} exceeds the maximum of {} (got {})",
            what, MAX_AMOUNT, v
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000u64));
    }

    #[test]
    fn amounts_outside_range_are_rejected() {
        assert!(ensure_amount("rent", MAX_AMOUNT).is_ok());
        assert!(ensure_amount("rent", MAX_AMOUNT + Decimal::ONE).is_err());
        assert!(ensure_amount("rent", Decimal::MAX).is_err());
        assert!(ensure_amount("rent", -Decimal::ONE).is_err());
        assert!(ensure_amount("rent", Decimal::ZERO).is_ok());
    }
}
