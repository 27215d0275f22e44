// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly reconciliation: what a tenant owes for a period, what they paid,
//! and the unpaid balance carried over from the period before.

use crate::calendar::Period;
use crate::error::StoreResult;
use crate::models::{ChargeCategory, ChargeSchedule, Session, Tenant};
use crate::store::{Backend, PaymentSnapshot, PaymentStore};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub tenant_id: String,
    pub period: Period,
    pub total_charge: Decimal,
    pub total_paid: Decimal,
    /// Charge minus paid for this period. Negative when overpaid.
    pub remaining: Decimal,
    pub previous_period: Period,
    pub previous_debt: Decimal,
    pub grand_remaining: Decimal,
    pub is_fully_paid: bool,
    /// Categories paid below their scheduled charge this period.
    pub unpaid: Vec<ChargeCategory>,
}

impl ReconciliationResult {
    /// Overpayment carried by this period, zero unless `grand_remaining` is negative.
    pub fn credit(&self) -> Decimal {
        if self.grand_remaining.is_sign_negative() {
            -self.grand_remaining
        } else {
            Decimal::ZERO
        }
    }

    /// The balance still owed, zero when paid up or in credit.
    pub fn outstanding(&self) -> Decimal {
        self.grand_remaining.max(Decimal::ZERO)
    }
}

/// Reconcile one tenant for `period`.
///
/// A missing schedule counts as all zeros. The previous period's debt is
/// measured against the current schedule, since schedule history is not kept,
/// and only counts when a record exists for that period. Lookup failures are
/// returned as-is.
pub fn reconcile<S: PaymentStore + ?Sized>(
    session: &Session,
    store: &S,
    tenant_id: &str,
    schedule: Option<&ChargeSchedule>,
    period: &Period,
) -> StoreResult<ReconciliationResult> {
    let zero = ChargeSchedule::default();
    let schedule = schedule.unwrap_or(&zero);
    let total_charge = schedule.total();

    let current = store.payment_record(session, tenant_id, period)?;
    let total_paid = current
        .as_ref()
        .map(|r| r.total_paid())
        .unwrap_or(Decimal::ZERO);
    let unpaid = ChargeCategory::ALL
        .into_iter()
        .filter(|c| {
            let paid = current
                .as_ref()
                .map(|r| r.paid.get(*c))
                .unwrap_or(Decimal::ZERO);
            paid < schedule.get(*c)
        })
        .collect();

    let previous_period = period.previous();
    let previous_debt = match store.payment_record(session, tenant_id, &previous_period)? {
        Some(prev) => (total_charge - prev.total_paid()).max(Decimal::ZERO),
        None => Decimal::ZERO,
    };

    let remaining = total_charge - total_paid;
    let grand_remaining = remaining + previous_debt;
    log::debug!(
        "reconciled tenant={} period={} charge={} paid={} carried={}",
        tenant_id,
        period,
        total_charge,
        total_paid,
        previous_debt
    );

    Ok(ReconciliationResult {
        tenant_id: tenant_id.to_string(),
        period: period.clone(),
        total_charge,
        total_paid,
        remaining,
        previous_period,
        previous_debt,
        grand_remaining,
        is_fully_paid: grand_remaining <= Decimal::ZERO,
        unpaid,
    })
}

pub fn reconcile_tenant<S: PaymentStore + ?Sized>(
    session: &Session,
    store: &S,
    tenant: &Tenant,
    period: &Period,
) -> StoreResult<ReconciliationResult> {
    reconcile(session, store, &tenant.id, Some(&tenant.schedule), period)
}

/// Reconcile every tenant of the session's user, in listing order.
///
/// Payments are read once for the whole pass.
pub fn reconcile_all<B: Backend + ?Sized>(
    session: &Session,
    backend: &B,
    period: &Period,
) -> StoreResult<Vec<(Tenant, ReconciliationResult)>> {
    let tenants = backend.list_tenants(session)?;
    let payments = PaymentSnapshot::load(session, backend)?;
    let mut out = Vec::with_capacity(tenants.len());
    for t in tenants {
        let r = reconcile_tenant(session, &payments, &t, period)?;
        out.push((t, r));
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub tenants: usize,
    pub expected_monthly: Decimal,
    pub collected: Decimal,
    pub outstanding: Decimal,
    pub fully_paid: usize,
}

pub fn summarize(rows: &[(Tenant, ReconciliationResult)]) -> PortfolioSummary {
    PortfolioSummary {
        tenants: rows.len(),
        expected_monthly: rows.iter().map(|(t, _)| t.monthly_total()).sum(),
        collected: rows.iter().map(|(_, r)| r.total_paid).sum(),
        outstanding: rows.iter().map(|(_, r)| r.outstanding()).sum(),
        fully_paid: rows.iter().filter(|(_, r)| r.is_fully_paid).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HebrewMonth;
    use crate::error::StoreError;
    use crate::models::{
        CategoryAmounts, MeterReadings, PaymentPatch, PaymentRecord, TenantDraft, TenantPatch,
    };
    use crate::store::{AuthStore, TenantStore};
    use chrono::Utc;
    use std::cell::Cell;

    struct Fixed(Vec<PaymentRecord>);

    impl PaymentStore for Fixed {
        fn payments(&self, _: &Session) -> StoreResult<Vec<PaymentRecord>> {
            Ok(self.0.clone())
        }

        fn upsert_payment(
            &self,
            _: &Session,
            _: &str,
            _: &Period,
            _: &PaymentPatch,
        ) -> StoreResult<PaymentRecord> {
            Err(StoreError::invalid("read-only"))
        }
    }

    struct Failing;

    impl PaymentStore for Failing {
        fn payments(&self, _: &Session) -> StoreResult<Vec<PaymentRecord>> {
            Err(StoreError::Backend {
                action: "getPayments".into(),
                message: "quota exceeded".into(),
            })
        }

        fn upsert_payment(
            &self,
            _: &Session,
            _: &str,
            _: &Period,
            _: &PaymentPatch,
        ) -> StoreResult<PaymentRecord> {
            unreachable!()
        }
    }

    fn session() -> Session {
        Session {
            user_id: "u1".into(),
            email: "owner@example.com".into(),
        }
    }

    fn record(period: Period, rent: i64) -> PaymentRecord {
        PaymentRecord {
            id: format!("p-{}", period.index()),
            tenant_id: "t1".into(),
            user_id: "u1".into(),
            period,
            paid: CategoryAmounts {
                rent: Decimal::from(rent),
                ..Default::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_schedule_reconciles_to_zero() {
        let period = Period::new(HebrewMonth::Av, "5785");
        let r = reconcile(&session(), &Fixed(vec![]), "t1", None, &period).unwrap();
        assert_eq!(r.total_charge, Decimal::ZERO);
        assert_eq!(r.grand_remaining, Decimal::ZERO);
        assert!(r.is_fully_paid);
        assert!(r.unpaid.is_empty());
    }

    #[test]
    fn tishrei_carries_debt_from_elul_of_the_same_year_label() {
        let schedule = CategoryAmounts {
            rent: Decimal::from(1000),
            ..Default::default()
        };
        let elul_same_label = record(Period::new(HebrewMonth::Elul, "5786"), 400);
        let tishrei = Period::new(HebrewMonth::Tishrei, "5786");
        let r = reconcile(
            &session(),
            &Fixed(vec![elul_same_label]),
            "t1",
            Some(&schedule),
            &tishrei,
        )
        .unwrap();
        assert_eq!(r.previous_period, Period::new(HebrewMonth::Elul, "5786"));
        assert_eq!(r.previous_debt, Decimal::from(600));
    }

    #[test]
    fn lookup_failure_propagates() {
        let period = Period::new(HebrewMonth::Nisan, "5785");
        let err = reconcile(&session(), &Failing, "t1", None, &period).unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
    }

    struct Counting {
        tenants: Vec<Tenant>,
        records: Vec<PaymentRecord>,
        payment_reads: Cell<usize>,
    }

    impl TenantStore for Counting {
        fn list_tenants(&self, _: &Session) -> StoreResult<Vec<Tenant>> {
            Ok(self.tenants.clone())
        }

        fn add_tenant(&self, _: &Session, _: &TenantDraft) -> StoreResult<Tenant> {
            unreachable!()
        }

        fn update_tenant(&self, _: &Session, _: &str, _: &TenantPatch) -> StoreResult<Tenant> {
            unreachable!()
        }

        fn delete_tenant(&self, _: &Session, _: &str) -> StoreResult<()> {
            unreachable!()
        }
    }

    impl PaymentStore for Counting {
        fn payments(&self, _: &Session) -> StoreResult<Vec<PaymentRecord>> {
            self.payment_reads.set(self.payment_reads.get() + 1);
            Ok(self.records.clone())
        }

        fn upsert_payment(
            &self,
            _: &Session,
            _: &str,
            _: &Period,
            _: &PaymentPatch,
        ) -> StoreResult<PaymentRecord> {
            unreachable!()
        }
    }

    impl AuthStore for Counting {
        fn sign_up(&self, _: &str, _: &str) -> StoreResult<Session> {
            Err(StoreError::Unauthorized)
        }

        fn sign_in(&self, _: &str, _: &str) -> StoreResult<Session> {
            Err(StoreError::Unauthorized)
        }
    }

    impl Backend for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn tenant(id: &str) -> Tenant {
        Tenant {
            id: id.into(),
            user_id: "u1".into(),
            name: id.to_uppercase(),
            schedule: CategoryAmounts {
                rent: Decimal::from(1000),
                ..Default::default()
            },
            meters: MeterReadings::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn reconcile_all_reads_payments_once() {
        let adar = Period::new(HebrewMonth::Adar, "5786");
        let backend = Counting {
            tenants: vec![tenant("t1"), tenant("t2"), tenant("t3")],
            records: vec![record(adar.clone(), 1000)],
            payment_reads: Cell::new(0),
        };
        let rows = reconcile_all(&session(), &backend, &adar).unwrap();
        assert_eq!(backend.payment_reads.get(), 1);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].1.is_fully_paid);
        assert!(!rows[1].1.is_fully_paid);
    }
}
