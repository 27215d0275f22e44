// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Period;
use crate::error::StoreResult;
use crate::models::{ChargeCategory, PaymentPatch, PaymentRecord, Session};
use crate::store::PaymentStore;
use rust_decimal::Decimal;

/// Set the paid amount of one category for (tenant, period).
///
/// Creates the record with every other category at zero if none exists.
/// Repeating the call with the same amount leaves the stored amounts as they were.
pub fn record_payment<S: PaymentStore + ?Sized>(
    session: &Session,
    store: &S,
    tenant_id: &str,
    period: &Period,
    category: ChargeCategory,
    amount: Decimal,
) -> StoreResult<PaymentRecord> {
    record_payments(
        session,
        store,
        tenant_id,
        period,
        &PaymentPatch::single(category, amount),
    )
}

/// Apply several category amounts to (tenant, period) in one write.
pub fn record_payments<S: PaymentStore + ?Sized>(
    session: &Session,
    store: &S,
    tenant_id: &str,
    period: &Period,
    patch: &PaymentPatch,
) -> StoreResult<PaymentRecord> {
    patch.validate()?;
    store.upsert_payment(session, tenant_id, period, patch)
}
