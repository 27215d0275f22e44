// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage backends.
//!
//! Every call takes the caller's [`Session`] explicitly; backends hold no
//! notion of a current user. Field naming differences between backends stay
//! inside each adapter.

pub mod sheets;
pub mod sqlite;

use crate::calendar::Period;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    ChargeSchedule, PaymentPatch, PaymentRecord, Session, Tenant, TenantDraft, TenantPatch,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;

pub trait TenantStore {
    fn list_tenants(&self, session: &Session) -> StoreResult<Vec<Tenant>>;

    fn add_tenant(&self, session: &Session, draft: &TenantDraft) -> StoreResult<Tenant>;

    fn update_tenant(
        &self,
        session: &Session,
        tenant_id: &str,
        patch: &TenantPatch,
    ) -> StoreResult<Tenant>;

    fn delete_tenant(&self, session: &Session, tenant_id: &str) -> StoreResult<()>;

    fn get_tenant(&self, session: &Session, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        Ok(self
            .list_tenants(session)?
            .into_iter()
            .find(|t| t.id == tenant_id))
    }

    fn charge_schedule(
        &self,
        session: &Session,
        tenant_id: &str,
    ) -> StoreResult<Option<ChargeSchedule>> {
        Ok(self.get_tenant(session, tenant_id)?.map(|t| t.schedule))
    }
}

pub trait PaymentStore {
    /// Every record of the session's user, in storage order.
    fn payments(&self, session: &Session) -> StoreResult<Vec<PaymentRecord>>;

    /// All records stored for one (tenant, period). Normally zero or one.
    fn payment_records(
        &self,
        session: &Session,
        tenant_id: &str,
        period: &Period,
    ) -> StoreResult<Vec<PaymentRecord>> {
        Ok(self
            .payments(session)?
            .into_iter()
            .filter(|p| p.tenant_id == tenant_id && &p.period == period)
            .collect())
    }

    /// The record for one (tenant, period), picking one deterministically
    /// when duplicates exist.
    fn payment_record(
        &self,
        session: &Session,
        tenant_id: &str,
        period: &Period,
    ) -> StoreResult<Option<PaymentRecord>> {
        let records = self.payment_records(session, tenant_id, period)?;
        if records.len() > 1 {
            log::warn!(
                "{} payment records for tenant {} in {}; using the most recently updated",
                records.len(),
                tenant_id,
                period
            );
        }
        Ok(select_record(records))
    }

    /// Create the record with the patched categories (others zero) or
    /// update only the patched categories of the existing one.
    fn upsert_payment(
        &self,
        session: &Session,
        tenant_id: &str,
        period: &Period,
        patch: &PaymentPatch,
    ) -> StoreResult<PaymentRecord>;
}

pub trait AuthStore {
    fn sign_up(&self, email: &str, password: &str) -> StoreResult<Session>;

    fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session>;
}

/// A complete storage backend.
pub trait Backend: TenantStore + PaymentStore + AuthStore {
    fn name(&self) -> &'static str;
}

/// Payments fetched once and looked up in memory, for passes that read
/// many (tenant, period) pairs. Writes are refused.
pub struct PaymentSnapshot {
    records: Vec<PaymentRecord>,
}

impl PaymentSnapshot {
    pub fn load<S: PaymentStore + ?Sized>(session: &Session, store: &S) -> StoreResult<Self> {
        Ok(Self {
            records: store.payments(session)?,
        })
    }
}

impl PaymentStore for PaymentSnapshot {
    fn payments(&self, _session: &Session) -> StoreResult<Vec<PaymentRecord>> {
        Ok(self.records.clone())
    }

    fn payment_records(
        &self,
        _session: &Session,
        tenant_id: &str,
        period: &Period,
    ) -> StoreResult<Vec<PaymentRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|p| p.tenant_id == tenant_id && &p.period == period)
            .cloned()
            .collect())
    }

    fn upsert_payment(
        &self,
        _session: &Session,
        _tenant_id: &str,
        _period: &Period,
        _patch: &PaymentPatch,
    ) -> StoreResult<PaymentRecord> {
        Err(StoreError::invalid("Payment snapshot is read-only"))
    }
}

/// Tie-break for duplicate (tenant, period) records: latest `updated_at`,
/// then latest `created_at`, then greatest id.
pub fn select_record(records: Vec<PaymentRecord>) -> Option<PaymentRecord> {
    records.into_iter().max_by(|a, b| {
        a.updated_at
            .cmp(&b.updated_at)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    })
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

pub fn validate_credentials(email: &str, password: &str) -> StoreResult<()> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(StoreError::invalid(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    if password.is_empty() {
        return Err(StoreError::invalid("Password must not be empty"));
    }
    Ok(())
}

/// Hex SHA-256 digest, the same scheme the spreadsheet script uses.
pub fn hash_password(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
