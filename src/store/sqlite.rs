// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Relational backend on a local SQLite file.

use super::{
    AuthStore, Backend, PaymentStore, TenantStore, hash_password, select_record,
    validate_credentials,
};
use crate::calendar::Period;
use crate::db::init_schema;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    CategoryAmounts, ChargeCategory, MeterReadings, PaymentPatch, PaymentRecord, Session, Tenant,
    TenantDraft, TenantPatch, ensure_amount,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::path::Path;

const TENANT_COLUMNS: &str = "id, user_id, name, monthly_rent, monthly_electricity, monthly_water, \
     monthly_committee, monthly_gas, water_meter, electricity_meter, gas_meter, created_at";

const PAYMENT_COLUMNS: &str = "id, tenant_id, user_id, hebrew_month, hebrew_year, rent_paid, \
     electricity_paid, water_paid, committee_paid, gas_paid, created_at, updated_at";

fn paid_column(category: ChargeCategory) -> &'static str {
    match category {
        ChargeCategory::Rent => "rent_paid",
        ChargeCategory::Electricity => "electricity_paid",
        ChargeCategory::Water => "water_paid",
        ChargeCategory::Committee => "committee_paid",
        ChargeCategory::Gas => "gas_paid",
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn fetch_tenant(&self, session: &Session, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id=?1 AND user_id=?2");
        let raw = self
            .conn
            .query_row(&sql, params![tenant_id, session.user_id], RawTenant::from_row)
            .optional()?;
        raw.map(RawTenant::into_tenant).transpose()
    }

    fn write_tenant(&self, tenant: &Tenant) -> StoreResult<()> {
        let s = &tenant.schedule;
        let m = &tenant.meters;
        self.conn.execute(
            "UPDATE tenants SET name=?1, monthly_rent=?2, monthly_electricity=?3, monthly_water=?4,
                 monthly_committee=?5, monthly_gas=?6, water_meter=?7, electricity_meter=?8, gas_meter=?9
             WHERE id=?10 AND user_id=?11",
            params![
                tenant.name,
                s.rent.to_string(),
                s.electricity.to_string(),
                s.water.to_string(),
                s.committee.to_string(),
                s.gas.to_string(),
                m.water.to_string(),
                m.electricity.to_string(),
                m.gas.to_string(),
                tenant.id,
                tenant.user_id,
            ],
        )?;
        Ok(())
    }

    fn query_payments(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> StoreResult<Vec<PaymentRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, RawPayment::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_record()?);
        }
        Ok(out)
    }
}

impl TenantStore for SqliteStore {
    fn list_tenants(&self, session: &Session) -> StoreResult<Vec<Tenant>> {
        let sql = format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE user_id=?1 ORDER BY created_at, name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![session.user_id], RawTenant::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_tenant()?);
        }
        Ok(out)
    }

    fn get_tenant(&self, session: &Session, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        self.fetch_tenant(session, tenant_id)
    }

    fn add_tenant(&self, session: &Session, draft: &TenantDraft) -> StoreResult<Tenant> {
        draft.validate()?;
        let tenant = Tenant {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: session.user_id.clone(),
            name: draft.name.trim().to_string(),
            schedule: draft.schedule.clone(),
            meters: draft.meters.clone(),
            created_at: Utc::now(),
        };
        let s = &tenant.schedule;
        let m = &tenant.meters;
        self.conn.execute(
            &format!(
                "INSERT INTO tenants({TENANT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)"
            ),
            params![
                tenant.id,
                tenant.user_id,
                tenant.name,
                s.rent.to_string(),
                s.electricity.to_string(),
                s.water.to_string(),
                s.committee.to_string(),
                s.gas.to_string(),
                m.water.to_string(),
                m.electricity.to_string(),
                m.gas.to_string(),
                tenant.created_at,
            ],
        )?;
        log::info!("added tenant {} ({})", tenant.id, tenant.name);
        Ok(tenant)
    }

    fn update_tenant(
        &self,
        session: &Session,
        tenant_id: &str,
        patch: &TenantPatch,
    ) -> StoreResult<Tenant> {
        patch.validate()?;
        let mut tenant = self
            .fetch_tenant(session, tenant_id)?
            .ok_or_else(|| StoreError::NotFound {
                kind: "Tenant",
                id: tenant_id.to_string(),
            })?;
        patch.apply_to(&mut tenant);
        self.write_tenant(&tenant)?;
        log::info!("updated tenant {}", tenant.id);
        Ok(tenant)
    }

    fn delete_tenant(&self, session: &Session, tenant_id: &str) -> StoreResult<()> {
        let n = self.conn.execute(
            "DELETE FROM tenants WHERE id=?1 AND user_id=?2",
            params![tenant_id, session.user_id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                kind: "Tenant",
                id: tenant_id.to_string(),
            });
        }
        log::info!("deleted tenant {}", tenant_id);
        Ok(())
    }
}

impl PaymentStore for SqliteStore {
    fn payments(&self, session: &Session) -> StoreResult<Vec<PaymentRecord>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id=?1 ORDER BY created_at, id"
        );
        self.query_payments(&sql, params![session.user_id])
    }

    fn payment_records(
        &self,
        session: &Session,
        tenant_id: &str,
        period: &Period,
    ) -> StoreResult<Vec<PaymentRecord>> {
        log::debug!("lookup payments tenant={} period={}", tenant_id, period);
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE user_id=?1 AND tenant_id=?2 AND hebrew_month=?3 AND hebrew_year=?4
             ORDER BY created_at, id"
        );
        self.query_payments(
            &sql,
            params![session.user_id, tenant_id, period.month_name(), period.year],
        )
    }

    fn upsert_payment(
        &self,
        session: &Session,
        tenant_id: &str,
        period: &Period,
        patch: &PaymentPatch,
    ) -> StoreResult<PaymentRecord> {
        patch.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now();
        let existing = select_record(self.payment_records(session, tenant_id, period)?);
        let record = match existing {
            Some(mut record) => {
                patch.apply_to(&mut record.paid);
                record.updated_at = now;
                for (c, v) in patch.fields() {
                    tx.execute(
                        &format!("UPDATE payments SET {}=?1 WHERE id=?2", paid_column(c)),
                        params![v.to_string(), record.id],
                    )?;
                }
                tx.execute(
                    "UPDATE payments SET updated_at=?1 WHERE id=?2",
                    params![now, record.id],
                )?;
                record
            }
            None => {
                let mut paid = CategoryAmounts::default();
                patch.apply_to(&mut paid);
                let record = PaymentRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    tenant_id: tenant_id.to_string(),
                    user_id: session.user_id.clone(),
                    period: period.clone(),
                    paid,
                    created_at: now,
                    updated_at: now,
                };
                tx.execute(
                    &format!(
                        "INSERT INTO payments({PAYMENT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)"
                    ),
                    params![
                        record.id,
                        record.tenant_id,
                        record.user_id,
                        record.period.month_name(),
                        record.period.year,
                        record.paid.rent.to_string(),
                        record.paid.electricity.to_string(),
                        record.paid.water.to_string(),
                        record.paid.committee.to_string(),
                        record.paid.gas.to_string(),
                        record.created_at,
                        record.updated_at,
                    ],
                )?;
                record
            }
        };
        tx.commit()?;
        log::info!(
            "recorded payment tenant={} period={} total={}",
            tenant_id,
            period,
            record.total_paid()
        );
        Ok(record)
    }
}

impl AuthStore for SqliteStore {
    fn sign_up(&self, email: &str, password: &str) -> StoreResult<Session> {
        validate_credentials(email, password)?;
        let email = email.trim();
        let exists: Option<String> = self
            .conn
            .query_row("SELECT id FROM users WHERE email=?1", params![email], |r| {
                r.get(0)
            })
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::invalid(format!(
                "A user with email '{}' already exists",
                email
            )));
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO users(id, email, password_hash, created_at) VALUES (?1,?2,?3,?4)",
            params![id, email, hash_password(password), Utc::now()],
        )?;
        Ok(Session {
            user_id: id,
            email: email.to_string(),
        })
    }

    fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let email = email.trim();
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE email=?1 AND password_hash=?2",
                params![email, hash_password(password)],
                |r| r.get(0),
            )
            .optional()?;
        match id {
            Some(user_id) => Ok(Session {
                user_id,
                email: email.to_string(),
            }),
            None => Err(StoreError::Unauthorized),
        }
    }
}

impl Backend for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}

// Amounts are stored as TEXT; rows are read raw and parsed afterwards so a
// malformed amount surfaces as a decode error rather than a type mismatch.
struct RawTenant {
    id: String,
    user_id: String,
    name: String,
    amounts: [String; 8],
    created_at: DateTime<Utc>,
}

impl RawTenant {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            amounts: [
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
                r.get(7)?,
                r.get(8)?,
                r.get(9)?,
                r.get(10)?,
            ],
            created_at: r.get(11)?,
        })
    }

    fn into_tenant(self) -> StoreResult<Tenant> {
        let mut v = [Decimal::ZERO; 8];
        for (slot, s) in v.iter_mut().zip(self.amounts.iter()) {
            *slot = parse_stored(s, &self.id)?;
        }
        Ok(Tenant {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            schedule: CategoryAmounts {
                rent: v[0],
                electricity: v[1],
                water: v[2],
                committee: v[3],
                gas: v[4],
            },
            meters: MeterReadings {
                water: v[5],
                electricity: v[6],
                gas: v[7],
            },
            created_at: self.created_at,
        })
    }
}

struct RawPayment {
    id: String,
    tenant_id: String,
    user_id: String,
    month: String,
    year: String,
    paid: [String; 5],
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RawPayment {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            tenant_id: r.get(1)?,
            user_id: r.get(2)?,
            month: r.get(3)?,
            year: r.get(4)?,
            paid: [r.get(5)?, r.get(6)?, r.get(7)?, r.get(8)?, r.get(9)?],
            created_at: r.get(10)?,
            updated_at: r.get(11)?,
        })
    }

    fn into_record(self) -> StoreResult<PaymentRecord> {
        let period = Period::parse(&self.month, &self.year)
            .map_err(|e| StoreError::decode(format!("payment {}", self.id), e))?;
        let mut paid = CategoryAmounts::default();
        for (c, s) in ChargeCategory::ALL.into_iter().zip(self.paid.iter()) {
            paid.set(c, parse_stored(s, &self.id)?);
        }
        Ok(PaymentRecord {
            id: self.id,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            period,
            paid,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_stored(s: &str, row_id: &str) -> StoreResult<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let d = s
        .parse::<Decimal>()
        .map_err(|e| StoreError::decode(format!("amount '{}' in row {}", s, row_id), e))?;
    ensure_amount("stored amount", d)
        .map_err(|e| StoreError::decode(format!("row {}", row_id), e))?;
    Ok(d)
}
