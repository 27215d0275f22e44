// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spreadsheet backend: a Google Sheet fronted by an Apps Script web app.
//!
//! Requests are `?action=<name>` with query parameters, plus a JSON body sent
//! as `text/plain` for writes. Responses are JSON objects carrying either the
//! payload or `{"error": "..."}`. Sheet cells come back loosely typed: years
//! may be numbers, blank amounts may be empty strings.

use super::{
    AuthStore, Backend, PaymentStore, TenantStore, select_record, validate_credentials,
};
use crate::calendar::Period;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    CategoryAmounts, ChargeCategory, MeterReadings, PaymentPatch, PaymentRecord, Session, Tenant,
    TenantDraft, TenantPatch, ensure_amount,
};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};

pub struct SheetsStore {
    client: Client,
    url: String,
}

impl SheetsStore {
    pub fn new(url: &str) -> StoreResult<Self> {
        Ok(Self {
            client: crate::utils::http_client()?,
            url: url.trim().to_string(),
        })
    }

    fn call(&self, action: &str, query: &[(&str, &str)], body: Option<&Value>) -> StoreResult<Value> {
        log::debug!("sheets call action={}", action);
        let req = match body {
            Some(b) => self
                .client
                .post(&self.url)
                .query(&[("action", action)])
                .query(query)
                .header(CONTENT_TYPE, "text/plain")
                .body(serde_json::to_string(b)?),
            None => self.client.get(&self.url).query(&[("action", action)]).query(query),
        };
        let resp = req.send()?.error_for_status()?;
        let v: Value = resp.json()?;
        check_response(action, v)
    }

    fn fetch_payments(&self, session: &Session) -> StoreResult<Vec<PaymentRecord>> {
        let v = self.call("getPayments", &[("userId", session.user_id.as_str())], None)?;
        decode_payments(&v)
    }
}

impl TenantStore for SheetsStore {
    fn list_tenants(&self, session: &Session) -> StoreResult<Vec<Tenant>> {
        let v = self.call("getTenants", &[("userId", session.user_id.as_str())], None)?;
        decode_tenants(&v)
    }

    fn add_tenant(&self, session: &Session, draft: &TenantDraft) -> StoreResult<Tenant> {
        draft.validate()?;
        let body = tenant_body(session, draft);
        let v = self.call("addTenant", &[], Some(&body))?;
        let id = returned_id("addTenant", &v)?;
        log::info!("added tenant {} ({})", id, draft.name.trim());
        Ok(Tenant {
            id,
            user_id: session.user_id.clone(),
            name: draft.name.trim().to_string(),
            schedule: draft.schedule.clone(),
            meters: draft.meters.clone(),
            created_at: Utc::now(),
        })
    }

    fn update_tenant(
        &self,
        session: &Session,
        tenant_id: &str,
        patch: &TenantPatch,
    ) -> StoreResult<Tenant> {
        patch.validate()?;
        // the script does not scope updates by user, so check ownership first
        let mut tenant = self
            .get_tenant(session, tenant_id)?
            .ok_or_else(|| StoreError::NotFound {
                kind: "Tenant",
                id: tenant_id.to_string(),
            })?;
        self.call("updateTenant", &[], Some(&tenant_patch_body(tenant_id, patch)))?;
        patch.apply_to(&mut tenant);
        log::info!("updated tenant {}", tenant_id);
        Ok(tenant)
    }

    fn delete_tenant(&self, session: &Session, tenant_id: &str) -> StoreResult<()> {
        if self.get_tenant(session, tenant_id)?.is_none() {
            return Err(StoreError::NotFound {
                kind: "Tenant",
                id: tenant_id.to_string(),
            });
        }
        self.call("deleteTenant", &[("id", tenant_id)], None)?;
        log::info!("deleted tenant {}", tenant_id);
        Ok(())
    }
}

impl PaymentStore for SheetsStore {
    fn payments(&self, session: &Session) -> StoreResult<Vec<PaymentRecord>> {
        self.fetch_payments(session)
    }

    fn upsert_payment(
        &self,
        session: &Session,
        tenant_id: &str,
        period: &Period,
        patch: &PaymentPatch,
    ) -> StoreResult<PaymentRecord> {
        patch.validate()?;
        let now = Utc::now();
        let existing = select_record(self.payment_records(session, tenant_id, period)?);
        let record = match existing {
            Some(mut record) => {
                self.call(
                    "updatePayment",
                    &[],
                    Some(&payment_patch_body(&record.id, patch)),
                )?;
                patch.apply_to(&mut record.paid);
                record.updated_at = now;
                record
            }
            None => {
                let mut paid = CategoryAmounts::default();
                patch.apply_to(&mut paid);
                let body = new_payment_body(session, tenant_id, period, &paid);
                let v = self.call("createPayment", &[], Some(&body))?;
                PaymentRecord {
                    id: returned_id("createPayment", &v)?,
                    tenant_id: tenant_id.to_string(),
                    user_id: session.user_id.clone(),
                    period: period.clone(),
                    paid,
                    created_at: now,
                    updated_at: now,
                }
            }
        };
        log::info!(
            "recorded payment tenant={} period={} total={}",
            tenant_id,
            period,
            record.total_paid()
        );
        Ok(record)
    }
}

impl AuthStore for SheetsStore {
    fn sign_up(&self, email: &str, password: &str) -> StoreResult<Session> {
        validate_credentials(email, password)?;
        let v = self.call(
            "signup",
            &[("email", email.trim()), ("password", password)],
            None,
        )?;
        decode_session(&v)
    }

    fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let v = self
            .call(
                "signin",
                &[("email", email.trim()), ("password", password)],
                None,
            )
            .map_err(signin_error)?;
        decode_session(&v)
    }
}

impl Backend for SheetsStore {
    fn name(&self) -> &'static str {
        "sheets"
    }
}

fn paid_field(category: ChargeCategory) -> &'static str {
    match category {
        ChargeCategory::Rent => "rentPaid",
        ChargeCategory::Electricity => "electricityPaid",
        ChargeCategory::Water => "waterPaid",
        ChargeCategory::Committee => "committeePaid",
        ChargeCategory::Gas => "gasPaid",
    }
}

fn charge_field(category: ChargeCategory) -> &'static str {
    match category {
        ChargeCategory::Rent => "monthlyRent",
        ChargeCategory::Electricity => "monthlyElectricity",
        ChargeCategory::Water => "monthlyWater",
        ChargeCategory::Committee => "monthlyCommittee",
        ChargeCategory::Gas => "monthlyGas",
    }
}

/// Message the script returns for a wrong email or password.
pub const SIGNIN_REJECTED: &str = "מייל או סיסמה שגויים";

/// Only the script's credentials rejection means bad credentials; any other
/// failure is passed through unchanged.
pub fn signin_error(err: StoreError) -> StoreError {
    match err {
        StoreError::Backend { ref message, .. } if message.trim() == SIGNIN_REJECTED => {
            StoreError::Unauthorized
        }
        other => other,
    }
}

/// Surface a script-reported `error` as [`StoreError::Backend`].
pub fn check_response(action: &str, v: Value) -> StoreResult<Value> {
    match v.get("error") {
        Some(Value::Null) | None => Ok(v),
        Some(e) => Err(StoreError::Backend {
            action: action.to_string(),
            message: e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()),
        }),
    }
}

pub fn decode_tenants(v: &Value) -> StoreResult<Vec<Tenant>> {
    let rows = v
        .get("tenants")
        .ok_or_else(|| StoreError::decode("getTenants response", "missing 'tenants'"))?;
    let rows: Vec<SheetTenantRow> = Vec::deserialize(rows)
        .map_err(|e| StoreError::decode("tenant rows", e))?;
    Ok(rows.into_iter().map(SheetTenantRow::into_tenant).collect())
}

pub fn decode_payments(v: &Value) -> StoreResult<Vec<PaymentRecord>> {
    let rows = v
        .get("payments")
        .ok_or_else(|| StoreError::decode("getPayments response", "missing 'payments'"))?;
    let rows: Vec<SheetPaymentRow> = Vec::deserialize(rows)
        .map_err(|e| StoreError::decode("payment rows", e))?;
    rows.into_iter().map(SheetPaymentRow::into_record).collect()
}

pub fn decode_session(v: &Value) -> StoreResult<Session> {
    let user = v
        .get("user")
        .ok_or_else(|| StoreError::decode("auth response", "missing 'user'"))?;
    let field = |name: &str| -> StoreResult<String> {
        user.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::decode("auth response", format!("missing user.{}", name)))
    };
    Ok(Session {
        user_id: field("id")?,
        email: field("email")?,
    })
}

fn returned_id(action: &str, v: &Value) -> StoreResult<String> {
    v.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::decode(format!("{} response", action), "missing 'id'"))
}

// Sent as text so no precision is lost on the way to the sheet.
fn amount_json(d: Decimal) -> Value {
    Value::String(d.to_string())
}

pub fn tenant_body(session: &Session, draft: &TenantDraft) -> Value {
    let mut m = Map::new();
    m.insert("userId".into(), json!(session.user_id));
    m.insert("name".into(), json!(draft.name.trim()));
    for (c, v) in draft.schedule.iter() {
        m.insert(charge_field(c).into(), amount_json(v));
    }
    m.insert("waterMeter".into(), amount_json(draft.meters.water));
    m.insert("electricityMeter".into(), amount_json(draft.meters.electricity));
    m.insert("gasMeter".into(), amount_json(draft.meters.gas));
    Value::Object(m)
}

/// Only the fields the patch sets; the script leaves absent fields untouched.
pub fn tenant_patch_body(tenant_id: &str, patch: &TenantPatch) -> Value {
    let mut m = Map::new();
    m.insert("id".into(), json!(tenant_id));
    if let Some(name) = &patch.name {
        m.insert("name".into(), json!(name.trim()));
    }
    for c in ChargeCategory::ALL {
        if let Some(v) = patch.charge(c) {
            m.insert(charge_field(c).into(), amount_json(v));
        }
    }
    for (key, v) in [
        ("waterMeter", patch.water_meter),
        ("electricityMeter", patch.electricity_meter),
        ("gasMeter", patch.gas_meter),
    ] {
        if let Some(v) = v {
            m.insert(key.into(), amount_json(v));
        }
    }
    Value::Object(m)
}

pub fn new_payment_body(
    session: &Session,
    tenant_id: &str,
    period: &Period,
    paid: &CategoryAmounts,
) -> Value {
    let mut m = Map::new();
    m.insert("tenantId".into(), json!(tenant_id));
    m.insert("userId".into(), json!(session.user_id));
    m.insert("hebrewMonth".into(), json!(period.month_name()));
    m.insert("hebrewYear".into(), json!(period.year));
    for (c, v) in paid.iter() {
        m.insert(paid_field(c).into(), amount_json(v));
    }
    Value::Object(m)
}

pub fn payment_patch_body(record_id: &str, patch: &PaymentPatch) -> Value {
    let mut m = Map::new();
    m.insert("id".into(), json!(record_id));
    for (c, v) in patch.fields() {
        m.insert(paid_field(c).into(), amount_json(v));
    }
    Value::Object(m)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetTenantRow {
    #[serde(deserialize_with = "cell_string")]
    id: String,
    #[serde(default, deserialize_with = "cell_string")]
    user_id: String,
    #[serde(default, deserialize_with = "cell_string")]
    name: String,
    #[serde(default, deserialize_with = "cell_amount")]
    monthly_rent: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    monthly_electricity: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    monthly_water: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    monthly_committee: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    monthly_gas: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    water_meter: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    electricity_meter: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    gas_meter: Decimal,
    #[serde(default, deserialize_with = "cell_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

impl SheetTenantRow {
    fn into_tenant(self) -> Tenant {
        Tenant {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            schedule: CategoryAmounts {
                rent: self.monthly_rent,
                electricity: self.monthly_electricity,
                water: self.monthly_water,
                committee: self.monthly_committee,
                gas: self.monthly_gas,
            },
            meters: MeterReadings {
                water: self.water_meter,
                electricity: self.electricity_meter,
                gas: self.gas_meter,
            },
            created_at: self.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetPaymentRow {
    #[serde(deserialize_with = "cell_string")]
    id: String,
    #[serde(deserialize_with = "cell_string")]
    tenant_id: String,
    #[serde(default, deserialize_with = "cell_string")]
    user_id: String,
    #[serde(deserialize_with = "cell_string")]
    hebrew_month: String,
    #[serde(deserialize_with = "cell_string")]
    hebrew_year: String,
    #[serde(default, deserialize_with = "cell_amount")]
    rent_paid: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    electricity_paid: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    water_paid: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    committee_paid: Decimal,
    #[serde(default, deserialize_with = "cell_amount")]
    gas_paid: Decimal,
    #[serde(default, deserialize_with = "cell_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "cell_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

impl SheetPaymentRow {
    fn into_record(self) -> StoreResult<PaymentRecord> {
        let period = Period::parse(&self.hebrew_month, &self.hebrew_year)
            .map_err(|e| StoreError::decode(format!("payment row {}", self.id), e))?;
        // rows without timestamps sort before any stamped duplicate
        let created_at = self.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC);
        Ok(PaymentRecord {
            id: self.id,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            period,
            paid: CategoryAmounts {
                rent: self.rent_paid,
                electricity: self.electricity_paid,
                water: self.water_paid,
                committee: self.committee_paid,
                gas: self.gas_paid,
            },
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

fn cell_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected text cell, got {}",
            other
        ))),
    }
}

fn cell_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    use serde::de::Error;
    let parse = |s: &str| -> Result<Decimal, D::Error> {
        let d = s
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| D::Error::custom(format!("invalid amount '{}'", s)))?;
        ensure_amount("sheet cell", d).map_err(D::Error::custom)?;
        Ok(d)
    };
    match Value::deserialize(d)? {
        Value::Number(n) => parse(&n.to_string()),
        Value::String(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Value::String(s) => parse(s.trim()),
        Value::Null | Value::Bool(false) => Ok(Decimal::ZERO),
        other => Err(serde::de::Error::custom(format!(
            "expected amount cell, got {}",
            other
        ))),
    }
}

fn cell_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))),
        _ => Ok(None),
    }
}
