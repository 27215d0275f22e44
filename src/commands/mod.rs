// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod backend;
pub mod doctor;
pub mod exporter;
pub mod payments;
pub mod status;
pub mod tenants;

use crate::models::Session;
use crate::store::Backend;
use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Everything a command needs, passed explicitly instead of read from globals.
pub struct AppContext {
    pub backend: Box<dyn Backend>,
    pub session: Option<Session>,
    pub today: NaiveDate,
}

impl AppContext {
    pub fn new(backend: Box<dyn Backend>, session: Option<Session>, today: NaiveDate) -> Self {
        Self {
            backend,
            session,
            today,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .context("Not signed in; run `rentbook auth signin --email ... --password ...`")
    }
}
