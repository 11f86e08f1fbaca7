//! Admin session gate.
//!
//! A single authorized credential pair and one session record under a
//! well-known key. This is a cosmetic gate, not an access-control
//! boundary: anything that can write to the storage key can forge a
//! session. Session validity is re-checked by re-reading the key before
//! every protected operation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::storage::{self, keys, StoragePort};
use crate::{Result, StoreError};

#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub authorized_email: String,
    pub password: String,
    pub session_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            authorized_email: "7904084589y@gmail.com".to_string(),
            password: "admin123".to_string(),
            session_key: keys::ADMIN_SESSION.to_string(),
        }
    }
}

impl AdminConfig {
    /// Credentials from `ADMIN_EMAIL` / `ADMIN_PASSWORD`, falling back to
    /// the built-in pair.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            authorized_email: std::env::var("ADMIN_EMAIL").unwrap_or(defaults.authorized_email),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or(defaults.password),
            session_key: defaults.session_key,
        }
    }
}

#[derive(Clone, Debug, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub email: String,
    pub login_time: DateTime<Utc>,
    pub remember_me: bool,
    pub authorized: bool,
}

pub struct AdminGate {
    storage: Arc<dyn StoragePort>,
    config: AdminConfig,
}

impl AdminGate {
    pub fn new(storage: Arc<dyn StoragePort>, config: AdminConfig) -> Self {
        Self { storage, config }
    }

    /// Check credentials and open a session. Failures leave any stored
    /// session untouched.
    pub fn login(&self, request: &LoginRequest) -> Result<AdminSession> {
        if request.validate().is_err() {
            return Err(StoreError::InvalidEmail);
        }
        if request.email != self.config.authorized_email {
            return Err(StoreError::UnauthorizedEmail);
        }
        if request.password != self.config.password {
            return Err(StoreError::InvalidPassword);
        }
        let session = AdminSession {
            email: request.email.clone(),
            login_time: Utc::now(),
            remember_me: request.remember_me,
            authorized: true,
        };
        if !storage::set_json(self.storage.as_ref(), &self.config.session_key, &session) {
            return Err(StoreError::Storage("session write failed".into()));
        }
        info!(email = %session.email, "admin session opened");
        Ok(session)
    }

    /// The stored session, if it still names the authorized email and
    /// carries the authorized flag. Anything else, including an
    /// unreadable record, counts as logged out.
    pub fn current_session(&self) -> Option<AdminSession> {
        let session: AdminSession =
            storage::get_json(self.storage.as_ref(), &self.config.session_key)?;
        if session.email == self.config.authorized_email && session.authorized {
            Some(session)
        } else {
            None
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    /// Drop the session record. Logging out twice is fine.
    pub fn logout(&self) {
        storage::remove_key(self.storage.as_ref(), &self.config.session_key);
        info!("admin session closed");
    }
}
