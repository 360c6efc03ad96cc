//! Mock accounts with a free-plan usage allowance
//!
//! There is no authentication: passwords are accepted and ignored. The
//! signed-in user is persisted under its own key so a new service over the
//! same store resumes the session.

use crate::store::{generate_id, read_json, write_json, KeyValueStore, StoreError};
use crate::usage::UsageTracker;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USERS_KEY: &str = "cfo_helper_users";
const AUTH_KEY: &str = "cfo_helper_auth";

/// Actions allowed on the free plan
pub const FREE_PLAN_MAX_USAGE: u32 = 10;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("User already exists: {0}")]
    UserExists(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("usage limit reached ({used}/{max})")]
    UsageLimitReached { used: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub plan: Plan,
    pub usage_count: u32,
    pub max_usage: u32,
    #[serde(default)]
    pub scenarios_simulated: u32,
    #[serde(default)]
    pub reports_exported: u32,
}

impl User {
    pub fn remaining_usage(&self) -> u32 {
        self.max_usage.saturating_sub(self.usage_count)
    }

    /// Share of the allowance used, capped at 100
    pub fn usage_percent(&self) -> f64 {
        if self.max_usage == 0 {
            return 100.0;
        }
        (self.usage_count as f64 / self.max_usage as f64 * 100.0).min(100.0)
    }

    pub fn can_export(&self) -> bool {
        self.usage_count < self.max_usage
    }
}

pub struct AccountService<S: KeyValueStore> {
    store: S,
    usage: UsageTracker<S>,
    max_usage: u32,
}

impl<S: KeyValueStore> AccountService<S> {
    /// `store` keeps users and the session, `usage` the billing events
    pub fn new(store: S, usage: UsageTracker<S>) -> Self {
        Self::with_max_usage(store, usage, FREE_PLAN_MAX_USAGE)
    }

    pub fn with_max_usage(store: S, usage: UsageTracker<S>, max_usage: u32) -> Self {
        Self { store, usage, max_usage }
    }

    pub fn usage(&self) -> &UsageTracker<S> {
        &self.usage
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(read_json(&self.store, USERS_KEY)?.unwrap_or_default())
    }

    /// Persist `user` as the session and in the user list
    fn persist(&mut self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users()?;
        if let Some(stored) = users.iter_mut().find(|u| u.id == user.id) {
            *stored = user.clone();
        } else {
            users.push(user.clone());
        }
        write_json(&mut self.store, USERS_KEY, &users)?;
        write_json(&mut self.store, AUTH_KEY, user)
    }

    fn sync_usage(&self, user: &mut User) -> Result<(), StoreError> {
        let stats = self.usage.user_usage(&user.id)?;
        user.scenarios_simulated = stats.scenarios_simulated;
        user.reports_exported = stats.reports_exported;
        Ok(())
    }

    pub fn sign_up(&mut self, email: &str, _password: &str, name: &str) -> Result<User, AccountError> {
        if self.users()?.iter().any(|u| u.email == email) {
            return Err(AccountError::UserExists(email.to_string()));
        }

        let user = User {
            id: generate_id(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            plan: Plan::Free,
            usage_count: 0,
            max_usage: self.max_usage,
            scenarios_simulated: 0,
            reports_exported: 0,
        };
        self.persist(&user)?;

        info!("signed up {} ({})", user.email, user.id);
        Ok(user)
    }

    pub fn sign_in(&mut self, email: &str, _password: &str) -> Result<User, AccountError> {
        let mut user = self
            .users()?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or_else(|| AccountError::UserNotFound(email.to_string()))?;

        self.sync_usage(&mut user)?;
        write_json(&mut self.store, AUTH_KEY, &user)?;

        info!("signed in {}", user.email);
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Result<(), AccountError> {
        Ok(self.store.remove(AUTH_KEY)?)
    }

    /// Signed-in user with counters synced from the usage tracker
    pub fn current_user(&self) -> Result<Option<User>, AccountError> {
        let Some(mut user) = read_json::<User, _>(&self.store, AUTH_KEY)? else {
            return Ok(None);
        };
        self.sync_usage(&mut user)?;
        Ok(Some(user))
    }

    fn require_user(&self) -> Result<User, AccountError> {
        self.current_user()?.ok_or(AccountError::NotSignedIn)
    }

    pub fn increment_usage(&mut self) -> Result<User, AccountError> {
        let mut user = self.require_user()?;
        user.usage_count += 1;
        self.persist(&user)?;
        Ok(user)
    }

    pub fn track_scenario_simulation(&mut self, scenario_name: Option<&str>) -> Result<User, AccountError> {
        let mut user = self.require_user()?;
        self.usage.track_scenario_simulation(&user.id, scenario_name)?;
        self.sync_usage(&mut user)?;
        write_json(&mut self.store, AUTH_KEY, &user)?;
        Ok(user)
    }

    pub fn track_report_export(&mut self, report_type: Option<&str>) -> Result<User, AccountError> {
        let mut user = self.require_user()?;
        self.usage.track_report_export(&user.id, report_type)?;
        self.sync_usage(&mut user)?;
        write_json(&mut self.store, AUTH_KEY, &user)?;
        Ok(user)
    }

    /// Fails with [`AccountError::UsageLimitReached`] once the allowance is used up
    pub fn check_export_allowed(&self) -> Result<User, AccountError> {
        let user = self.require_user()?;
        if !user.can_export() {
            warn!("export refused for {}: {}/{} used", user.email, user.usage_count, user.max_usage);
            return Err(AccountError::UsageLimitReached {
                used: user.usage_count,
                max: user.max_usage,
            });
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use approx::assert_relative_eq;

    fn service() -> AccountService<MemoryStore> {
        AccountService::new(MemoryStore::new(), UsageTracker::new(MemoryStore::new()))
    }

    #[test]
    fn test_sign_up_creates_free_user_and_session() {
        let mut accounts = service();
        let user = accounts.sign_up("cfo@example.com", "secret", "Asha").unwrap();

        assert_eq!(user.plan, Plan::Free);
        assert_eq!(user.max_usage, FREE_PLAN_MAX_USAGE);
        assert_eq!(user.id.len(), 9);
        assert_eq!(accounts.current_user().unwrap(), Some(user));
    }

    #[test]
    fn test_duplicate_sign_up_is_rejected() {
        let mut accounts = service();
        accounts.sign_up("cfo@example.com", "a", "Asha").unwrap();
        let err = accounts.sign_up("cfo@example.com", "b", "Other").unwrap_err();
        assert!(matches!(err, AccountError::UserExists(email) if email == "cfo@example.com"));
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut accounts = service();
        accounts.sign_up("cfo@example.com", "pw", "Asha").unwrap();
        accounts.sign_out().unwrap();
        assert!(accounts.current_user().unwrap().is_none());

        assert!(matches!(
            accounts.sign_in("ghost@example.com", "pw"),
            Err(AccountError::UserNotFound(_))
        ));
        let user = accounts.sign_in("cfo@example.com", "pw").unwrap();
        assert_eq!(user.name, "Asha");
    }

    #[test]
    fn test_tracking_requires_session_and_syncs_counters() {
        let mut accounts = service();
        assert!(matches!(accounts.track_scenario_simulation(None), Err(AccountError::NotSignedIn)));

        accounts.sign_up("cfo@example.com", "pw", "Asha").unwrap();
        accounts.track_scenario_simulation(Some("Lean")).unwrap();
        let user = accounts.track_report_export(None).unwrap();
        assert_eq!(user.scenarios_simulated, 1);
        assert_eq!(user.reports_exported, 1);

        accounts.sign_out().unwrap();
        let user = accounts.sign_in("cfo@example.com", "pw").unwrap();
        assert_eq!(user.scenarios_simulated, 1);
    }

    #[test]
    fn test_usage_limit_blocks_exports() {
        let mut accounts = AccountService::with_max_usage(MemoryStore::new(), UsageTracker::new(MemoryStore::new()), 2);
        accounts.sign_up("cfo@example.com", "pw", "Asha").unwrap();

        accounts.increment_usage().unwrap();
        assert!(accounts.check_export_allowed().is_ok());

        let user = accounts.increment_usage().unwrap();
        assert_eq!(user.remaining_usage(), 0);
        assert!(matches!(
            accounts.check_export_allowed(),
            Err(AccountError::UsageLimitReached { used: 2, max: 2 })
        ));

        // Usage counts survive a fresh sign-in
        accounts.sign_out().unwrap();
        assert_eq!(accounts.sign_in("cfo@example.com", "pw").unwrap().usage_count, 2);
    }

    #[test]
    fn test_usage_percent_is_capped() {
        let mut accounts = service();
        let mut user = accounts.sign_up("cfo@example.com", "pw", "Asha").unwrap();
        user.usage_count = 3;
        assert_relative_eq!(user.usage_percent(), 30.0);
        user.usage_count = 25;
        assert_relative_eq!(user.usage_percent(), 100.0);
        assert_eq!(user.remaining_usage(), 0);
    }
}
