//! Billing-event tracking for scenario simulations and report exports
//!
//! Every tracked action appends a [`BillingEvent`] and bumps the per-user
//! [`UsageStats`]. Both collections live in the injected store.

use crate::store::{read_json, write_json, KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

const EVENTS_KEY: &str = "flexprice_events";
const USAGE_KEY: &str = "flexprice_usage";

pub const DEFAULT_SCENARIO_NAME: &str = "Unnamed Scenario";
pub const DEFAULT_REPORT_TYPE: &str = "PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SimulateScenario,
    ExportReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingEvent {
    pub event_type: EventType,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
}

/// Per-user counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub scenarios_simulated: u32,
    pub reports_exported: u32,
    pub last_updated: DateTime<Utc>,
}

impl UsageStats {
    fn empty() -> Self {
        Self {
            scenarios_simulated: 0,
            reports_exported: 0,
            last_updated: Utc::now(),
        }
    }
}

/// System-wide totals over the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalUsage {
    pub total_scenarios: usize,
    pub total_exports: usize,
    pub total_users: usize,
}

pub struct UsageTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> UsageTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn events(&self) -> Result<Vec<BillingEvent>, StoreError> {
        Ok(read_json(&self.store, EVENTS_KEY)?.unwrap_or_default())
    }

    fn usage_map(&self) -> Result<BTreeMap<String, UsageStats>, StoreError> {
        Ok(read_json(&self.store, USAGE_KEY)?.unwrap_or_default())
    }

    fn record(&mut self, event: BillingEvent) -> Result<(), StoreError> {
        let mut usage = self.usage_map()?;
        let stats = usage.entry(event.user_id.clone()).or_insert_with(UsageStats::empty);
        match event.event_type {
            EventType::SimulateScenario => stats.scenarios_simulated += 1,
            EventType::ExportReport => stats.reports_exported += 1,
        }
        stats.last_updated = event.timestamp;

        let mut events = self.events()?;
        debug!("billing event {:?} for {}", event.event_type, event.user_id);
        events.push(event);

        write_json(&mut self.store, EVENTS_KEY, &events)?;
        write_json(&mut self.store, USAGE_KEY, &usage)
    }

    pub fn track_scenario_simulation(&mut self, user_id: &str, scenario_name: Option<&str>) -> Result<(), StoreError> {
        self.record(BillingEvent {
            event_type: EventType::SimulateScenario,
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            scenario_name: Some(scenario_name.unwrap_or(DEFAULT_SCENARIO_NAME).to_string()),
            report_type: None,
        })
    }

    pub fn track_report_export(&mut self, user_id: &str, report_type: Option<&str>) -> Result<(), StoreError> {
        self.record(BillingEvent {
            event_type: EventType::ExportReport,
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            scenario_name: None,
            report_type: Some(report_type.unwrap_or(DEFAULT_REPORT_TYPE).to_string()),
        })
    }

    /// Counters for a user; zeroed stats when nothing was tracked yet
    pub fn user_usage(&self, user_id: &str) -> Result<UsageStats, StoreError> {
        Ok(self.usage_map()?.remove(user_id).unwrap_or_else(UsageStats::empty))
    }

    pub fn user_events(&self, user_id: &str) -> Result<Vec<BillingEvent>, StoreError> {
        Ok(self.events()?.into_iter().filter(|e| e.user_id == user_id).collect())
    }

    /// Zero a user's counters; the event log is kept
    pub fn reset_user_usage(&mut self, user_id: &str) -> Result<(), StoreError> {
        let mut usage = self.usage_map()?;
        usage.insert(user_id.to_string(), UsageStats::empty());
        write_json(&mut self.store, USAGE_KEY, &usage)
    }

    pub fn total_usage(&self) -> Result<TotalUsage, StoreError> {
        let events = self.events()?;
        let count = |kind: EventType| events.iter().filter(|e| e.event_type == kind).count();
        let users: HashSet<&str> = events.iter().map(|e| e.user_id.as_str()).collect();

        Ok(TotalUsage {
            total_scenarios: count(EventType::SimulateScenario),
            total_exports: count(EventType::ExportReport),
            total_users: users.len(),
        })
    }
}
