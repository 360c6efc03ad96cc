//! CFO Helper - What-if financial scenario engine for startups
//!
//! This library provides:
//! - KPI calculation (burn, runway, gross profit) from baseline figures and levers
//! - 12-month cash projections and plain-language scenario narratives
//! - Rupee formatting with Indian digit grouping
//! - A simulated live revenue/expense feed on a tokio timer
//! - Scenario storage, comparison, usage tracking and mock accounts
//! - Batch evaluation of lever sets and report export

pub mod finance;
pub mod inputs;
pub mod live;
pub mod store;
pub mod scenarios;
pub mod usage;
pub mod accounts;
pub mod report;
pub mod runner;
pub mod config;

// Re-export commonly used types
pub use finance::{
    compute_kpis, format_compact_currency, format_currency, generate_narrative, project_cash, project_cash_12, Kpis,
};
pub use inputs::{BaseInputs, Levers, LiveDataOverlay, Preset, ScenarioInputs};
pub use live::{FeedHandle, LiveFeed};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use scenarios::{QuickSave, ScenarioManager};
pub use usage::UsageTracker;
pub use accounts::AccountService;
pub use report::ScenarioReport;
pub use runner::ScenarioRunner;
pub use config::PlannerConfig;
