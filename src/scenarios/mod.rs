//! Scenario persistence: quick saves, named scenarios and comparisons
//!
//! The finance engine never sees these types; they only store the plain
//! inputs and KPI values it produces.

mod compare;
mod manager;
mod quick_save;

pub use compare::{kpi_changes, lever_changes, KpiChange, KpiMetric, LeverChange, LeverField};
pub use manager::{
    CurrentScenario, ImportSummary, NewScenario, SavedScenario, ScenarioComparison, ScenarioError,
    ScenarioManager, ScenarioUpdate, DEFAULT_RECENT_LIMIT,
};
pub use quick_save::{QuickSave, QuickSaveEntry, DEFAULT_HISTORY_LIMIT};
