//! Scenario input records: baseline position, levers and the live-data overlay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Baseline financial position of the business
///
/// All amounts are monthly figures in rupees except `cash`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInputs {
    /// Cash on hand
    pub cash: f64,

    /// Recurring monthly revenue before levers and live adjustments
    pub monthly_revenue: f64,

    /// Recurring monthly expenses, excluding new-hire payroll and live deltas
    pub monthly_expenses: f64,

    /// Current headcount (informational only)
    pub team_size: u32,

    /// Fraction of revenue retained after direct costs (0..1)
    pub gross_margin_pct: f64,
}

impl Default for BaseInputs {
    fn default() -> Self {
        Self {
            cash: 1_000_000.0,
            monthly_revenue: 350_000.0,
            monthly_expenses: 300_000.0,
            team_size: 6,
            gross_margin_pct: 0.65,
        }
    }
}

/// User-adjustable deltas applied on top of [`BaseInputs`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Levers {
    /// Additional headcount to simulate
    pub add_hires: u32,

    /// Fully-loaded monthly cost per additional hire
    pub cost_per_hire: f64,

    /// Change to monthly marketing spend (+/-)
    pub delta_marketing: f64,

    /// Change to monthly infrastructure spend (+/-)
    pub delta_infra: f64,

    /// Price adjustment, e.g. 0.10 for +10%
    pub price_change_pct: f64,
}

impl Levers {
    /// Monthly payroll added by the simulated hires
    pub fn new_hire_payroll(&self) -> f64 {
        self.add_hires as f64 * self.cost_per_hire
    }
}

impl Default for Levers {
    fn default() -> Self {
        Self {
            add_hires: 0,
            cost_per_hire: 50_000.0,
            delta_marketing: 0.0,
            delta_infra: 0.0,
            price_change_pct: 0.0,
        }
    }
}

/// Snapshot of the simulated live-data feed
///
/// Produced by [`crate::live::LiveFeed`]; read-only for the finance engine,
/// which applies it only while `is_connected` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveDataOverlay {
    /// Multiplier applied to monthly revenue (1.0 = no change)
    pub revenue_multiplier: f64,

    /// Amount added to monthly expenses
    pub expenses_delta: f64,

    pub is_connected: bool,

    /// Number of updates the feed has produced since the last reset
    #[serde(default)]
    pub update_count: u32,

    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl LiveDataOverlay {
    /// Connected overlay with the given adjustments and no recorded updates
    pub fn connected(revenue_multiplier: f64, expenses_delta: f64) -> Self {
        Self {
            revenue_multiplier,
            expenses_delta,
            is_connected: true,
            ..Default::default()
        }
    }

    /// Whether the finance engine should apply this overlay
    pub fn is_active(&self) -> bool {
        self.is_connected
    }
}

impl Default for LiveDataOverlay {
    fn default() -> Self {
        Self {
            revenue_multiplier: 1.0,
            expenses_delta: 0.0,
            is_connected: false,
            update_count: 0,
            last_update: None,
        }
    }
}

/// Baseline plus levers, the unit a scenario file describes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInputs {
    #[serde(alias = "baseInputs")]
    pub base: BaseInputs,
    pub levers: Levers,
}
