//! Side-by-side deltas between two scenarios

use crate::finance::Kpis;
use crate::inputs::Levers;
use serde::{Deserialize, Serialize};

/// KPI tracked in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiMetric {
    Revenue,
    Expenses,
    Burn,
    RunwayMonths,
    GrossProfit,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 5] = [
        KpiMetric::Revenue,
        KpiMetric::Expenses,
        KpiMetric::Burn,
        KpiMetric::RunwayMonths,
        KpiMetric::GrossProfit,
    ];

    pub fn value(&self, kpis: &Kpis) -> f64 {
        match self {
            KpiMetric::Revenue => kpis.revenue,
            KpiMetric::Expenses => kpis.expenses,
            KpiMetric::Burn => kpis.burn,
            KpiMetric::RunwayMonths => kpis.runway_months,
            KpiMetric::GrossProfit => kpis.gross_profit,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KpiMetric::Revenue => "Monthly Revenue",
            KpiMetric::Expenses => "Monthly Expenses",
            KpiMetric::Burn => "Monthly Burn Rate",
            KpiMetric::RunwayMonths => "Cash Runway",
            KpiMetric::GrossProfit => "Gross Profit",
        }
    }
}

/// Lever tracked in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeverField {
    AddHires,
    CostPerHire,
    DeltaMarketing,
    DeltaInfra,
    PriceChangePct,
}

impl LeverField {
    pub const ALL: [LeverField; 5] = [
        LeverField::AddHires,
        LeverField::CostPerHire,
        LeverField::DeltaMarketing,
        LeverField::DeltaInfra,
        LeverField::PriceChangePct,
    ];

    pub fn value(&self, levers: &Levers) -> f64 {
        match self {
            LeverField::AddHires => levers.add_hires as f64,
            LeverField::CostPerHire => levers.cost_per_hire,
            LeverField::DeltaMarketing => levers.delta_marketing,
            LeverField::DeltaInfra => levers.delta_infra,
            LeverField::PriceChangePct => levers.price_change_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiChange {
    pub metric: KpiMetric,
    pub baseline: f64,
    pub current: f64,
    pub change: f64,
    /// Percent change relative to baseline; 0 when the baseline is 0
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverChange {
    pub lever: LeverField,
    pub baseline: f64,
    pub current: f64,
    pub change: f64,
}

pub fn kpi_changes(baseline: &Kpis, current: &Kpis) -> Vec<KpiChange> {
    KpiMetric::ALL
        .iter()
        .map(|&metric| {
            let b = metric.value(baseline);
            let c = metric.value(current);
            let change = c - b;
            KpiChange {
                metric,
                baseline: b,
                current: c,
                change,
                change_percent: if b != 0.0 { change / b * 100.0 } else { 0.0 },
            }
        })
        .collect()
}

pub fn lever_changes(baseline: &Levers, current: &Levers) -> Vec<LeverChange> {
    LeverField::ALL
        .iter()
        .map(|&lever| {
            let b = lever.value(baseline);
            let c = lever.value(current);
            LeverChange { lever, baseline: b, current: c, change: c - b }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::compute_kpis;
    use crate::inputs::BaseInputs;
    use approx::assert_relative_eq;

    #[test]
    fn test_kpi_changes_for_hiring() {
        let base = BaseInputs::default();
        let before = compute_kpis(&base, &Levers::default(), None);
        let after = compute_kpis(&base, &Levers { add_hires: 2, ..Default::default() }, None);

        let changes = kpi_changes(&before, &after);
        assert_eq!(changes.len(), 5);

        let expenses = changes.iter().find(|c| c.metric == KpiMetric::Expenses).unwrap();
        assert_relative_eq!(expenses.change, 100_000.0);
        assert_relative_eq!(expenses.change_percent, 100_000.0 / 300_000.0 * 100.0);

        // Burn goes from 0 to 50,000: percent is reported as 0
        let burn = changes.iter().find(|c| c.metric == KpiMetric::Burn).unwrap();
        assert_relative_eq!(burn.change, 50_000.0);
        assert_eq!(burn.change_percent, 0.0);
    }

    #[test]
    fn test_lever_changes_cover_every_lever() {
        let before = Levers::default();
        let after = Levers { add_hires: 1, price_change_pct: 0.05, ..Default::default() };

        let changes = lever_changes(&before, &after);
        assert_eq!(changes.len(), 5);
        assert_eq!(changes[0].lever, LeverField::AddHires);
        assert_eq!(changes[0].change, 1.0);
        assert_eq!(changes[1].change, 0.0);
        assert_eq!(changes[4].change, 0.05);
    }
}
