//! KPI calculation for a single scenario

use crate::inputs::{BaseInputs, Levers, LiveDataOverlay};
use serde::{Deserialize, Serialize};

/// Fraction of a price change that carries through to revenue
/// (+10% price -> +5% revenue)
pub const ELASTICITY: f64 = 0.5;

/// Share of base expenses treated as existing payroll
pub const BASE_PAYROLL_RATIO: f64 = 0.6;

/// Share of new-hire cost charged against gross profit (ramp-up allocation)
pub const NEW_HIRE_GROSS_PROFIT_SHARE: f64 = 0.5;

/// Floor applied to burn before dividing cash by it
pub const MIN_BURN_DIVISOR: f64 = 1.0;

/// Derived monthly metrics for one (base, levers, overlay) triple
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Elasticity-adjusted monthly revenue
    pub revenue: f64,

    /// Monthly expenses including lever deltas and new-hire payroll
    pub expenses: f64,

    /// Estimated base payroll plus new hires
    pub payroll: f64,

    /// Net monthly cash outflow, floored at zero
    pub burn: f64,

    /// Months of cash left at the current burn
    pub runway_months: f64,

    /// Revenue after margin, lever spend and half of new-hire cost
    pub gross_profit: f64,

    // Live overlay echo (zero / false when no connected overlay)
    #[serde(default)]
    pub live_revenue_adjustment: f64,
    #[serde(default)]
    pub live_expenses_adjustment: f64,
    #[serde(default)]
    pub is_live_data_active: bool,
}

impl Kpis {
    /// Signed monthly cash movement (positive when profitable)
    ///
    /// Unlike `burn` this is not floored, so the cash projection can grow.
    pub fn net_cash_flow(&self) -> f64 {
        self.revenue - self.expenses
    }
}

/// Compute the full KPI set for one scenario
///
/// Pure and total over finite inputs; nothing is validated. The overlay is
/// applied only when it is connected.
pub fn compute_kpis(base: &BaseInputs, levers: &Levers, overlay: Option<&LiveDataOverlay>) -> Kpis {
    let base_payroll = BASE_PAYROLL_RATIO * base.monthly_expenses;
    let new_hire_payroll = levers.new_hire_payroll();
    let payroll = base_payroll + new_hire_payroll;

    let live = overlay.filter(|o| o.is_active());
    let (adjusted_revenue, adjusted_expenses) = match live {
        Some(o) => (
            base.monthly_revenue * o.revenue_multiplier,
            base.monthly_expenses + o.expenses_delta,
        ),
        None => (base.monthly_revenue, base.monthly_expenses),
    };

    let revenue = adjusted_revenue * (1.0 + levers.price_change_pct * ELASTICITY);
    let expenses = adjusted_expenses + levers.delta_marketing + levers.delta_infra + new_hire_payroll;

    let burn = floor_at(expenses - revenue, 0.0);
    let runway_months = base.cash / floor_at(burn, MIN_BURN_DIVISOR);

    let gross_profit = revenue * base.gross_margin_pct
        - (levers.delta_marketing + levers.delta_infra + new_hire_payroll * NEW_HIRE_GROSS_PROFIT_SHARE);

    Kpis {
        revenue,
        expenses,
        payroll,
        burn,
        runway_months,
        gross_profit,
        live_revenue_adjustment: if live.is_some() { adjusted_revenue - base.monthly_revenue } else { 0.0 },
        live_expenses_adjustment: live.map_or(0.0, |o| o.expenses_delta),
        is_live_data_active: live.is_some(),
    }
}

/// `max(value, floor)` that keeps NaN instead of swallowing it
pub(crate) fn floor_at(value: f64, floor: f64) -> f64 {
    if value.is_nan() || value >= floor {
        value
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f64 = 1e-9;

    fn base() -> BaseInputs {
        BaseInputs::default()
    }

    #[test]
    fn test_elasticity_scenario() {
        let levers = Levers { price_change_pct: 0.10, ..Default::default() };
        let kpis = compute_kpis(&base(), &levers, None);

        assert_relative_eq!(kpis.revenue, 367_500.0, max_relative = TOL);
        assert_relative_eq!(kpis.expenses, 300_000.0, max_relative = TOL);
        assert_eq!(kpis.burn, 0.0);
        assert_relative_eq!(kpis.runway_months, 1_000_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.gross_profit, 238_875.0, max_relative = TOL);
        assert_relative_eq!(kpis.payroll, 180_000.0, max_relative = TOL);
    }

    #[test]
    fn test_hiring_scenario() {
        let levers = Levers { add_hires: 2, ..Default::default() };
        let kpis = compute_kpis(&base(), &levers, None);

        assert_relative_eq!(kpis.revenue, 350_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.expenses, 400_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.burn, 50_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.runway_months, 20.0, max_relative = TOL);
        assert_relative_eq!(kpis.gross_profit, 177_500.0, max_relative = TOL);
        assert_relative_eq!(kpis.payroll, 280_000.0, max_relative = TOL);
    }

    #[test]
    fn test_connected_overlay_adjusts_revenue_and_expenses() {
        let overlay = LiveDataOverlay::connected(1.1, 20_000.0);
        let kpis = compute_kpis(&base(), &Levers::default(), Some(&overlay));

        assert_relative_eq!(kpis.revenue, 385_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.expenses, 320_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.live_revenue_adjustment, 35_000.0, max_relative = TOL);
        assert_eq!(kpis.live_expenses_adjustment, 20_000.0);
        assert!(kpis.is_live_data_active);
        // Payroll estimate stays on unadjusted base expenses
        assert_relative_eq!(kpis.payroll, 180_000.0, max_relative = TOL);
    }

    #[test]
    fn test_disconnected_overlay_is_ignored() {
        let levers = Levers { add_hires: 1, delta_marketing: 10_000.0, ..Default::default() };
        let overlay = LiveDataOverlay { is_connected: false, ..LiveDataOverlay::connected(0.8, 90_000.0) };

        assert_eq!(
            compute_kpis(&base(), &levers, Some(&overlay)),
            compute_kpis(&base(), &levers, None)
        );
    }

    #[test]
    fn test_small_burn_uses_divisor_floor() {
        // burn of 0.5 is below the floor, so runway equals cash
        let b = BaseInputs { monthly_revenue: 299_999.5, ..base() };
        let kpis = compute_kpis(&b, &Levers::default(), None);
        assert_relative_eq!(kpis.burn, 0.5, max_relative = TOL);
        assert_eq!(kpis.runway_months, b.cash);
    }

    #[test]
    fn test_negative_levers_and_out_of_range_margin() {
        let b = BaseInputs { gross_margin_pct: 1.5, ..base() };
        let levers = Levers {
            delta_marketing: -20_000.0,
            delta_infra: -10_000.0,
            price_change_pct: -0.05,
            ..Default::default()
        };
        let kpis = compute_kpis(&b, &levers, None);

        assert_relative_eq!(kpis.revenue, 341_250.0, max_relative = TOL);
        assert_relative_eq!(kpis.expenses, 270_000.0, max_relative = TOL);
        assert_relative_eq!(kpis.gross_profit, 341_250.0 * 1.5 + 30_000.0, max_relative = TOL);
    }

    #[test]
    fn test_nan_propagates() {
        let b = BaseInputs { monthly_revenue: f64::NAN, ..base() };
        let kpis = compute_kpis(&b, &Levers::default(), None);
        assert!(kpis.revenue.is_nan());
        assert!(kpis.burn.is_nan());
        assert!(kpis.runway_months.is_nan());
    }

    #[test]
    fn test_floor_at() {
        assert_eq!(floor_at(-3.0, 0.0), 0.0);
        assert_eq!(floor_at(3.0, 1.0), 3.0);
        assert!(floor_at(f64::NAN, 0.0).is_nan());
    }
}
