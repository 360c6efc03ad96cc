//! Forward cash projection at a constant monthly net flow

use super::kpis::{floor_at, Kpis};
use crate::inputs::BaseInputs;

/// Length of the planner's standard projection
pub const PROJECTION_MONTHS: usize = 12;

/// Longest horizon [`project_cash`] will produce (100 years)
pub const MAX_PROJECTION_MONTHS: usize = 1_200;

/// Twelve monthly cash balances starting from today's cash
///
/// Index 0 is `base.cash`; every later month adds the same net cash flow
/// (`revenue - expenses`) and floors the balance at zero.
pub fn project_cash_12(base: &BaseInputs, kpis: &Kpis) -> [f64; PROJECTION_MONTHS] {
    let net_cash_flow = kpis.net_cash_flow();
    let mut balances = [0.0; PROJECTION_MONTHS];
    balances[0] = base.cash;

    for i in 1..PROJECTION_MONTHS {
        balances[i] = next_balance(balances[i - 1], net_cash_flow);
    }

    balances
}

/// Same projection over an arbitrary horizon
///
/// `months == 0` yields an empty vector; `months == 12` equals
/// [`project_cash_12`]. Horizons beyond [`MAX_PROJECTION_MONTHS`] are cut
/// to that length.
pub fn project_cash(base: &BaseInputs, kpis: &Kpis, months: usize) -> Vec<f64> {
    let months = months.min(MAX_PROJECTION_MONTHS);
    let net_cash_flow = kpis.net_cash_flow();
    let mut balances: Vec<f64> = Vec::with_capacity(months);

    for month in 0..months {
        let balance = match month {
            0 => base.cash,
            _ => next_balance(balances[month - 1], net_cash_flow),
        };
        balances.push(balance);
    }

    balances
}

/// First month index whose balance has hit zero, if any
pub fn months_until_cash_out(balances: &[f64]) -> Option<usize> {
    balances.iter().position(|&b| b <= 0.0)
}

fn next_balance(previous: f64, net_cash_flow: f64) -> f64 {
    floor_at(previous + net_cash_flow, 0.0)
}
