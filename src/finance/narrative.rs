//! Plain-language summary of what changed between two lever settings

use super::format::{format_compact_currency, to_fixed};
use super::kpis::compute_kpis;
use crate::inputs::{BaseInputs, LiveDataOverlay, Levers};

/// Revenue-multiplier deviation (in percent) worth mentioning
const LIVE_REVENUE_THRESHOLD_PCT: f64 = 1.0;

/// Live expense delta (in rupees) worth mentioning
const LIVE_EXPENSES_THRESHOLD: f64 = 1_000.0;

/// Describe the move from `before` to `after` against the same baseline
///
/// `before` is evaluated without the overlay and `after` with it. Clauses
/// appear in a fixed order: live data, hiring, marketing, runway. The runway
/// clause is always present.
pub fn generate_narrative(
    base: &BaseInputs,
    before: &Levers,
    after: &Levers,
    overlay: Option<&LiveDataOverlay>,
) -> String {
    let kpis_before = compute_kpis(base, before, None);
    let kpis_after = compute_kpis(base, after, overlay);

    let hire_delta = after.add_hires as i64 - before.add_hires as i64;
    let marketing_delta = after.delta_marketing - before.delta_marketing;
    let runway_change = kpis_after.runway_months - kpis_before.runway_months;

    let mut narrative = String::new();

    if let Some(live) = overlay.filter(|o| o.is_connected && o.update_count > 0) {
        narrative.push_str(&live_clauses(live));
    }

    if hire_delta != 0 {
        let payroll_impact = hire_delta as f64 * after.cost_per_hire;
        let count = hire_delta.unsigned_abs();
        narrative.push_str(&format!(
            "{} {} {} {} {}/mo in payroll. ",
            if hire_delta > 0 { "Hiring" } else { "Reducing" },
            count,
            if count == 1 { "person" } else { "people" },
            if hire_delta > 0 { "adds" } else { "saves" },
            format_compact_currency(payroll_impact.abs()),
        ));
    }

    if marketing_delta != 0.0 {
        narrative.push_str(&format!(
            "Marketing spend {} by {}/mo. ",
            if marketing_delta > 0.0 { "increases" } else { "decreases" },
            format_compact_currency(marketing_delta.abs()),
        ));
    }

    narrative.push_str(&format!(
        "Cash runway changes from {} to {} months",
        to_fixed(kpis_before.runway_months, 1),
        to_fixed(kpis_after.runway_months, 1),
    ));

    if runway_change > 0.0 {
        narrative.push_str(&format!(" (+{} months).", to_fixed(runway_change, 1)));
    } else if runway_change < 0.0 {
        narrative.push_str(&format!(" ({} months).", to_fixed(runway_change, 1)));
    } else {
        narrative.push_str(" (no change).");
    }

    narrative
}

fn live_clauses(live: &LiveDataOverlay) -> String {
    let mut text = String::new();

    let revenue_impact = (live.revenue_multiplier - 1.0) * 100.0;
    if revenue_impact.abs() > LIVE_REVENUE_THRESHOLD_PCT {
        text.push_str(&format!(
            "Live data shows revenue {} by {}%. ",
            if revenue_impact > 0.0 { "increased" } else { "decreased" },
            to_fixed(revenue_impact.abs(), 1),
        ));
    }

    if live.expenses_delta.abs() > LIVE_EXPENSES_THRESHOLD {
        text.push_str(&format!(
            "Expenses {} by {} from live data. ",
            if live.expenses_delta > 0.0 { "increased" } else { "decreased" },
            format_compact_currency(live.expenses_delta.abs()),
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updated_overlay(multiplier: f64, delta: f64) -> LiveDataOverlay {
        LiveDataOverlay { update_count: 3, ..LiveDataOverlay::connected(multiplier, delta) }
    }

    #[test]
    fn test_identical_levers_report_no_change() {
        let base = BaseInputs::default();
        let levers = Levers { add_hires: 2, delta_marketing: 40_000.0, ..Default::default() };
        let text = generate_narrative(&base, &levers, &levers, None);

        assert!(text.ends_with("(no change)."), "{text}");
        assert!(!text.contains("Hiring"));
        assert!(!text.contains("Marketing"));
        assert_eq!(text, "Cash runway changes from 11.1 to 11.1 months (no change).");
    }

    #[test]
    fn test_hiring_clause_and_runway_drop() {
        let base = BaseInputs { monthly_revenue: 250_000.0, ..Default::default() };
        let before = Levers::default();
        let after = Levers { add_hires: 2, ..Default::default() };
        let text = generate_narrative(&base, &before, &after, None);

        // burn 50,000 -> 150,000
        assert_eq!(
            text,
            "Hiring 2 people adds ₹1.0L/mo in payroll. \
             Cash runway changes from 20.0 to 6.7 months (-13.3 months)."
        );
    }

    #[test]
    fn test_reducing_one_person_and_marketing_cut() {
        let base = BaseInputs { monthly_revenue: 250_000.0, ..Default::default() };
        let before = Levers { add_hires: 1, delta_marketing: 30_000.0, ..Default::default() };
        let after = Levers { add_hires: 0, delta_marketing: 5_000.0, ..Default::default() };
        let text = generate_narrative(&base, &before, &after, None);

        assert!(text.starts_with("Reducing 1 person saves ₹50.0K/mo in payroll. "), "{text}");
        assert!(text.contains("Marketing spend decreases by ₹25.0K/mo. "), "{text}");
        assert!(text.ends_with(" (+10.5 months)."), "{text}");
    }

    #[test]
    fn test_live_clauses_come_first() {
        let base = BaseInputs::default();
        let overlay = updated_overlay(1.05, -12_000.0);
        let text = generate_narrative(&base, &Levers::default(), &Levers::default(), Some(&overlay));

        assert!(
            text.starts_with(
                "Live data shows revenue increased by 5.0%. Expenses decreased by ₹12.0K from live data. "
            ),
            "{text}"
        );
        // Both sides are profitable, so runway is cash / 1
        assert!(text.ends_with("(no change)."), "{text}");
    }

    #[test]
    fn test_live_clauses_need_updates_and_thresholds() {
        let base = BaseInputs::default();
        let levers = Levers::default();

        let fresh = LiveDataOverlay::connected(1.5, 50_000.0);
        let text = generate_narrative(&base, &levers, &levers, Some(&fresh));
        assert!(!text.contains("Live data"));

        let small = updated_overlay(1.005, 900.0);
        let text = generate_narrative(&base, &levers, &levers, Some(&small));
        assert!(!text.contains("Live data"));
        assert!(!text.contains("from live data"));
    }

    #[test]
    fn test_narrative_is_deterministic() {
        let base = BaseInputs::default();
        let before = Levers::default();
        let after = Levers { add_hires: 3, delta_marketing: -10_000.0, ..Default::default() };
        let overlay = updated_overlay(0.9, 20_000.0);

        assert_eq!(
            generate_narrative(&base, &before, &after, Some(&overlay)),
            generate_narrative(&base, &before, &after, Some(&overlay))
        );
    }
}
