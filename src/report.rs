//! Scenario report: KPIs, inputs, levers and the cash projection in one record
//!
//! Rendered as plain text or JSON, with the projection also available as CSV.
//! [`export_with_limits`] gates an export on the signed-in user's allowance.

use crate::accounts::{AccountError, AccountService, User};
use crate::finance::format::to_fixed;
use crate::finance::{
    compute_kpis, format_currency, format_percent, generate_narrative, months_until_cash_out, project_cash, Kpis,
};
use crate::inputs::{BaseInputs, Levers, LiveDataOverlay};
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REPORT_TITLE: &str = "CFO Helper - Financial Scenario Report";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write projection csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Account(#[from] AccountError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    /// Label recorded with the export billing event
    pub fn label(&self) -> &'static str {
        match self {
            ReportFormat::Text => "TXT",
            ReportFormat::Json => "JSON",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub base_inputs: BaseInputs,
    pub levers: Levers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<LiveDataOverlay>,
    pub kpis: Kpis,
    pub projection: Vec<f64>,
    /// Zero-based month at which the projection first hits zero cash
    pub cash_out_month: Option<usize>,
    /// Narrative against the default levers
    pub narrative: String,
}

impl ScenarioReport {
    pub fn build(
        name: impl Into<String>,
        base: &BaseInputs,
        levers: &Levers,
        overlay: Option<&LiveDataOverlay>,
        months: usize,
    ) -> Self {
        let kpis = compute_kpis(base, levers, overlay);
        let projection = project_cash(base, &kpis, months);

        Self {
            name: name.into(),
            created_at: Utc::now(),
            base_inputs: *base,
            levers: *levers,
            overlay: overlay.copied(),
            kpis,
            cash_out_month: months_until_cash_out(&projection),
            narrative: generate_narrative(base, &Levers::default(), levers, overlay),
            projection,
        }
    }

    /// Suggested file name, e.g. `cfo-helper-lean-mode-2024-05-01.txt`
    pub fn file_name(&self, format: ReportFormat) -> String {
        let slug = self
            .name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("cfo-helper-{}-{}.{}", slug, self.created_at.format("%Y-%m-%d"), format.extension())
    }

    /// `target` itself, or [`Self::file_name`] inside it when it is a directory
    pub fn output_path(&self, target: &Path, format: ReportFormat) -> PathBuf {
        if target.is_dir() {
            target.join(self.file_name(format))
        } else {
            target.to_path_buf()
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let k = &self.kpis;
        let b = &self.base_inputs;
        let l = &self.levers;

        // Writing into a String cannot fail
        let _ = writeln!(out, "{REPORT_TITLE}");
        let _ = writeln!(out, "Scenario: {}", self.name);
        let _ = writeln!(out, "Generated: {}", self.created_at.format("%Y-%m-%d"));

        section(&mut out, "Key Performance Indicators");
        line(&mut out, "Monthly Revenue", format_currency(k.revenue));
        line(&mut out, "Monthly Expenses", format_currency(k.expenses));
        line(&mut out, "Monthly Burn Rate", format_currency(k.burn));
        line(&mut out, "Cash Runway", format!("{} months", to_fixed(k.runway_months, 1)));
        line(&mut out, "Gross Profit", format_currency(k.gross_profit));
        line(&mut out, "Payroll", format_currency(k.payroll));
        if k.is_live_data_active {
            line(&mut out, "Live Revenue Adjustment", signed_currency(k.live_revenue_adjustment));
            line(&mut out, "Live Expenses Adjustment", signed_currency(k.live_expenses_adjustment));
        }

        section(&mut out, "Base Financial Inputs");
        line(&mut out, "Starting Cash", format_currency(b.cash));
        line(&mut out, "Monthly Revenue", format_currency(b.monthly_revenue));
        line(&mut out, "Monthly Expenses", format_currency(b.monthly_expenses));
        line(&mut out, "Team Size", format!("{} people", b.team_size));
        line(&mut out, "Gross Margin", format!("{}%", to_fixed(b.gross_margin_pct * 100.0, 1)));

        section(&mut out, "Financial Levers");
        line(&mut out, "Additional Hires", format!("{} @ {}/month", l.add_hires, format_currency(l.cost_per_hire)));
        line(&mut out, "Marketing Spend", format!("{}/month", signed_currency(l.delta_marketing)));
        line(&mut out, "Infrastructure Costs", format!("{}/month", signed_currency(l.delta_infra)));
        line(&mut out, "Pricing Adjustment", format_percent(l.price_change_pct));

        section(&mut out, "Cash Projection");
        for (month, cash) in self.projection.iter().enumerate() {
            let _ = writeln!(out, "  Month {:<3} {}", month + 1, format_currency(*cash));
        }
        match self.cash_out_month {
            Some(month) => {
                let _ = writeln!(out, "  Cash depleted in month {}", month + 1);
            }
            None => {
                let _ = writeln!(out, "  Cash lasts the full {} months", self.projection.len());
            }
        }

        section(&mut out, "Summary");
        let _ = writeln!(out, "  {}", self.narrative);
        out
    }

    /// `Month,Cash` rows, months numbered from 1
    pub fn write_projection_csv<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["Month", "Cash"])?;
        for (month, cash) in self.projection.iter().enumerate() {
            csv_writer.write_record([(month + 1).to_string(), format!("{cash:.2}")])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn line(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "  {label}: {value}");
}

fn signed_currency(amount: f64) -> String {
    if amount > 0.0 {
        format!("+{}", format_currency(amount))
    } else {
        format_currency(amount)
    }
}

/// Render `report` for the signed-in user, charging one unit of their allowance
///
/// Refused with [`AccountError::UsageLimitReached`] once the allowance is
/// used up; on success the export is also recorded with the usage tracker.
pub fn export_with_limits<S: KeyValueStore>(
    accounts: &mut AccountService<S>,
    report: &ScenarioReport,
    format: ReportFormat,
) -> Result<(String, User), ReportError> {
    accounts.check_export_allowed()?;
    let rendered = report.render(format)?;

    accounts.increment_usage()?;
    let user = accounts.track_report_export(Some(format.label()))?;

    info!(
        "exported report {:?} as {} for {} ({}/{})",
        report.name,
        format.label(),
        user.email,
        user.usage_count,
        user.max_usage
    );
    Ok((rendered, user))
}
