//! Evaluate every preset (plus optional CSV lever rows) against one baseline
//!
//! Outputs one summary row per lever set for spreadsheet comparison

use anyhow::{Context, Result};
use cfo_helper::inputs::{load_lever_rows, load_scenario_json};
use cfo_helper::finance::months_until_cash_out;
use cfo_helper::runner::RunResult;
use cfo_helper::{BaseInputs, Levers, Preset, ScenarioRunner};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "preset_sweep")]
struct Args {
    /// Scenario JSON whose `base` is used (default: planner defaults)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Extra lever sets: Name,AddHires,CostPerHire,DeltaMarketing,DeltaInfra,PriceChangePct
    #[arg(long)]
    levers: Option<PathBuf>,

    #[arg(long, default_value = "preset_sweep_output.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 12)]
    months: usize,
}

/// One output row
#[derive(Debug, Serialize)]
struct SweepRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "AddHires")]
    add_hires: u32,
    #[serde(rename = "DeltaMarketing")]
    delta_marketing: f64,
    #[serde(rename = "DeltaInfra")]
    delta_infra: f64,
    #[serde(rename = "PriceChangePct")]
    price_change_pct: f64,
    #[serde(rename = "Revenue")]
    revenue: f64,
    #[serde(rename = "Expenses")]
    expenses: f64,
    #[serde(rename = "Burn")]
    burn: f64,
    #[serde(rename = "RunwayMonths")]
    runway_months: f64,
    #[serde(rename = "GrossProfit")]
    gross_profit: f64,
    #[serde(rename = "EndingCash")]
    ending_cash: f64,
    /// 1-based month the cash runs out, empty when it lasts
    #[serde(rename = "CashOutMonth")]
    cash_out_month: Option<usize>,
}

impl<'a> SweepRow<'a> {
    fn new(name: &'a str, result: &RunResult) -> Self {
        let l = &result.levers;
        let k = &result.kpis;
        Self {
            name,
            add_hires: l.add_hires,
            delta_marketing: l.delta_marketing,
            delta_infra: l.delta_infra,
            price_change_pct: l.price_change_pct,
            revenue: k.revenue,
            expenses: k.expenses,
            burn: k.burn,
            runway_months: k.runway_months,
            gross_profit: k.gross_profit,
            ending_cash: result.projection.last().copied().unwrap_or(0.0),
            cash_out_month: months_until_cash_out(&result.projection).map(|m| m + 1),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let base = match &args.scenario {
        Some(path) => load_scenario_json(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?
            .base,
        None => BaseInputs::default(),
    };

    let mut named: Vec<(String, Levers)> = vec![("Baseline".to_string(), Levers::default())];
    named.extend(Preset::ALL.iter().map(|p| (p.name().to_string(), p.levers())));
    if let Some(path) = &args.levers {
        let rows = load_lever_rows(path).with_context(|| format!("Failed to load levers {}", path.display()))?;
        println!("Loaded {} lever rows from {}", rows.len(), path.display());
        named.extend(rows);
    }

    println!("Evaluating {} lever sets...", named.len());
    let runner = ScenarioRunner::new(base);
    let lever_sets: Vec<Levers> = named.iter().map(|(_, l)| *l).collect();
    let results = runner.run_batch_detailed(&lever_sets, args.months);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for ((name, _), result) in named.iter().zip(&results) {
        writer.serialize(SweepRow::new(name, result))?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());

    println!("\nSweep Summary:");
    for ((name, _), result) in named.iter().zip(&results) {
        println!(
            "  {:<24} burn {:>12.0}  runway {:>10.1} months",
            name, result.kpis.burn, result.kpis.runway_months
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
