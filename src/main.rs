//! CFO Helper CLI
//!
//! Command-line interface for evaluating what-if scenarios

use anyhow::{bail, Context, Result};
use cfo_helper::finance::format::to_fixed;
use cfo_helper::finance::MAX_PROJECTION_MONTHS;
use cfo_helper::inputs::{load_levers_json, load_scenario_json, preset_levers};
use cfo_helper::report::{export_with_limits, ReportFormat};
use cfo_helper::scenarios::NewScenario;
use cfo_helper::{
    compute_kpis, format_compact_currency, format_currency, generate_narrative, AccountService,
    BaseInputs, FileStore, Kpis, Levers, LiveDataOverlay, LiveFeed, PlannerConfig, QuickSave, ScenarioManager,
    ScenarioReport, ScenarioRunner, UsageTracker,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cfo-helper", version, about = "What-if financial scenarios: burn, runway and cash projections")]
struct Cli {
    /// JSON config file (CFO_HELPER_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print KPIs for a scenario
    Compute {
        #[command(flatten)]
        inputs: InputArgs,
        /// Print the KPIs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the monthly cash projection
    Project {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long)]
        months: Option<usize>,
        /// Also write the projection as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Describe the change between two lever sets
    Narrate {
        #[command(flatten)]
        base: BaseArgs,
        #[command(flatten)]
        live: LiveArgs,
        #[arg(long, conflicts_with = "before")]
        before_preset: Option<String>,
        #[arg(long, conflicts_with = "after")]
        after_preset: Option<String>,
        /// Levers JSON file for the "before" side
        #[arg(long)]
        before: Option<PathBuf>,
        /// Levers JSON file for the "after" side
        #[arg(long)]
        after: Option<PathBuf>,
    },
    /// Evaluate every preset against the baseline
    Presets {
        #[command(flatten)]
        base: BaseArgs,
    },
    /// Render a full scenario report
    Report {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, default_value = "Scenario")]
        name: String,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
        /// Output file, or a directory to write a dated file into
        #[arg(long)]
        output: Option<PathBuf>,
        /// Export as this (mock) account, counting against its allowance
        #[arg(long)]
        account: Option<String>,
    },
    /// Run the simulated live feed and print KPIs after each update
    Feed {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, default_value_t = 5)]
        ticks: u32,
        /// Tick period; defaults to the configured interval plus jitter
        #[arg(long)]
        interval_ms: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Manage saved scenarios in the file store
    #[command(subcommand)]
    Scenarios(ScenarioCommand),
}

#[derive(Subcommand, Debug)]
enum ScenarioCommand {
    /// Save the given inputs as a named scenario
    Save {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List the most recently updated scenarios
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    Search { query: String },
    Delete { id: String },
    /// Compare two saved scenarios by id
    Compare { baseline: String, current: String },
    /// Snapshot the given inputs into the quick-save history
    QuickSave {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the quick-save history, newest first
    History,
    /// Print all scenarios as JSON
    Export,
    /// Import scenarios from a JSON export
    Import { file: PathBuf },
}

#[derive(Args, Debug, Default)]
struct BaseArgs {
    #[arg(long)]
    cash: Option<f64>,
    #[arg(long)]
    revenue: Option<f64>,
    #[arg(long)]
    expenses: Option<f64>,
    #[arg(long)]
    team_size: Option<u32>,
    /// Gross margin as a fraction, e.g. 0.65
    #[arg(long)]
    margin: Option<f64>,
}

#[derive(Args, Debug, Default)]
struct LeverArgs {
    /// Start from a preset (name or id)
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    hires: Option<u32>,
    #[arg(long)]
    cost_per_hire: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    marketing: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    infra: Option<f64>,
    /// Price change as a fraction, e.g. 0.1 for +10%
    #[arg(long, allow_hyphen_values = true)]
    price_change: Option<f64>,
}

#[derive(Args, Debug, Default)]
struct LiveArgs {
    /// Apply a connected live overlay with this revenue multiplier
    #[arg(long)]
    live_multiplier: Option<f64>,
    /// Apply a connected live overlay with this expenses delta
    #[arg(long, allow_hyphen_values = true)]
    live_delta: Option<f64>,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Scenario JSON file with `base` and `levers`
    #[arg(long)]
    scenario: Option<PathBuf>,
    #[command(flatten)]
    base: BaseArgs,
    #[command(flatten)]
    levers: LeverArgs,
    #[command(flatten)]
    live: LiveArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

impl BaseArgs {
    fn apply(&self, mut base: BaseInputs) -> BaseInputs {
        base.cash = self.cash.unwrap_or(base.cash);
        base.monthly_revenue = self.revenue.unwrap_or(base.monthly_revenue);
        base.monthly_expenses = self.expenses.unwrap_or(base.monthly_expenses);
        base.team_size = self.team_size.unwrap_or(base.team_size);
        base.gross_margin_pct = self.margin.unwrap_or(base.gross_margin_pct);
        base
    }
}

impl LeverArgs {
    fn apply(&self, mut levers: Levers) -> Result<Levers> {
        if let Some(name) = &self.preset {
            levers = preset_levers(name)?;
        }
        levers.add_hires = self.hires.unwrap_or(levers.add_hires);
        levers.cost_per_hire = self.cost_per_hire.unwrap_or(levers.cost_per_hire);
        levers.delta_marketing = self.marketing.unwrap_or(levers.delta_marketing);
        levers.delta_infra = self.infra.unwrap_or(levers.delta_infra);
        levers.price_change_pct = self.price_change.unwrap_or(levers.price_change_pct);
        Ok(levers)
    }
}

impl LiveArgs {
    fn overlay(&self) -> Option<LiveDataOverlay> {
        if self.live_multiplier.is_none() && self.live_delta.is_none() {
            return None;
        }
        Some(LiveDataOverlay {
            update_count: 1,
            ..LiveDataOverlay::connected(self.live_multiplier.unwrap_or(1.0), self.live_delta.unwrap_or(0.0))
        })
    }
}

impl InputArgs {
    fn resolve(&self) -> Result<(BaseInputs, Levers, Option<LiveDataOverlay>)> {
        let (base, levers) = match &self.scenario {
            Some(path) => {
                let inputs = load_scenario_json(path)
                    .with_context(|| format!("Failed to load scenario {}", path.display()))?;
                (inputs.base, inputs.levers)
            }
            None => (BaseInputs::default(), Levers::default()),
        };
        Ok((self.base.apply(base), self.levers.apply(levers)?, self.live.overlay()))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = PlannerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Compute { inputs, json } => {
            let (base, levers, overlay) = inputs.resolve()?;
            let kpis = compute_kpis(&base, &levers, overlay.as_ref());
            if json {
                println!("{}", serde_json::to_string_pretty(&kpis)?);
            } else {
                print_kpis(&kpis);
            }
        }
        Commands::Project { inputs, months, csv } => {
            let (base, levers, overlay) = inputs.resolve()?;
            let months = checked_months(months.unwrap_or(config.projection_months))?;
            let report = ScenarioReport::build("Projection", &base, &levers, overlay.as_ref(), months);

            for (month, cash) in report.projection.iter().enumerate() {
                println!("Month {:>3}  {:>16}", month + 1, format_currency(*cash));
            }
            if let Some(month) = report.cash_out_month {
                println!("Cash depleted in month {}", month + 1);
            }
            if let Some(path) = csv {
                let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
                report.write_projection_csv(file)?;
                println!("Projection written to {}", path.display());
            }
        }
        Commands::Narrate { base, live, before_preset, after_preset, before, after } => {
            let base = base.apply(BaseInputs::default());
            let before = resolve_levers(before_preset.as_deref(), before.as_deref())?;
            let after = resolve_levers(after_preset.as_deref(), after.as_deref())?;
            println!("{}", generate_narrative(&base, &before, &after, live.overlay().as_ref()));
        }
        Commands::Presets { base } => {
            let runner = ScenarioRunner::new(base.apply(BaseInputs::default()));
            let baseline = runner.run(&Levers::default());

            println!("{:<20} {:>12} {:>12} {:>12} {:>10}", "Preset", "Revenue", "Burn", "Gross Profit", "Runway");
            println!("{}", "-".repeat(70));
            println!("{:<20} {}", "Baseline", kpi_columns(&baseline));
            for (preset, kpis) in runner.run_presets() {
                println!("{:<20} {}", preset.name(), kpi_columns(&kpis));
            }
        }
        Commands::Report { inputs, name, format, output, account } => {
            let (base, levers, overlay) = inputs.resolve()?;
            let months = checked_months(config.projection_months)?;
            let report = ScenarioReport::build(name, &base, &levers, overlay.as_ref(), months);
            let format = ReportFormat::from(format);

            let rendered = match account {
                Some(email) => {
                    let mut accounts = open_accounts(&config)?;
                    accounts
                        .sign_in(&email, "")
                        .with_context(|| format!("Cannot export as {email}"))?;
                    let (rendered, user) = export_with_limits(&mut accounts, &report, format)?;
                    eprintln!("{} of {} exports used", user.usage_count, user.max_usage);
                    rendered
                }
                None => report.render(format)?,
            };

            match output {
                Some(target) => {
                    let path = report.output_path(&target, format);
                    std::fs::write(&path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Feed { inputs, ticks, interval_ms, seed } => {
            let (base, levers, _) = inputs.resolve()?;
            run_feed(&config, base, levers, ticks, interval_ms, seed.or(config.feed_seed))?;
        }
        Commands::Scenarios(command) => run_scenarios(&config, command)?,
    }

    Ok(())
}

fn checked_months(months: usize) -> Result<usize> {
    if months > MAX_PROJECTION_MONTHS {
        bail!("months must be at most {MAX_PROJECTION_MONTHS}, got {months}");
    }
    Ok(months)
}

fn resolve_levers(preset: Option<&str>, file: Option<&Path>) -> Result<Levers> {
    match (preset, file) {
        (Some(name), _) => Ok(preset_levers(name)?),
        (None, Some(path)) => {
            load_levers_json(path).with_context(|| format!("Failed to load levers {}", path.display()))
        }
        (None, None) => Ok(Levers::default()),
    }
}

fn print_kpis(kpis: &Kpis) {
    println!("Monthly Revenue:   {}", format_currency(kpis.revenue));
    println!("Monthly Expenses:  {}", format_currency(kpis.expenses));
    println!("Payroll:           {}", format_currency(kpis.payroll));
    println!("Monthly Burn Rate: {}", format_currency(kpis.burn));
    println!("Cash Runway:       {} months", to_fixed(kpis.runway_months, 1));
    println!("Gross Profit:      {}", format_currency(kpis.gross_profit));
    if kpis.is_live_data_active {
        println!("Live revenue adj:  {}", format_currency(kpis.live_revenue_adjustment));
        println!("Live expenses adj: {}", format_currency(kpis.live_expenses_adjustment));
    }
}

fn kpi_columns(kpis: &Kpis) -> String {
    format!(
        "{:>12} {:>12} {:>12} {:>10}",
        format_compact_currency(kpis.revenue),
        format_compact_currency(kpis.burn),
        format_compact_currency(kpis.gross_profit),
        to_fixed(kpis.runway_months, 1),
    )
}

fn open_store(config: &PlannerConfig) -> Result<FileStore> {
    FileStore::open(&config.store_dir)
        .with_context(|| format!("Failed to open store at {}", config.store_dir.display()))
}

fn open_accounts(config: &PlannerConfig) -> Result<AccountService<FileStore>> {
    Ok(AccountService::with_max_usage(
        open_store(config)?,
        UsageTracker::new(open_store(config)?),
        config.free_plan_max_usage,
    ))
}

fn run_feed(
    config: &PlannerConfig,
    base: BaseInputs,
    levers: Levers,
    ticks: u32,
    interval_ms: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    let mut feed = match seed {
        Some(seed) => LiveFeed::seeded(seed),
        None => LiveFeed::new(),
    };
    let period = match interval_ms {
        Some(0) => bail!("--interval-ms must be greater than zero"),
        Some(ms) => std::time::Duration::from_millis(ms),
        None => feed.sample_period(config.feed_interval(), config.feed_jitter()),
    };
    info!("running live feed for {ticks} ticks every {period:?}");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(async move {
        let handle = feed.spawn(period);
        let mut updates = handle.subscribe();
        let mut runner = ScenarioRunner::new(base);

        for _ in 0..ticks {
            updates.changed().await.context("Live feed stopped")?;
            let overlay = *updates.borrow_and_update();
            runner.set_overlay(Some(overlay));
            let kpis = runner.run(&levers);
            println!(
                "#{:<3} x{:.3} {:>10}  burn {:>10}  runway {:>6} months",
                overlay.update_count,
                overlay.revenue_multiplier,
                format_compact_currency(overlay.expenses_delta),
                format_currency(kpis.burn),
                to_fixed(kpis.runway_months, 1),
            );
        }
        handle.stop();
        Ok::<(), anyhow::Error>(())
    })
}

fn run_scenarios(config: &PlannerConfig, command: ScenarioCommand) -> Result<()> {
    let mut manager = ScenarioManager::new(open_store(config)?);

    match command {
        ScenarioCommand::Save { inputs, name, description, tags } => {
            let (base, levers, overlay) = inputs.resolve()?;
            let mut scenario = NewScenario::evaluate(name, base, levers, overlay.as_ref());
            scenario.description = description;
            scenario.tags = tags;
            let saved = manager.save(scenario)?;
            println!("Saved {} ({})", saved.name, saved.id);
        }
        ScenarioCommand::List { limit } => {
            for s in manager.recent(limit.unwrap_or(config.recent_limit))? {
                println!(
                    "{}  {:<24} runway {:>6} months  updated {}",
                    s.id,
                    s.name,
                    to_fixed(s.kpis.runway_months, 1),
                    s.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ScenarioCommand::Search { query } => {
            for s in manager.search(&query)? {
                println!("{}  {}", s.id, s.name);
            }
        }
        ScenarioCommand::Delete { id } => {
            if !manager.delete(&id)? {
                bail!("No scenario with id {id}");
            }
            println!("Deleted {id}");
        }
        ScenarioCommand::Compare { baseline, current } => {
            let comparison = manager.compare_by_id(&baseline, &current)?;
            println!("{} -> {}", comparison.baseline.name, comparison.current.name);
            for change in &comparison.kpi_changes {
                println!(
                    "  {:<20} {:>14} -> {:>14}  ({}%)",
                    change.metric.label(),
                    format_currency(change.baseline),
                    format_currency(change.current),
                    to_fixed(change.change_percent, 1)
                );
            }
        }
        ScenarioCommand::QuickSave { inputs, name } => {
            let (base, levers, _) = inputs.resolve()?;
            let mut quick = QuickSave::with_history_limit(open_store(config)?, config.history_limit);
            let entry = quick.save(&base, &levers, name.as_deref())?;
            println!("Saved {}", entry.name.unwrap_or_default());
        }
        ScenarioCommand::History => {
            let quick = QuickSave::with_history_limit(open_store(config)?, config.history_limit);
            for entry in quick.history()? {
                let kpis = compute_kpis(&entry.base, &entry.levers, None);
                println!(
                    "{}  {:<36} runway {:>6} months",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.name.unwrap_or_default(),
                    to_fixed(kpis.runway_months, 1)
                );
            }
        }
        ScenarioCommand::Export => println!("{}", manager.export_json()?),
        ScenarioCommand::Import { file } => {
            let json = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let summary = manager.import_json(&json)?;
            println!("Imported {} scenario(s)", summary.imported);
            for error in &summary.errors {
                eprintln!("  {error}");
            }
        }
    }

    Ok(())
}
