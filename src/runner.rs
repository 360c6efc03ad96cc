//! Scenario runner for batch KPI evaluation
//!
//! Holds one baseline (and optional live overlay), then evaluates many lever
//! sets against it. Batches fan out over rayon.

use crate::finance::{compute_kpis, project_cash, Kpis};
use crate::inputs::{BaseInputs, Levers, LiveDataOverlay, Preset};
use rayon::prelude::*;

/// Pre-configured runner for evaluating many lever sets
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(BaseInputs::default());
/// let results = runner.run_batch(&[Levers::default(), Preset::LeanMode.levers()]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRunner {
    base: BaseInputs,
    overlay: Option<LiveDataOverlay>,
}

/// One evaluated lever set
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub levers: Levers,
    pub kpis: Kpis,
    pub projection: Vec<f64>,
}

impl ScenarioRunner {
    pub fn new(base: BaseInputs) -> Self {
        Self { base, overlay: None }
    }

    pub fn with_overlay(base: BaseInputs, overlay: LiveDataOverlay) -> Self {
        Self {
            base,
            overlay: Some(overlay),
        }
    }

    pub fn base(&self) -> &BaseInputs {
        &self.base
    }

    /// Replace the overlay, e.g. with a fresh live feed snapshot
    pub fn set_overlay(&mut self, overlay: Option<LiveDataOverlay>) {
        self.overlay = overlay;
    }

    pub fn run(&self, levers: &Levers) -> Kpis {
        compute_kpis(&self.base, levers, self.overlay.as_ref())
    }

    /// KPIs plus a `months`-long cash projection
    pub fn run_detailed(&self, levers: &Levers, months: usize) -> RunResult {
        let kpis = self.run(levers);
        RunResult {
            levers: *levers,
            projection: project_cash(&self.base, &kpis, months),
            kpis,
        }
    }

    /// Evaluate lever sets in parallel; output order matches input order
    pub fn run_batch(&self, levers: &[Levers]) -> Vec<Kpis> {
        levers.par_iter().map(|l| self.run(l)).collect()
    }

    pub fn run_batch_detailed(&self, levers: &[Levers], months: usize) -> Vec<RunResult> {
        levers.par_iter().map(|l| self.run_detailed(l, months)).collect()
    }

    /// Every preset against the baseline
    pub fn run_presets(&self) -> Vec<(Preset, Kpis)> {
        Preset::ALL.par_iter().map(|&p| (p, self.run(&p.levers()))).collect()
    }
}
