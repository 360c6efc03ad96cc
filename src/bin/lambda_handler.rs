//! AWS Lambda handler for evaluating a single scenario
//!
//! Accepts a JSON scenario (baseline, levers, optional "before" levers and
//! live overlay) and returns KPIs, the cash projection and the narrative.

use cfo_helper::finance::{MAX_PROJECTION_MONTHS, PROJECTION_MONTHS};
use cfo_helper::inputs::preset_levers;
use cfo_helper::{compute_kpis, generate_narrative, project_cash, BaseInputs, Kpis, Levers, LiveDataOverlay};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

/// Input for one scenario evaluation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    /// Baseline figures (default: planner defaults)
    #[serde(default)]
    pub base: Option<BaseInputs>,

    /// Levers to evaluate (default: no changes)
    #[serde(default)]
    pub levers: Option<Levers>,

    /// Preset name or id used when `levers` is absent
    #[serde(default)]
    pub preset: Option<String>,

    /// Levers the narrative compares against (default: no changes)
    #[serde(default)]
    pub before_levers: Option<Levers>,

    #[serde(default)]
    pub overlay: Option<LiveDataOverlay>,

    /// Projection length (default: 12)
    #[serde(default)]
    pub months: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpis: Option<Kpis>,
    pub projection: Vec<f64>,
    pub narrative: String,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioResponse {
    fn failed(message: String, start: std::time::Instant) -> Self {
        Self {
            kpis: None,
            projection: Vec::new(),
            narrative: String::new(),
            execution_time_ms: start.elapsed().as_millis() as u64,
            error: Some(message),
        }
    }
}

fn evaluate(request: &ScenarioRequest, start: std::time::Instant) -> ScenarioResponse {
    let base = request.base.unwrap_or_default();
    let levers = match (&request.levers, &request.preset) {
        (Some(levers), _) => *levers,
        (None, Some(name)) => match preset_levers(name) {
            Ok(levers) => levers,
            Err(e) => return ScenarioResponse::failed(e.to_string(), start),
        },
        (None, None) => Levers::default(),
    };
    let before = request.before_levers.unwrap_or_default();
    let overlay = request.overlay.as_ref();
    let months = request.months.unwrap_or(PROJECTION_MONTHS);
    if months > MAX_PROJECTION_MONTHS {
        return ScenarioResponse::failed(format!("months must be at most {MAX_PROJECTION_MONTHS}"), start);
    }

    let kpis = compute_kpis(&base, &levers, overlay);
    let projection = project_cash(&base, &kpis, months);
    let narrative = generate_narrative(&base, &before, &levers, overlay);

    ScenarioResponse {
        kpis: Some(kpis),
        projection,
        narrative,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error: None,
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ScenarioRequest>) -> Result<ScenarioResponse, Error> {
    let start = std::time::Instant::now();
    let response = evaluate(&event.payload, start);

    match &response.error {
        Some(e) => log::warn!("scenario request rejected: {e}"),
        None => log::info!("scenario evaluated in {} ms", response.execution_time_ms),
    }
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
