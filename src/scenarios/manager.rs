//! Named scenarios with search, comparison and JSON import/export

use super::compare::{kpi_changes, lever_changes, KpiChange, LeverChange};
use crate::finance::{compute_kpis, Kpis};
use crate::inputs::{BaseInputs, Levers, LiveDataOverlay};
use crate::store::{generate_id, read_json, write_json, KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SCENARIOS_KEY: &str = "cfo_helper_scenarios";
const CURRENT_SCENARIO_KEY: &str = "cfo_helper_current_scenario";

/// Number of scenarios returned by [`ScenarioManager::recent`] by default
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("scenario not found: {0}")]
    NotFound(String),
    #[error("failed to encode scenarios: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A stored, named snapshot of inputs and the KPIs they produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedScenario {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub base_inputs: BaseInputs,
    pub levers: Levers,
    pub kpis: Kpis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SavedScenario {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(query))
            || self.tags.iter().any(|t| t.to_lowercase().contains(query))
    }
}

/// Scenario to be saved; id and timestamps are assigned on save
#[derive(Debug, Clone, PartialEq)]
pub struct NewScenario {
    pub name: String,
    pub description: Option<String>,
    pub base_inputs: BaseInputs,
    pub levers: Levers,
    pub kpis: Kpis,
    pub tags: Vec<String>,
}

impl NewScenario {
    /// Build a scenario with KPIs computed from its inputs
    pub fn evaluate(
        name: impl Into<String>,
        base_inputs: BaseInputs,
        levers: Levers,
        overlay: Option<&LiveDataOverlay>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            kpis: compute_kpis(&base_inputs, &levers, overlay),
            base_inputs,
            levers,
            tags: Vec::new(),
        }
    }
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_inputs: Option<BaseInputs>,
    pub levers: Option<Levers>,
    pub kpis: Option<Kpis>,
    pub tags: Option<Vec<String>>,
}

/// Live planner state, saved on every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentScenario {
    pub base_inputs: BaseInputs,
    pub levers: Levers,
    pub kpis: Kpis,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of [`ScenarioManager::import_json`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub baseline: SavedScenario,
    pub current: SavedScenario,
    pub kpi_changes: Vec<KpiChange>,
    pub lever_changes: Vec<LeverChange>,
}

/// Shape accepted when importing exported scenarios
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedScenario {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    base_inputs: BaseInputs,
    levers: Levers,
    kpis: Kpis,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: Vec<String>,
}

pub struct ScenarioManager<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ScenarioManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All saved scenarios in insertion order
    pub fn all(&self) -> Result<Vec<SavedScenario>, ScenarioError> {
        Ok(read_json(&self.store, SCENARIOS_KEY)?.unwrap_or_default())
    }

    fn write_all(&mut self, scenarios: &[SavedScenario]) -> Result<(), ScenarioError> {
        Ok(write_json(&mut self.store, SCENARIOS_KEY, scenarios)?)
    }

    pub fn save(&mut self, scenario: NewScenario) -> Result<SavedScenario, ScenarioError> {
        let mut scenarios = self.all()?;
        let now = Utc::now();

        let saved = SavedScenario {
            id: generate_id(),
            name: scenario.name,
            description: scenario.description,
            base_inputs: scenario.base_inputs,
            levers: scenario.levers,
            kpis: scenario.kpis,
            created_at: now,
            updated_at: now,
            tags: scenario.tags,
        };

        scenarios.push(saved.clone());
        self.write_all(&scenarios)?;

        info!("saved scenario {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    /// Apply a partial update; `Ok(None)` when the id is unknown
    ///
    /// Changing the inputs without supplying KPIs recomputes them.
    pub fn update(&mut self, id: &str, update: ScenarioUpdate) -> Result<Option<SavedScenario>, ScenarioError> {
        let mut scenarios = self.all()?;
        let Some(scenario) = scenarios.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        let inputs_changed = update.base_inputs.is_some() || update.levers.is_some();
        if let Some(name) = update.name {
            scenario.name = name;
        }
        if let Some(description) = update.description {
            scenario.description = Some(description);
        }
        if let Some(base) = update.base_inputs {
            scenario.base_inputs = base;
        }
        if let Some(levers) = update.levers {
            scenario.levers = levers;
        }
        if let Some(tags) = update.tags {
            scenario.tags = tags;
        }
        scenario.kpis = match update.kpis {
            Some(kpis) => kpis,
            None if inputs_changed => compute_kpis(&scenario.base_inputs, &scenario.levers, None),
            None => scenario.kpis,
        };
        scenario.updated_at = Utc::now();

        let updated = scenario.clone();
        self.write_all(&scenarios)?;
        Ok(Some(updated))
    }

    /// Remove a scenario; `false` when the id is unknown
    pub fn delete(&mut self, id: &str) -> Result<bool, ScenarioError> {
        let scenarios = self.all()?;
        let before = scenarios.len();
        let remaining: Vec<SavedScenario> = scenarios.into_iter().filter(|s| s.id != id).collect();

        if remaining.len() == before {
            return Ok(false);
        }
        self.write_all(&remaining)?;
        info!("deleted scenario {id}");
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Result<Option<SavedScenario>, ScenarioError> {
        Ok(self.all()?.into_iter().find(|s| s.id == id))
    }

    /// Most recently updated scenarios first
    pub fn recent(&self, limit: usize) -> Result<Vec<SavedScenario>, ScenarioError> {
        let mut scenarios = self.all()?;
        scenarios.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        scenarios.truncate(limit);
        Ok(scenarios)
    }

    /// Case-insensitive match on name, description or tags
    pub fn search(&self, query: &str) -> Result<Vec<SavedScenario>, ScenarioError> {
        let query = query.to_lowercase();
        Ok(self.all()?.into_iter().filter(|s| s.matches(&query)).collect())
    }

    pub fn save_current(&mut self, base_inputs: &BaseInputs, levers: &Levers, kpis: &Kpis) -> Result<(), ScenarioError> {
        let current = CurrentScenario {
            base_inputs: *base_inputs,
            levers: *levers,
            kpis: *kpis,
            timestamp: Utc::now(),
        };
        Ok(write_json(&mut self.store, CURRENT_SCENARIO_KEY, &current)?)
    }

    pub fn current(&self) -> Result<Option<CurrentScenario>, ScenarioError> {
        Ok(read_json(&self.store, CURRENT_SCENARIO_KEY)?)
    }

    pub fn compare(&self, baseline: &SavedScenario, current: &SavedScenario) -> ScenarioComparison {
        ScenarioComparison {
            baseline: baseline.clone(),
            current: current.clone(),
            kpi_changes: kpi_changes(&baseline.kpis, &current.kpis),
            lever_changes: lever_changes(&baseline.levers, &current.levers),
        }
    }

    pub fn compare_by_id(&self, baseline_id: &str, current_id: &str) -> Result<ScenarioComparison, ScenarioError> {
        let baseline = self
            .get(baseline_id)?
            .ok_or_else(|| ScenarioError::NotFound(baseline_id.to_string()))?;
        let current = self
            .get(current_id)?
            .ok_or_else(|| ScenarioError::NotFound(current_id.to_string()))?;
        Ok(self.compare(&baseline, &current))
    }

    /// Pretty-printed JSON array of every scenario
    pub fn export_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(&self.all()?)?)
    }

    /// Merge scenarios exported by [`export_json`](Self::export_json)
    ///
    /// Entries without a name or whose name already exists are skipped and
    /// reported; accepted entries get a fresh id and keep their creation time.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary, ScenarioError> {
        let entries: Vec<serde_json::Value> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("scenario import rejected: {e}");
                return Ok(ImportSummary {
                    success: false,
                    imported: 0,
                    errors: vec!["Invalid JSON format".to_string()],
                });
            }
        };

        let mut scenarios = self.all()?;
        let mut errors = Vec::new();
        let mut imported = 0;
        let now = Utc::now();

        for (index, entry) in entries.into_iter().enumerate() {
            let parsed: ImportedScenario = match serde_json::from_value(entry) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("scenario {} does not deserialize: {e}", index + 1);
                    errors.push(format!("Scenario {}: Missing required fields", index + 1));
                    continue;
                }
            };
            if parsed.name.is_empty() {
                errors.push(format!("Scenario {}: Missing required fields", index + 1));
                continue;
            }
            if scenarios.iter().any(|s| s.name == parsed.name) {
                errors.push(format!("Scenario \"{}\": Already exists", parsed.name));
                continue;
            }

            scenarios.push(SavedScenario {
                id: generate_id(),
                name: parsed.name,
                description: parsed.description,
                base_inputs: parsed.base_inputs,
                levers: parsed.levers,
                kpis: parsed.kpis,
                created_at: parsed.created_at.unwrap_or(now),
                updated_at: now,
                tags: parsed.tags,
            });
            imported += 1;
        }

        self.write_all(&scenarios)?;
        for error in &errors {
            warn!("scenario import skipped: {error}");
        }

        Ok(ImportSummary { success: imported > 0, imported, errors })
    }
}
