//! Load scenario inputs from JSON files and lever sets from CSV

use super::data::{Levers, ScenarioInputs};
use super::presets::Preset;
use csv::Reader;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lever csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse scenario json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Raw CSV row for one named lever set
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "AddHires")]
    add_hires: u32,
    #[serde(rename = "CostPerHire")]
    cost_per_hire: f64,
    #[serde(rename = "DeltaMarketing")]
    delta_marketing: f64,
    #[serde(rename = "DeltaInfra")]
    delta_infra: f64,
    #[serde(rename = "PriceChangePct")]
    price_change_pct: f64,
}

impl CsvRow {
    fn into_named_levers(self) -> (String, Levers) {
        (
            self.name,
            Levers {
                add_hires: self.add_hires,
                cost_per_hire: self.cost_per_hire,
                delta_marketing: self.delta_marketing,
                delta_infra: self.delta_infra,
                price_change_pct: self.price_change_pct,
            },
        )
    }
}

/// Load a `{ base, levers }` scenario from a JSON file
pub fn load_scenario_json<P: AsRef<Path>>(path: P) -> Result<ScenarioInputs, InputError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Load a bare [`Levers`] object from a JSON file
pub fn load_levers_json<P: AsRef<Path>>(path: P) -> Result<Levers, InputError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Load named lever sets from a CSV file
pub fn load_lever_rows<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Levers)>, InputError> {
    let file = File::open(path)?;
    load_lever_rows_from_reader(file)
}

/// Load named lever sets from any reader (e.g., string buffer, request body)
pub fn load_lever_rows_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<(String, Levers)>, InputError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        rows.push(row.into_named_levers());
    }

    Ok(rows)
}

/// Resolve a preset name, reporting unknown names as an error
pub fn preset_levers(name: &str) -> Result<Levers, InputError> {
    Preset::from_name(name)
        .map(|p| p.levers())
        .ok_or_else(|| InputError::UnknownPreset(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const LEVER_CSV: &str = "\
Name,AddHires,CostPerHire,DeltaMarketing,DeltaInfra,PriceChangePct
Hire two,2,50000,0,0,0
Price bump,0,50000,0,0,0.1
";

    #[test]
    fn test_load_lever_rows_from_reader() {
        let rows = load_lever_rows_from_reader(LEVER_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "Hire two");
        assert_eq!(rows[0].1.add_hires, 2);
        assert_eq!(rows[1].1.price_change_pct, 0.1);
    }

    #[test]
    fn test_bad_row_is_reported() {
        let csv = "Name,AddHires,CostPerHire,DeltaMarketing,DeltaInfra,PriceChangePct\nBroken,-1,x,0,0,0\n";
        let err = load_lever_rows_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Csv(_)));
    }

    #[test]
    fn test_load_scenario_json_accepts_stored_record_shape() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("scenario.json");
        file.write_str(
            r#"{
                "baseInputs": {"cash":1000000,"monthlyRevenue":350000,"monthlyExpenses":300000,"teamSize":6,"grossMarginPct":0.65},
                "levers": {"addHires":2,"costPerHire":50000,"deltaMarketing":0,"deltaInfra":0,"priceChangePct":0}
            }"#,
        )
        .unwrap();

        let inputs = load_scenario_json(file.path()).unwrap();
        assert_eq!(inputs.base.team_size, 6);
        assert_eq!(inputs.levers.add_hires, 2);
    }

    #[test]
    fn test_preset_levers_unknown() {
        assert!(preset_levers("lean-mode").is_ok());
        assert!(matches!(preset_levers("yolo"), Err(InputError::UnknownPreset(name)) if name == "yolo"));
    }
}
