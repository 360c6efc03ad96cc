//! Scenario inputs, preset lever sets and their file loaders

mod data;
mod presets;
pub mod loader;

pub use data::{BaseInputs, Levers, LiveDataOverlay, ScenarioInputs};
pub use presets::Preset;
pub use loader::{InputError, load_lever_rows, load_lever_rows_from_reader, load_scenario_json, load_levers_json, preset_levers};
