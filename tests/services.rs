//! Store-backed services sharing one directory, as the CLI uses them

use assert_fs::prelude::*;
use assert_fs::TempDir;
use cfo_helper::report::{export_with_limits, ReportError, ReportFormat};
use cfo_helper::scenarios::NewScenario;
use cfo_helper::accounts::AccountError;
use cfo_helper::{
    AccountService, BaseInputs, FileStore, Levers, Preset, QuickSave, ScenarioManager, ScenarioReport, UsageTracker,
};

fn store(dir: &TempDir) -> FileStore {
    FileStore::open(dir.path()).unwrap()
}

#[test]
fn scenarios_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();

    let saved = {
        let mut manager = ScenarioManager::new(store(&dir));
        let scenario = NewScenario::evaluate("Lean Q3", BaseInputs::default(), Preset::LeanMode.levers(), None);
        manager.save(scenario).unwrap()
    };

    assert!(dir.child("cfo_helper_scenarios.json").path().exists());

    let manager = ScenarioManager::new(store(&dir));
    assert_eq!(manager.get(&saved.id).unwrap(), Some(saved));
}

#[test]
fn export_import_between_directories() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();

    let mut source = ScenarioManager::new(store(&source_dir));
    for preset in Preset::ALL {
        source
            .save(NewScenario::evaluate(preset.name(), BaseInputs::default(), preset.levers(), None))
            .unwrap();
    }
    let exported = source.export_json().unwrap();

    let mut target = ScenarioManager::new(store(&target_dir));
    let summary = target.import_json(&exported).unwrap();
    assert!(summary.success);
    assert_eq!(summary.imported, 3);

    // A second import only reports duplicates
    let again = target.import_json(&exported).unwrap();
    assert!(!again.success);
    assert_eq!(again.errors.len(), 3);
    assert_eq!(target.all().unwrap().len(), 3);
}

#[test]
fn quick_save_and_manager_use_separate_keys() {
    let dir = TempDir::new().unwrap();
    let mut quick = QuickSave::new(store(&dir));
    let manager = ScenarioManager::new(store(&dir));

    quick
        .save(&BaseInputs::default(), &Levers { add_hires: 1, ..Default::default() }, None)
        .unwrap();
    assert!(manager.all().unwrap().is_empty());
    assert_eq!(quick.history().unwrap().len(), 1);
}

#[test]
fn free_plan_exports_until_allowance_is_used() {
    let dir = TempDir::new().unwrap();
    let report = ScenarioReport::build("Hire two", &BaseInputs::default(), &Levers { add_hires: 2, ..Default::default() }, None, 12);

    {
        let mut accounts = AccountService::with_max_usage(store(&dir), UsageTracker::new(store(&dir)), 2);
        accounts.sign_up("cfo@example.com", "pw", "Asha").unwrap();
        export_with_limits(&mut accounts, &report, ReportFormat::Text).unwrap();
    }

    // A fresh service over the same directory resumes the session
    let mut accounts = AccountService::with_max_usage(store(&dir), UsageTracker::new(store(&dir)), 2);
    let user = accounts.current_user().unwrap().unwrap();
    assert_eq!(user.usage_count, 1);
    assert_eq!(user.reports_exported, 1);

    export_with_limits(&mut accounts, &report, ReportFormat::Json).unwrap();
    let refused = export_with_limits(&mut accounts, &report, ReportFormat::Text);
    assert!(matches!(
        refused,
        Err(ReportError::Account(AccountError::UsageLimitReached { used: 2, max: 2 }))
    ));

    let total = accounts.usage().total_usage().unwrap();
    assert_eq!(total.total_exports, 2);
    assert_eq!(total.total_users, 1);
}

#[test]
fn report_output_into_directory_uses_suggested_name() {
    let dir = TempDir::new().unwrap();
    let report = ScenarioReport::build("Lean Mode", &BaseInputs::default(), &Preset::LeanMode.levers(), None, 12);

    let in_dir = report.output_path(dir.path(), ReportFormat::Json);
    assert_eq!(in_dir, dir.path().join(report.file_name(ReportFormat::Json)));
    assert!(in_dir.file_name().unwrap().to_str().unwrap().starts_with("cfo-helper-lean-mode-"));

    let explicit = dir.child("q3.txt");
    assert_eq!(report.output_path(explicit.path(), ReportFormat::Text), explicit.path());
}
