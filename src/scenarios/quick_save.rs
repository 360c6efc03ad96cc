//! One-click save/restore of the planner state with a short history

use crate::inputs::{BaseInputs, Levers};
use crate::store::{read_json, write_json, KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

const HISTORY_KEY: &str = "cfo-helper-scenarios";
const CURRENT_KEY: &str = "cfo-helper-current";

/// Number of quick saves kept by default
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// A quick-saved (base, levers) snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSaveEntry {
    pub base: BaseInputs,
    pub levers: Levers,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub struct QuickSave<S: KeyValueStore> {
    store: S,
    history_limit: usize,
}

impl<S: KeyValueStore> QuickSave<S> {
    pub fn new(store: S) -> Self {
        Self::with_history_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(store: S, history_limit: usize) -> Self {
        Self { store, history_limit }
    }

    /// Name given to a save made without one, e.g. `Quick Save - 2024-05-01 10:30:00`
    pub fn default_name(timestamp: DateTime<Utc>) -> String {
        format!("Quick Save - {}", timestamp.format("%Y-%m-%d %H:%M:%S"))
    }

    /// Record a snapshot as current and at the front of the history
    pub fn save(&mut self, base: &BaseInputs, levers: &Levers, name: Option<&str>) -> Result<QuickSaveEntry, StoreError> {
        let timestamp = Utc::now();
        let entry = QuickSaveEntry {
            base: *base,
            levers: *levers,
            timestamp,
            name: Some(name.map_or_else(|| Self::default_name(timestamp), str::to_string)),
        };

        let mut history = self.history()?;
        history.insert(0, entry.clone());
        history.truncate(self.history_limit);

        write_json(&mut self.store, HISTORY_KEY, &history)?;
        write_json(&mut self.store, CURRENT_KEY, &entry)?;

        info!("quick save {:?} ({} in history)", entry.name, history.len());
        Ok(entry)
    }

    /// Most recent quick save, if any
    pub fn load_current(&self) -> Result<Option<QuickSaveEntry>, StoreError> {
        read_json(&self.store, CURRENT_KEY)
    }

    /// Saved snapshots, newest first
    pub fn history(&self) -> Result<Vec<QuickSaveEntry>, StoreError> {
        Ok(read_json(&self.store, HISTORY_KEY)?.unwrap_or_default())
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY)?;
        self.store.remove(CURRENT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_save_and_load_current() {
        let mut quick = QuickSave::new(MemoryStore::new());
        assert!(quick.load_current().unwrap().is_none());

        let levers = Levers { add_hires: 1, ..Default::default() };
        let saved = quick.save(&BaseInputs::default(), &levers, Some("Before board meeting")).unwrap();

        let current = quick.load_current().unwrap().unwrap();
        assert_eq!(current, saved);
        assert_eq!(current.name.as_deref(), Some("Before board meeting"));
        assert_eq!(current.levers.add_hires, 1);
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let mut quick = QuickSave::with_history_limit(MemoryStore::new(), 3);
        for hires in 0..5 {
            let levers = Levers { add_hires: hires, ..Default::default() };
            quick.save(&BaseInputs::default(), &levers, None).unwrap();
        }

        let history = quick.history().unwrap();
        let hires: Vec<u32> = history.iter().map(|e| e.levers.add_hires).collect();
        assert_eq!(hires, vec![4, 3, 2]);
        assert!(history[0].name.as_deref().unwrap().starts_with("Quick Save - "));
    }

    #[test]
    fn test_clear() {
        let mut quick = QuickSave::new(MemoryStore::new());
        quick.save(&BaseInputs::default(), &Levers::default(), None).unwrap();
        quick.clear().unwrap();
        assert!(quick.history().unwrap().is_empty());
        assert!(quick.load_current().unwrap().is_none());
    }
}
