//! Predefined lever sets offered by the planner

use super::data::Levers;
use serde::{Deserialize, Serialize};

/// Named lever configuration for quick what-if comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Hire and spend aggressively, raise prices
    AggressiveGrowth,
    /// Cut spend, discount prices
    LeanMode,
    /// Small, balanced increases
    Conservative,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::AggressiveGrowth, Preset::LeanMode, Preset::Conservative];

    /// Display name as shown in the planner
    pub fn name(&self) -> &'static str {
        match self {
            Preset::AggressiveGrowth => "Aggressive Growth",
            Preset::LeanMode => "Lean Mode",
            Preset::Conservative => "Conservative",
        }
    }

    /// Kebab-case identifier used on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Preset::AggressiveGrowth => "aggressive-growth",
            Preset::LeanMode => "lean-mode",
            Preset::Conservative => "conservative",
        }
    }

    pub fn levers(&self) -> Levers {
        match self {
            Preset::AggressiveGrowth => Levers {
                add_hires: 3,
                cost_per_hire: 60_000.0,
                delta_marketing: 100_000.0,
                delta_infra: 25_000.0,
                price_change_pct: 0.15,
            },
            Preset::LeanMode => Levers {
                add_hires: 0,
                cost_per_hire: 45_000.0,
                delta_marketing: -20_000.0,
                delta_infra: -10_000.0,
                price_change_pct: -0.05,
            },
            Preset::Conservative => Levers {
                add_hires: 1,
                cost_per_hire: 50_000.0,
                delta_marketing: 25_000.0,
                delta_infra: 5_000.0,
                price_change_pct: 0.05,
            },
        }
    }

    /// Look up a preset by display name or id, ignoring case
    pub fn from_name(name: &str) -> Option<Preset> {
        let wanted = name.trim();
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted) || p.id().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
