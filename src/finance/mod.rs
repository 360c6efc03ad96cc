//! Finance engine: KPIs, cash projection, narratives and rupee formatting
//!
//! Everything here is a pure function of its arguments. No I/O, no shared
//! state, no dependency on the storage or account services.

mod kpis;
mod projection;
mod narrative;
pub mod format;

pub use kpis::{compute_kpis, Kpis, BASE_PAYROLL_RATIO, ELASTICITY, MIN_BURN_DIVISOR, NEW_HIRE_GROSS_PROFIT_SHARE};
pub use projection::{months_until_cash_out, project_cash, project_cash_12, MAX_PROJECTION_MONTHS, PROJECTION_MONTHS};
pub use narrative::generate_narrative;
pub use format::{format_compact_currency, format_currency, format_percent};
