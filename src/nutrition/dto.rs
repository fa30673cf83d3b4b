use serde::Serialize;

use super::aggregate::DailyTotals;
use super::progress::ProgressReport;
use super::rda::{EnergyBreakdown, RdaTarget};

#[derive(Debug, Serialize)]
pub struct RdaResponse {
    pub targets: RdaTarget,
    pub energy: EnergyBreakdown,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// Local calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub totals: DailyTotals,
    pub progress: ProgressReport,
}
