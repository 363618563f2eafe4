//! Daily revenue reconciliation model
//!
//! Two teams measure revenue independently: Finance sums payments (excluding
//! unavailable/canceled orders), Growth sums item price plus freight. This
//! module classifies each day by comparing the two figures. A `mismatch` is
//! the expected outcome of differing definitions; the `missing_*` statuses
//! mean one of the pipelines skipped a day entirely and are the signals worth
//! alerting on.

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Per-day reconciliation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Both figures present and within tolerance
    Match,
    /// Both figures present but further apart than the tolerance
    Mismatch,
    /// Finance reported nothing for the day
    MissingFinance,
    /// Growth reported nothing for the day
    MissingGrowth,
    /// Neither side reported the day. The build script's FULL OUTER JOIN
    /// cannot produce this, but the model stays total for arbitrary inputs.
    MissingBoth,
}

impl DayStatus {
    /// Stable string form, as stored in the mismatch table
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Match => "match",
            DayStatus::Mismatch => "mismatch",
            DayStatus::MissingFinance => "missing_finance",
            DayStatus::MissingGrowth => "missing_growth",
            DayStatus::MissingBoth => "missing_both",
        }
    }

    /// True for the statuses that indicate a pipeline defect rather than a
    /// definitional difference
    pub fn is_coverage_gap(&self) -> bool {
        matches!(
            self,
            DayStatus::MissingFinance | DayStatus::MissingGrowth | DayStatus::MissingBoth
        )
    }

    /// One-line reading of what the status means for the day
    pub fn explanation(&self) -> &'static str {
        match self {
            DayStatus::Match => {
                "Finance and Growth definitions align for this day (difference ~ 0)."
            }
            DayStatus::Mismatch => {
                "Mismatch is expected when definitions differ: Growth counts item price plus \
                 freight, Finance counts payments and excludes unavailable/canceled orders."
            }
            DayStatus::MissingFinance => {
                "Finance revenue is missing for this day, likely a pipeline coverage or join issue."
            }
            DayStatus::MissingGrowth => {
                "Growth revenue is missing for this day, likely a pipeline coverage or join issue."
            }
            DayStatus::MissingBoth => {
                "Neither pipeline produced a figure for this day; check both builds."
            }
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DayStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "match" => Ok(DayStatus::Match),
            "mismatch" => Ok(DayStatus::Mismatch),
            "missing_finance" => Ok(DayStatus::MissingFinance),
            "missing_growth" => Ok(DayStatus::MissingGrowth),
            "missing_both" => Ok(DayStatus::MissingBoth),
            other => Err(CoreError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Classify a day from the two optionally-absent revenue figures.
///
/// Total over all inputs: exactly one status for every combination of
/// presence and difference.
pub fn classify(finance: Option<f64>, growth: Option<f64>, tolerance: f64) -> DayStatus {
    match (finance, growth) {
        (None, None) => DayStatus::MissingBoth,
        (None, Some(_)) => DayStatus::MissingFinance,
        (Some(_), None) => DayStatus::MissingGrowth,
        (Some(f), Some(g)) => {
            if (g - f).abs() <= tolerance {
                DayStatus::Match
            } else {
                DayStatus::Mismatch
            }
        }
    }
}

/// One reconciliation record, the row shape of the mismatch table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconRecord {
    pub day: NaiveDate,
    pub revenue_finance: Option<f64>,
    pub revenue_growth: Option<f64>,
    /// Growth minus Finance, treating an absent side as 0.0
    pub diff: f64,
    pub status: DayStatus,
}

impl ReconRecord {
    /// Derive a record from the raw figure pair
    pub fn from_pair(
        day: NaiveDate,
        finance: Option<f64>,
        growth: Option<f64>,
        tolerance: f64,
    ) -> Self {
        Self {
            day,
            revenue_finance: finance,
            revenue_growth: growth,
            diff: growth.unwrap_or(0.0) - finance.unwrap_or(0.0),
            status: classify(finance, growth, tolerance),
        }
    }

    /// Rebuild a record from stored table columns. A NULL diff falls back to
    /// the coalesced difference so the field stays total.
    pub fn from_columns(
        day: NaiveDate,
        finance: Option<f64>,
        growth: Option<f64>,
        diff: Option<f64>,
        status: &str,
    ) -> CoreResult<Self> {
        Ok(Self {
            day,
            revenue_finance: finance,
            revenue_growth: growth,
            diff: diff.unwrap_or_else(|| growth.unwrap_or(0.0) - finance.unwrap_or(0.0)),
            status: status.parse()?,
        })
    }

    /// Status the classification rule would assign to this record's figures
    pub fn expected_status(&self, tolerance: f64) -> DayStatus {
        classify(self.revenue_finance, self.revenue_growth, tolerance)
    }
}

/// Aggregate counts over a set of reconciliation records
#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_days: usize,
    pub match_days: usize,
    pub mismatch_days: usize,
    pub missing_finance_days: usize,
    pub missing_growth_days: usize,
    pub missing_both_days: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

impl ReconSummary {
    pub fn from_records(records: &[ReconRecord]) -> Self {
        let mut summary = Self {
            total_days: records.len(),
            match_days: 0,
            mismatch_days: 0,
            missing_finance_days: 0,
            missing_growth_days: 0,
            missing_both_days: 0,
            first_day: records.iter().map(|r| r.day).min(),
            last_day: records.iter().map(|r| r.day).max(),
        };
        for record in records {
            match record.status {
                DayStatus::Match => summary.match_days += 1,
                DayStatus::Mismatch => summary.mismatch_days += 1,
                DayStatus::MissingFinance => summary.missing_finance_days += 1,
                DayStatus::MissingGrowth => summary.missing_growth_days += 1,
                DayStatus::MissingBoth => summary.missing_both_days += 1,
            }
        }
        summary
    }

    /// Days where at least one pipeline skipped the day entirely
    pub fn coverage_gap_days(&self) -> usize {
        self.missing_finance_days + self.missing_growth_days + self.missing_both_days
    }
}

/// Mismatch-status records ordered by absolute difference, worst first,
/// capped at `n`
pub fn top_mismatch_days(records: &[ReconRecord], n: usize) -> Vec<&ReconRecord> {
    let mut worst: Vec<&ReconRecord> = records
        .iter()
        .filter(|r| r.status == DayStatus::Mismatch)
        .collect();
    worst.sort_by(|a, b| {
        b.diff
            .abs()
            .partial_cmp(&a.diff.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    worst.truncate(n);
    worst
}

/// Count records whose stored status disagrees with what the classification
/// rule derives from their figures at the given tolerance
pub fn count_status_drift(records: &[ReconRecord], tolerance: f64) -> usize {
    records
        .iter()
        .filter(|r| r.expected_status(tolerance) != r.status)
        .count()
}

#[cfg(test)]
#[path = "recon_test.rs"]
mod tests;
