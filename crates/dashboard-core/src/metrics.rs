//! Plan analytics derived from a dataset
//!
//! PMPM (per member per month) figures are computed from the monthly cost
//! series; the budget roll-up sums the budget-vs-actuals rows.

use crate::model::{BudgetVsActuals, MonthlyCostSummary};
use serde::Serialize;

/// PMPM for one month and its movement against the previous month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PmpmPoint {
    pub month: String,
    pub year: i32,
    pub pmpm: f64,
    /// Absent for the first month
    pub change: Option<f64>,
    /// Absent for the first month or when the previous PMPM is zero
    pub change_percent: Option<f64>,
}

/// Month-over-month PMPM series in plan-year order
pub fn pmpm_trend(monthly: &[MonthlyCostSummary]) -> Vec<PmpmPoint> {
    let mut previous: Option<f64> = None;
    monthly
        .iter()
        .map(|m| {
            let pmpm = m.per_member_cost();
            let change = previous.map(|p| pmpm - p);
            let change_percent = previous.filter(|p| *p > 0.0).map(|p| (pmpm - p) / p * 100.0);
            previous = Some(pmpm);
            PmpmPoint {
                month: m.month.clone(),
                year: m.year,
                pmpm,
                change,
                change_percent,
            }
        })
        .collect()
}

/// Trailing average PMPM over `window` months.
///
/// Entry `i` averages months `i + 1 - window ..= i`; the series starts once a
/// full window is available. Empty when `window` is zero or longer than
/// the series.
pub fn rolling_pmpm(monthly: &[MonthlyCostSummary], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    monthly
        .windows(window)
        .map(|w| w.iter().map(|m| m.per_member_cost()).sum::<f64>() / window as f64)
        .collect()
}

/// Sum of monthly enrollment
pub fn member_months(monthly: &[MonthlyCostSummary]) -> u64 {
    monthly.iter().map(|m| m.member_enrollment as u64).sum()
}

/// Plan-period spend divided by member months; zero with no enrollment
pub fn plan_pmpm(monthly: &[MonthlyCostSummary]) -> f64 {
    let months = member_months(monthly);
    if months == 0 {
        return 0.0;
    }
    let total: f64 = monthly.iter().map(|m| m.total_payment()).sum();
    total / months as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRollup {
    pub total_budget: f64,
    pub total_actual: f64,
    /// Positive when under budget
    pub variance: f64,
    pub variance_percent: f64,
    pub months_over_budget: usize,
}

pub fn budget_rollup(rows: &[BudgetVsActuals]) -> BudgetRollup {
    let total_budget: f64 = rows.iter().map(|r| r.budget_total).sum();
    let total_actual: f64 = rows.iter().map(|r| r.total_actual()).sum();
    let variance = total_budget - total_actual;
    BudgetRollup {
        total_budget,
        total_actual,
        variance,
        variance_percent: if total_budget > 0.0 {
            variance / total_budget * 100.0
        } else {
            0.0
        },
        months_over_budget: rows.iter().filter(|r| r.variance() < 0.0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(name: &str, medical: f64, rx: f64, enrollment: u32) -> MonthlyCostSummary {
        MonthlyCostSummary::new(name, 2024, medical, rx, enrollment).unwrap()
    }

    #[test]
    fn test_pmpm_trend_changes() {
        let series = vec![
            month("April", 900.0, 100.0, 10),
            month("May", 1000.0, 200.0, 10),
            month("June", 0.0, 0.0, 0),
            month("July", 500.0, 0.0, 5),
        ];
        let trend = pmpm_trend(&series);

        assert_eq!(trend[0].pmpm, 100.0);
        assert_eq!(trend[0].change, None);
        assert_eq!(trend[1].change, Some(20.0));
        assert_eq!(trend[1].change_percent, Some(20.0));
        assert_eq!(trend[2].pmpm, 0.0);
        // previous month had no enrollment
        assert_eq!(trend[3].change, Some(100.0));
        assert_eq!(trend[3].change_percent, None);
    }

    #[test]
    fn test_rolling_pmpm_window() {
        let series = vec![
            month("April", 100.0, 0.0, 1),
            month("May", 200.0, 0.0, 1),
            month("June", 300.0, 0.0, 1),
        ];
        assert_eq!(rolling_pmpm(&series, 2), vec![150.0, 250.0]);
        assert_eq!(rolling_pmpm(&series, 3), vec![200.0]);
        assert!(rolling_pmpm(&series, 4).is_empty());
        assert!(rolling_pmpm(&series, 0).is_empty());
    }

    #[test]
    fn test_plan_pmpm_uses_member_months() {
        let series = vec![month("April", 1000.0, 200.0, 10), month("May", 600.0, 0.0, 5)];
        assert_eq!(member_months(&series), 15);
        assert_eq!(plan_pmpm(&series), 120.0);
        assert_eq!(plan_pmpm(&[]), 0.0);
    }

    #[test]
    fn test_budget_rollup() {
        let rows = vec![
            BudgetVsActuals::new("April", 2024, 800.0, 200.0, 1100.0).unwrap(),
            BudgetVsActuals::new("May", 2024, 900.0, 300.0, 1100.0).unwrap(),
        ];
        let rollup = budget_rollup(&rows);
        assert_eq!(rollup.total_budget, 2200.0);
        assert_eq!(rollup.total_actual, 2200.0);
        assert_eq!(rollup.variance, 0.0);
        assert_eq!(rollup.months_over_budget, 1);

        assert_eq!(budget_rollup(&[]).variance_percent, 0.0);
    }
}
