//! Cross-entity validation of a complete dataset
//!
//! Every check runs on every call; nothing short-circuits, so one pass
//! surfaces all violations. Messages come out in a fixed check order:
//!
//! 1. KPI reconciliation (medical + rx vs total, tolerance 1.0)
//! 2. Exactly 12 monthly cost records
//! 3. Member distribution claimant % and payment % columns each sum to 100 +/- 1
//! 4. Diagnosis by cost, then by utilization, percentages within 0-100
//! 5. Preventive screening participation percentages within 0-100

use crate::dataset::CompleteDashboardData;
use serde::Serialize;
use tracing::{debug, warn};

/// Number of monthly records in a complete plan year
pub const EXPECTED_MONTHS: usize = 12;

/// Accepted window for a percentage column total
pub const PERCENT_SUM_MIN: f64 = 99.0;
pub const PERCENT_SUM_MAX: f64 = 101.0;

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    violations: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violation messages in check order
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// `(is_valid, violations)`
    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.violations.is_empty(), self.violations)
    }

    fn push(&mut self, message: String) {
        warn!(violation = %message, "dataset validation");
        self.violations.push(message);
    }
}

fn percent_sum_ok(sum: f64) -> bool {
    (PERCENT_SUM_MIN..=PERCENT_SUM_MAX).contains(&sum)
}

/// Check every cross-field invariant of `data`
pub fn validate(data: &CompleteDashboardData) -> ValidationReport {
    let mut report = ValidationReport::default();

    let kpi = &data.financial_kpis;
    if !kpi.reconciles() {
        report.push(format!(
            "Financial KPIs: Medical + RX ({:.2}) doesn't equal total ({:.2})",
            kpi.medical_plan_payment + kpi.rx_plan_payment,
            kpi.total_plan_payment
        ));
    }

    if data.monthly_costs.len() != EXPECTED_MONTHS {
        report.push(format!(
            "Monthly costs: Expected {} months, got {}",
            EXPECTED_MONTHS,
            data.monthly_costs.len()
        ));
    }

    let claimants: f64 = data.member_distribution.iter().map(|d| d.claimants_percent).sum();
    let payments: f64 = data.member_distribution.iter().map(|d| d.payments_percent).sum();
    if !percent_sum_ok(claimants) {
        report.push(format!(
            "Member distribution: Claimants % sum to {:.2}, expected ~100",
            claimants
        ));
    }
    if !percent_sum_ok(payments) {
        report.push(format!(
            "Member distribution: Payments % sum to {:.2}, expected ~100",
            payments
        ));
    }

    for dx in data.diagnosis_by_cost.iter().filter(|d| !d.is_valid()) {
        report.push(format!(
            "Diagnosis by cost: Invalid percentage for {}",
            dx.diagnosis_code
        ));
    }
    for dx in data.diagnosis_by_utilization.iter().filter(|d| !d.is_valid()) {
        report.push(format!(
            "Diagnosis by utilization: Invalid percentage for {}",
            dx.diagnosis_code
        ));
    }

    for screening in data.preventive_screenings.iter().filter(|s| !s.is_valid()) {
        report.push(format!(
            "Preventive screening: Invalid participation % for {}",
            screening.screening_name
        ));
    }

    debug!(violations = report.violations.len(), "validation complete");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::CostRange;
    use crate::model::*;
    use chrono::NaiveDate;

    fn minimal_dataset() -> CompleteDashboardData {
        let months = plan_year_months(4);
        CompleteDashboardData {
            plan_info: PlanInfo::new(
                "Test Plan",
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            )
            .unwrap(),
            financial_kpis: FinancialKpi::new(500.0, 300.0, 200.0).unwrap(),
            monthly_costs: months
                .iter()
                .map(|m| MonthlyCostSummary::new(*m, 2024, 25.0, 16.0, 100).unwrap())
                .collect(),
            budget_vs_actuals: vec![],
            member_distribution: vec![
                MemberDistribution::new(CostRange::Under25k, 94.0, 29.0).unwrap(),
                MemberDistribution::new(CostRange::From25kTo50k, 2.0, 9.0).unwrap(),
                MemberDistribution::new(CostRange::From50kTo100k, 2.0, 19.0).unwrap(),
                MemberDistribution::new(CostRange::Over100k, 2.0, 43.0).unwrap(),
            ],
            top_claimants: vec![],
            place_of_service: vec![],
            diagnosis_by_cost: vec![DiagnosisByCost::new("C02.1", "Tongue", 10.0, 99.9).unwrap()],
            diagnosis_by_utilization: vec![],
            medical_episodes: vec![],
            drug_classes: vec![],
            er_utilization: vec![],
            er_top_diagnoses: vec![],
            chronic_condition_compliance: vec![],
            preventive_screenings: vec![
                PreventiveScreening::new("Preventive Care Visit", 1100, 1050, 92.0, 94.0).unwrap(),
            ],
        }
    }

    #[test]
    fn test_minimal_dataset_passes() {
        let report = validate(&minimal_dataset());
        assert!(report.is_valid(), "{:?}", report.violations());
    }

    #[test]
    fn test_kpi_mismatch_is_reported() {
        let mut data = minimal_dataset();
        data.financial_kpis.total_plan_payment = 499.0;
        let (ok, violations) = validate(&data).into_parts();
        assert!(!ok);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("Financial KPIs"));
        assert!(violations[0].contains("499.00"));
    }

    #[test]
    fn test_eleven_months_reports_exactly_one_violation() {
        let mut data = minimal_dataset();
        data.monthly_costs.pop();
        let report = validate(&data);
        assert_eq!(report.violations(), &["Monthly costs: Expected 12 months, got 11".to_string()]);
    }

    #[test]
    fn test_distribution_columns_checked_independently() {
        let mut data = minimal_dataset();
        data.member_distribution[0].payments_percent = 20.0;
        let report = validate(&data);
        assert_eq!(report.violations().len(), 1);
        assert!(report.violations()[0].contains("Payments % sum to 91.00"));
    }

    #[test]
    fn test_diagnosis_percent_bounds() {
        let mut data = minimal_dataset();
        data.diagnosis_by_cost[0].percentage = 101.0;
        let report = validate(&data);
        assert_eq!(
            report.violations(),
            &["Diagnosis by cost: Invalid percentage for C02.1".to_string()]
        );
    }

    #[test]
    fn test_all_checks_run_in_fixed_order() {
        let mut data = minimal_dataset();
        data.preventive_screenings[0].current_participation_percent = 104.0;
        data.diagnosis_by_cost[0].percentage = -1.0;
        data.monthly_costs.truncate(3);
        data.financial_kpis.rx_plan_payment = 0.0;

        let violations = validate(&data).violations().to_vec();
        assert_eq!(violations.len(), 4);
        assert!(violations[0].starts_with("Financial KPIs"));
        assert!(violations[1].starts_with("Monthly costs"));
        assert!(violations[2].starts_with("Diagnosis by cost"));
        assert!(violations[3].starts_with("Preventive screening"));
    }

    #[test]
    fn test_empty_distribution_fails_both_columns() {
        let mut data = minimal_dataset();
        data.member_distribution.clear();
        assert_eq!(validate(&data).violations().len(), 2);
    }
}
