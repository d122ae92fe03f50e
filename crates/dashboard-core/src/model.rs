//! Entity model: one record type per dashboard visualization
//!
//! Every record is a plain owned value. Derived properties (totals, rates,
//! variances, trends) are methods computed from the owned fields on each
//! call and are never stored.
//!
//! The `new` constructors reject malformed input with a [`ModelError`]
//! naming the offending field. Fields remain public so that records read
//! from JSON or a CSV import can hold out-of-range values, which the
//! validator then reports instead of failing.

use crate::error::ModelError;
use crate::labels::{CostRange, ErCategory, PlaceOfService, PredictedCostRange};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Allowed gap between `medical + rx` and `total` on the KPI cards
pub const KPI_TOLERANCE: f64 = 1.0;

/// Participation change (percentage points) beyond which a screening trends
pub const TREND_THRESHOLD: f64 = 0.5;

/// English month names, January first
pub const CALENDAR_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// 1-based calendar number of a month name (case-insensitive)
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    CALENDAR_MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// The twelve month names of a plan year beginning at `start_month` (1-12)
pub fn plan_year_months(start_month: u32) -> Vec<&'static str> {
    let offset = (start_month.clamp(1, 12) - 1) as usize;
    (0..12).map(|i| CALENDAR_MONTHS[(offset + i) % 12]).collect()
}

fn check_amount(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if !value.is_finite() {
        return Err(ModelError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(ModelError::Negative { field, value });
    }
    Ok(value)
}

fn check_percent(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if !value.is_finite() {
        return Err(ModelError::NonFinite { field });
    }
    if !is_percent(value) {
        return Err(ModelError::PercentOutOfRange { field, value });
    }
    Ok(value)
}

fn check_text(field: &'static str, value: impl Into<String>) -> Result<String, ModelError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(ModelError::Empty { field });
    }
    Ok(value)
}

fn check_month(value: impl Into<String>) -> Result<String, ModelError> {
    let value = value.into();
    match month_number(&value) {
        Some(n) => Ok(CALENDAR_MONTHS[(n - 1) as usize].to_string()),
        None => Err(ModelError::UnknownMonth(value)),
    }
}

pub(crate) fn is_percent(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

// =============================================================================
// Plan header and KPI cards
// =============================================================================

/// Plan identification and period (dashboard header card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInfo {
    pub client_name: String,
    pub plan_start_date: NaiveDate,
    pub plan_end_date: NaiveDate,
}

impl PlanInfo {
    pub fn new(
        client_name: impl Into<String>,
        plan_start_date: NaiveDate,
        plan_end_date: NaiveDate,
    ) -> Result<Self, ModelError> {
        if plan_end_date < plan_start_date {
            return Err(ModelError::InvertedPeriod {
                start: plan_start_date.to_string(),
                end: plan_end_date.to_string(),
            });
        }
        Ok(PlanInfo {
            client_name: check_text("client_name", client_name)?,
            plan_start_date,
            plan_end_date,
        })
    }

    /// Build from `YYYY-MM-DD` strings
    pub fn parse(client_name: impl Into<String>, start: &str, end: &str) -> Result<Self, ModelError> {
        let parse = |field: &'static str, value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                ModelError::InvalidDate {
                    field,
                    value: value.to_string(),
                }
            })
        };
        Self::new(
            client_name,
            parse("plan_start_date", start)?,
            parse("plan_end_date", end)?,
        )
    }

    /// Plan period as shown on the header card, e.g. `4/1/2024 - 3/31/2025`
    pub fn period_display(&self) -> String {
        let (s, e) = (self.plan_start_date, self.plan_end_date);
        format!(
            "{}/{}/{} - {}/{}/{}",
            s.month(),
            s.day(),
            s.year(),
            e.month(),
            e.day(),
            e.year()
        )
    }
}

/// Plan-period payment totals (three KPI cards)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialKpi {
    pub total_plan_payment: f64,
    pub medical_plan_payment: f64,
    pub rx_plan_payment: f64,
}

impl FinancialKpi {
    pub fn new(total: f64, medical: f64, rx: f64) -> Result<Self, ModelError> {
        Ok(FinancialKpi {
            total_plan_payment: check_amount("total_plan_payment", total)?,
            medical_plan_payment: check_amount("medical_plan_payment", medical)?,
            rx_plan_payment: check_amount("rx_plan_payment", rx)?,
        })
    }

    /// KPIs whose total is the sum of its parts
    pub fn from_parts(medical: f64, rx: f64) -> Result<Self, ModelError> {
        Self::new(medical + rx, medical, rx)
    }

    /// Whether medical + rx matches the total within [`KPI_TOLERANCE`]
    pub fn reconciles(&self) -> bool {
        (self.medical_plan_payment + self.rx_plan_payment - self.total_plan_payment).abs()
            < KPI_TOLERANCE
    }
}

// =============================================================================
// Time series
// =============================================================================

/// One month of plan spend and enrollment (monthly cost summary chart)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCostSummary {
    pub month: String,
    pub year: i32,
    pub medical_plan_payment: f64,
    pub rx_plan_payment: f64,
    pub member_enrollment: u32,
}

impl MonthlyCostSummary {
    pub fn new(
        month: impl Into<String>,
        year: i32,
        medical: f64,
        rx: f64,
        member_enrollment: u32,
    ) -> Result<Self, ModelError> {
        Ok(MonthlyCostSummary {
            month: check_month(month)?,
            year,
            medical_plan_payment: check_amount("medical_plan_payment", medical)?,
            rx_plan_payment: check_amount("rx_plan_payment", rx)?,
            member_enrollment,
        })
    }

    pub fn total_payment(&self) -> f64 {
        self.medical_plan_payment + self.rx_plan_payment
    }

    /// PMPM for the month; zero when nobody is enrolled
    pub fn per_member_cost(&self) -> f64 {
        if self.member_enrollment == 0 {
            0.0
        } else {
            self.total_payment() / self.member_enrollment as f64
        }
    }
}

/// One month of budget against actual spend (budget vs actuals chart)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetVsActuals {
    pub month: String,
    pub year: i32,
    pub claims_actual: f64,
    pub fixed_costs_actual: f64,
    pub budget_total: f64,
}

impl BudgetVsActuals {
    pub fn new(
        month: impl Into<String>,
        year: i32,
        claims_actual: f64,
        fixed_costs_actual: f64,
        budget_total: f64,
    ) -> Result<Self, ModelError> {
        Ok(BudgetVsActuals {
            month: check_month(month)?,
            year,
            claims_actual: check_amount("claims_actual", claims_actual)?,
            fixed_costs_actual: check_amount("fixed_costs_actual", fixed_costs_actual)?,
            budget_total: check_amount("budget_total", budget_total)?,
        })
    }

    pub fn total_actual(&self) -> f64 {
        self.claims_actual + self.fixed_costs_actual
    }

    /// Positive when under budget
    pub fn variance(&self) -> f64 {
        self.budget_total - self.total_actual()
    }

    pub fn variance_percent(&self) -> f64 {
        if self.budget_total > 0.0 {
            self.variance() / self.budget_total * 100.0
        } else {
            0.0
        }
    }
}

// =============================================================================
// Distributions and claimants
// =============================================================================

/// Share of claimants and of payments falling in one cost bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDistribution {
    pub cost_range: CostRange,
    pub claimants_percent: f64,
    pub payments_percent: f64,
}

impl MemberDistribution {
    pub fn new(
        cost_range: CostRange,
        claimants_percent: f64,
        payments_percent: f64,
    ) -> Result<Self, ModelError> {
        Ok(MemberDistribution {
            cost_range,
            claimants_percent: check_percent("claimants_percent", claimants_percent)?,
            payments_percent: check_percent("payments_percent", payments_percent)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        is_percent(self.claimants_percent) && is_percent(self.payments_percent)
    }
}

/// A member in the upper tail of plan spend (top claimants table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighCostClaimant {
    /// De-identified member id
    pub member_id: String,
    pub medical_payment: f64,
    pub rx_payment: f64,
    pub predicted_cost_range: Option<PredictedCostRange>,
}

impl HighCostClaimant {
    pub fn new(
        member_id: impl Into<String>,
        medical_payment: f64,
        rx_payment: f64,
        predicted_cost_range: Option<PredictedCostRange>,
    ) -> Result<Self, ModelError> {
        Ok(HighCostClaimant {
            member_id: check_text("member_id", member_id)?,
            medical_payment: check_amount("medical_payment", medical_payment)?,
            rx_payment: check_amount("rx_payment", rx_payment)?,
            predicted_cost_range,
        })
    }

    pub fn total_plan_payment(&self) -> f64 {
        self.medical_payment + self.rx_payment
    }
}

/// Spend by service location (place of service chart)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOfServiceData {
    pub service_category: PlaceOfService,
    pub total_amount: f64,
    pub claim_count: Option<u32>,
}

impl PlaceOfServiceData {
    pub fn new(
        service_category: PlaceOfService,
        total_amount: f64,
        claim_count: Option<u32>,
    ) -> Result<Self, ModelError> {
        Ok(PlaceOfServiceData {
            service_category,
            total_amount: check_amount("total_amount", total_amount)?,
            claim_count,
        })
    }
}

// =============================================================================
// Diagnoses, episodes, drugs
// =============================================================================

/// Diagnosis ranked by total cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisByCost {
    /// ICD-10 code
    pub diagnosis_code: String,
    pub diagnosis_description: String,
    pub total_cost: f64,
    pub percentage: f64,
}

impl DiagnosisByCost {
    pub fn new(
        diagnosis_code: impl Into<String>,
        diagnosis_description: impl Into<String>,
        total_cost: f64,
        percentage: f64,
    ) -> Result<Self, ModelError> {
        Ok(DiagnosisByCost {
            diagnosis_code: check_text("diagnosis_code", diagnosis_code)?,
            diagnosis_description: diagnosis_description.into(),
            total_cost: check_amount("total_cost", total_cost)?,
            percentage: check_percent("percentage", percentage)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        is_percent(self.percentage)
    }
}

/// Diagnosis ranked by claim count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisByUtilization {
    /// ICD-10 code
    pub diagnosis_code: String,
    pub diagnosis_description: String,
    pub claim_count: u32,
    pub percentage: f64,
}

impl DiagnosisByUtilization {
    pub fn new(
        diagnosis_code: impl Into<String>,
        diagnosis_description: impl Into<String>,
        claim_count: u32,
        percentage: f64,
    ) -> Result<Self, ModelError> {
        Ok(DiagnosisByUtilization {
            diagnosis_code: check_text("diagnosis_code", diagnosis_code)?,
            diagnosis_description: diagnosis_description.into(),
            claim_count,
            percentage: check_percent("percentage", percentage)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        is_percent(self.percentage)
    }
}

/// Episode-of-care cost grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalEpisode {
    pub episode_description: String,
    pub total_cost: f64,
    pub percentage: f64,
}

impl MedicalEpisode {
    pub fn new(
        episode_description: impl Into<String>,
        total_cost: f64,
        percentage: f64,
    ) -> Result<Self, ModelError> {
        Ok(MedicalEpisode {
            episode_description: check_text("episode_description", episode_description)?,
            total_cost: check_amount("total_cost", total_cost)?,
            percentage: check_percent("percentage", percentage)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        is_percent(self.percentage)
    }
}

/// Prescription utilization for one therapeutic class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugClass {
    pub drug_class_name: String,
    pub script_count: u32,
    /// Patient out-of-pocket
    pub patient_cost: f64,
    pub plan_payment: f64,
}

impl DrugClass {
    pub fn new(
        drug_class_name: impl Into<String>,
        script_count: u32,
        patient_cost: f64,
        plan_payment: f64,
    ) -> Result<Self, ModelError> {
        Ok(DrugClass {
            drug_class_name: check_text("drug_class_name", drug_class_name)?,
            script_count,
            patient_cost: check_amount("patient_cost", patient_cost)?,
            plan_payment: check_amount("plan_payment", plan_payment)?,
        })
    }
}

// =============================================================================
// Emergency room
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErUtilization {
    pub er_category: ErCategory,
    pub visit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErTopDiagnosis {
    pub diagnosis_description: String,
    pub visit_count: u32,
}

impl ErTopDiagnosis {
    pub fn new(diagnosis_description: impl Into<String>, visit_count: u32) -> Result<Self, ModelError> {
        Ok(ErTopDiagnosis {
            diagnosis_description: check_text("diagnosis_description", diagnosis_description)?,
            visit_count,
        })
    }
}

// =============================================================================
// Chronic care and prevention
// =============================================================================

/// Care-protocol adherence for one chronic condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronicConditionCompliance {
    pub condition_name: String,
    pub compliant_count: u32,
    pub non_compliant_count: u32,
    /// Average per-member-per-year cost
    pub avg_pmpy: f64,
}

impl ChronicConditionCompliance {
    pub fn new(
        condition_name: impl Into<String>,
        compliant_count: u32,
        non_compliant_count: u32,
        avg_pmpy: f64,
    ) -> Result<Self, ModelError> {
        Ok(ChronicConditionCompliance {
            condition_name: check_text("condition_name", condition_name)?,
            compliant_count,
            non_compliant_count,
            avg_pmpy: check_amount("avg_pmpy", avg_pmpy)?,
        })
    }

    pub fn total_members(&self) -> u64 {
        u64::from(self.compliant_count) + u64::from(self.non_compliant_count)
    }

    /// Compliant share as a percentage; zero for an empty condition
    pub fn compliance_rate(&self) -> f64 {
        let total = self.total_members();
        if total == 0 {
            0.0
        } else {
            self.compliant_count as f64 / total as f64 * 100.0
        }
    }
}

/// Direction of year-over-year screening participation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Year-over-year participation in one preventive screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventiveScreening {
    pub screening_name: String,
    pub prior_year_members: u32,
    pub current_year_members: u32,
    pub prior_participation_percent: f64,
    pub current_participation_percent: f64,
}

impl PreventiveScreening {
    pub fn new(
        screening_name: impl Into<String>,
        prior_year_members: u32,
        current_year_members: u32,
        prior_participation_percent: f64,
        current_participation_percent: f64,
    ) -> Result<Self, ModelError> {
        Ok(PreventiveScreening {
            screening_name: check_text("screening_name", screening_name)?,
            prior_year_members,
            current_year_members,
            prior_participation_percent: check_percent(
                "prior_participation_percent",
                prior_participation_percent,
            )?,
            current_participation_percent: check_percent(
                "current_participation_percent",
                current_participation_percent,
            )?,
        })
    }

    /// Percentage-point change from prior to current year
    pub fn participation_change(&self) -> f64 {
        self.current_participation_percent - self.prior_participation_percent
    }

    pub fn trend(&self) -> Trend {
        let change = self.participation_change();
        if change > TREND_THRESHOLD {
            Trend::Up
        } else if change < -TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn is_valid(&self) -> bool {
        is_percent(self.prior_participation_percent) && is_percent(self.current_participation_percent)
    }
}
