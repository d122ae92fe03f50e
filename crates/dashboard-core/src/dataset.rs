//! The complete dashboard dataset
//!
//! [`CompleteDashboardData`] owns one instance of every entity the dashboard
//! renders. It is the unit handed to validation, export and the CLI summary,
//! and is treated as an immutable snapshot once built.

use crate::error::{ExportError, ImportError};
use crate::export::write_atomic;
use crate::model::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every record needed to populate the analytics dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteDashboardData {
    pub plan_info: PlanInfo,
    pub financial_kpis: FinancialKpi,

    // Time series
    pub monthly_costs: Vec<MonthlyCostSummary>,
    pub budget_vs_actuals: Vec<BudgetVsActuals>,

    pub member_distribution: Vec<MemberDistribution>,
    pub top_claimants: Vec<HighCostClaimant>,

    // Services and diagnoses
    pub place_of_service: Vec<PlaceOfServiceData>,
    pub diagnosis_by_cost: Vec<DiagnosisByCost>,
    pub diagnosis_by_utilization: Vec<DiagnosisByUtilization>,
    pub medical_episodes: Vec<MedicalEpisode>,

    pub drug_classes: Vec<DrugClass>,

    pub er_utilization: Vec<ErUtilization>,
    pub er_top_diagnoses: Vec<ErTopDiagnosis>,

    // Chronic care and prevention
    pub chronic_condition_compliance: Vec<ChronicConditionCompliance>,
    pub preventive_screenings: Vec<PreventiveScreening>,
}

/// Headline figures printed after a generation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub client_name: String,
    pub plan_period: String,
    pub total_plan_payment: f64,
    pub medical_plan_payment: f64,
    pub rx_plan_payment: f64,
    pub monthly_records: usize,
    pub high_cost_claimants: usize,
    pub top_claimant_total: Option<f64>,
    pub diagnosis_by_cost: usize,
    pub diagnosis_by_utilization: usize,
    pub drug_classes: usize,
    pub chronic_conditions: usize,
    pub preventive_screenings: usize,
}

impl CompleteDashboardData {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            client_name: self.plan_info.client_name.clone(),
            plan_period: self.plan_info.period_display(),
            total_plan_payment: self.financial_kpis.total_plan_payment,
            medical_plan_payment: self.financial_kpis.medical_plan_payment,
            rx_plan_payment: self.financial_kpis.rx_plan_payment,
            monthly_records: self.monthly_costs.len(),
            high_cost_claimants: self.top_claimants.len(),
            top_claimant_total: self.top_claimants.first().map(|c| c.total_plan_payment()),
            diagnosis_by_cost: self.diagnosis_by_cost.len(),
            diagnosis_by_utilization: self.diagnosis_by_utilization.len(),
            drug_classes: self.drug_classes.len(),
            chronic_conditions: self.chronic_condition_compliance.len(),
            preventive_screenings: self.preventive_screenings.len(),
        }
    }

    /// Write the dataset as pretty JSON, replacing any existing file
    pub fn to_json_file(&self, path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ExportError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, json.as_bytes())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ImportError> {
        let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
