//! Visualization-to-schema mapping
//!
//! Documents which entity and attributes feed each dashboard chart or
//! table. Serialized to `visualization_mapping.json` as an object keyed by
//! visualization id, in dashboard order.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One displayed element bound to a record attribute
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldMapping {
    /// Series name, column heading or axis role shown on the dashboard
    pub label: &'static str,
    pub attribute: &'static str,
    /// Derived by a method rather than stored on the record
    pub computed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Visualization {
    #[serde(skip)]
    pub id: &'static str,
    pub description: &'static str,
    pub component: &'static str,
    pub data_source: &'static str,
    /// Field of `CompleteDashboardData` holding the records
    #[serde(skip)]
    pub dataset_field: &'static str,
    pub fields: Vec<FieldMapping>,
}

/// Every dashboard visualization in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizationMapping(pub Vec<Visualization>);

impl VisualizationMapping {
    pub fn get(&self, id: &str) -> Option<&Visualization> {
        self.0.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for VisualizationMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for viz in &self.0 {
            map.serialize_entry(viz.id, viz)?;
        }
        map.end()
    }
}

const fn stored(label: &'static str, attribute: &'static str) -> FieldMapping {
    FieldMapping {
        label,
        attribute,
        computed: false,
    }
}

const fn derived(label: &'static str, attribute: &'static str) -> FieldMapping {
    FieldMapping {
        label,
        attribute,
        computed: true,
    }
}

fn viz(
    id: &'static str,
    description: &'static str,
    component: &'static str,
    data_source: &'static str,
    dataset_field: &'static str,
    fields: &[FieldMapping],
) -> Visualization {
    Visualization {
        id,
        description,
        component,
        data_source,
        dataset_field,
        fields: fields.to_vec(),
    }
}

pub fn visualization_mapping() -> VisualizationMapping {
    VisualizationMapping(vec![
        viz(
            "kpi_cards",
            "Three KPI cards showing total financial metrics",
            "Card components with financial totals",
            "FinancialKpi",
            "financial_kpis",
            &[
                stored("Plan Payment", "total_plan_payment"),
                stored("Medical Plan Payment", "medical_plan_payment"),
                stored("RX Plan Payment", "rx_plan_payment"),
            ],
        ),
        viz(
            "monthly_cost_summary_chart",
            "Area/Line chart showing monthly medical and RX costs",
            "LineChart with two series",
            "MonthlyCostSummary (list)",
            "monthly_costs",
            &[
                stored("X Axis", "month"),
                stored("Medical Plan Payment", "medical_plan_payment"),
                stored("RX Plan Payment", "rx_plan_payment"),
            ],
        ),
        viz(
            "member_distribution_chart",
            "Horizontal stacked bar chart showing member distribution by cost bracket",
            "Custom horizontal bars",
            "MemberDistribution (list)",
            "member_distribution",
            &[
                stored("Categories", "cost_range"),
                stored("Claimants %", "claimants_percent"),
                stored("Payments %", "payments_percent"),
            ],
        ),
        viz(
            "budget_vs_actuals_chart",
            "Stacked bar chart with line overlay comparing budget to actual costs",
            "BudgetVsActualsChart",
            "BudgetVsActuals (list)",
            "budget_vs_actuals",
            &[
                stored("X Axis", "month"),
                stored("Claims (stacked)", "claims_actual"),
                stored("Fixed Costs (stacked)", "fixed_costs_actual"),
                stored("Budget (line)", "budget_total"),
            ],
        ),
        viz(
            "top_claimants_table",
            "Table showing top 10 high-cost members",
            "MUI Table",
            "HighCostClaimant (list)",
            "top_claimants",
            &[
                stored("Member ID", "member_id"),
                stored("Medical Payment", "medical_payment"),
                stored("RX Payment", "rx_payment"),
                derived("Plan Payment", "total_plan_payment"),
                stored("Predicted Cost Range", "predicted_cost_range"),
            ],
        ),
        viz(
            "place_of_service_chart",
            "Horizontal bar chart showing costs by service location",
            "BarChart (horizontal)",
            "PlaceOfServiceData (list)",
            "place_of_service",
            &[
                stored("Y Axis", "service_category"),
                stored("X Axis", "total_amount"),
            ],
        ),
        viz(
            "diagnosis_by_cost_chart",
            "Pie chart showing top diagnoses by cost",
            "PieChart",
            "DiagnosisByCost (list)",
            "diagnosis_by_cost",
            &[
                stored("Value", "total_cost"),
                stored("Label", "diagnosis_code"),
            ],
        ),
        viz(
            "diagnosis_by_cost_table",
            "Table showing top 10 diagnoses by cost",
            "MUI Table",
            "DiagnosisByCost (list)",
            "diagnosis_by_cost",
            &[
                stored("Code", "diagnosis_code"),
                stored("Description", "diagnosis_description"),
                stored("Cost", "total_cost"),
                stored("%", "percentage"),
            ],
        ),
        viz(
            "diagnosis_by_utilization_table",
            "Table showing top 10 diagnoses by claim count",
            "MUI Table",
            "DiagnosisByUtilization (list)",
            "diagnosis_by_utilization",
            &[
                stored("Code", "diagnosis_code"),
                stored("Description", "diagnosis_description"),
                stored("Count", "claim_count"),
                stored("%", "percentage"),
            ],
        ),
        viz(
            "medical_episodes_chart",
            "Bar chart showing top medical episodes by cost",
            "BarChart",
            "MedicalEpisode (list)",
            "medical_episodes",
            &[
                stored("X Axis", "episode_description"),
                stored("Y Axis", "total_cost"),
            ],
        ),
        viz(
            "drug_classes_table",
            "Table showing top drug classes by utilization",
            "MUI Table",
            "DrugClass (list)",
            "drug_classes",
            &[
                stored("Drug Class", "drug_class_name"),
                stored("Scripts", "script_count"),
                stored("Patient Cost", "patient_cost"),
                stored("Plan Payment", "plan_payment"),
            ],
        ),
        viz(
            "er_category_chart",
            "Bar chart showing ER visits by category",
            "BarChart",
            "ErUtilization (list)",
            "er_utilization",
            &[
                stored("X Axis", "er_category"),
                stored("Y Axis", "visit_count"),
            ],
        ),
        viz(
            "er_top_diagnosis_chart",
            "Horizontal bar chart showing top ER diagnoses",
            "Custom horizontal bars",
            "ErTopDiagnosis (list)",
            "er_top_diagnoses",
            &[
                stored("Label", "diagnosis_description"),
                stored("Value", "visit_count"),
            ],
        ),
        viz(
            "chronic_condition_compliance_chart",
            "Stacked bar chart showing care compliance by condition",
            "BarChart (stacked)",
            "ChronicConditionCompliance (list)",
            "chronic_condition_compliance",
            &[
                stored("X Axis", "condition_name"),
                stored("Non-Compliant", "non_compliant_count"),
                stored("Compliant", "compliant_count"),
            ],
        ),
        viz(
            "preventive_screenings_table",
            "Table showing year-over-year preventive screening participation",
            "MUI Table",
            "PreventiveScreening (list)",
            "preventive_screenings",
            &[
                stored("Screening", "screening_name"),
                stored("Prior Year Members", "prior_year_members"),
                stored("Current Members", "current_year_members"),
                stored("Prior Participation", "prior_participation_percent"),
                stored("Current Participation", "current_participation_percent"),
                derived("Trend", "participation_change"),
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthConfig;
    use crate::synth::generate_complete_dataset;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fifteen_visualizations_in_order() {
        let mapping = visualization_mapping();
        assert_eq!(mapping.len(), 15);

        let json = serde_json::to_string(&mapping).unwrap();
        let first = json.find("\"kpi_cards\"").unwrap();
        let last = json.find("\"preventive_screenings_table\"").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(visualization_mapping()).unwrap();
        let table = &value["top_claimants_table"];
        assert_eq!(table["component"], "MUI Table");
        assert_eq!(table["data_source"], "HighCostClaimant (list)");
        assert_eq!(table["fields"][3]["attribute"], "total_plan_payment");
        assert_eq!(table["fields"][3]["computed"], true);
        assert!(table.get("id").is_none());
        assert!(table.get("dataset_field").is_none());
    }

    #[test]
    fn test_stored_attributes_exist_on_records() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let data = generate_complete_dataset(&mut rng, &SynthConfig::default()).unwrap();
        let dataset = serde_json::to_value(&data).unwrap();

        for viz in visualization_mapping().0 {
            let source = &dataset[viz.dataset_field];
            let record = source.get(0).unwrap_or(source);
            for field in viz.fields.iter().filter(|f| !f.computed) {
                assert!(
                    record.get(field.attribute).is_some(),
                    "{}: {} missing",
                    viz.id,
                    field.attribute
                );
            }
        }
    }
}
