//! CSV import templates
//!
//! Each template is a short file: `#` comment lines stating the validation
//! rules, a blank line, the header row and one sample data row. Header
//! columns come from the entity's [`CsvRecord`] impl, so the templates and
//! the importer cannot drift apart.

use crate::csv::{format_record, CsvRecord};
use crate::labels::PredictedCostRange;
use crate::model::*;

/// One template file in the catalogue
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub file_name: &'static str,
    pub title: &'static str,
    pub rules: &'static [&'static str],
    pub columns: &'static [&'static str],
    sample: fn() -> Vec<String>,
}

impl Template {
    fn of<T: CsvRecord>(
        title: &'static str,
        rules: &'static [&'static str],
        sample: fn() -> Vec<String>,
    ) -> Self {
        Template {
            file_name: T::FILE_NAME,
            title,
            rules,
            columns: T::COLUMNS,
            sample,
        }
    }

    pub fn sample_row(&self) -> Vec<String> {
        (self.sample)()
    }

    /// Full file contents
    pub fn render(&self) -> String {
        let mut out = format!("# {} - Template\n# Validation Rules:\n", self.title);
        for rule in self.rules {
            out.push_str("# - ");
            out.push_str(rule);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&format_record(self.columns));
        out.push('\n');
        out.push_str(&format_record(&self.sample_row()));
        out.push('\n');
        out
    }
}

/// Every template, in output order
pub fn catalogue() -> Vec<Template> {
    vec![
        Template::of::<MonthlyCostSummary>(
            "Monthly Cost Summary",
            &[
                "Must have exactly 12 rows (one per month)",
                "Months: January, February, March, April, May, June, July, August, September, October, November, December",
                "medical_plan_payment: numeric, >= 0",
                "rx_plan_payment: numeric, >= 0",
                "member_enrollment: integer, > 0",
            ],
            || {
                MonthlyCostSummary {
                    month: "April".to_string(),
                    year: 2024,
                    medical_plan_payment: 450_000.0,
                    rx_plan_payment: 95_000.0,
                    member_enrollment: 1050,
                }
                .to_row()
            },
        ),
        Template::of::<HighCostClaimant>(
            "High-Cost Claimants",
            &[
                "member_id: De-identified/hashed identifier",
                "medical_payment: numeric, >= 0",
                "rx_payment: numeric, >= 0",
                "predicted_cost_range: Optional, values: >$250,000 | $100,000-$250,000 | $50,000-$100,000 | <$50,000 | (blank)",
                "Typically top 10-20 claimants sorted by total descending",
            ],
            || {
                HighCostClaimant {
                    member_id: "M5678871894251147653".to_string(),
                    medical_payment: 551_798.0,
                    rx_payment: 1_648.0,
                    predicted_cost_range: Some(PredictedCostRange::Over250k),
                }
                .to_row()
            },
        ),
        Template::of::<DiagnosisByCost>(
            "Top Diagnosis by Cost",
            &[
                "Top 10 diagnoses only",
                "diagnosis_code: Valid ICD-10 code",
                "total_cost: numeric, >= 0",
                "percentage: numeric, 0-100, all percentages should sum to ~100",
                "Sorted by total_cost descending",
            ],
            || {
                DiagnosisByCost {
                    diagnosis_code: "C02.1".to_string(),
                    diagnosis_description: "Malignant neoplasm of border of tongue".to_string(),
                    total_cost: 305_000.0,
                    percentage: 17.02,
                }
                .to_row()
            },
        ),
        Template::of::<DiagnosisByUtilization>(
            "Top Diagnosis by Utilization",
            &[
                "Top 10 diagnoses only",
                "diagnosis_code: Valid ICD-10 code",
                "claim_count: integer, > 0",
                "percentage: numeric, 0-100, all percentages should sum to ~100",
                "Sorted by claim_count descending",
            ],
            || {
                DiagnosisByUtilization {
                    diagnosis_code: "Z00.00".to_string(),
                    diagnosis_description: "Encounter for general adult medical exam".to_string(),
                    claim_count: 2000,
                    percentage: 29.87,
                }
                .to_row()
            },
        ),
        Template::of::<DrugClass>(
            "Top Drug Classes by Utilization",
            &[
                "Top 10 drug classes only",
                "drug_class_name: Therapeutic class name (all caps)",
                "script_count: integer, > 0",
                "patient_cost: numeric, >= 0 (patient out-of-pocket)",
                "plan_payment: numeric, >= 0 (plan payment)",
                "Sorted by script_count descending",
            ],
            || {
                DrugClass {
                    drug_class_name: "ANTIHYPERTENSIVES".to_string(),
                    script_count: 1149,
                    patient_cost: 8_640.91,
                    plan_payment: 4_861.57,
                }
                .to_row()
            },
        ),
        Template::of::<PreventiveScreening>(
            "Adult Preventive Screenings",
            &[
                "screening_name: Type of preventive screening",
                "prior_year_members: integer, >= 0 (eligible members prior year)",
                "current_year_members: integer, >= 0 (eligible members current year)",
                "prior_participation_percent: numeric, 0-100",
                "current_participation_percent: numeric, 0-100",
            ],
            || {
                PreventiveScreening {
                    screening_name: "Preventive Care Visit".to_string(),
                    prior_year_members: 1100,
                    current_year_members: 1050,
                    prior_participation_percent: 92.0,
                    current_participation_percent: 94.0,
                }
                .to_row()
            },
        ),
        Template::of::<ChronicConditionCompliance>(
            "Chronic Condition Care Compliance",
            &[
                "condition_name: Chronic condition name",
                "compliant_count: integer, >= 0 (members compliant with care protocols)",
                "non_compliant_count: integer, >= 0 (members not compliant)",
                "avg_pmpy: numeric, >= 0 (Average Per Member Per Year cost)",
            ],
            || {
                ChronicConditionCompliance {
                    condition_name: "Hypertension".to_string(),
                    compliant_count: 180,
                    non_compliant_count: 65,
                    avg_pmpy: 12_000.0,
                }
                .to_row()
            },
        ),
    ]
}

/// Look up a template by file name
pub fn find(file_name: &str) -> Option<Template> {
    catalogue().into_iter().find(|t| t.file_name == file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_records;

    #[test]
    fn test_catalogue_has_seven_templates() {
        let names: Vec<_> = catalogue().iter().map(|t| t.file_name).collect();
        assert_eq!(
            names,
            vec![
                "monthly_costs.csv",
                "high_cost_claimants.csv",
                "diagnosis_by_cost.csv",
                "diagnosis_by_utilization.csv",
                "drug_classes.csv",
                "preventive_screenings.csv",
                "chronic_condition_compliance.csv",
            ]
        );
    }

    #[test]
    fn test_render_layout() {
        let template = find("monthly_costs.csv").unwrap();
        let text = template.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# Monthly Cost Summary - Template");
        assert_eq!(lines[1], "# Validation Rules:");
        assert_eq!(lines[2], "# - Must have exactly 12 rows (one per month)");
        assert_eq!(lines[7], "");
        assert_eq!(
            lines[8],
            "month,year,medical_plan_payment,rx_plan_payment,member_enrollment"
        );
        assert_eq!(lines[9], "April,2024,450000.00,95000.00,1050");
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn test_sample_rows() {
        assert_eq!(
            find("high_cost_claimants.csv").unwrap().sample_row(),
            vec!["M5678871894251147653", "551798.00", "1648.00", ">$250,000"]
        );
        assert_eq!(
            find("preventive_screenings.csv").unwrap().sample_row(),
            vec!["Preventive Care Visit", "1100", "1050", "92", "94"]
        );
        assert_eq!(
            find("diagnosis_by_cost.csv").unwrap().sample_row()[3],
            "17.02"
        );
    }

    #[test]
    fn test_every_template_parses_to_header_plus_sample() {
        for template in catalogue() {
            let records = parse_records(&template.render()).unwrap();
            assert_eq!(records.len(), 2, "{}", template.file_name);
            assert_eq!(records[0].fields, template.columns);
            assert_eq!(records[1].fields.len(), template.columns.len());
        }
    }

    #[test]
    fn test_quoted_sample_field() {
        // '>$250,000' contains a comma
        let text = find("high_cost_claimants.csv").unwrap().render();
        assert!(text.ends_with("M5678871894251147653,551798.00,1648.00,\">$250,000\"\n"));
    }
}
