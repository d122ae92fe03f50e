//! Integration tests for Dashboard Core
//!
//! Tests combining multiple modules: synthesis + validation, templates +
//! import, export + dataset reload.

use dashboard_core::csv::CsvRecord;
use dashboard_core::export::{MAPPING_FILE, MOCK_DATASET_FILE};
use dashboard_core::import::read_template;
use dashboard_core::templates::catalogue;
use dashboard_core::{
    generate_complete_dataset, import_directory, validate, write_all, write_templates,
    CompleteDashboardData, DiagnosisByCost, DiagnosisByUtilization, MonthlyCostSummary,
    PreventiveScreening, SynthConfig,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;

fn dataset(seed: u64) -> CompleteDashboardData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_complete_dataset(&mut rng, &SynthConfig::default()).unwrap()
}

// =============================================================================
// Synthesis + Validation
// =============================================================================

mod synthesis {
    use super::*;

    #[test]
    fn test_generated_dataset_passes_validation() {
        let data = dataset(42);
        let (ok, violations) = validate(&data).into_parts();
        assert!(ok, "{:?}", violations);
    }

    #[test]
    fn test_eleven_months_yields_single_violation() {
        let mut data = dataset(42);
        data.monthly_costs.pop();

        let report = validate(&data);
        assert_eq!(
            report.violations(),
            &["Monthly costs: Expected 12 months, got 11".to_string()]
        );
    }

    #[test]
    fn test_diagnosis_percent_boundary() {
        let mut data = dataset(42);
        data.diagnosis_by_cost[0].percentage = 99.9;
        assert!(validate(&data).is_valid());

        data.diagnosis_by_cost[0].percentage = 101.0;
        let report = validate(&data);
        assert_eq!(report.violations().len(), 1);
        assert!(report.violations()[0].starts_with("Diagnosis by cost: Invalid percentage for"));
    }

    #[test]
    fn test_calendar_year_plan() {
        let config = SynthConfig {
            client_name: "Calendar Plan".to_string(),
            plan_start_year: 2025,
            plan_start_month: 1,
            ..SynthConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let data = generate_complete_dataset(&mut rng, &config).unwrap();

        assert_eq!(data.monthly_costs[0].month, "January");
        assert_eq!(data.monthly_costs[11].month, "December");
        assert!(data.monthly_costs.iter().all(|m| m.year == 2025));
        assert_eq!(data.plan_info.period_display(), "1/1/2025 - 12/31/2025");
        assert!(validate(&data).is_valid());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_any_seed_validates(seed in any::<u64>()) {
            let data = dataset(seed);
            prop_assert!(validate(&data).is_valid());
            prop_assert_eq!(data.monthly_costs.len(), 12);
            prop_assert!(data
                .monthly_costs
                .windows(2)
                .all(|w| w[1].member_enrollment <= w[0].member_enrollment));
            prop_assert!(data.monthly_costs.iter().all(|m| m.member_enrollment >= 900));
        }
    }
}

// =============================================================================
// Templates + Import
// =============================================================================

mod templates {
    use super::*;

    #[test]
    fn test_template_headers_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path()).unwrap();

        for template in catalogue() {
            let text = fs::read_to_string(dir.path().join(template.file_name)).unwrap();
            let header = text
                .lines()
                .find(|l| !l.starts_with('#') && !l.is_empty())
                .unwrap();
            let columns: Vec<&str> = header.split(',').collect();
            assert_eq!(columns, template.columns, "{}", template.file_name);
        }
    }

    #[test]
    fn test_written_templates_import_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path()).unwrap();

        let tables = import_directory(dir.path());
        assert_eq!(tables.files.len(), 7);
        assert!(!tables.has_errors(), "{:?}", tables.files);

        let months = tables.monthly_costs.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, "April");
        assert_eq!(months[0].member_enrollment, 1050);

        let claimants = tables.high_cost_claimants.unwrap();
        assert_eq!(claimants[0].total_plan_payment(), 553_446.0);
    }

    #[test]
    fn test_populated_template_round_trip() {
        let data = dataset(11);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DiagnosisByCost::FILE_NAME);

        let mut text = String::from("# populated\n\n");
        text.push_str(&DiagnosisByCost::COLUMNS.join(","));
        text.push('\n');
        for dx in &data.diagnosis_by_cost {
            text.push_str(&dashboard_core::csv::format_record(&dx.to_row()));
            text.push('\n');
        }
        fs::write(&path, text).unwrap();

        let imported = read_template::<DiagnosisByCost>(&path).unwrap();
        assert!(imported.is_clean());
        assert_eq!(imported.records.len(), data.diagnosis_by_cost.len());
        for (back, original) in imported.records.iter().zip(&data.diagnosis_by_cost) {
            assert_eq!(back.diagnosis_code, original.diagnosis_code);
            assert_eq!(back.diagnosis_description, original.diagnosis_description);
            assert!((back.total_cost - original.total_cost).abs() < 0.01);
            assert!((back.percentage - original.percentage).abs() < 0.01);
        }
    }

    #[test]
    fn test_row_errors_reported_with_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MonthlyCostSummary::FILE_NAME);
        fs::write(
            &path,
            "month,year,medical_plan_payment,rx_plan_payment,member_enrollment\n\
             April,2024,450000,95000,1050\n\
             Smarch,2024,1,1,1\n\
             May,2024,abc,1,1\n",
        )
        .unwrap();

        let imported = read_template::<MonthlyCostSummary>(&path).unwrap();
        assert_eq!(imported.records.len(), 1);
        let messages: Vec<String> = imported.row_errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("row 3:"));
        assert!(messages[1].contains("row 4: column 'medical_plan_payment'"));
    }

    #[test]
    fn test_screening_and_utilization_templates_import() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path()).unwrap();

        let screenings =
            read_template::<PreventiveScreening>(&dir.path().join(PreventiveScreening::FILE_NAME))
                .unwrap();
        assert_eq!(screenings.records[0].trend().as_str(), "up");

        let utilization = read_template::<DiagnosisByUtilization>(
            &dir.path().join(DiagnosisByUtilization::FILE_NAME),
        )
        .unwrap();
        assert_eq!(utilization.records[0].claim_count, 2000);
    }
}

// =============================================================================
// Export + Reload
// =============================================================================

mod export {
    use super::*;

    #[test]
    fn test_write_all_then_reload_dataset() {
        let data = dataset(7);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("data_templates");

        let report = write_all(&out, Some(&data)).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.written.len(), 9);

        let reloaded = CompleteDashboardData::from_json_file(&out.join(MOCK_DATASET_FILE)).unwrap();
        assert_eq!(reloaded.monthly_costs, data.monthly_costs);
        assert_eq!(reloaded.plan_info, data.plan_info);
        assert_eq!(reloaded.top_claimants.len(), data.top_claimants.len());
        assert!(validate(&reloaded).is_valid());

        let mapping: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(MAPPING_FILE)).unwrap()).unwrap();
        assert_eq!(mapping.as_object().unwrap().len(), 15);
    }

    #[test]
    fn test_export_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("monthly_costs.csv"), "stale").unwrap();

        write_templates(dir.path()).unwrap();
        let text = fs::read_to_string(dir.path().join("monthly_costs.csv")).unwrap();
        assert!(text.starts_with("# Monthly Cost Summary - Template"));
    }

    #[test]
    fn test_invalid_json_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"plan_info\": 3}").unwrap();

        let err = CompleteDashboardData::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
