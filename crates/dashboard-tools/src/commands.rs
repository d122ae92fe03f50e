//! Subcommand implementations
//!
//! Each command prints colored progress to stdout; structured logs from
//! the core library go through `tracing`.

use anyhow::{bail, Context, Result};
use colored::*;
use dashboard_core::export::{self, ExportReport};
use dashboard_core::metrics;
use dashboard_core::{
    generate_complete_dataset, import_directory, validate, CompleteDashboardData, SynthConfig,
    ValidationReport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::info;

// =============================================================================
// Helpers
// =============================================================================

fn section(title: &str) {
    println!("{}", "─".repeat(60));
    println!("{}", title.green().bold());
    println!("{}", "─".repeat(60));
}

/// `$1,234,567.89`
fn money(value: f64) -> String {
    let cents = format!("{:.2}", value.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}

fn load_config(path: Option<&Path>) -> Result<SynthConfig> {
    match path {
        Some(path) => {
            let config = SynthConfig::from_json_file(path)?;
            println!("  Config: {}", path.display());
            Ok(config)
        }
        None => Ok(SynthConfig::default()),
    }
}

fn generate(seed: Option<u64>, config: &SynthConfig) -> Result<CompleteDashboardData> {
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "seeding generator");
    println!("  Seed: {}", seed.to_string().cyan());

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data = generate_complete_dataset(&mut rng, config)
        .context("failed to generate mock dataset")?;
    println!("{} Mock data generated successfully", "✓".green());
    Ok(data)
}

fn print_validation(report: &ValidationReport) {
    if report.is_valid() {
        println!("{} All validation checks passed", "✓".green());
    } else {
        println!("{} Validation errors found:", "✗".red());
        for violation in report.violations() {
            println!("  - {}", violation);
        }
    }
}

fn print_export(report: &ExportReport) {
    for path in &report.written {
        println!("{} Wrote {}", "✓".green(), path.display());
    }
    for failure in &report.failures {
        eprintln!("{} {}", "Error:".red().bold(), failure);
    }
}

fn print_summary(data: &CompleteDashboardData) {
    let summary = data.summary();
    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  SUMMARY".cyan().bold());
    println!("{}", "═".repeat(60).cyan());
    println!("Client: {}", summary.client_name);
    println!("Plan Period: {}", summary.plan_period);
    println!("Total Plan Payment: {}", money(summary.total_plan_payment).cyan());
    println!("  - Medical: {}", money(summary.medical_plan_payment));
    println!("  - RX: {}", money(summary.rx_plan_payment));
    println!();
    println!("Monthly Cost Records: {}", summary.monthly_records);
    println!("Member Months: {}", metrics::member_months(&data.monthly_costs));
    println!("Plan PMPM: {}", money(metrics::plan_pmpm(&data.monthly_costs)));

    let budget = metrics::budget_rollup(&data.budget_vs_actuals);
    println!(
        "Budget Variance: {} ({:.1}%, {} month(s) over budget)",
        money(budget.variance),
        budget.variance_percent,
        budget.months_over_budget
    );
    println!();
    println!("High-Cost Claimants: {}", summary.high_cost_claimants);
    if let Some(top) = summary.top_claimant_total {
        println!("Top Claimant Total: {}", money(top));
    }
    println!();
    println!("Diagnosis by Cost: {} records", summary.diagnosis_by_cost);
    println!("Diagnosis by Utilization: {} records", summary.diagnosis_by_utilization);
    println!("Drug Classes: {} records", summary.drug_classes);
    println!("Chronic Conditions: {} records", summary.chronic_conditions);
    println!("Preventive Screenings: {} records", summary.preventive_screenings);
}

// =============================================================================
// Commands
// =============================================================================

pub fn run_all(output: &Path, seed: Option<u64>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;

    section("MOCK DATA");
    let data = generate(seed, &config)?;

    section("VALIDATION");
    let report = validate(&data);
    print_validation(&report);
    println!();

    section("ARTIFACTS");
    let artifacts = export::write_all(output, Some(&data))
        .with_context(|| format!("failed to export to {}", output.display()))?;
    print_export(&artifacts);
    println!();

    print_summary(&data);
    println!("{}", "═".repeat(60).cyan());
    println!("Templates and mappings saved to: {}", output.display());
    println!("{}", "═".repeat(60).cyan());

    exit_status(&report, &artifacts)
}

fn exit_status(report: &ValidationReport, artifacts: &ExportReport) -> Result<()> {
    if !artifacts.is_complete() {
        bail!("{} artifact(s) could not be written", artifacts.failures.len());
    }
    if !report.is_valid() {
        bail!("dataset has {} validation violation(s)", report.violations().len());
    }
    Ok(())
}

pub fn templates(output: &Path) -> Result<()> {
    section("CSV TEMPLATES");
    let report = export::write_templates(output)
        .with_context(|| format!("failed to write templates to {}", output.display()))?;
    print_export(&report);

    if !report.is_complete() {
        bail!("{} template(s) could not be written", report.failures.len());
    }
    Ok(())
}

pub fn mock(output: &Path, seed: Option<u64>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;

    section("MOCK DATA");
    let data = generate(seed, &config)?;
    print_validation(&validate(&data));

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    data.to_json_file(output)?;
    println!("{} Dataset saved to: {}", "✓".green(), output.display());
    Ok(())
}

pub fn validate_file(input: &Path) -> Result<()> {
    section("VALIDATION");
    let data = CompleteDashboardData::from_json_file(input)?;
    println!("  Input: {}", input.display());
    println!("  Plan: {} ({})", data.plan_info.client_name, data.plan_info.period_display());

    let report = validate(&data);
    print_validation(&report);

    if !report.is_valid() {
        bail!("dataset has {} validation violation(s)", report.violations().len());
    }
    Ok(())
}

pub fn import(input: &Path) -> Result<()> {
    section("IMPORT");
    if !input.is_dir() {
        bail!("{} is not a directory", input.display());
    }

    let tables = import_directory(input);
    if tables.files.is_empty() {
        println!("{} No templates found in {}", "!".yellow(), input.display());
        return Ok(());
    }

    for file in &tables.files {
        match &file.failure {
            Some(e) => eprintln!("{} {}: {}", "✗".red(), file.file_name, e),
            None if file.row_errors.is_empty() => {
                println!("{} {}: {} rows", "✓".green(), file.file_name, file.records)
            }
            None => {
                println!(
                    "{} {}: {} rows, {} rejected",
                    "!".yellow(),
                    file.file_name,
                    file.records,
                    file.row_errors.len()
                );
                for error in &file.row_errors {
                    println!("    - {}", error);
                }
            }
        }
    }

    if let Some(months) = &tables.monthly_costs {
        if months.len() != 12 {
            println!(
                "{} monthly_costs.csv: expected 12 months, got {}",
                "!".yellow(),
                months.len()
            );
        }
    }

    if tables.has_errors() {
        bail!("import finished with errors");
    }
    Ok(())
}

pub fn mapping(output: &Path) -> Result<()> {
    section("VISUALIZATION MAPPING");
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    export::write_mapping(output)?;
    println!("{} Visualization mapping saved to: {}", "✓".green(), output.display());
    Ok(())
}
