//! Mock dataset synthesis
//!
//! Generates statistically plausible (not actuarially accurate) values for
//! every dashboard entity. Generators take the random source explicitly, so a
//! seeded `ChaCha8Rng` reproduces a dataset exactly:
//!
//! ```rust
//! use dashboard_core::{synth, validation, SynthConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let data = synth::generate_complete_dataset(&mut rng, &SynthConfig::default()).unwrap();
//! assert!(validation::validate(&data).is_valid());
//! ```
//!
//! Invariants the validator checks hold by construction: totals are sums of
//! their parts and percentage columns come from
//! [`allocate_percentages`](crate::allocation::allocate_percentages).

use crate::allocation::{allocate_percentages, allocate_percentages_sorted};
use crate::config::{SynthConfig, UniformRange};
use crate::dataset::CompleteDashboardData;
use crate::error::{ModelError, SynthError};
use crate::labels::{CostRange, ErCategory, PlaceOfService, PredictedCostRange};
use crate::model::*;
use chrono::{Months, NaiveDate};
use rand::Rng;
use tracing::{debug, info};

/// High-cost diagnoses drawn for the by-cost ranking
pub const COST_DIAGNOSES: &[(&str, &str)] = &[
    ("C02.1", "Malignant neoplasm of border of tongue"),
    ("C04.9", "Malignant neoplasm of floor of mouth"),
    ("I71.01", "Dissection of ascending aorta"),
    ("A41.9", "Sepsis; unspecified organism"),
    ("Z51.12", "Encounter for antineoplastic immunotherapy"),
    ("J96.01", "Acute respiratory failure with hypoxia"),
    ("I42.2", "Other hypertrophic cardiomyopathy"),
    ("Z12.39", "Encounter for screening for malignant neoplasm"),
    ("C34.11", "Malignant neoplasm of upper lobe, right bronchus"),
    ("I47.1", "Other supraventricular tachycardia"),
];

/// High-frequency diagnoses drawn for the by-utilization ranking.
/// Disjoint from [`COST_DIAGNOSES`].
pub const UTILIZATION_DIAGNOSES: &[(&str, &str)] = &[
    ("Z00.00", "Encounter for general adult medical exam"),
    ("I10", "Essential (primary) hypertension"),
    ("Z23", "Encounter for immunization"),
    ("E11.65", "Type 2 diabetes mellitus with hyperglycemia"),
    ("G47.33", "Obstructive sleep apnea (adult)"),
    ("Z51.11", "Encounter for antineoplastic chemotherapy"),
    ("Z12.11", "Encounter for screening for malignant neoplasm of colon"),
    ("E11.9", "Type 2 diabetes mellitus without complications"),
    ("J06.9", "Acute upper respiratory infection; unspecified"),
    ("M54.50", "Low back pain; unspecified"),
];

pub const DRUG_CLASSES: &[&str] = &[
    "ANTIHYPERTENSIVES",
    "ANTIDEPRESSANTS",
    "ANTIHYPERLIPIDEMICS",
    "ANTIDIABETICS",
    "ANTICONVULSANTS",
    "BETA BLOCKERS",
    "ANTIASTHMATIC AND BRONCHODILATOR AGENTS",
    "CALCIUM CHANNEL BLOCKERS",
    "ANALGESICS - OPIOID",
    "ADHD/ANTI-NARCOLEPSY/ANTI-OBESITY/ANOREXIANTS",
];

pub const CHRONIC_CONDITIONS: &[&str] = &[
    "Hypertension",
    "Lipid Metabolism",
    "Depression",
    "Asthma",
    "Diabetes",
    "Hypothyroidism",
    "Ischemic Heart Disease",
];

/// Conditions given the high PMPY band and a coin-flip on inverted compliance
pub const EXPENSIVE_CONDITIONS: &[&str] = &["Ischemic Heart Disease", "Diabetes"];

pub const PREVENTIVE_SCREENINGS: &[&str] = &[
    "Preventive Care Visit",
    "Lipid Disorder Screening",
    "Diabetes Screening",
    "Colorectal Cancer Screening",
    "Cervical Cancer Screening",
    "Breast Cancer Screening",
];

pub const MEDICAL_EPISODES: &[&str] = &[
    "Cancer of head and neck",
    "Heart disease",
    "Chemotherapy",
    "Respiratory disease",
    "Screening",
    "Septicemia",
    "Vascular disorder",
    "Back pain",
    "Cancer of respiratory system",
    "Medical examination",
];

/// Share of annual medical spend by service location. Drugs is taken from
/// annual RX spend instead.
const MEDICAL_SPEND_SHARES: &[(PlaceOfService, f64)] = &[
    (PlaceOfService::OutpatientProcedures, 0.34),
    (PlaceOfService::InpatientHospital, 0.23),
    (PlaceOfService::ImmediateAttention, 0.10),
    (PlaceOfService::Testing, 0.06),
    (PlaceOfService::OfficeClinic, 0.05),
    (PlaceOfService::SubstanceAbuse, 0.015),
    (PlaceOfService::MentalHealth, 0.009),
    (PlaceOfService::Pregnancy, 0.006),
    (PlaceOfService::Recovery, 0.005),
];

const ER_VISITS: &[(ErCategory, u32)] = &[
    (ErCategory::AllOthers, 1560),
    (ErCategory::DrugAlcoholPsych, 133),
    (ErCategory::Injury, 497),
    (ErCategory::NonEmergentAvoidable, 1576),
    (ErCategory::PcpTreatable, 1464),
];

const ER_TOP_DIAGNOSES: &[(&str, u32)] = &[
    ("Chest pain; unspecified", 117),
    ("Neutropenia; unspecified", 104),
    ("Hydronephrosis with renal and ureteral calculous", 101),
    ("Other chest pain", 101),
    ("Atherosclerotic heart disease", 98),
];

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// Plan header
// =============================================================================

/// Twelve-month plan period starting on the first of the configured month
pub fn generate_plan_info(config: &SynthConfig) -> Result<PlanInfo, ModelError> {
    let start = NaiveDate::from_ymd_opt(config.plan_start_year, config.plan_start_month, 1)
        .ok_or_else(|| ModelError::InvalidDate {
            field: "plan_start_date",
            value: format!("{}-{:02}-01", config.plan_start_year, config.plan_start_month),
        })?;
    let end = start
        .checked_add_months(Months::new(12))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ModelError::InvalidDate {
            field: "plan_end_date",
            value: start.to_string(),
        })?;
    PlanInfo::new(config.client_name.clone(), start, end)
}

/// Masked member id: `M` followed by 19 digits
pub fn generate_member_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "M{}",
        rng.gen_range(1_000_000_000_000_000_000u64..=9_999_999_999_999_999_999u64)
    )
}

// =============================================================================
// Time series
// =============================================================================

/// One plan year of monthly spend and enrollment.
///
/// Medical spend is the baseline times an independent seasonal factor, with
/// an occasional catastrophic-claim spike. RX spend is drawn from a narrower
/// stable band. Enrollment only ever declines, never below the floor.
pub fn generate_monthly_costs<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Vec<MonthlyCostSummary> {
    let start_month = config.plan_start_month.clamp(1, 12);
    let months = plan_year_months(start_month);
    let seasonal = UniformRange::new(-config.seasonal_variation, config.seasonal_variation);
    let mut enrollment = config.base_enrollment;
    let mut monthly = Vec::with_capacity(months.len());

    for (i, month) in months.into_iter().enumerate() {
        let seasonal_factor = 1.0 + seasonal.sample(rng);
        let spike = if rng.gen::<f64>() < config.spike_probability {
            config.spike_multiplier.sample(rng)
        } else {
            1.0
        };

        let medical = (config.medical_baseline * seasonal_factor * spike).trunc();
        let rx = config.monthly_rx.sample(rng).trunc();

        let attrition = rng.gen_range(0..=config.max_monthly_attrition);
        enrollment = enrollment.saturating_sub(attrition).max(config.enrollment_floor);

        let year_offset = (start_month as usize - 1 + i) / 12;
        monthly.push(MonthlyCostSummary {
            month: month.to_string(),
            year: config.plan_start_year + year_offset as i32,
            medical_plan_payment: medical,
            rx_plan_payment: rx,
            member_enrollment: enrollment,
        });
    }

    debug!(months = monthly.len(), final_enrollment = enrollment, "generated monthly costs");
    monthly
}

/// Plan totals summed from the monthly series
pub fn generate_financial_kpis(monthly: &[MonthlyCostSummary]) -> FinancialKpi {
    let medical: f64 = monthly.iter().map(|m| m.medical_plan_payment).sum();
    let rx: f64 = monthly.iter().map(|m| m.rx_plan_payment).sum();
    FinancialKpi {
        total_plan_payment: medical + rx,
        medical_plan_payment: medical,
        rx_plan_payment: rx,
    }
}

/// Budget rows derived from each month's actual total.
///
/// Claims and fixed costs split the actual total, and the budget is the
/// total inflated by a margin, so the two reconcile month by month.
pub fn generate_budget_vs_actuals<R: Rng + ?Sized>(
    rng: &mut R,
    monthly: &[MonthlyCostSummary],
    config: &SynthConfig,
) -> Vec<BudgetVsActuals> {
    monthly
        .iter()
        .map(|m| {
            let total = m.total_payment();
            let budget_total = total * config.budget_margin.sample(rng);
            let claims = total * config.claims_share.sample(rng);
            BudgetVsActuals {
                month: m.month.clone(),
                year: m.year,
                claims_actual: claims,
                fixed_costs_actual: total - claims,
                budget_total,
            }
        })
        .collect()
}

// =============================================================================
// Distributions and claimants
// =============================================================================

/// Claimant and payment shares per cost bracket.
///
/// Brackets draw from the top down so the small high-cost brackets take
/// their shares first and `<$25K` receives the leftover: most claimants,
/// a minority of payments.
pub fn generate_member_distribution<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Vec<MemberDistribution> {
    let brackets = CostRange::ALL.len();
    let claimants = allocate_percentages(brackets, config.distribution_claimants_ratio, rng);
    let payments = allocate_percentages(brackets, config.distribution_payments_ratio, rng);

    CostRange::ALL
        .iter()
        .enumerate()
        .map(|(i, range)| {
            let draw = brackets - 1 - i;
            MemberDistribution {
                cost_range: *range,
                claimants_percent: claimants[draw],
                payments_percent: payments[draw],
            }
        })
        .collect()
}

/// Top claimants with Pareto-shaped costs, sorted by total descending
pub fn generate_high_cost_claimants<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Vec<HighCostClaimant> {
    let mut claimants: Vec<HighCostClaimant> = (0..config.claimant_count)
        .map(|rank| {
            let base = config.claimant_base_cost
                / ((rank + 1) as f64).powf(config.claimant_decay_exponent);
            let medical = base * config.claimant_medical_share.sample(rng);
            let rx = base - medical;

            let predicted_cost_range = if rng.gen::<f64>() < config.prediction_probability {
                Some(PredictedCostRange::from_total(medical + rx))
            } else {
                None
            };

            HighCostClaimant {
                member_id: generate_member_id(rng),
                medical_payment: medical,
                rx_payment: rx,
                predicted_cost_range,
            }
        })
        .collect();

    claimants.sort_by(|a, b| b.total_plan_payment().total_cmp(&a.total_plan_payment()));
    debug!(count = claimants.len(), "generated high-cost claimants");
    claimants
}

/// Spend by service location as fixed shares of plan totals
pub fn generate_place_of_service(kpis: &FinancialKpi) -> Vec<PlaceOfServiceData> {
    let mut rows: Vec<PlaceOfServiceData> = MEDICAL_SPEND_SHARES
        .iter()
        .map(|(category, share)| PlaceOfServiceData {
            service_category: *category,
            total_amount: kpis.medical_plan_payment * share,
            claim_count: None,
        })
        .collect();

    rows.insert(
        2,
        PlaceOfServiceData {
            service_category: PlaceOfService::Drugs,
            total_amount: kpis.rx_plan_payment,
            claim_count: None,
        },
    );
    rows
}

// =============================================================================
// Diagnoses, episodes, drugs
// =============================================================================

/// Top diagnoses by cost, largest first; percentages sum to 100
pub fn generate_diagnosis_by_cost<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Vec<DiagnosisByCost> {
    allocate_percentages_sorted(config.diagnosis_count, config.diagnosis_cost_ratio, rng)
        .into_iter()
        .enumerate()
        .map(|(i, percent)| {
            let (code, description) = COST_DIAGNOSES[i % COST_DIAGNOSES.len()];
            DiagnosisByCost {
                diagnosis_code: code.to_string(),
                diagnosis_description: description.to_string(),
                total_cost: config.diagnosis_cost_pool * percent / 100.0,
                percentage: percent,
            }
        })
        .collect()
}

/// Top diagnoses by claim count, largest first; percentages sum to 100
pub fn generate_diagnosis_by_utilization<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Vec<DiagnosisByUtilization> {
    let pool = config.utilization_claim_pool as f64;
    allocate_percentages_sorted(config.diagnosis_count, config.utilization_ratio, rng)
        .into_iter()
        .enumerate()
        .map(|(i, percent)| {
            let (code, description) = UTILIZATION_DIAGNOSES[i % UTILIZATION_DIAGNOSES.len()];
            DiagnosisByUtilization {
                diagnosis_code: code.to_string(),
                diagnosis_description: description.to_string(),
                claim_count: (pool * percent / 100.0) as u32,
                percentage: percent,
            }
        })
        .collect()
}

/// Episode groupings by cost, largest first; percentages sum to 100
pub fn generate_medical_episodes<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Vec<MedicalEpisode> {
    allocate_percentages_sorted(MEDICAL_EPISODES.len(), config.episode_ratio, rng)
        .into_iter()
        .zip(MEDICAL_EPISODES)
        .map(|(percent, description)| MedicalEpisode {
            episode_description: description.to_string(),
            total_cost: config.episode_cost_pool * percent / 100.0,
            percentage: percent,
        })
        .collect()
}

/// Drug class utilization sorted by script count descending
pub fn generate_drug_classes<R: Rng + ?Sized>(rng: &mut R, config: &SynthConfig) -> Vec<DrugClass> {
    let mut classes: Vec<DrugClass> = (0..config.drug_class_count)
        .map(|i| {
            let scripts = config.scripts_per_class.sample(rng) as u32;
            DrugClass {
                drug_class_name: DRUG_CLASSES[i % DRUG_CLASSES.len()].to_string(),
                script_count: scripts,
                patient_cost: scripts as f64 * config.patient_cost_per_script.sample(rng),
                plan_payment: scripts as f64 * config.plan_payment_per_script.sample(rng),
            }
        })
        .collect();

    classes.sort_by(|a, b| b.script_count.cmp(&a.script_count));
    classes
}

// =============================================================================
// Emergency room
// =============================================================================

pub fn generate_er_utilization() -> Vec<ErUtilization> {
    ER_VISITS
        .iter()
        .map(|(er_category, visit_count)| ErUtilization {
            er_category: *er_category,
            visit_count: *visit_count,
        })
        .collect()
}

pub fn generate_er_top_diagnoses() -> Vec<ErTopDiagnosis> {
    ER_TOP_DIAGNOSES
        .iter()
        .map(|(description, visit_count)| ErTopDiagnosis {
            diagnosis_description: description.to_string(),
            visit_count: *visit_count,
        })
        .collect()
}

// =============================================================================
// Chronic care and prevention
// =============================================================================

/// Compliance per chronic condition; expensive conditions run costlier and
/// half the time have their compliance inverted
pub fn generate_chronic_condition_compliance<R: Rng + ?Sized>(
    rng: &mut R,
) -> Vec<ChronicConditionCompliance> {
    CHRONIC_CONDITIONS
        .iter()
        .map(|condition| {
            let total_members: u32 = rng.gen_range(50..=250);
            let compliance_rate = rng.gen_range(0.5..=0.8);
            let mut compliant = (total_members as f64 * compliance_rate) as u32;
            let mut non_compliant = total_members - compliant;

            let avg_pmpy = if EXPENSIVE_CONDITIONS.contains(condition) {
                let pmpy = rng.gen_range(20_000.0..=40_000.0);
                if rng.gen_bool(0.5) {
                    std::mem::swap(&mut compliant, &mut non_compliant);
                }
                pmpy
            } else {
                rng.gen_range(8_000.0..=18_000.0)
            };

            ChronicConditionCompliance {
                condition_name: condition.to_string(),
                compliant_count: compliant,
                non_compliant_count: non_compliant,
                avg_pmpy,
            }
        })
        .collect()
}

/// Year-over-year screening participation, usually improving
pub fn generate_preventive_screenings<R: Rng + ?Sized>(rng: &mut R) -> Vec<PreventiveScreening> {
    PREVENTIVE_SCREENINGS
        .iter()
        .map(|name| {
            let prior_members: u32 = rng.gen_range(250..=1100);
            let current_members = (prior_members as f64 * rng.gen_range(0.85..=1.05)) as u32;

            let prior: f64 = rng.gen_range(45.0..=85.0);
            let current = if rng.gen_bool(0.8) {
                prior + rng.gen_range(1.0..=8.0)
            } else {
                prior - rng.gen_range(1.0..=5.0)
            };

            PreventiveScreening {
                screening_name: name.to_string(),
                prior_year_members: prior_members,
                current_year_members: current_members,
                prior_participation_percent: round1(prior.clamp(0.0, 100.0)),
                current_participation_percent: round1(current.clamp(0.0, 100.0)),
            }
        })
        .collect()
}

// =============================================================================
// Complete dataset
// =============================================================================

/// Generate every entity and assemble the dashboard dataset.
///
/// The monthly series is generated first; KPIs, budget rows and place of
/// service spend are derived from it.
pub fn generate_complete_dataset<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SynthConfig,
) -> Result<CompleteDashboardData, SynthError> {
    config.validate()?;

    let plan_info = generate_plan_info(config)?;
    let monthly_costs = generate_monthly_costs(rng, config);
    let financial_kpis = generate_financial_kpis(&monthly_costs);
    let budget_vs_actuals = generate_budget_vs_actuals(rng, &monthly_costs, config);
    let member_distribution = generate_member_distribution(rng, config);
    let top_claimants = generate_high_cost_claimants(rng, config);
    let place_of_service = generate_place_of_service(&financial_kpis);
    let diagnosis_by_cost = generate_diagnosis_by_cost(rng, config);
    let diagnosis_by_utilization = generate_diagnosis_by_utilization(rng, config);
    let medical_episodes = generate_medical_episodes(rng, config);
    let drug_classes = generate_drug_classes(rng, config);
    let chronic_condition_compliance = generate_chronic_condition_compliance(rng);
    let preventive_screenings = generate_preventive_screenings(rng);

    info!(
        client = %plan_info.client_name,
        total_plan_payment = financial_kpis.total_plan_payment,
        "generated complete dashboard dataset"
    );

    Ok(CompleteDashboardData {
        plan_info,
        financial_kpis,
        monthly_costs,
        budget_vs_actuals,
        member_distribution,
        top_claimants,
        place_of_service,
        diagnosis_by_cost,
        diagnosis_by_utilization,
        medical_episodes,
        drug_classes,
        er_utilization: generate_er_utilization(),
        er_top_diagnoses: generate_er_top_diagnoses(),
        chronic_condition_compliance,
        preventive_screenings,
    })
}
