//! Synthesizer parameters
//!
//! Defaults reproduce the illustrative plan used for dashboard development:
//! a ~1,200 member plan year starting in April with ~$6.6M annual spend.
//! Any field may be overridden from a JSON file; missing fields keep their
//! defaults.

use crate::allocation::RatioRange;
use crate::error::ConfigError;
use crate::synth::{COST_DIAGNOSES, DRUG_CLASSES, UTILIZATION_DIAGNOSES};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Closed interval sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    pub const fn new(low: f64, high: f64) -> Self {
        UniformRange { low, high }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.low >= self.high {
            self.low
        } else {
            rng.gen_range(self.low..=self.high)
        }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(ConfigError::Invalid {
                field,
                reason: "bounds must be finite".to_string(),
            });
        }
        if self.low > self.high {
            return Err(ConfigError::InvertedRange {
                field,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    fn check_non_negative(&self, field: &'static str) -> Result<(), ConfigError> {
        self.check(field)?;
        if self.low < 0.0 {
            return Err(ConfigError::Invalid {
                field,
                reason: "bounds must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub client_name: String,
    pub plan_start_year: i32,
    /// Calendar month (1-12) the plan year starts in
    pub plan_start_month: u32,

    // Monthly cost series
    pub medical_baseline: f64,
    /// Seasonal factor is `1 + U(-v, v)`
    pub seasonal_variation: f64,
    pub spike_probability: f64,
    pub spike_multiplier: UniformRange,
    pub monthly_rx: UniformRange,
    pub base_enrollment: u32,
    pub enrollment_floor: u32,
    pub max_monthly_attrition: u32,

    // Budget derived from monthly totals
    pub budget_margin: UniformRange,
    pub claims_share: UniformRange,

    // High-cost claimants
    pub claimant_count: usize,
    pub claimant_base_cost: f64,
    pub claimant_decay_exponent: f64,
    pub claimant_medical_share: UniformRange,
    pub prediction_probability: f64,

    // Percentage-allocated collections
    pub diagnosis_count: usize,
    pub diagnosis_cost_pool: f64,
    pub diagnosis_cost_ratio: RatioRange,
    pub utilization_claim_pool: u32,
    pub utilization_ratio: RatioRange,
    pub episode_cost_pool: f64,
    pub episode_ratio: RatioRange,
    pub distribution_claimants_ratio: RatioRange,
    pub distribution_payments_ratio: RatioRange,

    // Drug classes
    pub drug_class_count: usize,
    pub scripts_per_class: UniformRange,
    pub patient_cost_per_script: UniformRange,
    pub plan_payment_per_script: UniformRange,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            client_name: "Sample Healthcare Plan".to_string(),
            plan_start_year: 2024,
            plan_start_month: 4,

            medical_baseline: 450_000.0,
            seasonal_variation: 0.3,
            spike_probability: 0.1,
            spike_multiplier: UniformRange::new(1.0, 2.0),
            monthly_rx: UniformRange::new(85_000.0, 125_000.0),
            base_enrollment: 1200,
            enrollment_floor: 900,
            max_monthly_attrition: 25,

            budget_margin: UniformRange::new(1.05, 1.15),
            claims_share: UniformRange::new(0.75, 0.85),

            claimant_count: 10,
            claimant_base_cost: 600_000.0,
            claimant_decay_exponent: 0.7,
            claimant_medical_share: UniformRange::new(0.85, 0.98),
            prediction_probability: 0.7,

            diagnosis_count: 10,
            diagnosis_cost_pool: 1_800_000.0,
            diagnosis_cost_ratio: RatioRange { low: 0.15, high: 0.25 },
            utilization_claim_pool: 6700,
            utilization_ratio: RatioRange { low: 0.08, high: 0.35 },
            episode_cost_pool: 3_062_000.0,
            episode_ratio: RatioRange { low: 0.6, high: 1.2 },
            distribution_claimants_ratio: RatioRange { low: 0.04, high: 0.1 },
            distribution_payments_ratio: RatioRange { low: 0.8, high: 1.3 },

            drug_class_count: 10,
            scripts_per_class: UniformRange::new(300.0, 1200.0),
            patient_cost_per_script: UniformRange::new(5.0, 50.0),
            plan_payment_per_script: UniformRange::new(3.0, 500.0),
        }
    }
}

fn check_probability(field: &'static str, p: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("probability must be within 0..=1, got {}", p),
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {}", value),
        });
    }
    Ok(())
}

impl SynthConfig {
    /// Load overrides from a JSON file and validate the result
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SynthConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "client_name",
                reason: "must not be empty".to_string(),
            });
        }
        if !(1..=12).contains(&self.plan_start_month) {
            return Err(ConfigError::Invalid {
                field: "plan_start_month",
                reason: format!("must be 1-12, got {}", self.plan_start_month),
            });
        }

        check_positive("medical_baseline", self.medical_baseline)?;
        if !(0.0..1.0).contains(&self.seasonal_variation) {
            return Err(ConfigError::Invalid {
                field: "seasonal_variation",
                reason: "must be within 0..1".to_string(),
            });
        }
        check_probability("spike_probability", self.spike_probability)?;
        self.spike_multiplier.check_non_negative("spike_multiplier")?;
        self.monthly_rx.check_non_negative("monthly_rx")?;
        if self.enrollment_floor > self.base_enrollment {
            return Err(ConfigError::Invalid {
                field: "enrollment_floor",
                reason: format!(
                    "floor {} exceeds base enrollment {}",
                    self.enrollment_floor, self.base_enrollment
                ),
            });
        }

        self.budget_margin.check_non_negative("budget_margin")?;
        self.claims_share.check_non_negative("claims_share")?;
        if self.claims_share.high > 1.0 {
            return Err(ConfigError::Invalid {
                field: "claims_share",
                reason: "claims cannot exceed the month's total".to_string(),
            });
        }

        check_positive("claimant_base_cost", self.claimant_base_cost)?;
        if !self.claimant_decay_exponent.is_finite() || self.claimant_decay_exponent < 0.0 {
            return Err(ConfigError::Invalid {
                field: "claimant_decay_exponent",
                reason: "must be a non-negative number".to_string(),
            });
        }
        self.claimant_medical_share.check_non_negative("claimant_medical_share")?;
        if self.claimant_medical_share.high > 1.0 {
            return Err(ConfigError::Invalid {
                field: "claimant_medical_share",
                reason: "medical share cannot exceed 1".to_string(),
            });
        }
        check_probability("prediction_probability", self.prediction_probability)?;

        if self.diagnosis_count == 0 {
            return Err(ConfigError::Invalid {
                field: "diagnosis_count",
                reason: "must be at least 1".to_string(),
            });
        }
        let diagnosis_codes = COST_DIAGNOSES.len().min(UTILIZATION_DIAGNOSES.len());
        if self.diagnosis_count > diagnosis_codes {
            return Err(ConfigError::Invalid {
                field: "diagnosis_count",
                reason: format!(
                    "only {} distinct diagnosis codes, got {}",
                    diagnosis_codes, self.diagnosis_count
                ),
            });
        }
        check_positive("diagnosis_cost_pool", self.diagnosis_cost_pool)?;
        check_positive("episode_cost_pool", self.episode_cost_pool)?;
        self.diagnosis_cost_ratio.check("diagnosis_cost_ratio")?;
        self.utilization_ratio.check("utilization_ratio")?;
        self.episode_ratio.check("episode_ratio")?;
        self.distribution_claimants_ratio.check("distribution_claimants_ratio")?;
        self.distribution_payments_ratio.check("distribution_payments_ratio")?;

        if self.drug_class_count > DRUG_CLASSES.len() {
            return Err(ConfigError::Invalid {
                field: "drug_class_count",
                reason: format!(
                    "only {} distinct drug classes, got {}",
                    DRUG_CLASSES.len(),
                    self.drug_class_count
                ),
            });
        }
        self.scripts_per_class.check_non_negative("scripts_per_class")?;
        self.patient_cost_per_script.check_non_negative("patient_cost_per_script")?;
        self.plan_payment_per_script.check_non_negative("plan_payment_per_script")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        SynthConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"client_name": "Acme Co", "plan_start_month": 1}}"#).unwrap();

        let config = SynthConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.client_name, "Acme Co");
        assert_eq!(config.plan_start_month, 1);
        assert_eq!(config.base_enrollment, 1200);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let config = SynthConfig {
            monthly_rx: UniformRange::new(125_000.0, 85_000.0),
            ..SynthConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { field: "monthly_rx", .. })
        ));
    }

    #[test]
    fn test_rejects_floor_above_base() {
        let config = SynthConfig {
            enrollment_floor: 2000,
            ..SynthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_counts_beyond_tables() {
        let config = SynthConfig {
            diagnosis_count: COST_DIAGNOSES.len() + 1,
            ..SynthConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "diagnosis_count", .. })
        ));

        let config = SynthConfig {
            drug_class_count: DRUG_CLASSES.len() + 1,
            ..SynthConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "drug_class_count", .. })
        ));

        let config = SynthConfig {
            diagnosis_count: COST_DIAGNOSES.len(),
            drug_class_count: DRUG_CLASSES.len(),
            ..SynthConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SynthConfig::from_json_file(Path::new("/nonexistent/synth.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/synth.json"));
    }
}
