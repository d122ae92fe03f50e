//! Dashboard Core - Healthcare Analytics Data Contract
//!
//! Canonical schema for every chart and table of a healthcare plan
//! analytics dashboard, with the tooling around it.
//!
//! # Features
//!
//! - Typed entity records with checked constructors and derived metrics
//! - Cross-entity validation returning every violation found
//! - Seeded mock data synthesis with percentage columns summing to 100
//! - CSV import templates and a reader for populated templates
//! - Visualization-to-schema mapping
//!
//! # Example
//!
//! ```rust
//! use dashboard_core::{generate_complete_dataset, validate, SynthConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let data = generate_complete_dataset(&mut rng, &SynthConfig::default()).unwrap();
//!
//! let report = validate(&data);
//! assert!(report.is_valid());
//! println!("Plan period: {}", data.plan_info.period_display());
//! ```

pub mod allocation;
pub mod config;
pub mod csv;
pub mod dataset;
pub mod error;
pub mod export;
pub mod import;
pub mod labels;
pub mod mapping;
pub mod metrics;
pub mod model;
pub mod synth;
pub mod templates;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::{SynthConfig, UniformRange};
pub use dataset::{CompleteDashboardData, DatasetSummary};
pub use error::{ConfigError, ExportError, ImportError, ModelError, SynthError};
pub use export::{write_all, write_templates, ExportReport};
pub use import::{import_directory, ImportedTables};
pub use labels::{CostRange, ErCategory, PlaceOfService, PredictedCostRange};
pub use mapping::visualization_mapping;
pub use model::*;
pub use synth::generate_complete_dataset;
pub use validation::{validate, ValidationReport};
