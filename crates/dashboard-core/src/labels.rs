//! Closed label sets used by the dashboard charts
//!
//! Each variant serializes (JSON and CSV) as the exact label the dashboard
//! displays, e.g. `CostRange::Under25k` <-> `"<$25K"`.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! label_set {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// Every variant in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown on the dashboard
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == trimmed)
                    .ok_or_else(|| ModelError::UnknownLabel {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

label_set! {
    /// Member annual cost bracket
    CostRange, "cost range" {
        Under25k => "<$25K",
        From25kTo50k => "$25K-$49.9K",
        From50kTo100k => "$50K-$99.9K",
        Over100k => ">$100K",
    }
}

label_set! {
    /// Predicted future cost band for a high-cost claimant
    PredictedCostRange, "predicted cost range" {
        Over250k => ">$250,000",
        From100kTo250k => "$100,000-$250,000",
        From50kTo100k => "$50,000-$100,000",
        Under50k => "<$50,000",
    }
}

label_set! {
    /// Service location category
    PlaceOfService, "place of service" {
        OutpatientProcedures => "Outpatient Procedures",
        InpatientHospital => "Hospital Stay (In-Patient)",
        Drugs => "Drugs",
        ImmediateAttention => "Immediate Medical Attention",
        Testing => "Testing",
        OfficeClinic => "Office/Clinic Visit",
        SubstanceAbuse => "Substance Abuse",
        MentalHealth => "Mental Health",
        Pregnancy => "Pregnancy",
        Recovery => "Recovery",
    }
}

label_set! {
    /// Emergency room visit classification
    ErCategory, "ER category" {
        AllOthers => "ER All Others",
        DrugAlcoholPsych => "ER Drug Alcohol Psych",
        Injury => "ER Injury",
        NonEmergentAvoidable => "ER Non Emergent, Avoidable",
        PcpTreatable => "ER PCP Treatable",
    }
}

impl PredictedCostRange {
    /// Band for a combined claimant total.
    ///
    /// Thresholds are on observed spend, which runs higher than the
    /// predicted band it maps to.
    pub fn from_total(total: f64) -> Self {
        if total > 400_000.0 {
            PredictedCostRange::Over250k
        } else if total > 150_000.0 {
            PredictedCostRange::From100kTo250k
        } else if total > 75_000.0 {
            PredictedCostRange::From50kTo100k
        } else {
            PredictedCostRange::Under50k
        }
    }
}
