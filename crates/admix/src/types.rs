//! Core data types for budget allocations and competitor signals.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Campaign objective. Drives both platform weight selection and the
/// funnel-stage split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Awareness,
    Traffic,
    Leads,
    Sales,
    Conversions,
}

impl Goal {
    /// All goals, in funnel order.
    pub const ALL: [Goal; 5] = [
        Goal::Awareness,
        Goal::Traffic,
        Goal::Leads,
        Goal::Sales,
        Goal::Conversions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Awareness => "awareness",
            Goal::Traffic => "traffic",
            Goal::Leads => "leads",
            Goal::Sales => "sales",
            Goal::Conversions => "conversions",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awareness" => Ok(Goal::Awareness),
            "traffic" => Ok(Goal::Traffic),
            "leads" => Ok(Goal::Leads),
            "sales" => Ok(Goal::Sales),
            "conversions" => Ok(Goal::Conversions),
            other => Err(format!("unknown goal: {other}")),
        }
    }
}

/// Per-platform dollar allocation for one campaign budget.
///
/// Values sum to `total` within rounding tolerance (each share is rounded
/// to 2 decimal places independently).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub allocations: BTreeMap<String, f64>,
    pub total: f64,
}

impl AllocationPlan {
    /// Sum of the rounded per-platform shares.
    pub fn allocated_total(&self) -> f64 {
        self.allocations.values().sum()
    }
}

/// Three-bucket funnel split as percentages of spend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FunnelSplit {
    pub tof: f64,
    pub mof: f64,
    pub bof: f64,
}

impl FunnelSplit {
    /// Always 100.0 for splits produced by the allocator.
    pub fn total(&self) -> f64 {
        self.tof + self.mof + self.bof
    }
}

/// A ranked entity with its raw frequency across the analyzed pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub value: String,
    pub count: u32,
}

/// Ranked targeting hints mined from competitor pages.
///
/// Built fresh per analysis call; each list is ordered by descending
/// frequency and independently capped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorSignal {
    /// Ranked keywords, domain-relevant terms first.
    pub keywords: Vec<String>,
    /// Raw keyword frequencies before priority promotion.
    pub keyword_counts: Vec<EntityCount>,
    pub cities: Vec<EntityCount>,
    pub states: Vec<EntityCount>,
    pub zips: Vec<EntityCount>,
}

impl CompetitorSignal {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.cities.is_empty()
            && self.states.is_empty()
            && self.zips.is_empty()
    }
}

/// Errors surfaced by the library.
#[derive(thiserror::Error, Debug)]
pub enum AdmixError {
    #[error("total budget {total:.2} is below the minimum of {minimum:.2}")]
    BelowMinimumBudget { total: f64, minimum: f64 },

    #[error("no enabled platform carries any allocation weight")]
    NoEnabledPlatforms,

    #[error("matcher pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Convenience result type.
pub type AdmixResult<T> = Result<T, AdmixError>;
