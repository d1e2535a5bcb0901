//! Budget allocation, funnel splits, and performance rebalancing.

use std::collections::{BTreeMap, HashMap};

use crate::types::{AdmixError, AdmixResult, AllocationPlan, FunnelSplit, Goal};

/// The fixed platform set known to the default weight table.
pub const PLATFORMS: [&str; 6] = ["meta", "google", "tiktok", "spotify", "twitter", "youtube"];

/// Default minimum accepted campaign budget, in dollars.
pub const DEFAULT_MIN_BUDGET: f64 = 500.0;

/// Budget tier at which funnel spend shifts toward the bottom of the funnel.
const SCALE_TIER_BUDGET: f64 = 25_000.0;

/// Floor applied to performance scores before rebalancing. Keeps a badly
/// underperforming platform from being zeroed out in a single step.
const SCORE_FLOOR: f64 = 0.5;

/// Immutable allocation configuration, injected at construction so weight
/// tables and thresholds can be overridden per call site.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    pub min_budget: f64,
    /// Base platform weights, used when the goal has no override.
    pub base_weights: BTreeMap<String, f64>,
    /// Per-goal weight overrides, replacing a subset of the base table.
    pub goal_overrides: HashMap<Goal, Vec<(String, f64)>>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        let base_weights = [
            ("meta", 0.35),
            ("google", 0.30),
            ("tiktok", 0.20),
            ("youtube", 0.06),
            ("spotify", 0.05),
            ("twitter", 0.04),
        ]
        .into_iter()
        .map(|(platform, weight)| (platform.to_string(), weight))
        .collect();

        let mut goal_overrides: HashMap<Goal, Vec<(String, f64)>> = HashMap::new();
        // Conversion goals concentrate spend on the strongest DR channels.
        let conversion_boost = vec![
            ("meta".to_string(), 0.40),
            ("google".to_string(), 0.35),
            ("tiktok".to_string(), 0.10),
        ];
        goal_overrides.insert(Goal::Sales, conversion_boost.clone());
        goal_overrides.insert(Goal::Conversions, conversion_boost);
        // Awareness favors reach-heavy video channels.
        goal_overrides.insert(
            Goal::Awareness,
            vec![("tiktok".to_string(), 0.28), ("youtube".to_string(), 0.12)],
        );
        goal_overrides.insert(
            Goal::Leads,
            vec![("meta".to_string(), 0.40), ("google".to_string(), 0.33)],
        );
        // Traffic runs on the base table.

        Self {
            min_budget: DEFAULT_MIN_BUDGET,
            base_weights,
            goal_overrides,
        }
    }
}

/// Pure budget math over an injected [`AllocatorConfig`].
#[derive(Debug, Clone, Default)]
pub struct BudgetAllocator {
    config: AllocatorConfig,
}

impl BudgetAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Split `total_budget` across the enabled platforms.
    ///
    /// Weights are restricted to the enabled set and renormalized, so the
    /// plan always spends the full budget regardless of which platforms are
    /// turned off. Platform ids are matched case-insensitively.
    pub fn allocate(
        &self,
        total_budget: f64,
        goal: Goal,
        enabled: &[String],
    ) -> AdmixResult<AllocationPlan> {
        self.check_minimum(total_budget)?;

        let weights = self.effective_weights(goal);
        let mut restricted: BTreeMap<String, f64> = BTreeMap::new();
        for platform in enabled {
            let key = platform.trim().to_ascii_lowercase();
            if let Some(weight) = weights.get(&key) {
                if *weight > 0.0 {
                    restricted.insert(key, *weight);
                }
            }
        }

        let weight_sum: f64 = restricted.values().sum();
        if weight_sum <= 0.0 {
            return Err(AdmixError::NoEnabledPlatforms);
        }

        let allocations = restricted
            .into_iter()
            .map(|(platform, weight)| (platform, round2(weight / weight_sum * total_budget)))
            .collect();

        Ok(AllocationPlan {
            allocations,
            total: total_budget,
        })
    }

    /// Three-bucket TOF/MOF/BOF split for the goal, as percentages.
    ///
    /// Budgets at or above the scale tier shift ten points from prospecting
    /// to retargeting.
    pub fn funnel_split(&self, total_budget: f64, goal: Goal) -> AdmixResult<FunnelSplit> {
        self.check_minimum(total_budget)?;

        let (tof, mof, bof) = match goal {
            Goal::Awareness => (70.0, 20.0, 10.0),
            Goal::Traffic => (55.0, 30.0, 15.0),
            Goal::Leads => (40.0, 35.0, 25.0),
            Goal::Sales | Goal::Conversions => (25.0, 35.0, 40.0),
        };

        let split = if total_budget >= SCALE_TIER_BUDGET {
            FunnelSplit {
                tof: tof - 10.0,
                mof,
                bof: bof + 10.0,
            }
        } else {
            FunnelSplit { tof, mof, bof }
        };
        Ok(split)
    }

    /// One proportional rebalancing step from observed performance.
    ///
    /// Each platform's score (ratio > 1 means outperforming) is clamped to
    /// the [`SCORE_FLOOR`], renormalized, and multiplied by the current
    /// total. Platforms missing from the score map are treated as neutral
    /// (1.0). Not a feedback loop: no hysteresis, no rate limiting.
    pub fn rebalance(
        &self,
        current: &BTreeMap<String, f64>,
        scores: &HashMap<String, f64>,
    ) -> BTreeMap<String, f64> {
        let total: f64 = current.values().sum();
        if current.is_empty() || total <= 0.0 {
            return BTreeMap::new();
        }

        let clamped: BTreeMap<&str, f64> = current
            .keys()
            .map(|platform| {
                let score = scores.get(platform).copied().unwrap_or(1.0);
                (platform.as_str(), score.max(SCORE_FLOOR))
            })
            .collect();
        let score_sum: f64 = clamped.values().sum();

        current
            .keys()
            .map(|platform| {
                let share = clamped[platform.as_str()] / score_sum;
                (platform.clone(), round2(share * total))
            })
            .collect()
    }

    fn check_minimum(&self, total_budget: f64) -> AdmixResult<()> {
        if total_budget < self.config.min_budget {
            return Err(AdmixError::BelowMinimumBudget {
                total: total_budget,
                minimum: self.config.min_budget,
            });
        }
        Ok(())
    }

    fn effective_weights(&self, goal: Goal) -> BTreeMap<String, f64> {
        let mut weights = self.config.base_weights.clone();
        if let Some(overrides) = self.config.goal_overrides.get(&goal) {
            for (platform, weight) in overrides {
                weights.insert(platform.clone(), *weight);
            }
        }
        weights
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platforms(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_allocation_sums_to_total() {
        let allocator = BudgetAllocator::default();
        let all = platforms(&PLATFORMS);
        for goal in Goal::ALL {
            let plan = allocator.allocate(10_000.0, goal, &all).unwrap();
            let tolerance = 0.01 * plan.allocations.len() as f64;
            assert!(
                (plan.allocated_total() - 10_000.0).abs() <= tolerance,
                "goal {goal}: allocated {} vs total 10000",
                plan.allocated_total()
            );
        }
    }

    #[test]
    fn test_worked_example() {
        // Traffic has no weight override, so the base 0.35/0.30/0.20 table
        // renormalizes over 0.85.
        let allocator = BudgetAllocator::default();
        let plan = allocator
            .allocate(10_000.0, Goal::Traffic, &platforms(&["meta", "google", "tiktok"]))
            .unwrap();

        assert!((plan.allocations["meta"] - 4117.65).abs() < 0.01);
        assert!((plan.allocations["google"] - 3529.41).abs() < 0.01);
        assert!((plan.allocations["tiktok"] - 2352.94).abs() < 0.01);
        assert!((plan.allocated_total() - 10_000.0).abs() <= 0.03);
    }

    #[test]
    fn test_below_minimum_rejected() {
        let allocator = BudgetAllocator::default();
        for goal in Goal::ALL {
            let result = allocator.allocate(499.99, goal, &platforms(&["meta"]));
            assert!(matches!(
                result,
                Err(AdmixError::BelowMinimumBudget { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_platforms_rejected() {
        let allocator = BudgetAllocator::default();
        let result = allocator.allocate(5000.0, Goal::Traffic, &platforms(&["myspace", "vine"]));
        assert!(matches!(result, Err(AdmixError::NoEnabledPlatforms)));

        let result = allocator.allocate(5000.0, Goal::Traffic, &[]);
        assert!(matches!(result, Err(AdmixError::NoEnabledPlatforms)));
    }

    #[test]
    fn test_platform_ids_case_insensitive() {
        let allocator = BudgetAllocator::default();
        let plan = allocator
            .allocate(2000.0, Goal::Traffic, &platforms(&["Meta", "GOOGLE"]))
            .unwrap();
        assert!(plan.allocations.contains_key("meta"));
        assert!(plan.allocations.contains_key("google"));
    }

    #[test]
    fn test_configurable_minimum() {
        let config = AllocatorConfig {
            min_budget: 5000.0,
            ..AllocatorConfig::default()
        };
        let allocator = BudgetAllocator::new(config);
        assert!(allocator
            .allocate(1000.0, Goal::Sales, &platforms(&["meta"]))
            .is_err());
        assert!(allocator.funnel_split(1000.0, Goal::Sales).is_err());
        assert!(allocator
            .allocate(5000.0, Goal::Sales, &platforms(&["meta"]))
            .is_ok());
    }

    #[test]
    fn test_goal_override_shifts_weights() {
        let allocator = BudgetAllocator::default();
        let all = platforms(&PLATFORMS);
        let traffic = allocator.allocate(10_000.0, Goal::Traffic, &all).unwrap();
        let sales = allocator.allocate(10_000.0, Goal::Sales, &all).unwrap();
        assert!(sales.allocations["meta"] > traffic.allocations["meta"]);
        assert!(sales.allocations["tiktok"] < traffic.allocations["tiktok"]);
    }

    #[test]
    fn test_funnel_sums_to_100() {
        let allocator = BudgetAllocator::default();
        for goal in Goal::ALL {
            for budget in [1000.0, 50_000.0] {
                let split = allocator.funnel_split(budget, goal).unwrap();
                assert!((split.total() - 100.0).abs() < 1e-9, "goal {goal} budget {budget}");
            }
        }
    }

    #[test]
    fn test_funnel_tier_shift() {
        let allocator = BudgetAllocator::default();
        let small = allocator.funnel_split(5000.0, Goal::Sales).unwrap();
        let large = allocator.funnel_split(50_000.0, Goal::Sales).unwrap();
        assert!((small.bof - 40.0).abs() < 1e-9);
        assert!((large.bof - 50.0).abs() < 1e-9);
        assert!(large.tof < small.tof);
    }

    #[test]
    fn test_rebalance_uniform_for_equal_scores() {
        let allocator = BudgetAllocator::default();
        let current: BTreeMap<String, f64> = [
            ("meta".to_string(), 8000.0),
            ("google".to_string(), 1000.0),
            ("tiktok".to_string(), 1000.0),
        ]
        .into_iter()
        .collect();
        let scores: HashMap<String, f64> = current.keys().map(|p| (p.clone(), 1.0)).collect();

        let rebalanced = allocator.rebalance(&current, &scores);
        for amount in rebalanced.values() {
            assert!((amount - 3333.33).abs() < 0.01);
        }
        let total: f64 = rebalanced.values().sum();
        assert!((total - 10_000.0).abs() <= 0.03);
    }

    #[test]
    fn test_rebalance_score_floor() {
        let allocator = BudgetAllocator::default();
        let current: BTreeMap<String, f64> = [
            ("meta".to_string(), 5000.0),
            ("google".to_string(), 5000.0),
        ]
        .into_iter()
        .collect();
        let scores: HashMap<String, f64> =
            [("meta".to_string(), 0.1), ("google".to_string(), 1.0)]
                .into_iter()
                .collect();

        let rebalanced = allocator.rebalance(&current, &scores);
        // 0.1 clamps to 0.5, so meta gets 0.5 / 1.5 of the total.
        assert!((rebalanced["meta"] - 3333.33).abs() < 0.01);
        assert!((rebalanced["google"] - 6666.67).abs() < 0.01);
    }

    #[test]
    fn test_rebalance_missing_score_is_neutral() {
        let allocator = BudgetAllocator::default();
        let current: BTreeMap<String, f64> = [
            ("meta".to_string(), 6000.0),
            ("google".to_string(), 4000.0),
        ]
        .into_iter()
        .collect();
        let scores: HashMap<String, f64> = [("meta".to_string(), 1.0)].into_iter().collect();

        let rebalanced = allocator.rebalance(&current, &scores);
        assert!((rebalanced["meta"] - rebalanced["google"]).abs() < 0.01);
    }

    #[test]
    fn test_rebalance_empty_current() {
        let allocator = BudgetAllocator::default();
        let rebalanced = allocator.rebalance(&BTreeMap::new(), &HashMap::new());
        assert!(rebalanced.is_empty());
    }
}
