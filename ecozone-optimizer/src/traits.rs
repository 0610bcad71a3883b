use crate::config::RewardConfig;
use crate::dto::{
    AllocationSummary, OptimizationResult, StrategyEvaluation, StrategyTemplate, Zone, ZoneContext,
};
use crate::errors::OptimizerError;
use crate::metrics::Observability;

pub trait ContextDeriver: Send + Sync {
    fn derive(&self, zone: &Zone, budget_remaining: f64) -> ZoneContext;
}

pub trait StrategyScorer: Send + Sync {
    fn evaluate(
        &self,
        context: &ZoneContext,
        template: &StrategyTemplate,
        cfg: &RewardConfig,
    ) -> StrategyEvaluation;
}

pub trait OptimizerRunner: Send + Sync {
    fn optimize_unconstrained(
        &self,
        zones: &[Zone],
        obs: &dyn Observability,
    ) -> Result<Vec<OptimizationResult>, OptimizerError>;

    fn optimize_with_budget(
        &self,
        zones: &[Zone],
        total_budget: f64,
        obs: &dyn Observability,
    ) -> Result<AllocationSummary, OptimizerError>;
}
