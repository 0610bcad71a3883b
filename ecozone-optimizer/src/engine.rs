use tracing::info;

use crate::allocator::BudgetAllocator;
use crate::catalog::StrategyCatalog;
use crate::config::OptimizerConfig;
use crate::dto::{AllocationSummary, OptimizationResult, Zone};
use crate::errors::{CatalogError, OptimizerError};
use crate::metrics::Observability;
use crate::ranker::{RankBy, StrategyRanker};
use crate::traits::{ContextDeriver, OptimizerRunner, StrategyScorer};

pub struct OptimizerEngine<'a> {
    pub deriver: &'a dyn ContextDeriver,
    pub scorer: &'a dyn StrategyScorer,
    pub catalog: &'a StrategyCatalog,
    pub config: OptimizerConfig,
}

impl<'a> OptimizerEngine<'a> {
    fn validate_zones(zones: &[Zone]) -> Result<(), OptimizerError> {
        if zones.is_empty() {
            return Err(OptimizerError::EmptyZones);
        }
        for zone in zones {
            for (field, value) in [("co2_ppm", zone.co2_ppm), ("aqi", zone.aqi)] {
                if !value.is_finite() {
                    return Err(OptimizerError::InvalidZone {
                        zone_id: zone.id.clone(),
                        reason: format!("{field} is not a finite number"),
                    });
                }
            }
        }
        Ok(())
    }

    fn optimize_one(&self, zone: &Zone) -> Result<OptimizationResult, OptimizerError> {
        let context = self.deriver.derive(zone, self.config.unconstrained_budget);
        let evaluations = self
            .catalog
            .standard()
            .map(|template| self.scorer.evaluate(&context, template, &self.config.reward))
            .collect();
        let all_strategies = StrategyRanker::rank(evaluations, RankBy::Reward);
        let best_strategy = all_strategies.first().cloned().ok_or(CatalogError::Empty)?;

        Ok(OptimizationResult {
            zone_id: zone.id.clone(),
            zone_name: zone.display_name().to_string(),
            current_co2_ppm: zone.co2_ppm,
            current_aqi: zone.aqi,
            best_strategy,
            all_strategies,
            context,
        })
    }

    /// Ranks the catalog for a single zone picked out of `zones` by id.
    pub fn optimize_zone(
        &self,
        zones: &[Zone],
        zone_id: &str,
    ) -> Result<OptimizationResult, OptimizerError> {
        self.config.validate()?;
        let zone = zones
            .iter()
            .find(|zone| zone.id == zone_id)
            .ok_or_else(|| OptimizerError::ZoneNotFound(zone_id.to_string()))?;
        Self::validate_zones(std::slice::from_ref(zone))?;
        self.optimize_one(zone)
    }
}

impl<'a> OptimizerRunner for OptimizerEngine<'a> {
    fn optimize_unconstrained(
        &self,
        zones: &[Zone],
        obs: &dyn Observability,
    ) -> Result<Vec<OptimizationResult>, OptimizerError> {
        self.config.validate()?;
        Self::validate_zones(zones)?;

        let results = zones
            .iter()
            .map(|zone| self.optimize_one(zone))
            .collect::<Result<Vec<_>, _>>()?;

        obs.emit_metric(
            "ecozone.optimize.zones",
            results.len() as f64,
            &[("snapshot", self.config.snapshot_hash.clone())],
        );
        info!(
            zones = results.len(),
            snapshot = %self.config.snapshot_hash,
            "unconstrained optimization complete"
        );
        Ok(results)
    }

    fn optimize_with_budget(
        &self,
        zones: &[Zone],
        total_budget: f64,
        obs: &dyn Observability,
    ) -> Result<AllocationSummary, OptimizerError> {
        self.config.validate()?;
        Self::validate_zones(zones)?;
        if !total_budget.is_finite() || total_budget < 0.0 {
            return Err(OptimizerError::NegativeBudget(total_budget));
        }

        let allocator = BudgetAllocator {
            deriver: self.deriver,
            scorer: self.scorer,
            catalog: self.catalog,
            config: &self.config,
        };
        let summary = allocator.allocate(zones, total_budget);

        let tags = [("snapshot", self.config.snapshot_hash.clone())];
        obs.emit_metric("ecozone.allocation.spent", summary.total_spent, &tags);
        obs.emit_metric(
            "ecozone.allocation.funded",
            summary.zones_funded as f64,
            &tags,
        );
        obs.emit_metric(
            "ecozone.allocation.underfunded",
            summary.zones_underfunded as f64,
            &tags,
        );
        info!(
            budget = total_budget,
            spent = summary.total_spent,
            funded = summary.zones_funded,
            not_required = summary.zones_not_required,
            underfunded = summary.zones_underfunded,
            "budget allocation complete"
        );
        Ok(summary)
    }
}
