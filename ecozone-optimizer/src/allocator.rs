use tracing::{debug, warn};

use crate::catalog::StrategyCatalog;
use crate::config::OptimizerConfig;
use crate::dto::{
    AllocationResult, AllocationStatus, AllocationSummary, NeedLevel, StrategyEvaluation, Zone,
    ZoneContext,
};
use crate::ranker::{RankBy, StrategyRanker};
use crate::traits::{ContextDeriver, StrategyScorer};

/// A needing zone with everything that does not depend on the running budget
/// already computed.
struct PreparedZone<'z> {
    zone: &'z Zone,
    need: f64,
    context: ZoneContext,
    candidates: Vec<StrategyEvaluation>,
}

/// Accumulator threaded through the priority-ordered fold.
struct Waterfall {
    remaining: f64,
    /// Unspent part of the previous cap; added to the next zone's share.
    carry: f64,
    results: Vec<AllocationResult>,
}

pub struct BudgetAllocator<'a> {
    pub deriver: &'a dyn ContextDeriver,
    pub scorer: &'a dyn StrategyScorer,
    pub catalog: &'a StrategyCatalog,
    pub config: &'a OptimizerConfig,
}

impl<'a> BudgetAllocator<'a> {
    pub fn allocate(&self, zones: &[Zone], total_budget: f64) -> AllocationSummary {
        let allocator_cfg = &self.config.allocator;
        let (satisfied, needing): (Vec<&Zone>, Vec<&Zone>) = zones
            .iter()
            .partition(|zone| allocator_cfg.is_not_required(zone.co2_ppm, zone.aqi));

        let mut prepared: Vec<PreparedZone<'_>> =
            needing.into_iter().map(|zone| self.prepare(zone)).collect();
        prepared.sort_by(|a, b| {
            b.need
                .partial_cmp(&a.need)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_need: f64 = prepared.iter().map(|p| p.need).sum();
        let total_need = if total_need > 0.0 { total_need } else { 1.0 };

        let initial = Waterfall {
            remaining: total_budget,
            carry: 0.0,
            results: Vec::with_capacity(zones.len()),
        };
        let waterfall = prepared.iter().fold(initial, |state, zone| {
            let share = zone.need * total_budget / total_need;
            self.fund(state, zone, share)
        });

        let mut per_zone = waterfall.results;
        per_zone.extend(satisfied.into_iter().map(not_required));

        let total_spent: f64 = per_zone.iter().map(|r| r.spent).sum();
        let total_reduction_ppm = per_zone.iter().map(|r| r.achieved_reduction_ppm).sum();
        let count = |wanted: fn(&AllocationStatus) -> bool| {
            per_zone.iter().filter(|r| wanted(&r.status)).count()
        };

        AllocationSummary {
            budget: total_budget,
            total_spent,
            unallocated: (total_budget - total_spent).max(0.0),
            zones_funded: count(|s| matches!(s, AllocationStatus::Allocated)),
            zones_not_required: count(|s| matches!(s, AllocationStatus::NotRequired)),
            zones_underfunded: count(|s| matches!(s, AllocationStatus::Insufficient { .. })),
            total_reduction_ppm,
            per_zone,
        }
    }

    fn prepare<'z>(&self, zone: &'z Zone) -> PreparedZone<'z> {
        let need = self.config.allocator.need_score(zone.co2_ppm, zone.aqi);
        let context = self.deriver.derive(zone, self.config.unconstrained_budget);
        let candidates = self
            .catalog
            .all()
            .iter()
            .map(|template| self.scorer.evaluate(&context, template, &self.config.reward))
            .collect();
        PreparedZone {
            zone,
            need,
            context,
            candidates,
        }
    }

    fn fund(&self, mut state: Waterfall, prepared: &PreparedZone<'_>, share: f64) -> Waterfall {
        let cap = (share + state.carry).min(state.remaining).max(0.0);
        let need_level = self.config.allocator.need_level(prepared.need);
        let zone = prepared.zone;

        let affordable = prepared
            .candidates
            .iter()
            .filter(|candidate| candidate.estimated_cost <= cap);
        let chosen = StrategyRanker::best(affordable, RankBy::Efficiency)
            .and_then(|best| self.catalog.get(&best.strategy_name))
            .map(|template| {
                self.scorer.evaluate(
                    &prepared.context.with_budget(cap),
                    template,
                    &self.config.reward,
                )
            });

        let (spent, strategy, status) = match chosen {
            Some(evaluation) => {
                debug!(
                    zone = %zone.id,
                    strategy = %evaluation.strategy_name,
                    share,
                    cap,
                    cost = evaluation.estimated_cost,
                    "zone funded"
                );
                (
                    evaluation.estimated_cost,
                    Some(evaluation),
                    AllocationStatus::Allocated,
                )
            }
            None => {
                let cheapest = prepared.candidates.iter().fold(
                    None::<&StrategyEvaluation>,
                    |acc, candidate| match acc {
                        Some(current) if current.estimated_cost <= candidate.estimated_cost => {
                            Some(current)
                        }
                        _ => Some(candidate),
                    },
                );
                let (name, required) = cheapest
                    .map(|c| (c.strategy_name.clone(), c.estimated_cost))
                    .unwrap_or_default();
                warn!(
                    zone = %zone.id,
                    cap,
                    required,
                    "no strategy fits the zone cap"
                );
                (
                    0.0,
                    None,
                    AllocationStatus::Insufficient {
                        cheapest_strategy: name,
                        required,
                        cap,
                    },
                )
            }
        };

        let achieved_reduction_ppm = strategy
            .as_ref()
            .map(|s| (prepared.context.co2_current - s.new_co2_ppm).max(0.0))
            .unwrap_or(0.0);

        state.remaining -= spent;
        state.carry = cap - spent;
        let note = status.note();
        state.results.push(AllocationResult {
            zone_id: zone.id.clone(),
            zone_name: zone.display_name().to_string(),
            need_score: prepared.need,
            need_level,
            nominal_share: share,
            allocated_cap: cap,
            spent,
            achieved_reduction_ppm,
            strategy,
            status,
            note,
        });
        state
    }
}

fn not_required(zone: &Zone) -> AllocationResult {
    let status = AllocationStatus::NotRequired;
    AllocationResult {
        zone_id: zone.id.clone(),
        zone_name: zone.display_name().to_string(),
        need_score: 0.0,
        need_level: NeedLevel::NotRequired,
        nominal_share: 0.0,
        allocated_cap: 0.0,
        spent: 0.0,
        achieved_reduction_ppm: 0.0,
        strategy: None,
        note: status.note(),
        status,
    }
}
