use tracing::debug;

use crate::config::{OptimizerConfig, RewardConfig};
use crate::context::ZoneContextDeriver;
use crate::dto::{
    Action, ActionKind, Archetype, RewardBreakdown, StrategyEvaluation, StrategyTemplate,
    ZoneContext,
};
use crate::traits::StrategyScorer;

/// Pre-industrial floor; no strategy can push a zone below it.
pub const CO2_FLOOR_PPM: f64 = 280.0;

const HIGH_INDUSTRIAL: f64 = 0.6;
const LOW_GREEN_COVER: f64 = 0.4;
const HIGH_TRAFFIC: f64 = 0.7;
const SEVERE_CO2: f64 = 480.0;
const SEVERE_AQI: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextualEvaluator {
    /// Budget substituted whenever the context carries a non-positive one.
    pub fallback_budget: f64,
}

impl Default for ContextualEvaluator {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

impl ContextualEvaluator {
    pub fn new(fallback_budget: f64) -> Self {
        Self { fallback_budget }
    }

    /// Falls back to the same budget the engine uses for unconstrained runs.
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.unconstrained_budget)
    }

    /// Compounds every rule that applies to `kind` in this context.
    pub fn action_multiplier(context: &ZoneContext, kind: ActionKind) -> f64 {
        use ActionKind::*;

        let mut multiplier = 1.0;
        if context.industrial_index > HIGH_INDUSTRIAL {
            multiplier *= match kind {
                SolarPanels => 2.0,
                TrafficControl | FactoryRegulation => 1.5,
                TreePlanting | GreenCover => 0.5,
                EvTransition => 1.0,
            };
        }
        if context.green_cover_index < LOW_GREEN_COVER {
            multiplier *= match kind {
                TreePlanting | GreenCover => 1.8,
                SolarPanels => 0.8,
                _ => 1.0,
            };
        }
        if context.traffic_density > HIGH_TRAFFIC {
            multiplier *= match kind {
                TrafficControl | EvTransition => 2.0,
                FactoryRegulation => 0.7,
                _ => 1.0,
            };
        }
        multiplier
    }

    pub fn action_reduction(context: &ZoneContext, action: &Action) -> f64 {
        action.quantity * action.kind.base_rate() * Self::action_multiplier(context, action.kind)
    }

    /// Linear up to the threshold, square-root growth beyond it.
    pub fn diminishing(ratio: f64) -> f64 {
        if ratio > 1.0 {
            ratio.sqrt()
        } else {
            ratio
        }
    }

    pub fn policy_alignment(
        context: &ZoneContext,
        archetype: Archetype,
        cost: f64,
        budget: f64,
        cfg: &RewardConfig,
    ) -> f64 {
        let bonus = match archetype {
            Archetype::Afforestation if context.green_cover_index < LOW_GREEN_COVER => Some(2.0),
            Archetype::Solar if context.industrial_index > HIGH_INDUSTRIAL => Some(2.5),
            Archetype::TrafficIndustry if context.traffic_density > HIGH_TRAFFIC => Some(2.5),
            Archetype::Balanced if cost <= cfg.balanced_budget_fraction * budget => Some(1.5),
            Archetype::Maximal
                if context.co2_current > SEVERE_CO2 || context.aqi_current > SEVERE_AQI =>
            {
                Some(1.2)
            }
            _ => None,
        };
        bonus.unwrap_or(cfg.default_alignment)
    }

    fn effective_budget(&self, budget_remaining: f64) -> f64 {
        if budget_remaining.is_finite() && budget_remaining > 0.0 {
            budget_remaining
        } else {
            self.fallback_budget
        }
    }
}

/// Anti-repetition draw for a zone/strategy pair: collides when the zone hash
/// and the strategy name length land in the same residue class.
pub fn diversity_collision(zone_id: &str, strategy_name: &str, modulus: u64) -> bool {
    if modulus == 0 {
        return false;
    }
    let zone_slot = ZoneContextDeriver::zone_hash(zone_id) % modulus;
    let name_slot = strategy_name.chars().count() as u64 % modulus;
    zone_slot == name_slot
}

pub fn efficiency_score(reduction_pct: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        reduction_pct / (cost / 1_000_000.0)
    } else {
        0.0
    }
}

impl StrategyScorer for ContextualEvaluator {
    fn evaluate(
        &self,
        context: &ZoneContext,
        template: &StrategyTemplate,
        cfg: &RewardConfig,
    ) -> StrategyEvaluation {
        let total_reduction: f64 = template
            .actions
            .iter()
            .map(|action| Self::action_reduction(context, action))
            .sum();
        let cost = template.total_cost();
        let new_co2_ppm = (context.co2_current - total_reduction).max(CO2_FLOOR_PPM);
        let reduction_pct = if context.co2_current > 0.0 {
            total_reduction / context.co2_current * 100.0
        } else {
            0.0
        };

        let budget = self.effective_budget(context.budget_remaining);
        let weights = &cfg.weights;

        let norm_co2 = Self::diminishing(reduction_pct / cfg.co2_threshold_pct);
        let norm_health = Self::diminishing(reduction_pct / cfg.health_threshold_pct);
        let norm_sustainability =
            Self::diminishing(reduction_pct / cfg.sustainability_threshold_pct);
        let policy_alignment =
            Self::policy_alignment(context, template.archetype, cost, budget, cfg);
        let norm_cost = (cost / budget).min(1.0);
        let budget_violation = ((cost - budget) / budget).max(0.0);

        let mut reward = weights.co2 * norm_co2
            + weights.health * norm_health
            + weights.sustainability * norm_sustainability
            + weights.policy * policy_alignment
            + weights.cost * norm_cost
            + weights.budget_violation * budget_violation;

        let overspend_penalty = if cost > cfg.overspend_fraction * budget
            && context.aqi_current <= cfg.safe_aqi
            && context.co2_current <= cfg.safe_co2
        {
            cfg.overspend_penalty
        } else {
            0.0
        };
        reward -= overspend_penalty;

        let diversity_penalty =
            if diversity_collision(&context.zone_id, &template.name, cfg.diversity_modulus) {
                cfg.diversity_penalty
            } else {
                0.0
            };
        reward -= diversity_penalty;

        let urgency_multiplier = cfg.urgency_multiplier(context.aqi_current);
        reward *= urgency_multiplier;

        debug!(
            zone = %context.zone_id,
            strategy = %template.name,
            reduction_ppm = total_reduction,
            cost,
            reward,
            "strategy evaluated"
        );

        StrategyEvaluation {
            strategy_name: template.name.clone(),
            description: template.description.clone(),
            archetype: template.archetype,
            actions: template.actions.clone(),
            new_co2_ppm,
            reduction_ppm: total_reduction,
            reduction_pct,
            estimated_cost: cost,
            efficiency_score: efficiency_score(reduction_pct, cost),
            reward,
            breakdown: RewardBreakdown {
                norm_co2,
                norm_health,
                norm_sustainability,
                policy_alignment,
                norm_cost,
                budget_violation,
                overspend_penalty,
                diversity_penalty,
                urgency_multiplier,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(industrial: f64, green: f64, traffic: f64, co2: f64, aqi: f64) -> ZoneContext {
        ZoneContext {
            zone_id: "Z1".into(),
            industrial_index: industrial,
            green_cover_index: green,
            traffic_density: traffic,
            co2_current: co2,
            aqi_current: aqi,
            health_risk_score: ZoneContextDeriver::health_risk_score(aqi),
            sustainability_score: ZoneContextDeriver::sustainability_score(co2),
            budget_remaining: 1_000_000_000.0,
        }
    }

    fn single(
        kind: ActionKind,
        quantity: f64,
        unit: f64,
        archetype: Archetype,
    ) -> StrategyTemplate {
        StrategyTemplate {
            name: "Trial".into(),
            description: String::new(),
            archetype,
            light: false,
            actions: vec![Action::new(kind, quantity, unit)],
        }
    }

    fn score(ctx: &ZoneContext, template: &StrategyTemplate) -> StrategyEvaluation {
        ContextualEvaluator::default().evaluate(ctx, template, &RewardConfig::default())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn industrial_zone_doubles_solar_output() {
        let ctx = context(0.7, 0.5, 0.5, 460.0, 140.0);
        let template = single(ActionKind::SolarPanels, 2_000.0, 25_000.0, Archetype::Solar);
        let eval = score(&ctx, &template);
        assert_close(eval.reduction_ppm, 600.0);
        assert_eq!(eval.estimated_cost, 50_000_000.0);
        assert_eq!(eval.new_co2_ppm, CO2_FLOOR_PPM);
        assert_eq!(eval.breakdown.policy_alignment, 2.5);
    }

    #[test]
    fn multipliers_compound_across_rules() {
        let ctx = context(0.9, 0.1, 0.9, 450.0, 100.0);
        assert_close(
            ContextualEvaluator::action_multiplier(&ctx, ActionKind::SolarPanels),
            1.6,
        );
        assert_close(
            ContextualEvaluator::action_multiplier(&ctx, ActionKind::TreePlanting),
            0.9,
        );
        assert_close(
            ContextualEvaluator::action_multiplier(&ctx, ActionKind::FactoryRegulation),
            1.05,
        );
        assert_close(
            ContextualEvaluator::action_multiplier(&ctx, ActionKind::TrafficControl),
            3.0,
        );
        let neutral = context(0.5, 0.5, 0.5, 450.0, 100.0);
        for kind in [
            ActionKind::TreePlanting,
            ActionKind::SolarPanels,
            ActionKind::EvTransition,
            ActionKind::TrafficControl,
            ActionKind::FactoryRegulation,
            ActionKind::GreenCover,
        ] {
            assert_eq!(ContextualEvaluator::action_multiplier(&neutral, kind), 1.0);
        }
    }

    #[test]
    fn co2_objective_is_linear_below_threshold() {
        for pct in [0.0, 3.0, 12.5, 29.9, 30.0] {
            assert_eq!(ContextualEvaluator::diminishing(pct / 30.0), pct / 30.0);
        }
        assert_close(ContextualEvaluator::diminishing(120.0 / 30.0), 2.0);
    }

    #[test]
    fn reward_matches_weighted_terms() {
        // Neutral context, moderate AQI: no urgency, no overspend penalty.
        let mut ctx = context(0.5, 0.5, 0.5, 400.0, 100.0);
        ctx.zone_id = String::new();
        let template = single(
            ActionKind::FactoryRegulation,
            10.0,
            1_000_000.0,
            Archetype::Balanced,
        );
        let cfg = RewardConfig::default();
        let eval = ContextualEvaluator::default().evaluate(&ctx, &template, &cfg);

        // 10 * 1.8 = 18 ppm => 4.5 %
        assert_close(eval.reduction_pct, 4.5);
        let b = &eval.breakdown;
        assert_close(b.norm_co2, 0.15);
        assert_close(b.norm_health, 0.18);
        assert_close(b.norm_sustainability, 0.45);
        assert_eq!(b.policy_alignment, 1.5);
        assert_close(b.norm_cost, 0.01);
        assert_eq!(b.budget_violation, 0.0);
        assert_eq!(b.overspend_penalty, 0.0);
        assert_eq!(b.urgency_multiplier, 1.0);

        let expected = 0.25 * 0.15 + 0.20 * 0.18 + 0.10 * 0.45 + 0.35 * 1.5 - 0.40 * 0.01
            - b.diversity_penalty;
        assert_close(eval.reward, expected);
        assert_close(eval.efficiency_score, 0.45);
    }

    #[test]
    fn overspend_on_safe_zone_is_penalized() {
        let mut ctx = context(0.5, 0.5, 0.5, 420.0, 100.0);
        ctx.budget_remaining = 100.0;
        let template = single(ActionKind::TrafficControl, 1.0, 50.0, Archetype::Maximal);
        let eval = score(&ctx, &template);
        assert_eq!(eval.breakdown.overspend_penalty, 0.5);

        ctx.aqi_current = 121.0;
        let eval = score(&ctx, &template);
        assert_eq!(eval.breakdown.overspend_penalty, 0.0);
        assert_eq!(eval.breakdown.urgency_multiplier, 1.2);
    }

    #[test]
    fn budget_violation_grows_past_budget() {
        let mut ctx = context(0.5, 0.5, 0.5, 500.0, 150.0);
        ctx.budget_remaining = 1_000.0;
        let template = single(ActionKind::TrafficControl, 30.0, 100.0, Archetype::Solar);
        let eval = score(&ctx, &template);
        assert_eq!(eval.breakdown.norm_cost, 1.0);
        assert_close(eval.breakdown.budget_violation, 2.0);
    }

    #[test]
    fn non_positive_budget_falls_back_to_default() {
        let mut ctx = context(0.5, 0.5, 0.5, 500.0, 150.0);
        ctx.budget_remaining = 0.0;
        let template = single(ActionKind::TrafficControl, 30.0, 100.0, Archetype::Solar);
        let evaluator = ContextualEvaluator::new(3_000.0);
        let eval = evaluator.evaluate(&ctx, &template, &RewardConfig::default());
        assert!(eval.reward.is_finite());
        assert_close(eval.breakdown.norm_cost, 1.0);
        assert_eq!(eval.breakdown.budget_violation, 0.0);

        ctx.budget_remaining = -50.0;
        let negative = evaluator.evaluate(&ctx, &template, &RewardConfig::default());
        assert_eq!(negative.reward, eval.reward);
    }

    #[test]
    fn zero_cost_has_zero_efficiency() {
        assert_eq!(efficiency_score(12.0, 0.0), 0.0);
        let ctx = context(0.5, 0.5, 0.5, 450.0, 100.0);
        let template = single(ActionKind::GreenCover, 4.0, 0.0, Archetype::Afforestation);
        let eval = score(&ctx, &template);
        assert_eq!(eval.efficiency_score, 0.0);
        assert_close(eval.reduction_ppm, 2.0);
    }

    #[test]
    fn diversity_collision_tracks_name_length_residue() {
        let slot = ZoneContextDeriver::zone_hash("adyar") % 5;
        let colliding = "x".repeat(slot as usize + 5);
        let clear = "x".repeat(((slot + 1) % 5) as usize + 5);
        assert!(diversity_collision("adyar", &colliding, 5));
        assert!(!diversity_collision("adyar", &clear, 5));
        assert!(!diversity_collision("adyar", &colliding, 0));
    }

    #[test]
    fn urgent_zone_scales_whole_reward() {
        let calm = context(0.5, 0.5, 0.5, 470.0, 160.0);
        let urgent = ZoneContext {
            aqi_current: 180.0,
            ..calm.clone()
        };
        let template = single(ActionKind::TreePlanting, 1_000.0, 500.0, Archetype::Balanced);
        let cfg = RewardConfig::default();
        let evaluator = ContextualEvaluator::default();
        let a = evaluator.evaluate(&calm, &template, &cfg);
        let b = evaluator.evaluate(&urgent, &template, &cfg);
        assert_close(a.reward / 1.2, b.reward / 1.5);
    }

    #[test]
    fn policy_alignment_follows_archetype_conditions() {
        let cfg = RewardConfig::default();
        let budget = 1_000_000_000.0;
        let cases = [
            (context(0.5, 0.3, 0.5, 450.0, 100.0), Archetype::Afforestation, 0.0, 2.0),
            (context(0.5, 0.5, 0.5, 450.0, 100.0), Archetype::Afforestation, 0.0, 0.5),
            (context(0.7, 0.5, 0.5, 450.0, 100.0), Archetype::Solar, 0.0, 2.5),
            (context(0.5, 0.5, 0.5, 450.0, 100.0), Archetype::Solar, 0.0, 0.5),
            (context(0.5, 0.5, 0.8, 450.0, 100.0), Archetype::TrafficIndustry, 0.0, 2.5),
            (context(0.5, 0.5, 0.7, 450.0, 100.0), Archetype::TrafficIndustry, 0.0, 0.5),
            (context(0.5, 0.5, 0.5, 450.0, 100.0), Archetype::Balanced, 1.9e8, 1.5),
            (context(0.5, 0.5, 0.5, 450.0, 100.0), Archetype::Balanced, 2.1e8, 0.5),
            (context(0.5, 0.5, 0.5, 481.0, 100.0), Archetype::Maximal, 0.0, 1.2),
            (context(0.5, 0.5, 0.5, 450.0, 201.0), Archetype::Maximal, 0.0, 1.2),
            (context(0.5, 0.5, 0.5, 480.0, 200.0), Archetype::Maximal, 0.0, 0.5),
        ];
        for (ctx, archetype, cost, expected) in cases {
            assert_eq!(
                ContextualEvaluator::policy_alignment(&ctx, archetype, cost, budget, &cfg),
                expected,
                "{archetype:?} at cost {cost}"
            );
        }
    }

    #[test]
    fn colliding_name_costs_the_diversity_penalty() {
        let mut ctx = context(0.5, 0.5, 0.5, 450.0, 100.0);
        ctx.zone_id = "adyar".into();
        let slot = ZoneContextDeriver::zone_hash("adyar") % 5;

        let mut colliding = single(ActionKind::TrafficControl, 10.0, 100.0, Archetype::Balanced);
        colliding.name = "x".repeat(slot as usize + 5);
        let mut clear = colliding.clone();
        clear.name = "x".repeat(((slot + 1) % 5) as usize + 5);

        let hit = score(&ctx, &colliding);
        let miss = score(&ctx, &clear);
        assert_eq!(hit.breakdown.diversity_penalty, 0.1);
        assert_eq!(miss.breakdown.diversity_penalty, 0.0);
        assert_close(miss.reward - hit.reward, 0.1);
    }

    #[test]
    fn objectives_grow_by_sqrt_past_their_thresholds() {
        let ctx = context(0.5, 0.5, 0.5, 400.0, 100.0);
        // 100 * 1.8 = 180 ppm => 45 %, past every threshold.
        let template = single(ActionKind::FactoryRegulation, 100.0, 1.0, Archetype::Balanced);
        let eval = score(&ctx, &template);
        assert_close(eval.reduction_pct, 45.0);
        assert_close(eval.breakdown.norm_co2, 1.5_f64.sqrt());
        assert_close(eval.breakdown.norm_health, 1.8_f64.sqrt());
        assert_close(eval.breakdown.norm_sustainability, 4.5_f64.sqrt());
    }

    #[test]
    fn fallback_budget_tracks_config() {
        let mut config = OptimizerConfig::default();
        config
            .apply_env_overrides(vec![(
                "ECOZONE_UNCONSTRAINED_BUDGET".to_string(),
                "2e9".to_string(),
            )])
            .expect("override");
        assert_eq!(ContextualEvaluator::from_config(&config).fallback_budget, 2e9);
        assert_eq!(
            ContextualEvaluator::default().fallback_budget,
            OptimizerConfig::default().unconstrained_budget
        );
    }
}
