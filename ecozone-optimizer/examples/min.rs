use ecozone_optimizer::catalog::StrategyCatalog;
use ecozone_optimizer::config::OptimizerConfig;
use ecozone_optimizer::context::ZoneContextDeriver;
use ecozone_optimizer::dto::Zone;
use ecozone_optimizer::engine::OptimizerEngine;
use ecozone_optimizer::evaluator::ContextualEvaluator;
use ecozone_optimizer::metrics::NoopMetrics;
use ecozone_optimizer::traits::OptimizerRunner;

fn zones() -> Vec<Zone> {
    vec![
        Zone::new("adyar", 420.0, 112.0).with_name("Adyar"),
        Zone::new("t_nagar", 465.0, 145.0).with_name("T Nagar"),
        Zone::new("velachery", 440.0, 128.0).with_name("Velachery"),
        Zone::new("anna_nagar", 395.0, 72.0).with_name("Anna Nagar"),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = StrategyCatalog::default();
    let config = OptimizerConfig::default();
    let evaluator = ContextualEvaluator::from_config(&config);
    let engine = OptimizerEngine {
        deriver: &ZoneContextDeriver,
        scorer: &evaluator,
        catalog: &catalog,
        config,
    };
    let obs = NoopMetrics;
    let zones = zones();

    for result in engine.optimize_unconstrained(&zones, &obs)? {
        println!(
            "{}: best={} reward={:.3}",
            result.zone_name, result.best_strategy.strategy_name, result.best_strategy.reward
        );
    }

    let summary = engine.optimize_with_budget(&zones, 1_000_000_000.0, &obs)?;
    println!(
        "spent {:.0} of {:.0}; funded={} underfunded={} not_required={}",
        summary.total_spent,
        summary.budget,
        summary.zones_funded,
        summary.zones_underfunded,
        summary.zones_not_required
    );
    for zone in &summary.per_zone {
        println!("  {} [{:?}] {}", zone.zone_name, zone.need_level, zone.note);
    }
    Ok(())
}
