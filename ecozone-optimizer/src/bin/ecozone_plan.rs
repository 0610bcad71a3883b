use std::path::PathBuf;

use ecozone_optimizer::catalog::StrategyCatalog;
use ecozone_optimizer::config::OptimizerConfig;
use ecozone_optimizer::context::ZoneContextDeriver;
use ecozone_optimizer::dto::Zone;
use ecozone_optimizer::engine::OptimizerEngine;
use ecozone_optimizer::evaluator::ContextualEvaluator;
use ecozone_optimizer::metrics::InMemoryMetrics;
use ecozone_optimizer::traits::OptimizerRunner;
use tracing::info;

fn usage() -> String {
    "usage: ecozone_plan <zones.json> [budget]".to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let mut args = std::env::args().skip(1);
    let path = args.next().map(PathBuf::from).ok_or_else(usage)?;
    let budget = args
        .next()
        .map(|raw| raw.parse::<f64>())
        .transpose()
        .map_err(|e| format!("invalid budget: {e}"))?;

    let mut config = OptimizerConfig::default();
    config.apply_env_overrides(std::env::vars())?;

    let raw = std::fs::read_to_string(&path)?;
    let zones: Vec<Zone> = serde_json::from_str(&raw)?;
    info!(zones = zones.len(), path = %path.display(), "zones loaded");

    let catalog = StrategyCatalog::default();
    let evaluator = ContextualEvaluator::from_config(&config);
    let engine = OptimizerEngine {
        deriver: &ZoneContextDeriver,
        scorer: &evaluator,
        catalog: &catalog,
        config,
    };
    let obs = InMemoryMetrics::default();

    let rendered = match budget {
        Some(total) => {
            let summary = engine.optimize_with_budget(&zones, total, &obs)?;
            serde_json::to_string_pretty(&summary)?
        }
        None => serde_json::to_string_pretty(&engine.optimize_unconstrained(&zones, &obs)?)?,
    };
    println!("{rendered}");

    for sample in obs.samples() {
        info!(metric = %sample.name, value = sample.value, "metric");
    }
    Ok(())
}
