use xxhash_rust::xxh3::xxh3_64;

use crate::dto::{Zone, ZoneContext};
use crate::traits::ContextDeriver;

const INDEX_BITS: u32 = 21;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Derives latent zone indices from the zone id alone. The same id always maps
/// to the same indices, across calls and across processes.
pub struct ZoneContextDeriver;

impl ZoneContextDeriver {
    pub fn zone_hash(zone_id: &str) -> u64 {
        xxh3_64(zone_id.as_bytes())
    }

    /// Maps the `window`-th 21-bit slice of the hash into `[0, 1]`.
    fn index_from(hash: u64, window: u32) -> f64 {
        let bits = (hash >> (window * INDEX_BITS)) & INDEX_MASK;
        bits as f64 / INDEX_MASK as f64
    }

    pub fn latent_indices(zone_id: &str) -> (f64, f64, f64) {
        let hash = Self::zone_hash(zone_id);
        (
            Self::index_from(hash, 0),
            Self::index_from(hash, 1),
            Self::index_from(hash, 2),
        )
    }

    pub fn health_risk_score(aqi: f64) -> f64 {
        (aqi / 3.0).min(100.0)
    }

    pub fn sustainability_score(co2: f64) -> f64 {
        (100.0 - (co2 - 380.0) / 2.0).max(0.0)
    }
}

impl ContextDeriver for ZoneContextDeriver {
    fn derive(&self, zone: &Zone, budget_remaining: f64) -> ZoneContext {
        let (industrial_index, green_cover_index, traffic_density) = Self::latent_indices(&zone.id);
        ZoneContext {
            zone_id: zone.id.clone(),
            industrial_index,
            green_cover_index,
            traffic_density,
            co2_current: zone.co2_ppm,
            aqi_current: zone.aqi,
            health_risk_score: Self::health_risk_score(zone.aqi),
            sustainability_score: Self::sustainability_score(zone.co2_ppm),
            budget_remaining,
        }
    }
}
