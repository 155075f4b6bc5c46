//! Liquidation heatmap clusters.
//!
//! The scoring path only ever consumes the cluster nearest to the current
//! price; the full list is provider output.

use super::position::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One liquidation cluster from the heatmap feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationCluster {
    pub price: f64,
    /// Notional size of the cluster in USD.
    pub size: f64,
    /// Side of the positions that would liquidate there.
    pub side: Side,
    pub ts: DateTime<Utc>,
}

/// The cluster closest to `reference_price` by absolute distance.
/// Ties keep the earlier entry.
pub fn nearest_cluster(
    clusters: &[LiquidationCluster],
    reference_price: f64,
) -> Option<&LiquidationCluster> {
    clusters.iter().min_by(|a, b| {
        let da = (a.price - reference_price).abs();
        let db = (b.price - reference_price).abs();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    })
}
