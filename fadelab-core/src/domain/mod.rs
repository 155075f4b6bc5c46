//! Domain types for the exhaustion-fade decision core.

pub mod bar;
pub mod ids;
pub mod liquidation;
pub mod position;
pub mod series;

pub use bar::Bar;
pub use ids::{IdGen, OrderId};
pub use liquidation::{nearest_cluster, LiquidationCluster};
pub use position::{Position, PositionStatus, Side, TakeProfit};
pub use series::{IndicatorSeries, IndicatorSet};

/// Symbol type alias
pub type Symbol = String;
