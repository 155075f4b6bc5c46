//! Execution: position sizing and the simulated order book.
//!
//! Order transmission is out of scope for the whole system; everything
//! here is sizing arithmetic plus paper bookkeeping.

pub mod paper;
pub mod sizing;

pub use paper::{CloseRecord, OrderRecord, PaperBook, PaperError, TradeEvent};
pub use sizing::{plan_order, position_size, stop_distance, stop_multiplier, tp_ladder, OrderPlan};
