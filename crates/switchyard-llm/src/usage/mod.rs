//! Usage Tracking - approximate token counts and cost
//!
//! Token counts are a `ceil(chars / 4)` heuristic, not a tokenizer. Records
//! are created per successful call and only aggregated in memory.
//!
//! # Module Structure
//!
//! - `pricing`: static per-backend price tables
//! - `record`: usage record and session statistics types
//! - `tracker`: in-memory session totals

mod pricing;
mod record;
mod tracker;

#[cfg(test)]
mod tests;

pub use pricing::{lookup_price, price_table, ModelPrice};
pub use record::{estimate_tokens, BackendUsage, UsageRecord, UsageStats};
pub use tracker::UsageTracker;
