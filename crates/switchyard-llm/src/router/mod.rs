//! Router - backend selection
//!
//! # Module Structure
//!
//! - `table`: static preference and fallback tables
//! - `router_impl`: Router implementation

mod router_impl;
mod table;

#[cfg(test)]
mod tests;

pub use router_impl::{RouteDecision, RouteReason, Router};
pub use table::RoutingTable;
