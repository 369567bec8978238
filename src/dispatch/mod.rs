// src/dispatch/mod.rs
// =============================================================================
// This module runs the checks: one task per site, at most N at a time.
//
// Submodules:
// - limiter: The fixed-size permit pool that caps in-flight checks
// - pool: The dispatcher that fans sites out to tasks and waits for them
//
// Data flow:
//   site list -> Dispatcher -> (resolve -> check, gated by Limiter) -> sink
// =============================================================================

mod limiter;
mod pool;

pub use limiter::{Limiter, Permit};
pub use pool::Dispatcher;
