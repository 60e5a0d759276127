//! Adaptive exchange coordination for post-shuffle partition planning.
//!
//! Architecture role:
//! - registration and one-shot estimation for sibling exchanges
//! - map-stage submission orchestration against the scheduler seam
//! - plan memoization and failure replay
//!
//! Key modules:
//! - [`coordinator`]
//! - [`exchange`]

pub mod coordinator;
pub mod exchange;

pub use coordinator::ExchangeCoordinator;
pub use exchange::{Exchange, MapStageScheduler};
