use thiserror::Error;

use crate::ids::ExchangeId;

/// Canonical AEX error taxonomy used across crates.
///
/// Classification guidance:
/// - [`AexError::UnregisteredExchange`]: plan lookup for an exchange the coordinator never saw
/// - [`AexError::InvariantViolation`]: structural contract breaches (mismatched pre-partition
///   counts, double registration, registration after estimation)
/// - [`AexError::UpstreamStageFailed`]: a submitted map stage failed or was canceled
/// - [`AexError::UnexpectedRegistrationCount`]: estimation began with the wrong number of
///   registered exchanges
/// - [`AexError::InvalidConfig`]: configuration/environment contract violations
/// - [`AexError::Io`]: raw filesystem/network IO failures from std APIs
#[derive(Debug, Error)]
pub enum AexError {
    /// `plan_for` queried an exchange that was never registered.
    ///
    /// Non-recoverable by the caller; indicates a wiring bug in physical-plan
    /// compilation.
    #[error("unregistered exchange: {0}")]
    UnregisteredExchange(ExchangeId),

    /// A structural invariant of the surrounding system was violated.
    ///
    /// Examples:
    /// - upstream stages reported inconsistent pre-shuffle partition counts
    /// - the same exchange was registered twice
    /// - registration was attempted after estimation ran
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A submitted map stage failed before producing statistics.
    ///
    /// Wraps the stage future's failure, including cancellation by the
    /// surrounding scheduler. Poisons the coordinator that observed it.
    #[error("upstream map stage failed: {0}")]
    UpstreamStageFailed(String),

    /// Estimation started with a registration list of unexpected length.
    #[error("expected {expected} registered exchanges, found {actual}")]
    UnexpectedRegistrationCount {
        /// Registration count the coordinator was constructed for.
        expected: u32,
        /// Registration count observed at estimation time.
        actual: u32,
    },

    /// Invalid or inconsistent configuration state.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transparent std IO failures (surfaced by shuffle transport implementations).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard AEX result alias.
pub type Result<T> = std::result::Result<T, AexError>;
