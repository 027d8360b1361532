//! Network-facing services: per-record probing and the bounded validator
//! that fans probes out.

pub mod concurrent_validator;
pub mod reachability_prober;

pub use concurrent_validator::{ConcurrentValidator, ValidationReport};
pub use reachability_prober::{HttpReachabilityProber, ReachabilityProber, TRUSTED_HOSTS};
