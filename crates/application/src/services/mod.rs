pub mod inflight;
pub mod runtime_settings;
pub mod server_failover;

pub use inflight::{
    wait_for_leader, InflightKey, InflightLeaderGuard, InflightRegistry, InflightResult,
    Registration,
};
pub use runtime_settings::RuntimeSettings;
pub use server_failover::{
    FailoverPolicy, FailoverSnapshot, FailoverState, FailureTransition, ServerFailoverManager,
    SuccessTransition,
};
