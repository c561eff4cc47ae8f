use std::time::Instant;

/// Time source for expiry and failover timing.
pub trait Clock: Send + Sync {
    /// Monotonic time.
    fn now(&self) -> Instant;

    /// Wall-clock unix seconds, used to compare server-declared expiry timestamps.
    fn unix_now(&self) -> u64;
}
