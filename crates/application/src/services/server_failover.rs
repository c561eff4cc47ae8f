use crate::ports::Clock;
use httpdns_domain::{DomainError, HttpDnsConfig, ServerEndpoint};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailoverPolicy {
    pub failure_threshold: u32,
    pub revert_interval: Duration,
}

impl FailoverPolicy {
    pub fn from_config(config: &HttpDnsConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold.max(1),
            revert_interval: config.revert_interval(),
        }
    }
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            revert_interval: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailoverState {
    pub current_index: u32,
    pub consecutive_failures: u32,
    pub last_switch: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureTransition {
    Counted { consecutive_failures: u32 },
    Switched { from: ServerEndpoint, to: ServerEndpoint },
    /// The report named an endpoint that is no longer current.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessTransition {
    Stayed,
    Reverted { from: ServerEndpoint },
}

#[derive(Debug, Clone)]
pub struct FailoverSnapshot {
    pub current: ServerEndpoint,
    pub state: FailoverState,
}

/// Owns the endpoint list and the "serving endpoint i" state machine.
///
/// Every operation is a single short critical section and never does I/O.
pub struct ServerFailoverManager {
    endpoints: Arc<[ServerEndpoint]>,
    policy: FailoverPolicy,
    clock: Arc<dyn Clock>,
    state: Mutex<FailoverState>,
}

impl ServerFailoverManager {
    pub fn new(
        endpoints: Vec<ServerEndpoint>,
        policy: FailoverPolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        if endpoints.is_empty() {
            return Err(DomainError::InvalidEndpoint(
                "At least one server endpoint must be configured".into(),
            ));
        }
        if !endpoints[0].is_primary() {
            return Err(DomainError::InvalidEndpoint(format!(
                "First endpoint must be the primary, got {}",
                endpoints[0]
            )));
        }

        info!(
            endpoints = endpoints.len(),
            failure_threshold = policy.failure_threshold,
            revert_secs = policy.revert_interval.as_secs(),
            "Initializing server failover"
        );

        Ok(Self {
            endpoints: Arc::from(endpoints),
            policy,
            clock,
            state: Mutex::new(FailoverState {
                current_index: 0,
                consecutive_failures: 0,
                last_switch: None,
            }),
        })
    }

    pub fn endpoints(&self) -> &[ServerEndpoint] {
        &self.endpoints
    }

    pub fn current_endpoint(&self) -> ServerEndpoint {
        let state = self.lock();
        self.endpoints[state.current_index as usize].clone()
    }

    pub fn snapshot(&self) -> FailoverSnapshot {
        let state = *self.lock();
        FailoverSnapshot {
            current: self.endpoints[state.current_index as usize].clone(),
            state,
        }
    }

    /// Counts a failed exchange against `endpoint`. Reaching the threshold moves
    /// to the next backup, wrapping from the last backup to the first.
    pub fn record_failure(&self, endpoint: &ServerEndpoint) -> FailureTransition {
        let mut state = self.lock();
        if endpoint.index != state.current_index {
            debug!(endpoint = %endpoint, "Ignoring failure from a previous endpoint");
            return FailureTransition::Ignored;
        }

        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        if state.consecutive_failures < self.policy.failure_threshold {
            return FailureTransition::Counted {
                consecutive_failures: state.consecutive_failures,
            };
        }

        let Some(next) = self.next_backup_index(state.current_index) else {
            warn!(
                endpoint = %endpoint,
                failures = state.consecutive_failures,
                "Failure threshold reached but no backup endpoint configured"
            );
            return FailureTransition::Counted {
                consecutive_failures: state.consecutive_failures,
            };
        };

        let from = self.endpoints[state.current_index as usize].clone();
        let to = self.endpoints[next as usize].clone();
        state.current_index = next;
        state.consecutive_failures = 0;
        state.last_switch = Some(self.clock.now());

        warn!(from = %from, to = %to, "Switching HTTPDNS server after repeated failures");
        FailureTransition::Switched { from, to }
    }

    /// Clears the failure run. Once the revert interval has been exceeded on a
    /// backup, the next success moves back to the primary.
    pub fn record_success(&self, endpoint: &ServerEndpoint) -> SuccessTransition {
        let mut state = self.lock();
        if endpoint.index != state.current_index {
            debug!(endpoint = %endpoint, "Ignoring success from a previous endpoint");
            return SuccessTransition::Stayed;
        }

        state.consecutive_failures = 0;
        if state.current_index == 0 {
            return SuccessTransition::Stayed;
        }

        let elapsed = state
            .last_switch
            .map(|at| self.clock.now().saturating_duration_since(at))
            .unwrap_or(Duration::MAX);
        if elapsed <= self.policy.revert_interval {
            return SuccessTransition::Stayed;
        }

        let from = self.endpoints[state.current_index as usize].clone();
        state.current_index = 0;
        state.last_switch = None;

        info!(from = %from, to = %self.endpoints[0], "Reverting to primary HTTPDNS server");
        SuccessTransition::Reverted { from }
    }

    /// Forces the primary back into service immediately.
    pub fn switch_to_primary(&self) {
        let mut state = self.lock();
        if state.current_index != 0 {
            info!(from = %self.endpoints[state.current_index as usize], "Forced switch to primary");
        }
        state.current_index = 0;
        state.consecutive_failures = 0;
        state.last_switch = None;
    }

    fn next_backup_index(&self, current: u32) -> Option<u32> {
        let last = self.endpoints.len() as u32 - 1;
        if last == 0 {
            return None;
        }
        if current == 0 || current >= last {
            Some(1)
        } else {
            Some(current + 1)
        }
    }

    fn lock(&self) -> MutexGuard<'_, FailoverState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
