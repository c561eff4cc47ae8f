use httpdns_domain::NetworkStack;

/// Classifies the host's current connectivity.
///
/// Implementations may probe the network but must finish in bounded time and
/// never touch shared resolution state.
pub trait IpStackDetector: Send + Sync {
    fn detect(&self) -> NetworkStack;
}
