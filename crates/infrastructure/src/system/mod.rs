pub mod clock;
pub mod interfaces;
pub mod ip_stack;

pub use clock::SystemClock;
pub use interfaces::{InterfaceSource, SystemInterfaces};
pub use ip_stack::{ReachabilityProbe, SystemIpStackDetector, UdpReachabilityProbe};
