pub mod cache;
pub mod client;
pub mod protocol;
pub mod transport;

pub use cache::ResolutionCache;
pub use client::HttpsDnsClient;
pub use protocol::{parse_response, QueryBuilder};
pub use transport::{HttpReply, HttpTransport};
