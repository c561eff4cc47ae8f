pub mod request;
pub mod response;
pub mod signer;

pub use request::QueryBuilder;
pub use response::parse_response;
pub use signer::{sign, signing_message};
