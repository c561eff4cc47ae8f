pub mod detect;
pub mod lookup;
pub mod output;
pub mod resolve;
pub mod system_dns;
