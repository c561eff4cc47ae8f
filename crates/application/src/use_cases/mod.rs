pub mod resolve_domains;

pub use resolve_domains::{EnginePolicy, ResolutionEngine, ResolutionMap};
