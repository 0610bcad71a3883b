pub mod allocator;
pub mod catalog;
pub mod config;
pub mod context;
pub mod dto;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod metrics;
pub mod ranker;
pub mod traits;

pub use allocator::*;
pub use catalog::*;
pub use config::*;
pub use context::*;
pub use dto::*;
pub use engine::*;
pub use errors::*;
pub use evaluator::*;
pub use metrics::*;
pub use ranker::*;
pub use traits::*;
