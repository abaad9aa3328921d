//! Query descriptors, cache-key fingerprinting and the cache-aside engine

pub mod descriptor;
pub mod engine;
pub mod fingerprint;
pub mod plan;

pub use descriptor::{Filter, QueryDescriptor, SortOrder, Window};
pub use engine::CacheAsideEngine;
pub use fingerprint::{fingerprint, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, NO_FILTER, NO_ORDER};
pub use plan::QueryPlan;
