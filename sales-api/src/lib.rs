pub mod api;

pub use api::{router, ApiError, ApiServer, ApiServerConfig, AppState};
