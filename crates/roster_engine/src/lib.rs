//! Roster engine: HTTP page fetching, response adapters and effect execution.
mod adapter;
mod context;
mod endpoint;
mod engine;
mod fetch;
mod retry;
mod types;

pub use adapter::{decode_page, server_message};
pub use context::{ApiContext, Role};
pub use endpoint::{endpoint_for, json_body, request_params, Endpoint, Method};
pub use engine::{EngineConfig, EngineError, EngineEvents, EngineHandle};
pub use fetch::{FetchSettings, PageFetcher, ReqwestPageFetcher};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use types::{EngineEvent, FailureKind, FetchError};
