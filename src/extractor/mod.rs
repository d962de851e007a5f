// Extractor module - turns pasted share text into a playable video URL
//
// Flow: text -> first URL -> storage key -> first capable parser -> on
// failure, the generic parser. See orchestrator.rs for the fallback policy.

pub mod errors;
pub mod fetch;
pub mod models;
pub mod orchestrator;
pub mod platforms;
pub mod traits;
pub mod utils;

pub use errors::ExtractError;
pub use fetch::{FetchMethod, FetchRequest, FetchResponse, Fetcher, ProxyFetcher};
pub use models::{ExtractorConfig, MediaApiConfig, VideoMetadata};
pub use orchestrator::Dispatcher;
pub use traits::PlatformParser;
pub use utils::{extract_url, storage_key};
