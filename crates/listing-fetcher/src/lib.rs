//! listing-fetcher: one GET per listing page, a fresh browser identity per
//! request, and failures that are logged instead of raised.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod identity;
pub mod sink;
pub mod transport;
pub mod types;

pub use config::{load_config, resolve_config_source, ConfigSource, FetcherConfig};
pub use error::{ConfigError, FetchFailure};
pub use fetcher::Fetcher;
pub use identity::{IdentityPool, RequestIdentity};
pub use sink::{FailureSink, FanoutSink, JsonlSink, MemorySink, TracingSink};
pub use transport::{
    ReqwestTransport, Transport, TransportError, TransportErrorKind, TransportRequest,
    TransportResponse,
};
pub use types::{FailureRecord, FetchOutcome, FetchedPage};
