//! Core of cloudtag: cloud resource inventory and non-destructive tagging.
//!
//! Callers resolve a session and filters, pick an adapter and call
//! `list_resources`, `get_resource_tags` or `tag_resource`. Tag
//! reconciliation lives once in `adapter::reconcile_tags`.

pub mod adapter;
pub mod aws;
pub mod logging;
pub mod model;

pub use adapter::registry::{AdapterRegistry, RegistryError};
pub use adapter::{
    reconcile_tags, AdapterError, AdapterResult, ApiError, ResourceAdapter, ServiceDescriptor,
    TagWriter, UnavailableCause,
};
pub use aws::s3::{S3Adapter, TagSetLookup, NO_SUCH_TAG_SET};
pub use aws::s3_client::{BucketApi, BucketSummary, S3RestClient};
pub use aws::session::{AwsSession, Credentials, SessionError};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::filter::{Filter, FilterOperator, FilterSupport};
pub use model::resource::Resource;
pub use model::tag::{merge_tags, Tag, TagValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
