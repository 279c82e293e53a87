//! S3 bucket adapter.
//!
//! # Responsibility
//! - Implement the adapter contract for S3 buckets over a `BucketApi`.
//! - Normalize the provider's `NoSuchTagSet` signal to an empty tag set.
//!
//! # Invariants
//! - Listing ignores caller filters; S3 bucket listing has no server-side
//!   filtering, so callers must filter client-side.
//! - Only `NoSuchTagSet` is treated as "no tags"; every other error code,
//!   including `AccessDenied` and `NoSuchBucket`, is surfaced unchanged.
//! - Tag writes replace the bucket's whole tag set in one call.

use crate::adapter::{
    reconcile_tags, warn_if_filters_ignored, AdapterError, AdapterResult, ResourceAdapter,
    ServiceDescriptor, TagWriter,
};
use crate::aws::s3_client::{BucketApi, S3RestClient};
use crate::aws::session::{AwsSession, SessionError};
use crate::model::filter::{Filter, FilterSupport};
use crate::model::resource::Resource;
use crate::model::tag::Tag;
use log::debug;

/// Provider error code for a bucket that has never been tagged.
pub const NO_SUCH_TAG_SET: &str = "NoSuchTagSet";

const DESCRIPTOR: ServiceDescriptor = ServiceDescriptor {
    nice_name: "S3",
    short_name: "s3",
};

/// Outcome of reading a bucket's tags before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSetLookup {
    Found(Vec<Tag>),
    /// Provider reported that the bucket has no tag set configured.
    NotConfigured,
}

impl TagSetLookup {
    pub fn into_tags(self) -> Vec<Tag> {
        match self {
            Self::Found(tags) => tags,
            Self::NotConfigured => Vec::new(),
        }
    }
}

/// Adapter for S3 buckets.
pub struct S3Adapter<A: BucketApi> {
    api: A,
}

impl S3Adapter<S3RestClient> {
    /// Builds an adapter backed by the S3 REST API for `session`.
    pub fn from_session(session: &AwsSession) -> Result<Self, SessionError> {
        Ok(Self::new(S3RestClient::new(session)?))
    }
}

impl<A: BucketApi> S3Adapter<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Reads a bucket's tags, keeping the "not configured" signal typed.
    pub fn lookup_tags(&self, resource: &Resource) -> AdapterResult<TagSetLookup> {
        match self.api.get_bucket_tagging(&resource.name) {
            Ok(tags) => Ok(TagSetLookup::Found(tags)),
            Err(AdapterError::Provider(err)) if err.code == NO_SUCH_TAG_SET => {
                debug!(
                    "event=get_resource_tags module=s3 status=ok bucket={} tag_set=not_configured",
                    resource
                );
                Ok(TagSetLookup::NotConfigured)
            }
            Err(err) => Err(err),
        }
    }
}

impl<A: BucketApi> ResourceAdapter for S3Adapter<A> {
    fn descriptor(&self) -> ServiceDescriptor {
        DESCRIPTOR
    }

    fn filter_support(&self) -> FilterSupport {
        FilterSupport::Ignored
    }

    fn list_resources(&self, filters: &[Filter]) -> AdapterResult<Vec<Resource>> {
        warn_if_filters_ignored(DESCRIPTOR, filters);
        let resources: Vec<Resource> = self
            .api
            .list_buckets()?
            .into_iter()
            .map(|bucket| Resource::new(bucket.name))
            .collect();
        debug!(
            "event=list_resources module=s3 status=ok count={}",
            resources.len()
        );
        Ok(resources)
    }

    fn get_resource_tags(&self, resource: &Resource) -> AdapterResult<Vec<Tag>> {
        self.lookup_tags(resource).map(TagSetLookup::into_tags)
    }

    fn tag_resource(&self, resource: &Resource, tags: &[Tag]) -> AdapterResult<Vec<Tag>> {
        reconcile_tags(self, resource, tags)
    }
}

impl<A: BucketApi> TagWriter for S3Adapter<A> {
    fn put_resource_tags(&self, resource: &Resource, tags: &[Tag]) -> AdapterResult<()> {
        self.api.put_bucket_tagging(&resource.name, tags)
    }
}
