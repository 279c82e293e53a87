//! Provider adapter contract and shared tag reconciliation.
//!
//! # Responsibility
//! - Define the uniform surface every cloud-service integration exposes.
//! - Implement tag reconciliation once so every adapter gets the same
//!   non-destructive merge semantics.
//!
//! # Invariants
//! - `get_resource_tags` returns an empty list when the provider reports
//!   that no tags are configured; every other failure is surfaced.
//! - `tag_resource` never drops an existing tag whose key is not desired.
//! - No operation retries, caches or spawns background work.

pub mod error;
pub mod registry;

use crate::model::filter::{Filter, FilterSupport};
use crate::model::resource::Resource;
use crate::model::tag::{merge_tags, Tag};
use log::{info, warn};

pub use error::{AdapterError, AdapterResult, ApiError, UnavailableCause};

/// Human and machine names for one adapter's service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Display name, e.g. `S3`.
    pub nice_name: &'static str,
    /// Registry id, e.g. `s3`.
    pub short_name: &'static str,
}

/// Listing and tagging capability for one cloud resource kind.
///
/// This is the surface handed to callers. It has no whole-set replace;
/// the only write is the merging `tag_resource`. All calls block until the
/// provider answers.
pub trait ResourceAdapter: Send + Sync {
    fn descriptor(&self) -> ServiceDescriptor;

    /// Declares whether `list_resources` applies caller filters.
    fn filter_support(&self) -> FilterSupport;

    /// Lists every visible resource of this kind.
    ///
    /// Adapters returning `FilterSupport::Ignored` return an unfiltered list
    /// regardless of `filters`.
    fn list_resources(&self, filters: &[Filter]) -> AdapterResult<Vec<Resource>>;

    /// Reads the full current tag set of one resource.
    fn get_resource_tags(&self, resource: &Resource) -> AdapterResult<Vec<Tag>>;

    /// Adds or overwrites `tags` on `resource`, keeping unrelated tags.
    ///
    /// Implementations delegate to `reconcile_tags`. Returns the tag set
    /// that was written.
    fn tag_resource(&self, resource: &Resource, tags: &[Tag]) -> AdapterResult<Vec<Tag>>;
}

/// Raw whole-set tag write used only by `reconcile_tags`.
///
/// Kept off `ResourceAdapter` so registry handles cannot replace a tag set.
pub trait TagWriter {
    /// Replaces the resource's whole tag set with `tags` in one provider call.
    fn put_resource_tags(&self, resource: &Resource, tags: &[Tag]) -> AdapterResult<()>;
}

/// Reads current tags through `adapter`, merges `desired` and writes back.
///
/// # Errors
/// - `InvalidTag` when a desired tag has a blank key; nothing is sent.
/// - Any read failure from `get_resource_tags`; nothing is written.
/// - Any write failure from `put_resource_tags`.
pub fn reconcile_tags<A: ResourceAdapter + TagWriter + ?Sized>(
    adapter: &A,
    resource: &Resource,
    desired: &[Tag],
) -> AdapterResult<Vec<Tag>> {
    for tag in desired {
        tag.validate()?;
    }

    let service = adapter.descriptor().short_name;
    let current = adapter.get_resource_tags(resource)?;
    let merged = merge_tags(desired, &current);

    if let Err(err) = adapter.put_resource_tags(resource, &merged) {
        warn!(
            "event=tag_resource module=adapter status=error service={} resource={} kind={}",
            service,
            resource,
            err.kind()
        );
        return Err(err);
    }

    info!(
        "event=tag_resource module=adapter status=ok service={} resource={} desired={} existing={} written={}",
        service,
        resource,
        desired.len(),
        current.len(),
        merged.len()
    );
    Ok(merged)
}

/// Emits the shared warning for adapters that accept but skip filters.
pub(crate) fn warn_if_filters_ignored(descriptor: ServiceDescriptor, filters: &[Filter]) {
    if filters.is_empty() {
        return;
    }
    let fields = filters
        .iter()
        .map(|filter| filter.field.as_str())
        .collect::<Vec<_>>()
        .join(",");
    warn!(
        "event=filters_ignored module=adapter status=ok service={} count={} fields={}",
        descriptor.short_name,
        filters.len(),
        fields
    );
}
