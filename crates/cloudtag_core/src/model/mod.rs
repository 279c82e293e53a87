//! Provider-neutral value model exchanged between callers and adapters.
//!
//! # Responsibility
//! - Define the `Resource`, `Tag` and `Filter` descriptors.
//! - Keep the model free of any provider wire format.
//!
//! # Invariants
//! - Values are immutable query results or caller requests; reconciliation
//!   always builds a new tag set instead of editing one in place.
//! - Tag identity for merge purposes is the key only.

pub mod filter;
pub mod resource;
pub mod tag;
