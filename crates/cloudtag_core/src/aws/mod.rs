//! AWS integration: session context, request signing and service adapters.
//!
//! # Responsibility
//! - Carry the explicit session context adapters are built from.
//! - Translate the adapter contract into AWS REST calls.
//!
//! # Invariants
//! - Nothing in this module reads process environment or shared config
//!   files; callers hand in a resolved `AwsSession`.

pub mod s3;
pub mod s3_client;
pub mod session;
pub mod signing;
mod xml;
