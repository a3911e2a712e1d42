//! Data model shared by every logdigest crate.
//!
//! Defines the run context an invocation works within, the per-object log
//! records produced by fetching, and the digest rows produced by aggregation.

pub mod context;
pub mod digest;
pub mod record;
