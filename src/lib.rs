//! Batch fetcher for bibliographic CSV exports.
//!
//! The pipeline decodes a semi-structured CSV export into records, resolves
//! each record's DOI against a document mirror, downloads the document and
//! stores it under a collision-safe name. Records that cannot be processed
//! end up in a follow-up report instead of aborting the batch.

pub mod batch;
pub mod domain;
pub mod error;
pub mod mirror;
pub mod record;
pub mod report;
pub mod store;
