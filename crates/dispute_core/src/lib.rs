//! Dispute model for the garage booking service.
//!
//! Covers the shape of a dispute filed against a garage, the issue catalog
//! that decides whether a dispute is critical, the dispute status
//! lifecycle, and the garage verification status record that aggregation
//! services produce from accumulated disputes. Transport and storage are
//! left to callers; every type here serializes to the JSON wire contract.

pub mod catalog;
pub mod dispute;
pub mod error;
pub mod policy;
pub mod schema;
pub mod verification;

pub use catalog::{catalog, lookup, lookup_str};
pub use dispute::{Annotations, now_rfc3339};
pub use error::{DisputeError, InvalidTransitionError, Result, ValidationError};
pub use policy::DisputePolicy;
pub use schema::{
    Dispute, DisputeStatus, GarageFlag, GarageVerificationStatus, IssueCatalogEntry, IssueType,
    NewDispute,
};
pub use verification::{ComplaintTally, VerificationAggregator};
