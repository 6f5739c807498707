//! Garage verification status checks and the aggregation seam.
//!
//! How disputes turn into a trust score is owned by the aggregation
//! service, not this crate. What lives here is the shape it must produce,
//! the consistency checks on that shape, and complaint counting that any
//! aggregator can build on.

use crate::error::ValidationError;
use crate::schema::{Dispute, DisputeStatus, GarageFlag, GarageVerificationStatus};
use std::collections::BTreeSet;
use tracing::warn;

/// Turns the disputes filed against a garage into its verification status.
pub trait VerificationAggregator {
    fn aggregate(&self, garage_id: &str, disputes: &[Dispute]) -> GarageVerificationStatus;
}

impl GarageVerificationStatus {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.garage_id.trim().is_empty() {
            return Err(ValidationError::new("garageId", "must not be blank"));
        }
        if self.resolved_complaints > self.total_complaints {
            warn!(
                garage_id = %self.garage_id,
                resolved = self.resolved_complaints,
                total = self.total_complaints,
                "verification status has more resolved than total complaints"
            );
            return Err(ValidationError::new(
                "resolvedComplaints",
                format!(
                    "{} exceeds totalComplaints {}",
                    self.resolved_complaints, self.total_complaints
                ),
            ));
        }
        if !self.trust_score.is_finite() {
            return Err(ValidationError::new("trustScore", "must be a finite number"));
        }
        Ok(())
    }

    pub fn has_flag(&self, flag: GarageFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Complaint counts for one garage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintTally {
    pub garage_id: String,
    pub total: u32,
    pub resolved: u32,
    pub critical: u32,
    pub reported_flags: BTreeSet<GarageFlag>,
}

impl ComplaintTally {
    /// Count the disputes filed against `garage_id`; others are skipped.
    pub fn from_disputes(garage_id: &str, disputes: &[Dispute]) -> Self {
        let mut tally = Self {
            garage_id: garage_id.to_string(),
            ..Self::default()
        };
        for dispute in disputes.iter().filter(|d| d.garage_id == garage_id) {
            tally.total = tally.total.saturating_add(1);
            if dispute.status() == DisputeStatus::Resolved {
                tally.resolved = tally.resolved.saturating_add(1);
            }
            if dispute.is_critical() {
                tally.critical = tally.critical.saturating_add(1);
            }
            if let Some(flag) = dispute.issue_type().reported_flag() {
                tally.reported_flags.insert(flag);
            }
        }
        tally
    }

    /// Copy the counts and reported flags onto `status`.
    pub fn apply_to(&self, status: &mut GarageVerificationStatus) {
        status.total_complaints = self.total;
        status.resolved_complaints = self.resolved;
        status.flags.extend(self.reported_flags.iter().copied());
    }
}
