//! Dispute filing and status lifecycle.
//!
//! ```text
//! pending ──► under-review ──► resolved
//!    │              └────────► rejected
//!    ├───────────────────────► resolved
//!    └───────────────────────► rejected
//! ```
//!
//! `resolved` and `rejected` are terminal. Every accepted change moves
//! `updatedAt` forward; a rejected change leaves the dispute untouched.

use crate::error::{InvalidTransitionError, Result, ValidationError};
use crate::policy::DisputePolicy;
use crate::schema::{Dispute, DisputeStatus, IssueType, NewDispute};
use time::{OffsetDateTime, UtcOffset};
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Current UTC time as an RFC 3339 string
pub fn now_rfc3339() -> Result<String> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

fn parse_timestamp(
    field: &'static str,
    value: &str,
) -> std::result::Result<OffsetDateTime, ValidationError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|err| ValidationError::new(field, format!("not an RFC 3339 timestamp: {err}")))
}

/// Parse a caller-supplied timestamp and re-render it in UTC.
fn normalize_timestamp(field: &'static str, value: &str) -> Result<(OffsetDateTime, String)> {
    let at = parse_timestamp(field, value)?.to_offset(UtcOffset::UTC);
    let rendered = at.format(&Rfc3339)?;
    Ok((at, rendered))
}

impl DisputeStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Whether the lifecycle has an edge from `self` to `next`
    pub const fn can_transition_to(self, next: DisputeStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::UnderReview)
                | (Self::Pending, Self::Resolved)
                | (Self::Pending, Self::Rejected)
                | (Self::UnderReview, Self::Resolved)
                | (Self::UnderReview, Self::Rejected)
        )
    }

    pub fn check_transition(
        self,
        next: DisputeStatus,
    ) -> std::result::Result<(), InvalidTransitionError> {
        if self.is_terminal() {
            return Err(InvalidTransitionError::Terminal { from: self });
        }
        if self == next {
            return Err(InvalidTransitionError::AlreadyInStatus { status: self });
        }
        if !self.can_transition_to(next) {
            return Err(InvalidTransitionError::Illegal { from: self, to: next });
        }
        Ok(())
    }
}

/// Optional notes attached alongside a status change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Moderator notes; only accepted when the dispute is being closed
    pub admin_notes: Option<String>,
    pub garage_response: Option<String>,
    pub garage_response_media_urls: Option<Vec<String>>,
}

impl Annotations {
    pub fn admin_notes(notes: impl Into<String>) -> Self {
        Self {
            admin_notes: Some(notes.into()),
            ..Self::default()
        }
    }

    pub fn garage_response(response: impl Into<String>, media_urls: Vec<String>) -> Self {
        Self {
            garage_response: Some(response.into()),
            garage_response_media_urls: Some(media_urls),
            ..Self::default()
        }
    }

    fn check(&self, target: DisputeStatus) -> std::result::Result<(), ValidationError> {
        if self.admin_notes.is_some() && !target.is_terminal() {
            return Err(ValidationError::new(
                "adminNotes",
                format!("only accepted when resolving or rejecting, not on {target}"),
            ));
        }
        match &self.garage_response {
            Some(response) if response.trim().is_empty() => {
                return Err(ValidationError::new("garageResponse", "must not be blank"));
            }
            None if self.garage_response_media_urls.is_some() => {
                return Err(ValidationError::new(
                    "garageResponse",
                    "media attached without a response",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

impl Dispute {
    /// File a new dispute, stamped with the current time.
    pub fn file(input: NewDispute, policy: &DisputePolicy) -> Result<Self> {
        let now = now_rfc3339()?;
        Self::file_at(input, policy, &now)
    }

    /// File a new dispute with an explicit creation timestamp.
    pub fn file_at(input: NewDispute, policy: &DisputePolicy, timestamp: &str) -> Result<Self> {
        let issue_type = policy.validate(&input)?;
        let (_, created_at) = normalize_timestamp("createdAt", timestamp)?;

        let dispute = Self {
            id: Uuid::new_v4().to_string(),
            booking_id: input.booking_id,
            user_id: input.user_id,
            garage_id: input.garage_id,
            garage_name: input.garage_name,
            issue_type,
            description: input.description,
            media_urls: input.media_urls,
            user_phone: input.user_phone,
            status: DisputeStatus::Pending,
            critical: issue_type.is_critical(),
            updated_at: created_at.clone(),
            created_at,
            admin_notes: None,
            garage_response: None,
            garage_response_media_urls: None,
        };

        debug!(
            dispute_id = %dispute.id,
            garage_id = %dispute.garage_id,
            issue_type = %issue_type,
            critical = dispute.critical,
            "dispute filed"
        );
        Ok(dispute)
    }

    /// Parse a dispute from JSON and verify its derived fields.
    pub fn from_json(raw: &str) -> Result<Self> {
        let dispute: Self = serde_json::from_str(raw)?;
        dispute.check_integrity()?;
        Ok(dispute)
    }

    pub fn issue_type(&self) -> IssueType {
        self.issue_type
    }

    pub fn status(&self) -> DisputeStatus {
        self.status
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn admin_notes(&self) -> Option<&str> {
        self.admin_notes.as_deref()
    }

    pub fn garage_response(&self) -> Option<&str> {
        self.garage_response.as_deref()
    }

    pub fn garage_response_media_urls(&self) -> Option<&[String]> {
        self.garage_response_media_urls.as_deref()
    }

    pub fn transition(&mut self, to: DisputeStatus, annotations: Annotations) -> Result<()> {
        let now = now_rfc3339()?;
        self.transition_at(to, annotations, &now)
    }

    /// Move to `to`, merging `annotations`, with an explicit change timestamp.
    pub fn transition_at(
        &mut self,
        to: DisputeStatus,
        annotations: Annotations,
        timestamp: &str,
    ) -> Result<()> {
        let outcome = self.apply_transition(to, annotations, timestamp);
        if let Err(err) = &outcome {
            warn!(dispute_id = %self.id, from = %self.status, to = %to, error = %err, "status change rejected");
        }
        outcome
    }

    fn apply_transition(
        &mut self,
        to: DisputeStatus,
        annotations: Annotations,
        timestamp: &str,
    ) -> Result<()> {
        self.status.check_transition(to)?;
        annotations.check(to)?;
        let updated_at = self.check_change_time(timestamp)?;

        let from = self.status;
        self.status = to;
        self.merge(annotations);
        self.updated_at = updated_at;

        info!(dispute_id = %self.id, garage_id = %self.garage_id, from = %from, to = %to, "dispute status changed");
        Ok(())
    }

    pub fn record_garage_response(&mut self, response: &str, media_urls: Vec<String>) -> Result<()> {
        let now = now_rfc3339()?;
        self.record_garage_response_at(response, media_urls, &now)
    }

    /// Attach the garage's reply without changing status.
    pub fn record_garage_response_at(
        &mut self,
        response: &str,
        media_urls: Vec<String>,
        timestamp: &str,
    ) -> Result<()> {
        let outcome = self.apply_garage_response(response, media_urls, timestamp);
        if let Err(err) = &outcome {
            warn!(dispute_id = %self.id, status = %self.status, error = %err, "garage response rejected");
        }
        outcome
    }

    fn apply_garage_response(
        &mut self,
        response: &str,
        media_urls: Vec<String>,
        timestamp: &str,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Err(InvalidTransitionError::Terminal { from: self.status }.into());
        }
        let annotations = Annotations::garage_response(response, media_urls);
        annotations.check(self.status)?;
        let updated_at = self.check_change_time(timestamp)?;

        self.merge(annotations);
        self.updated_at = updated_at;

        info!(dispute_id = %self.id, garage_id = %self.garage_id, "garage response recorded");
        Ok(())
    }

    /// Re-check fields that are derived rather than authored, e.g. after
    /// reading a dispute from an untrusted source.
    pub fn check_integrity(&self) -> std::result::Result<(), ValidationError> {
        let expected = self.issue_type.is_critical();
        if self.critical != expected {
            return Err(ValidationError::new(
                "critical",
                format!("{} but issue type {} implies {expected}", self.critical, self.issue_type),
            ));
        }
        let created = parse_timestamp("createdAt", &self.created_at)?;
        let updated = parse_timestamp("updatedAt", &self.updated_at)?;
        if updated < created {
            return Err(ValidationError::new("updatedAt", "earlier than createdAt"));
        }
        Ok(())
    }

    /// Validate a change timestamp and return it normalized to UTC.
    fn check_change_time(&self, timestamp: &str) -> Result<String> {
        let (at, rendered) = normalize_timestamp("updatedAt", timestamp)?;
        let last = parse_timestamp("updatedAt", &self.updated_at)?;
        if at < last {
            return Err(ValidationError::new(
                "updatedAt",
                format!("{timestamp} is earlier than last change {}", self.updated_at),
            )
            .into());
        }
        Ok(rendered)
    }

    fn merge(&mut self, annotations: Annotations) {
        if let Some(notes) = annotations.admin_notes {
            self.admin_notes = Some(notes);
        }
        if let Some(response) = annotations.garage_response {
            self.garage_response = Some(response);
            self.garage_response_media_urls =
                Some(annotations.garage_response_media_urls.unwrap_or_default());
        }
    }
}
