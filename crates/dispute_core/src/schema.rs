use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// What a dispute is about. The wire literal doubles as the catalog id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, JsonSchema, Display, EnumIter, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IssueType {
    InternalPartTheft,
    Overcharged,
    PoorService,
    RudeBehavior,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, JsonSchema, Display, EnumIter, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DisputeStatus {
    Pending,
    UnderReview,
    Resolved,
    Rejected,
}

/// Trust signal attached to a garage's verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, JsonSchema, Display, EnumIter, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GarageFlag {
    Trustworthy,
    PartsTheftClaimed,
    OverchargingReported,
}

fn parse_literal<T>(field: &'static str, value: &str) -> Result<T, ValidationError>
where
    T: IntoEnumIterator + AsRef<str>,
{
    T::iter()
        .find(|variant| variant.as_ref() == value)
        .ok_or_else(|| ValidationError::new(field, format!("unrecognized value {value:?}")))
}

impl FromStr for IssueType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_literal("issueType", s)
    }
}

impl FromStr for DisputeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_literal("status", s)
    }
}

impl FromStr for GarageFlag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_literal("flags", s)
    }
}

/// One row of the issue catalog.
///
/// The built-in table borrows its strings; rows read back from JSON own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssueCatalogEntry {
    pub id: IssueType,
    pub label: Cow<'static, str>,
    pub icon: Cow<'static, str>, // icon name understood by the frontend's icon resolver
    pub critical: bool,
}

/// Intake document for filing a dispute.
///
/// `issueType` stays a plain string here so an unknown id is reported as a
/// validation failure on that field rather than as a parse error of the
/// whole document. `description` and `mediaUrls` are required, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDispute {
    pub booking_id: String,
    pub user_id: String,
    pub garage_id: String,
    pub garage_name: String,
    pub issue_type: String,
    pub description: String,
    pub media_urls: Vec<String>,
    pub user_phone: String,
}

/// A complaint filed by a user against a garage for one booking.
///
/// Issue type, status, criticality, timestamps and the moderator/garage
/// annotations are only changed through the methods in [`crate::dispute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    pub garage_id: String,
    pub garage_name: String, // denormalized for display
    pub(crate) issue_type: IssueType,
    pub description: String,
    pub media_urls: Vec<String>, // evidence, in upload order
    pub user_phone: String,
    pub(crate) status: DisputeStatus,
    pub(crate) critical: bool,
    pub(crate) created_at: String, // RFC 3339, UTC
    pub(crate) updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) admin_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) garage_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) garage_response_media_urls: Option<Vec<String>>,
}

/// Trust posture of a garage, produced by an aggregation service.
///
/// `trustScore` has no declared range. `isUnderInvestigation` and
/// `isSuspended` are independent booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GarageVerificationStatus {
    pub garage_id: String,
    pub is_verified: bool,
    pub is_under_investigation: bool,
    pub is_suspended: bool,
    pub trust_score: f64,
    pub total_complaints: u32,
    pub resolved_complaints: u32,
    pub flags: BTreeSet<GarageFlag>,
}
