//! The issue catalog: fixed reference data for every dispute issue type.

use crate::error::ValidationError;
use crate::schema::{GarageFlag, IssueCatalogEntry, IssueType};
use std::borrow::Cow;
use tracing::debug;

static ISSUE_CATALOG: [IssueCatalogEntry; 5] = [
    IssueCatalogEntry {
        id: IssueType::InternalPartTheft,
        label: Cow::Borrowed("Internal Part Theft"),
        icon: Cow::Borrowed("alert-octagon"),
        critical: true,
    },
    IssueCatalogEntry {
        id: IssueType::Overcharged,
        label: Cow::Borrowed("Overcharged"),
        icon: Cow::Borrowed("indian-rupee"),
        critical: false,
    },
    IssueCatalogEntry {
        id: IssueType::PoorService,
        label: Cow::Borrowed("Poor Service Quality"),
        icon: Cow::Borrowed("wrench"),
        critical: false,
    },
    IssueCatalogEntry {
        id: IssueType::RudeBehavior,
        label: Cow::Borrowed("Rude Behavior"),
        icon: Cow::Borrowed("user-x"),
        critical: false,
    },
    IssueCatalogEntry {
        id: IssueType::Other,
        label: Cow::Borrowed("Other"),
        icon: Cow::Borrowed("help-circle"),
        critical: false,
    },
];

/// All catalog entries, in display order
pub fn catalog() -> &'static [IssueCatalogEntry] {
    &ISSUE_CATALOG
}

pub fn lookup(issue_type: IssueType) -> &'static IssueCatalogEntry {
    // Table order matches the enum's declaration order.
    &ISSUE_CATALOG[issue_type as usize]
}

/// Look up an untyped issue id, e.g. straight from a form submission.
pub fn lookup_str(issue_type: &str) -> Result<&'static IssueCatalogEntry, ValidationError> {
    let parsed: IssueType = issue_type.parse()?;
    let entry = lookup(parsed);
    debug!(issue_type = %parsed, critical = entry.critical, "issue catalog lookup");
    Ok(entry)
}

impl IssueType {
    pub fn is_critical(self) -> bool {
        lookup(self).critical
    }

    pub fn label(self) -> &'static str {
        &lookup(self).label
    }

    /// The verification flag a report of this issue raises against a garage.
    pub fn reported_flag(self) -> Option<GarageFlag> {
        match self {
            Self::InternalPartTheft => Some(GarageFlag::PartsTheftClaimed),
            Self::Overcharged => Some(GarageFlag::OverchargingReported),
            Self::PoorService | Self::RudeBehavior | Self::Other => None,
        }
    }
}
