//! Property-based tests for the dispute model
//!
//! These tests verify:
//! - Enum string round-trips (to_string → parse)
//! - Catalog criticality and filing invariants
//! - Lifecycle transition rules
//! - JSON round-trips of disputes at any point in their lifecycle
//! - The cached critical flag staying in step with the issue type

use dispute_core::{
    Annotations, Dispute, DisputePolicy, DisputeStatus, GarageFlag, IssueType, NewDispute,
    lookup,
};
use proptest::prelude::*;

const FILED: &str = "2026-03-14T09:30:00Z";
const REVIEWED: &str = "2026-03-15T10:00:00Z";
const CLOSED: &str = "2026-03-16T17:45:00Z";

fn issue_type_strategy() -> impl Strategy<Value = IssueType> {
    prop_oneof![
        Just(IssueType::InternalPartTheft),
        Just(IssueType::Overcharged),
        Just(IssueType::PoorService),
        Just(IssueType::RudeBehavior),
        Just(IssueType::Other),
    ]
}

fn status_strategy() -> impl Strategy<Value = DisputeStatus> {
    prop_oneof![
        Just(DisputeStatus::Pending),
        Just(DisputeStatus::UnderReview),
        Just(DisputeStatus::Resolved),
        Just(DisputeStatus::Rejected),
    ]
}

fn flag_strategy() -> impl Strategy<Value = GarageFlag> {
    prop_oneof![
        Just(GarageFlag::Trustworthy),
        Just(GarageFlag::PartsTheftClaimed),
        Just(GarageFlag::OverchargingReported),
    ]
}

/// Intake documents the default policy accepts
fn intake_strategy() -> impl Strategy<Value = NewDispute> {
    (
        "[a-z0-9_]{1,16}",
        "[a-z0-9_]{1,16}",
        "[a-z0-9_]{1,16}",
        "[A-Za-z ]{0,32}",
        issue_type_strategy(),
        ".{0,200}",
        prop::collection::vec("https://cdn\\.example\\.com/[a-z0-9]{1,12}\\.jpg", 0..=10),
        prop_oneof![Just(String::new()), "[0-9]{7,15}"],
    )
        .prop_map(
            |(booking_id, user_id, garage_id, garage_name, issue, description, media_urls, phone)| {
                NewDispute {
                    booking_id,
                    user_id,
                    garage_id,
                    garage_name,
                    issue_type: issue.to_string(),
                    description,
                    media_urls,
                    user_phone: phone,
                }
            },
        )
}

proptest! {
    #[test]
    fn issue_type_roundtrip(issue in issue_type_strategy()) {
        let s = issue.to_string();
        let parsed: IssueType = s.parse().expect("Should parse");
        prop_assert_eq!(issue, parsed);
    }

    #[test]
    fn status_roundtrip(status in status_strategy()) {
        let parsed: DisputeStatus = status.to_string().parse().expect("Should parse");
        prop_assert_eq!(status, parsed);
    }

    #[test]
    fn flag_roundtrip(flag in flag_strategy()) {
        let parsed: GarageFlag = flag.to_string().parse().expect("Should parse");
        prop_assert_eq!(flag, parsed);
    }

    /// Display matches the serde wire literal
    #[test]
    fn display_matches_wire_literal(issue in issue_type_strategy(), status in status_strategy()) {
        prop_assert_eq!(serde_json::to_value(issue).unwrap(), serde_json::json!(issue.to_string()));
        prop_assert_eq!(serde_json::to_value(status).unwrap(), serde_json::json!(status.to_string()));
    }

    /// Only internal part theft is critical
    #[test]
    fn catalog_criticality(issue in issue_type_strategy()) {
        let entry = lookup(issue);
        prop_assert_eq!(entry.id, issue);
        prop_assert_eq!(entry.critical, issue.to_string() == "internal-part-theft");
    }

    /// Anything outside the closed set fails to parse
    #[test]
    fn unknown_issue_ids_rejected(s in "[a-z-]{0,24}") {
        let known = ["internal-part-theft", "overcharged", "poor-service", "rude-behavior", "other"];
        prop_assume!(!known.contains(&s.as_str()));
        let err = s.parse::<IssueType>().unwrap_err();
        prop_assert_eq!(err.field, "issueType");
    }

    #[test]
    fn filing_invariants(input in intake_strategy()) {
        let expected_issue: IssueType = input.issue_type.parse().unwrap();
        let media_count = input.media_urls.len();

        let dispute = Dispute::file_at(input, &DisputePolicy::default(), FILED).expect("valid intake");

        prop_assert_eq!(dispute.issue_type(), expected_issue);
        prop_assert_eq!(dispute.is_critical(), lookup(expected_issue).critical);
        prop_assert_eq!(dispute.status(), DisputeStatus::Pending);
        prop_assert_eq!(dispute.updated_at(), dispute.created_at());
        prop_assert_eq!(dispute.media_urls.len(), media_count);
        prop_assert!(dispute.check_integrity().is_ok());
    }

    /// Transitions succeed exactly on lifecycle edges and never leave a terminal status
    #[test]
    fn transition_rules(from in status_strategy(), to in status_strategy()) {
        let result = from.check_transition(to);
        prop_assert_eq!(result.is_ok(), from.can_transition_to(to));
        if from.is_terminal() || from == to {
            prop_assert!(result.is_err());
        }
    }

    /// Serializing and reading back gives the same record wherever it is in its lifecycle
    #[test]
    fn json_roundtrip_through_lifecycle(
        input in intake_strategy(),
        review in any::<bool>(),
        close in prop::option::of(prop_oneof![Just(DisputeStatus::Resolved), Just(DisputeStatus::Rejected)]),
        notes in prop::option::of("[a-zA-Z ]{1,40}"),
        reply in prop::option::of("[a-zA-Z ]{1,40}"),
    ) {
        let mut dispute = Dispute::file_at(input, &DisputePolicy::default(), FILED).unwrap();

        if review {
            let annotations = match &reply {
                Some(text) => Annotations::garage_response(text.clone(), vec![]),
                None => Annotations::default(),
            };
            dispute.transition_at(DisputeStatus::UnderReview, annotations, REVIEWED).unwrap();
        }
        if let Some(target) = close {
            let annotations = Annotations {
                admin_notes: notes.clone(),
                ..Annotations::default()
            };
            dispute.transition_at(target, annotations, CLOSED).unwrap();
        }

        let raw = serde_json::to_string(&dispute).unwrap();
        let back = Dispute::from_json(&raw).unwrap();
        prop_assert_eq!(back, dispute);
    }

    /// Editing the public content fields and driving the lifecycle never
    /// separates `critical` from the catalog entry of the issue type
    #[test]
    fn critical_tracks_issue_type_through_public_api(
        input in intake_strategy(),
        description in ".{0,80}",
        extra_media in prop::collection::vec("https://cdn\\.example\\.com/[a-z0-9]{1,12}\\.png", 0..3),
        path in prop_oneof![
            Just(vec![]),
            Just(vec![DisputeStatus::UnderReview]),
            Just(vec![DisputeStatus::Resolved]),
            Just(vec![DisputeStatus::UnderReview, DisputeStatus::Rejected]),
        ],
        reply in prop::option::of("[a-zA-Z]{1,20}"),
    ) {
        let mut dispute = Dispute::file_at(input, &DisputePolicy::default(), FILED).unwrap();
        let issue = dispute.issue_type();

        dispute.description = description;
        dispute.media_urls.extend(extra_media);
        dispute.garage_name.push_str(" (renamed)");
        if let Some(text) = &reply {
            dispute.record_garage_response_at(text, vec![], REVIEWED).unwrap();
        }
        for status in path {
            dispute.transition_at(status, Annotations::default(), CLOSED).unwrap();
        }

        prop_assert_eq!(dispute.issue_type(), issue);
        prop_assert_eq!(dispute.is_critical(), lookup(dispute.issue_type()).critical);
        prop_assert!(dispute.check_integrity().is_ok());

        let raw = serde_json::to_string(&dispute).unwrap();
        prop_assert!(Dispute::from_json(&raw).is_ok());
    }
}
