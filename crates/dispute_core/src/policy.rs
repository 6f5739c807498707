//! Intake limits applied when a dispute is filed.

use crate::error::{Result, ValidationError};
use crate::schema::{IssueType, NewDispute};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisputePolicy {
    pub max_media_urls: usize,
    pub max_description_chars: usize,
    pub phone_min_digits: usize,
    pub phone_max_digits: usize,
}

impl Default for DisputePolicy {
    fn default() -> Self {
        Self {
            max_media_urls: 10,
            max_description_chars: 2000,
            phone_min_digits: 7,
            phone_max_digits: 15,
        }
    }
}

impl DisputePolicy {
    /// Load a policy from a TOML file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let policy: Self = toml::from_str(&raw)?;
        policy.check()?;
        Ok(policy)
    }

    fn check(&self) -> std::result::Result<(), ValidationError> {
        if self.phone_min_digits > self.phone_max_digits {
            return Err(ValidationError::new(
                "phone_min_digits",
                format!(
                    "{} exceeds phone_max_digits {}",
                    self.phone_min_digits, self.phone_max_digits
                ),
            ));
        }
        Ok(())
    }

    /// Validate an intake document and resolve its issue type.
    pub fn validate(&self, input: &NewDispute) -> std::result::Result<IssueType, ValidationError> {
        let outcome = self.validate_fields(input);
        if let Err(err) = &outcome {
            warn!(field = err.field, reason = %err.reason, "dispute intake rejected");
        }
        outcome
    }

    fn validate_fields(&self, input: &NewDispute) -> std::result::Result<IssueType, ValidationError> {
        let issue_type: IssueType = input.issue_type.parse()?;

        require_present("bookingId", &input.booking_id)?;
        require_present("userId", &input.user_id)?;
        require_present("garageId", &input.garage_id)?;

        let description_chars = input.description.chars().count();
        if description_chars > self.max_description_chars {
            return Err(ValidationError::new(
                "description",
                format!(
                    "{description_chars} characters, limit is {}",
                    self.max_description_chars
                ),
            ));
        }

        if input.media_urls.len() > self.max_media_urls {
            return Err(ValidationError::new(
                "mediaUrls",
                format!(
                    "{} attachments, limit is {}",
                    input.media_urls.len(),
                    self.max_media_urls
                ),
            ));
        }
        if let Some(index) = input.media_urls.iter().position(|url| url.trim().is_empty()) {
            return Err(ValidationError::new(
                "mediaUrls",
                format!("entry {index} is blank"),
            ));
        }

        self.check_phone(&input.user_phone)?;
        Ok(issue_type)
    }

    fn check_phone(&self, phone: &str) -> std::result::Result<(), ValidationError> {
        if phone.is_empty() {
            return Ok(());
        }
        if let Some(bad) = phone
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(*c, ' ' | '+' | '-' | '(' | ')')))
        {
            return Err(ValidationError::new(
                "userPhone",
                format!("unexpected character {bad:?}"),
            ));
        }
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if digits < self.phone_min_digits || digits > self.phone_max_digits {
            return Err(ValidationError::new(
                "userPhone",
                format!(
                    "{digits} digits, expected {} to {}",
                    self.phone_min_digits, self.phone_max_digits
                ),
            ));
        }
        Ok(())
    }
}

fn require_present(field: &'static str, value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}
