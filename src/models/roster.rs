// src/models/roster.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One student in the school roster, keyed by lower-cased email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[validate(length(min = 1, max = 32))]
    pub student_code: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Given name must not be empty."))]
    pub given_name: String,

    #[validate(length(min = 1, max = 100, message = "Family name must not be empty."))]
    pub family_name: String,

    #[validate(range(min = 1, max = 12))]
    pub year_level: i64,

    #[validate(length(min = 1, max = 32))]
    pub class_name: String,
}

impl RosterEntry {
    /// Document key in the `roster` collection.
    pub fn key(&self) -> String {
        roster_key(&self.email)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name.trim(), self.family_name.trim())
            .trim()
            .to_string()
    }

    /// Case-insensitive family-then-given ordering used for class output.
    pub fn sort_key(&self) -> (String, String) {
        (
            self.family_name.trim().to_lowercase(),
            self.given_name.trim().to_lowercase(),
        )
    }
}

pub fn roster_key(email: &str) -> String {
    email.trim().to_lowercase()
}
