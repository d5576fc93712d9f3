// src/reports/data.rs

use std::collections::HashMap;

use serde_json::json;

use crate::{
    error::AppError,
    models::{
        response::ResponseDocument,
        roster::{RosterEntry, roster_key},
    },
    store::{DocumentStore, RESPONSES, ROSTER},
};

/// Trimmed, case-insensitive class label comparison.
pub fn class_matches(class_name: &str, filter: &str) -> bool {
    class_name.trim().eq_ignore_ascii_case(filter.trim())
}

/// Every response document of one quiz, joined with the roster entries
/// their emails resolve to.
#[derive(Debug, Clone, Default)]
pub struct QuizData {
    pub quiz_id: String,
    /// Sorted by document id.
    pub documents: Vec<ResponseDocument>,
    /// Keyed by lower-cased email.
    pub roster: HashMap<String, RosterEntry>,
}

impl QuizData {
    pub fn new(
        quiz_id: impl Into<String>,
        mut documents: Vec<ResponseDocument>,
        roster: impl IntoIterator<Item = RosterEntry>,
    ) -> Self {
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            quiz_id: quiz_id.into(),
            documents,
            roster: roster.into_iter().map(|r| (r.key(), r)).collect(),
        }
    }

    /// Fetches the quiz's response documents and the roster entries of
    /// their authors in one batched lookup.
    pub async fn load(store: &dyn DocumentStore, quiz_id: &str) -> Result<Self, AppError> {
        let documents: Vec<ResponseDocument> = store
            .find_by_field(RESPONSES, "quizId", &json!(quiz_id))
            .await?
            .into_iter()
            .map(|d| ResponseDocument::new(d.id, d.data))
            .collect();

        let mut keys: Vec<String> = documents
            .iter()
            .filter_map(|d| d.email())
            .map(roster_key)
            .collect();
        keys.sort();
        keys.dedup();

        let roster = store
            .get_many(ROSTER, &keys)
            .await?
            .into_iter()
            .filter_map(|d| match serde_json::from_value::<RosterEntry>(d.data.into()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed roster entry {}: {}", d.id, e);
                    None
                }
            });

        let data = Self::new(quiz_id, documents, roster);
        tracing::debug!(
            "Loaded quiz {}: {} response documents, {} roster matches",
            quiz_id,
            data.documents.len(),
            data.roster.len()
        );
        Ok(data)
    }

    pub fn roster_entry(&self, email: &str) -> Option<&RosterEntry> {
        self.roster.get(&roster_key(email))
    }

    /// First document (by id) whose email matches case-insensitively.
    pub fn document_for(&self, email: &str) -> Option<&ResponseDocument> {
        self.documents.iter().find(|d| d.belongs_to(email))
    }

    /// Roster-matched students, optionally restricted to one class.
    /// Each student appears once, with their first document.
    pub fn students(&self, class_filter: Option<&str>) -> Vec<(&RosterEntry, &ResponseDocument)> {
        let mut seen = std::collections::HashSet::new();
        self.documents
            .iter()
            .filter_map(|doc| {
                let entry = self.roster_entry(doc.email()?)?;
                Some((entry, doc))
            })
            .filter(|(entry, _)| {
                class_filter.is_none_or(|class| class_matches(&entry.class_name, class))
            })
            .filter(|(entry, _)| seen.insert(entry.key()))
            .collect()
    }
}
