// src/models/response.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::models::{ID_RE, roster::roster_key};

/// Curriculum outcome category attached to a question.
/// Declaration order is the fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "KU")]
    Ku,
    #[serde(rename = "PCE")]
    Pce,
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "CM")]
    Cm,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [Outcome::Ku, Outcome::Pce, Outcome::Ps, Outcome::Cm];

    pub fn code(self) -> &'static str {
        match self {
            Outcome::Ku => "KU",
            Outcome::Pce => "PCE",
            Outcome::Ps => "PS",
            Outcome::Cm => "CM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Ku => "Knowledge and Understanding",
            Outcome::Pce => "Planning, Conducting and Evaluating",
            Outcome::Ps => "Problem Solving",
            Outcome::Cm => "Communication",
        }
    }

    /// Parses a stored outcome tag. Unknown tags yield `None`.
    pub fn parse(raw: &str) -> Option<Outcome> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "KU" => Some(Outcome::Ku),
            "PCE" => Some(Outcome::Pce),
            "PS" => Some(Outcome::Ps),
            "CM" => Some(Outcome::Cm),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One answered question as stored by the quiz client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub answer: Option<String>,
    /// `None` excludes the question from every percentage.
    pub correct_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub outcome: Option<Outcome>,
    pub topic_id: Option<String>,
    pub topic_name: Option<String>,
    pub grade_level: Option<String>,
}

impl QuestionResponse {
    /// Reads a stored record field by field, tolerating wrong types.
    ///
    /// The topic id is taken from `topicId`, then `topic`. A value that is
    /// not an object yields an empty record.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            answer: text("answer"),
            correct_answer: text("correctAnswer"),
            is_correct: obj.get("isCorrect").and_then(Value::as_bool),
            outcome: obj
                .get("outcome")
                .and_then(Value::as_str)
                .and_then(Outcome::parse),
            topic_id: text("topicId").or_else(|| text("topic")),
            topic_name: text("topicName"),
            grade_level: text("gradeLevel"),
        }
    }

    /// Member of the scored set: has a non-empty correct answer.
    pub fn is_scored(&self) -> bool {
        self.correct_answer
            .as_deref()
            .is_some_and(|c| !c.is_empty())
    }

    /// Stored flag when present, otherwise compares the answer to the key.
    pub fn answered_correctly(&self) -> bool {
        match self.is_correct {
            Some(flag) => flag,
            None => match (&self.answer, &self.correct_answer) {
                (Some(a), Some(c)) => !c.is_empty() && a == c,
                _ => false,
            },
        }
    }
}

/// A student's response document for one quiz, kept in raw form.
///
/// Question records may live under a nested `responses` map or under
/// flattened `responses.<id>` keys; see [`crate::reports::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDocument {
    pub id: String,
    pub data: Map<String, Value>,
}

impl ResponseDocument {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { id: id.into(), data }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn quiz_name(&self) -> Option<&str> {
        self.str_field("quizName")
    }

    pub fn student_name(&self) -> Option<&str> {
        self.str_field("studentName")
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Compares emails under the same key rule the roster uses.
    pub fn belongs_to(&self, email: &str) -> bool {
        self.email()
            .is_some_and(|e| roster_key(e) == roster_key(email))
    }
}

/// DTO for a single answer submitted by the quiz client.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 64), regex(path = *ID_RE))]
    pub quiz_id: String,
    #[validate(length(min = 1, max = 64), regex(path = *ID_RE))]
    pub question_id: String,
    #[validate(length(min = 1, max = 200))]
    pub answer: String,
    #[validate(length(max = 200))]
    pub correct_answer: Option<String>,
    #[validate(custom(function = validate_outcome))]
    pub outcome: Option<String>,
    #[validate(length(max = 64))]
    pub topic: Option<String>,
    #[validate(length(max = 200))]
    pub topic_name: Option<String>,
    #[validate(length(max = 16))]
    pub grade_level: Option<String>,
    #[validate(length(max = 200))]
    pub quiz_name: Option<String>,
    #[validate(length(max = 200))]
    pub student_name: Option<String>,
}

fn validate_outcome(outcome: &str) -> Result<(), validator::ValidationError> {
    match Outcome::parse(outcome) {
        Some(_) => Ok(()),
        None => Err(validator::ValidationError::new("unknown_outcome")),
    }
}
