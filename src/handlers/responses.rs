// src/handlers/responses.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::{
    error::AppError,
    models::response::{Outcome, SubmitAnswerRequest},
    state::AppState,
    store::RESPONSES,
    utils::jwt::Principal,
};

/// Key of the single response document a student keeps per quiz.
pub fn response_document_id(quiz_id: &str, uid: &str) -> String {
    format!("{}__{}", quiz_id, uid)
}

/// Blank strings are stored as null, like the quiz client does.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Records one answered question for the signed-in student.
///
/// * Computes `isCorrect` when the question carries a correct answer.
/// * Merges the record under a flattened `responses.<questionId>` field so
///   earlier answers in the same document are kept.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    if !state.config.email_domain_allowed(&principal.email) {
        return Err(AppError::Forbidden(
            "Please sign in with your school account.".to_string(),
        ));
    }

    let correct_answer = req.correct_answer.filter(|c| !c.is_empty());
    let topic = non_blank(req.topic);
    let topic_name = non_blank(req.topic_name);
    let is_correct = correct_answer.as_ref().map(|c| *c == req.answer);
    let outcome = req
        .outcome
        .as_deref()
        .and_then(Outcome::parse)
        .map(Outcome::code);
    let now = Utc::now().to_rfc3339();

    let record = json!({
        "answer": req.answer,
        "correctAnswer": correct_answer,
        "isCorrect": is_correct,
        "outcome": outcome,
        "topic": topic,
        "topicName": topic_name,
        "gradeLevel": req.grade_level,
        "ts": now,
    });

    let mut fields = Map::new();
    fields.insert("uid".to_string(), json!(principal.uid));
    fields.insert("email".to_string(), json!(principal.email));
    fields.insert("quizId".to_string(), json!(req.quiz_id));
    if let Some(name) = non_blank(req.quiz_name) {
        fields.insert("quizName".to_string(), Value::String(name));
    }
    if let Some(name) = non_blank(req.student_name) {
        fields.insert("studentName".to_string(), Value::String(name));
    }
    fields.insert(format!("responses.{}", req.question_id), record);
    fields.insert("lastUpdated".to_string(), json!(now));

    let doc_id = response_document_id(&req.quiz_id, &principal.uid);
    state.store.merge(RESPONSES, &doc_id, fields).await?;

    tracing::info!(
        "Recorded {} / {} for {}",
        req.quiz_id,
        req.question_id,
        principal.email
    );

    Ok(Json(json!({
        "questionId": req.question_id,
        "isCorrect": is_correct,
    })))
}
