// src/handlers/reports.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::{optional, required},
    reports::{
        QuizData,
        batch::{build_class_reports, load_class_roster},
        build_student_report,
        class_stats::{class_scores, distribution_summary},
        export::{Sheet, export_responses},
        render::{RecordedDocument, RenderOptions, render_report, render_reports},
    },
    store::DocumentStore,
};

/// Query parameters shared by the report endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub quiz_id: Option<String>,
    pub email: Option<String>,
    pub class_name: Option<String>,
}

/// Student report model as JSON.
/// Admin only.
pub async fn student_report(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = required(&params.quiz_id, "quizId")?;
    let email = required(&params.email, "email")?;

    let data = QuizData::load(store.as_ref(), quiz_id).await?;
    let model = build_student_report(&data, email, optional(&params.class_name))?;

    Ok(Json(model))
}

/// Student report rendered to draw operations.
/// Admin only.
pub async fn student_report_document(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = required(&params.quiz_id, "quizId")?;
    let email = required(&params.email, "email")?;

    let data = QuizData::load(store.as_ref(), quiz_id).await?;
    let model = build_student_report(&data, email, optional(&params.class_name))?;

    let mut document = RecordedDocument::new();
    render_report(&model, &mut document, RenderOptions::default());

    Ok(Json(document))
}

/// Every report of one class in a single document.
/// Admin only.
pub async fn class_report(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = required(&params.quiz_id, "quizId")?;
    let class_name = required(&params.class_name, "className")?;

    let data = QuizData::load(store.as_ref(), quiz_id).await?;
    let students = load_class_roster(store.as_ref(), class_name).await?;
    let models = build_class_reports(&data, &students, class_name)?;

    let mut document = RecordedDocument::new();
    render_reports(&models, &mut document);

    Ok(Json(document))
}

/// Score distribution for a quiz, optionally one class.
/// Admin only.
pub async fn class_stats(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = required(&params.quiz_id, "quizId")?;

    let data = QuizData::load(store.as_ref(), quiz_id).await?;
    if data.documents.is_empty() {
        return Err(AppError::NotFound(format!(
            "No responses found for quiz {}",
            quiz_id
        )));
    }
    let scores = class_scores(&data, optional(&params.class_name));

    Ok(Json(distribution_summary(&scores)))
}

/// Spreadsheet of every matched student's results and answers.
/// Admin only.
pub async fn export_quiz_responses(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = required(&params.quiz_id, "quizId")?;

    let data = QuizData::load(store.as_ref(), quiz_id).await?;
    let mut sheet = Sheet::default();
    export_responses(&data, optional(&params.class_name), &mut sheet)?;

    Ok(Json(sheet))
}
