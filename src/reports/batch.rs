// src/reports/batch.rs

use crate::{
    error::AppError,
    models::{report::StudentReportModel, roster::RosterEntry},
    reports::{builder::build_student_report, data::{QuizData, class_matches}},
    store::{DocumentStore, ROSTER},
};

/// Roster entries assigned to `class_label`, family then given name.
pub async fn load_class_roster(
    store: &dyn DocumentStore,
    class_label: &str,
) -> Result<Vec<RosterEntry>, AppError> {
    let mut entries: Vec<RosterEntry> = store
        .get_all(ROSTER)
        .await?
        .into_iter()
        .filter_map(|d| match serde_json::from_value::<RosterEntry>(d.data.into()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping malformed roster entry {}: {}", d.id, e);
                None
            }
        })
        .filter(|r| class_matches(&r.class_name, class_label))
        .collect();
    entries.sort_by_key(RosterEntry::sort_key);
    Ok(entries)
}

/// Builds one report per student of the class, in roster order.
///
/// Students without a response document are logged and skipped. Fails
/// with `NotFound` only when no report at all could be built.
pub fn build_class_reports(
    data: &QuizData,
    students: &[RosterEntry],
    class_label: &str,
) -> Result<Vec<StudentReportModel>, AppError> {
    let mut ordered: Vec<&RosterEntry> = students.iter().collect();
    ordered.sort_by_key(|r| r.sort_key());

    let mut models = Vec::with_capacity(ordered.len());
    for student in ordered {
        match build_student_report(data, &student.email, Some(class_label)) {
            Ok(model) => models.push(model),
            Err(AppError::NotFound(msg)) => {
                tracing::warn!("Skipping {} in class report: {}", student.email, msg);
            }
            Err(e) => return Err(e),
        }
    }

    if models.is_empty() {
        return Err(AppError::NotFound(format!(
            "No reports could be generated for class {} in quiz {}",
            class_label.trim(),
            data.quiz_id
        )));
    }

    tracing::info!(
        "Built {} of {} class reports for {} / {}",
        models.len(),
        students.len(),
        class_label.trim(),
        data.quiz_id
    );
    Ok(models)
}
