// src/reports/export.rs

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    error::AppError,
    models::response::Outcome,
    reports::{
        builder::completion_date,
        data::QuizData,
        normalize::normalize_responses,
        scoring::score_student,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(String),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Spreadsheet writer: one header row, then data rows.
pub trait SheetSink {
    fn header(&mut self, columns: &[String]);
    fn row(&mut self, cells: Vec<Cell>);
}

/// Sink that keeps the sheet in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetSink for Sheet {
    fn header(&mut self, columns: &[String]) {
        self.headers = columns.to_vec();
    }

    fn row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }
}

const FIXED_COLUMNS: [&str; 13] = [
    "Student Code",
    "Given Name",
    "Family Name",
    "Class",
    "Email",
    "Correct",
    "Total",
    "Overall %",
    "KU %",
    "PCE %",
    "PS %",
    "CM %",
    "Last Updated",
];

/// Orders `q2` before `q10`: text prefix, then numeric suffix.
fn question_sort_key(id: &str) -> (String, u64, String) {
    let digits_at = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(id.len());
    let (prefix, digits) = id.split_at(digits_at);
    (
        prefix.to_string(),
        digits.parse().unwrap_or(0),
        id.to_string(),
    )
}

/// Writes one row per roster-matched student of the quiz, sorted by family
/// then given name, followed by their answer to every question seen.
/// Returns the number of rows written; `NotFound` when there are none.
pub fn export_responses(
    data: &QuizData,
    class_filter: Option<&str>,
    sink: &mut dyn SheetSink,
) -> Result<usize, AppError> {
    let mut students = data.students(class_filter);
    if students.is_empty() {
        return Err(AppError::NotFound(format!(
            "No responses to export for quiz {}",
            data.quiz_id
        )));
    }
    students.sort_by_key(|(entry, _)| entry.sort_key());

    let normalized: Vec<_> = students
        .iter()
        .map(|(_, doc)| normalize_responses(&doc.data))
        .collect();

    let mut question_ids: Vec<String> = normalized
        .iter()
        .flat_map(|r| r.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    question_ids.sort_by_key(|id| question_sort_key(id));

    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(question_ids.iter().cloned());
    sink.header(&columns);

    for ((entry, doc), responses) in students.iter().zip(&normalized) {
        let score = score_student(responses);
        let mut cells = vec![
            Cell::from(entry.student_code.as_str()),
            Cell::from(entry.given_name.as_str()),
            Cell::from(entry.family_name.as_str()),
            Cell::from(entry.class_name.as_str()),
            Cell::from(entry.email.as_str()),
            Cell::Number(score.overall.correct as f64),
            Cell::Number(score.overall.total as f64),
            Cell::Number(score.overall_percent()),
        ];
        cells.extend(
            Outcome::ALL
                .iter()
                .map(|&o| Cell::Number(score.outcome_percent(o))),
        );
        cells.push(Cell::Date(completion_date(doc)));
        cells.extend(question_ids.iter().map(|id| {
            Cell::Text(
                responses
                    .get(id)
                    .and_then(|r| r.answer.clone())
                    .unwrap_or_default(),
            )
        }));
        sink.row(cells);
    }

    tracing::info!(
        "Exported {} rows for quiz {}",
        students.len(),
        data.quiz_id
    );
    Ok(students.len())
}
