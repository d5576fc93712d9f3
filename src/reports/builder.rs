// src/reports/builder.rs

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::{
    error::AppError,
    models::{
        report::{
            Advice, OutcomeBreakdown, RawMarks, ReportHeader, StatsSection, Strengths,
            StudentReportModel, TopicAggregate, Weaknesses,
        },
        response::{Outcome, ResponseDocument},
    },
    reports::{
        class_stats::{class_scores, class_statistics},
        data::QuizData,
        format_percent,
        normalize::normalize_responses,
        scoring::{StudentScore, letter_grade, score_student},
        topics::aggregate_topics,
    },
};

pub const STRENGTH_THRESHOLD: f64 = 70.0;
pub const WEAKNESS_THRESHOLD: f64 = 50.0;

const DATE_FORMAT: &str = "%d/%m/%Y";

fn strength_note(outcome: Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Ku => Some("Shows secure knowledge and understanding of key scientific ideas."),
        Outcome::Ps => Some("Uses problem-solving skills to analyse data and reach sound conclusions."),
        Outcome::Cm => Some("Communicates scientific information accurately using correct terminology."),
        Outcome::Pce => None,
    }
}

fn error_type(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ku => "Gaps in recalling or applying core scientific concepts",
        Outcome::Pce => "Difficulty identifying variables, fair tests and suitable equipment",
        Outcome::Ps => "Misreading data or drawing conclusions the evidence does not support",
        Outcome::Cm => "Misinterpreting scientific terms, diagrams or representations",
    }
}

fn recommended_skill(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ku => "Review key definitions and summarise each topic in your own words",
        Outcome::Pce => "Practise planning fair tests by naming the independent, dependent and controlled variables",
        Outcome::Ps => "Practise reading graphs and tables, then state what the data shows before answering",
        Outcome::Cm => "Keep a glossary of scientific terms and use them in written answers",
    }
}

fn personalised_note(grade: &str, priority: &[TopicAggregate]) -> String {
    let focus = priority
        .first()
        .map(|t| format!(" Start with {}.", t.topic_name))
        .unwrap_or_default();
    let lead = match grade {
        "A" => "Excellent work. Stretch yourself with extension questions in your strongest topics.",
        "B" => "A strong result. Targeted revision will move you into the top band.",
        "C" => "A solid foundation. Regular revision of the priority topics will lift your result.",
        _ => "Work through the priority topics first and ask your teacher for help with the skills listed.",
    };
    format!("{}{}", lead, focus)
}

/// Builds the full report for one student of `data`'s quiz.
///
/// `class_label` selects the comparison group; when absent the student's
/// roster class is used. Fails with `NotFound` when the student has no
/// response document for the quiz.
pub fn build_student_report(
    data: &QuizData,
    email: &str,
    class_label: Option<&str>,
) -> Result<StudentReportModel, AppError> {
    let doc = data.document_for(email).ok_or_else(|| {
        AppError::NotFound(format!(
            "No responses found for {} in quiz {}",
            email.trim(),
            data.quiz_id
        ))
    })?;
    let roster = data.roster_entry(email);

    let responses = normalize_responses(&doc.data);
    let score = score_student(&responses);
    let topics = aggregate_topics(&responses);
    let overall = score.overall_percent();

    let class_name = class_label
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .or_else(|| roster.map(|r| r.class_name.trim().to_string()))
        .unwrap_or_default();
    let class_filter = Some(class_name.as_str()).filter(|c| !c.is_empty());

    let scores = class_scores(data, class_filter);
    let (class_stats, box_plot) = class_statistics(&scores, overall);

    let strong_outcomes = outcomes_where(&score, |p| p >= STRENGTH_THRESHOLD);
    let weak_outcomes = outcomes_where(&score, |p| p < WEAKNESS_THRESHOLD);

    let strength_topics: Vec<TopicAggregate> = topics
        .iter()
        .filter(|t| t.percent >= STRENGTH_THRESHOLD)
        .cloned()
        .collect();
    let weak_topics: Vec<TopicAggregate> = topics
        .iter()
        .filter(|t| t.percent < WEAKNESS_THRESHOLD)
        .cloned()
        .collect();

    let mut priority_topics = weak_topics.clone();
    priority_topics.sort_by(|a, b| a.percent.total_cmp(&b.percent));

    let grade = letter_grade(overall);
    let student_name = roster
        .map(|r| r.display_name())
        .filter(|n| !n.is_empty())
        .or_else(|| doc.student_name().map(str::to_string))
        .unwrap_or_else(|| "Student".to_string());
    let task_name = doc.quiz_name().unwrap_or(&data.quiz_id).to_string();

    let header = ReportHeader {
        student_name,
        class_name,
        task_name,
        date_completed: completion_date(doc),
        overall_percent: overall,
        overall_grade: grade.to_string(),
    };

    let summary_text = summary_text(&header, &strong_outcomes, &weak_outcomes, &priority_topics);

    let model = StudentReportModel {
        raw_marks: RawMarks {
            overall_raw: score.overall,
            outcome_raw: score.outcomes.clone(),
        },
        outcomes: OutcomeBreakdown {
            outcome_percentages: score.outcome_percentages(),
            order: Outcome::ALL.to_vec(),
        },
        stats: StatsSection {
            class_stats,
            box_plot,
        },
        topics,
        strengths: Strengths {
            strength_skills: strong_outcomes
                .iter()
                .filter_map(|&o| strength_note(o))
                .map(str::to_string)
                .collect(),
            strength_outcomes: strong_outcomes,
            strength_topics,
        },
        weaknesses: Weaknesses {
            error_types: weak_outcomes
                .iter()
                .map(|&o| error_type(o).to_string())
                .collect(),
            weak_outcomes: weak_outcomes.clone(),
            weak_topics,
        },
        advice: Advice {
            recommended_skills: weak_outcomes
                .iter()
                .map(|&o| recommended_skill(o).to_string())
                .collect(),
            personalised_note: personalised_note(grade, &priority_topics),
            priority_topics,
        },
        header,
        summary_text,
    };

    tracing::debug!(
        "Built report for {} ({}): {:.1}% over {} scored questions",
        email.trim(),
        data.quiz_id,
        overall,
        model.raw_marks.overall_raw.total
    );
    Ok(model)
}

/// Outcomes that have at least one scored question and pass `keep`.
fn outcomes_where(score: &StudentScore, keep: impl Fn(f64) -> bool) -> Vec<Outcome> {
    Outcome::ALL
        .iter()
        .copied()
        .filter(|o| score.outcomes.get(o).is_some_and(|t| t.total > 0))
        .filter(|&o| keep(score.outcome_percent(o)))
        .collect()
}

/// `lastUpdated`, then `timestamp`, then empty.
pub fn completion_date(doc: &ResponseDocument) -> String {
    ["lastUpdated", "timestamp"]
        .iter()
        .filter_map(|key| doc.field(key))
        .find_map(format_timestamp)
        .unwrap_or_default()
}

/// Accepts RFC 3339 or plain-date strings, `{seconds}` / `{_seconds}`
/// objects, and epoch numbers (milliseconds when large).
fn format_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.format(DATE_FORMAT).to_string());
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(date.format(DATE_FORMAT).to_string());
            }
            Some(s.to_string())
        }
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            let dt = if raw.unsigned_abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(raw)?
            } else {
                DateTime::from_timestamp(raw, 0)?
            };
            Some(dt.format(DATE_FORMAT).to_string())
        }
        Value::Object(obj) => {
            let secs = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)?;
            let dt = DateTime::from_timestamp(secs, 0)?;
            Some(dt.format(DATE_FORMAT).to_string())
        }
        _ => None,
    }
}

fn outcome_list(outcomes: &[Outcome]) -> String {
    outcomes
        .iter()
        .map(|o| o.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_text(
    header: &ReportHeader,
    strong: &[Outcome],
    weak: &[Outcome],
    priority: &[TopicAggregate],
) -> String {
    let mut text = format!(
        "{} achieved {}% (grade {}) in {}.",
        header.student_name,
        format_percent(header.overall_percent),
        header.overall_grade,
        header.task_name
    );

    if strong.is_empty() {
        text.push_str(" No outcome area has reached the 70% benchmark yet, so there is room to grow in every area.");
    } else {
        text.push_str(&format!(" Strongest areas: {}.", outcome_list(strong)));
    }

    if !weak.is_empty() {
        text.push_str(&format!(" Areas needing attention: {}.", outcome_list(weak)));
    }

    if !priority.is_empty() {
        let names: Vec<&str> = priority
            .iter()
            .take(3)
            .map(|t| t.topic_name.as_str())
            .collect();
        text.push_str(&format!(" Priority topics for revision: {}.", names.join(", ")));
    }

    text
}
