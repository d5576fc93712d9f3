// src/reports/class_stats.rs

use serde::Serialize;

use crate::models::report::{BoxPlot, ClassStatistics};
use crate::reports::{
    data::QuizData,
    normalize::normalize_responses,
    scoring::score_student,
    stats,
};

/// Overall percentages of every roster-matched student in the quiz,
/// optionally restricted to one class.
pub fn class_scores(data: &QuizData, class_filter: Option<&str>) -> Vec<f64> {
    data.students(class_filter)
        .into_iter()
        .map(|(_, doc)| score_student(&normalize_responses(&doc.data)).overall_percent())
        .collect()
}

/// Statistics of `scores` as seen by a student who scored `student_score`.
/// An empty distribution reports zeros and still carries the student's score.
pub fn class_statistics(scores: &[f64], student_score: f64) -> (ClassStatistics, BoxPlot) {
    if scores.is_empty() {
        return (
            ClassStatistics {
                student_score,
                ..ClassStatistics::default()
            },
            BoxPlot {
                student: student_score,
                ..BoxPlot::default()
            },
        );
    }

    let q = stats::quartiles(scores);
    let min = stats::min(scores);
    let max = stats::max(scores);

    let class_stats = ClassStatistics {
        count: scores.len(),
        min,
        max,
        mean: stats::mean(scores),
        std_dev: stats::std_dev(scores),
        percentile: stats::percentile_rank(scores, student_score),
        student_score,
    };
    let box_plot = BoxPlot {
        min,
        q1: q.q1,
        median: q.median,
        q3: q.q3,
        max,
        student: student_score,
    };
    (class_stats, box_plot)
}

/// Class-level summary without a focal student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

pub fn distribution_summary(scores: &[f64]) -> DistributionSummary {
    let q = stats::quartiles(scores);
    DistributionSummary {
        count: scores.len(),
        min: stats::min(scores),
        max: stats::max(scores),
        mean: stats::mean(scores),
        std_dev: stats::std_dev(scores),
        q1: q.q1,
        median: q.median,
        q3: q.q3,
    }
}
