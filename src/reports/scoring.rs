// src/reports/scoring.rs

use std::collections::BTreeMap;

use crate::models::{
    report::Tally,
    response::{Outcome, QuestionResponse},
};
use crate::reports::normalize::ResponseMap;

/// Overall and per-outcome results for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentScore {
    pub overall: Tally,
    /// Always holds all four outcome categories.
    pub outcomes: BTreeMap<Outcome, Tally>,
}

impl StudentScore {
    pub fn overall_percent(&self) -> f64 {
        self.overall.percent()
    }

    pub fn outcome_percent(&self, outcome: Outcome) -> f64 {
        self.outcomes
            .get(&outcome)
            .map(Tally::percent)
            .unwrap_or(0.0)
    }

    pub fn outcome_percentages(&self) -> BTreeMap<Outcome, f64> {
        Outcome::ALL
            .iter()
            .map(|&o| (o, self.outcome_percent(o)))
            .collect()
    }
}

/// Questions with a non-empty correct answer, in question-id order.
pub fn scored_set(responses: &ResponseMap) -> impl Iterator<Item = (&String, &QuestionResponse)> {
    responses.iter().filter(|(_, r)| r.is_scored())
}

pub fn score_student(responses: &ResponseMap) -> StudentScore {
    let mut overall = Tally::default();
    let mut outcomes: BTreeMap<Outcome, Tally> =
        Outcome::ALL.iter().map(|&o| (o, Tally::default())).collect();

    for (_, response) in scored_set(responses) {
        let correct = response.answered_correctly();
        overall.record(correct);
        if let Some(outcome) = response.outcome {
            outcomes.entry(outcome).or_default().record(correct);
        }
    }

    StudentScore { overall, outcomes }
}

/// Letter grade from the overall percentage.
pub fn letter_grade(percent: f64) -> &'static str {
    if percent >= 90.0 {
        "A"
    } else if percent >= 75.0 {
        "B"
    } else if percent >= 60.0 {
        "C"
    } else if percent >= 45.0 {
        "D"
    } else {
        "E"
    }
}
