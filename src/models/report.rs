// src/models/report.rs
//
// Field names here are the wire contract consumed by the renderer and by
// any export surface. Keep them stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::response::Outcome;

/// Correct/total counts over some subset of the scored set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// 0 when nothing was counted.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }
}

/// Ordinal mastery label derived from a topic percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MasteryLevel {
    Limited,
    Basic,
    Sound,
    Thorough,
    Outstanding,
}

impl MasteryLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 85.0 {
            MasteryLevel::Outstanding
        } else if percent >= 70.0 {
            MasteryLevel::Thorough
        } else if percent >= 55.0 {
            MasteryLevel::Sound
        } else if percent >= 40.0 {
            MasteryLevel::Basic
        } else {
            MasteryLevel::Limited
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MasteryLevel::Limited => "Limited",
            MasteryLevel::Basic => "Basic",
            MasteryLevel::Sound => "Sound",
            MasteryLevel::Thorough => "Thorough",
            MasteryLevel::Outstanding => "Outstanding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAggregate {
    pub topic_id: String,
    pub topic_name: String,
    pub correct: u32,
    pub total: u32,
    pub percent: f64,
    pub level: MasteryLevel,
}

/// Distribution of overall scores across a quiz or class, seen from one student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub percentile: f64,
    pub student_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlot {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub student: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    pub student_name: String,
    pub class_name: String,
    pub task_name: String,
    pub date_completed: String,
    pub overall_percent: f64,
    pub overall_grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarks {
    pub overall_raw: Tally,
    pub outcome_raw: BTreeMap<Outcome, Tally>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeBreakdown {
    pub outcome_percentages: BTreeMap<Outcome, f64>,
    pub order: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSection {
    pub class_stats: ClassStatistics,
    pub box_plot: BoxPlot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strengths {
    pub strength_outcomes: Vec<Outcome>,
    pub strength_topics: Vec<TopicAggregate>,
    pub strength_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weaknesses {
    pub weak_outcomes: Vec<Outcome>,
    pub weak_topics: Vec<TopicAggregate>,
    pub error_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// Weak topics, worst first.
    pub priority_topics: Vec<TopicAggregate>,
    pub recommended_skills: Vec<String>,
    pub personalised_note: String,
}

/// Everything needed to render one student's report page(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReportModel {
    pub header: ReportHeader,
    pub raw_marks: RawMarks,
    pub outcomes: OutcomeBreakdown,
    pub stats: StatsSection,
    pub topics: Vec<TopicAggregate>,
    pub strengths: Strengths,
    pub weaknesses: Weaknesses,
    pub advice: Advice,
    pub summary_text: String,
}
