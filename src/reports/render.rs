// src/reports/render.rs
//
// Page layout for student reports. Coordinates are A4 points with the
// origin at the top-left corner and y growing downwards.

use serde::Serialize;

use crate::models::report::{BoxPlot, StudentReportModel, TopicAggregate};
use crate::reports::format_percent;

pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 50.0;
pub const BOX_PLOT_WIDTH: f64 = 400.0;

const TITLE_SIZE: f64 = 18.0;
const HEADING_SIZE: f64 = 13.0;
const BODY_SIZE: f64 = 10.0;
const MAX_PRIORITY_TOPICS: usize = 5;

/// Drawing surface for reports (PDF writer, recorder, ...).
pub trait ReportSink {
    fn new_page(&mut self);
    fn text(&mut self, x: f64, y: f64, size: f64, text: &str);
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn filled_circle(&mut self, x: f64, y: f64, radius: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Text { x: f64, y: f64, size: f64, text: String },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { x: f64, y: f64, radius: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Sink that records draw operations page by page.
/// Like a fresh PDF document it starts with one blank page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedDocument {
    pub pages: Vec<Page>,
}

impl Default for RecordedDocument {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }
}

impl RecordedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text drawn on each page, in drawing order.
    pub fn page_texts(&self) -> Vec<Vec<&str>> {
        self.pages
            .iter()
            .map(|p| {
                p.ops
                    .iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

impl ReportSink for RecordedDocument {
    fn new_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn text(&mut self, x: f64, y: f64, size: f64, text: &str) {
        self.push(DrawOp::Text {
            x,
            y,
            size,
            text: text.to_string(),
        });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(DrawOp::Line { x1, y1, x2, y2 });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawOp::Rect { x, y, width, height });
    }

    fn filled_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.push(DrawOp::Circle { x, y, radius });
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Begin this report on a new page instead of the current one.
    pub start_on_new_page: bool,
}

/// Maps a 0..=100 score onto `[left, left + width]`.
pub fn scale_x(score: f64, left: f64, width: f64) -> f64 {
    left + score.clamp(0.0, 100.0) / 100.0 * width
}

/// Greedy word wrap on an approximate character budget.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Tracks the vertical position and breaks pages when needed.
struct Layout<'a> {
    sink: &'a mut dyn ReportSink,
    y: f64,
}

impl<'a> Layout<'a> {
    fn new(sink: &'a mut dyn ReportSink, new_page: bool) -> Self {
        if new_page {
            sink.new_page();
        }
        Self { sink, y: MARGIN }
    }

    fn ensure(&mut self, height: f64) {
        if self.y + height > PAGE_HEIGHT - MARGIN {
            self.page_break();
        }
    }

    fn page_break(&mut self) {
        self.sink.new_page();
        self.y = MARGIN;
    }

    fn write(&mut self, size: f64, text: &str) {
        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * 0.5)) as usize;
        for line in wrap_text(text, max_chars.max(10)) {
            self.ensure(size * 1.4);
            self.sink.text(MARGIN, self.y, size, &line);
            self.y += size * 1.4;
        }
    }

    fn heading(&mut self, text: &str) {
        self.y += 6.0;
        self.ensure(HEADING_SIZE * 1.4 + BODY_SIZE * 1.4);
        self.write(HEADING_SIZE, text);
    }

    fn body(&mut self, text: &str) {
        self.write(BODY_SIZE, text);
    }

    fn bullets<I, S>(&mut self, items: I, empty: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut any = false;
        for item in items {
            any = true;
            self.body(&format!("- {}", item.as_ref()));
        }
        if !any {
            self.body(empty);
        }
    }

    fn box_plot(&mut self, plot: &BoxPlot) {
        let height = 50.0;
        self.ensure(height);
        let left = MARGIN;
        let mid = self.y + 14.0;
        let x = |v: f64| scale_x(v, left, BOX_PLOT_WIDTH);

        // whisker and end ticks
        self.sink.line(x(plot.min), mid, x(plot.max), mid);
        self.sink.line(x(plot.min), mid - 6.0, x(plot.min), mid + 6.0);
        self.sink.line(x(plot.max), mid - 6.0, x(plot.max), mid + 6.0);
        // Q1..Q3 box and median
        self.sink
            .rect(x(plot.q1), mid - 8.0, x(plot.q3) - x(plot.q1), 16.0);
        self.sink.line(x(plot.median), mid - 8.0, x(plot.median), mid + 8.0);
        self.sink.filled_circle(x(plot.student), mid, 4.0);

        self.sink.text(left, mid + 22.0, BODY_SIZE - 2.0, "0");
        self.sink
            .text(left + BOX_PLOT_WIDTH - 10.0, mid + 22.0, BODY_SIZE - 2.0, "100");
        self.y += height;
    }
}

fn topic_line(t: &TopicAggregate) -> String {
    format!(
        "{} ({}): {}% - {} ({}/{})",
        t.topic_name,
        t.topic_id,
        format_percent(t.percent),
        t.level.as_str(),
        t.correct,
        t.total
    )
}

/// Paints one report. Section order is fixed; the summary always starts
/// on a page of its own.
pub fn render_report(model: &StudentReportModel, sink: &mut dyn ReportSink, options: RenderOptions) {
    let mut page = Layout::new(sink, options.start_on_new_page);
    let h = &model.header;

    page.write(TITLE_SIZE, "Student Report");
    page.body(&format!("Name: {}", h.student_name));
    page.body(&format!("Class: {}", h.class_name));
    page.body(&format!("Task: {}", h.task_name));
    page.body(&format!("Date completed: {}", h.date_completed));
    page.body(&format!(
        "Overall: {}% (Grade {})",
        format_percent(h.overall_percent),
        h.overall_grade
    ));

    page.heading("Raw Marks");
    let overall = model.raw_marks.overall_raw;
    page.body(&format!("Overall: {} / {}", overall.correct, overall.total));
    for outcome in &model.outcomes.order {
        let tally = model
            .raw_marks
            .outcome_raw
            .get(outcome)
            .copied()
            .unwrap_or_default();
        page.body(&format!("{}: {} / {}", outcome.code(), tally.correct, tally.total));
    }

    page.heading("Outcome Breakdown");
    for outcome in &model.outcomes.order {
        let percent = model
            .outcomes
            .outcome_percentages
            .get(outcome)
            .copied()
            .unwrap_or(0.0);
        page.body(&format!(
            "{} ({}): {}%",
            outcome.code(),
            outcome.label(),
            format_percent(percent)
        ));
    }

    page.heading("Class Summary");
    let stats = &model.stats.class_stats;
    page.body(&format!("Students compared: {}", stats.count));
    page.body(&format!(
        "Lowest: {}%   Highest: {}%   Mean: {}%   Std dev: {:.1}",
        format_percent(stats.min),
        format_percent(stats.max),
        format_percent(stats.mean),
        stats.std_dev
    ));
    page.body(&format!(
        "Your score: {}%   Percentile rank: {}",
        format_percent(stats.student_score),
        format_percent(stats.percentile)
    ));
    page.box_plot(&model.stats.box_plot);

    page.heading("Topic Performance");
    page.bullets(model.topics.iter().map(topic_line), "No topic data recorded.");

    page.heading("Strengths");
    page.bullets(
        model
            .strengths
            .strength_outcomes
            .iter()
            .map(|o| o.label().to_string())
            .chain(model.strengths.strength_topics.iter().map(|t| t.topic_name.clone()))
            .chain(model.strengths.strength_skills.iter().cloned()),
        "No strengths identified yet.",
    );

    page.heading("Areas for Improvement");
    page.bullets(
        model
            .weaknesses
            .weak_outcomes
            .iter()
            .map(|o| o.label().to_string())
            .chain(model.weaknesses.weak_topics.iter().map(|t| t.topic_name.clone()))
            .chain(model.weaknesses.error_types.iter().cloned()),
        "No areas of concern identified.",
    );

    page.heading("Study Advice");
    page.bullets(
        model
            .advice
            .priority_topics
            .iter()
            .take(MAX_PRIORITY_TOPICS)
            .map(topic_line)
            .chain(model.advice.recommended_skills.iter().cloned()),
        "Keep revising across all topics.",
    );
    page.body(&model.advice.personalised_note);

    page.page_break();
    page.write(TITLE_SIZE, "Summary");
    page.body(&model.summary_text);
}

/// Paints several reports into one document; each after the first begins
/// on a new page.
pub fn render_reports(models: &[StudentReportModel], sink: &mut dyn ReportSink) {
    for (i, model) in models.iter().enumerate() {
        render_report(
            model,
            sink,
            RenderOptions {
                start_on_new_page: i > 0,
            },
        );
    }
}
