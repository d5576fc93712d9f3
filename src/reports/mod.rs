// src/reports/mod.rs
//
// Student report pipeline: normalize stored responses, score them, compare
// against the class, then build and render the report model.

pub mod batch;
pub mod builder;
pub mod class_stats;
pub mod data;
pub mod export;
pub mod normalize;
pub mod render;
pub mod scoring;
pub mod stats;
pub mod topics;

pub use builder::build_student_report;
pub use data::QuizData;

/// Whole numbers print without decimals, everything else with one.
pub fn format_percent(percent: f64) -> String {
    let rounded = (percent * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
