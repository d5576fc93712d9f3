// tests/report_tests.rs

use quiz_reports::{
    error::AppError,
    models::{
        report::MasteryLevel,
        response::{Outcome, ResponseDocument},
        roster::RosterEntry,
    },
    reports::{
        QuizData,
        batch::build_class_reports,
        build_student_report,
        class_stats::{class_scores, class_statistics},
        export::{Cell, Sheet, export_responses},
        normalize::normalize_responses,
        render::{RecordedDocument, RenderOptions, render_report, render_reports},
        scoring::{letter_grade, score_student},
        topics::aggregate_topics,
    },
};
use serde_json::{Map, Value, json};

const QUIZ: &str = "task1_2025";
const CLASS: &str = "7Sci3";

fn object(v: Value) -> Map<String, Value> {
    v.as_object().cloned().expect("object literal")
}

fn question(correct: bool, outcome: &str, topic: &str) -> Value {
    json!({
        "answer": if correct { "A" } else { "B" },
        "correctAnswer": "A",
        "isCorrect": correct,
        "outcome": outcome,
        "topic": topic,
    })
}

/// Response document with `correct` of `total` questions right, all KU / topic 7.1,
/// stored with flattened keys as the quiz client writes them.
fn scored_doc(id: &str, email: &str, correct: usize, total: usize) -> ResponseDocument {
    let mut data = object(json!({
        "uid": id,
        "email": email,
        "quizId": QUIZ,
        "lastUpdated": "2025-03-01T09:30:00Z",
    }));
    for i in 0..total {
        data.insert(
            format!("responses.q{}", i + 1),
            question(i < correct, "KU", "7.1"),
        );
    }
    ResponseDocument::new(id, data)
}

fn roster(email: &str, given: &str, family: &str, class: &str) -> RosterEntry {
    RosterEntry {
        student_code: format!("S-{}", given),
        email: email.to_string(),
        given_name: given.to_string(),
        family_name: family.to_string(),
        year_level: 7,
        class_name: class.to_string(),
    }
}

#[test]
fn flattened_record_overrides_nested_one() {
    let doc = object(json!({
        "responses": {
            "q1": {"answer": "A", "correctAnswer": "A"},
            "q2": {"answer": "C", "correctAnswer": "D"}
        },
        "responses.q1": {"answer": "B", "correctAnswer": "A"},
        "responses.q3": {"answer": "D", "correctAnswer": "D"},
        "responses.q4": "not an object",
        "responsesq5": {"answer": "A"},
        "quizId": QUIZ
    }));

    let merged = normalize_responses(&doc);
    assert_eq!(merged.keys().collect::<Vec<_>>(), ["q1", "q2", "q3"]);
    assert_eq!(merged["q1"].answer.as_deref(), Some("B"));
    assert_eq!(merged["q3"].answer.as_deref(), Some("D"));
}

#[test]
fn questions_without_a_key_are_not_scored() {
    let doc = object(json!({
        "responses": {
            "q1": {"answer": "A", "correctAnswer": "A", "isCorrect": true, "outcome": "KU"},
            "q2": {"answer": "C", "isCorrect": true, "outcome": "KU"},
            "q3": {"answer": "C", "correctAnswer": "", "outcome": "PS"}
        }
    }));

    let score = score_student(&normalize_responses(&doc));
    assert_eq!(score.overall.correct, 1);
    assert_eq!(score.overall.total, 1);
    assert_eq!(score.overall_percent(), 100.0);
    assert_eq!(score.outcome_percent(Outcome::Ku), 100.0);
    assert_eq!(score.outcomes[&Outcome::Ps].total, 0);
}

#[test]
fn empty_scored_set_scores_zero() {
    let doc = object(json!({
        "responses.q1": {"answer": "A", "correctAnswer": null, "isCorrect": null},
        "responses.q2": {"answer": "B"}
    }));

    let score = score_student(&normalize_responses(&doc));
    assert_eq!(score.overall.total, 0);
    assert_eq!(score.overall.correct, 0);
    assert_eq!(score.overall_percent(), 0.0);
    for outcome in Outcome::ALL {
        assert_eq!(score.outcome_percent(outcome), 0.0);
    }
}

#[test]
fn outcome_percentages_count_only_their_category() {
    let doc = object(json!({
        "responses.q1": question(true, "KU", "7.1"),
        "responses.q2": question(false, "KU", "7.1"),
        "responses.q3": question(true, "PS", "7.2"),
        "responses.q4": question(true, "CM", "7.2"),
        "responses.q5": question(false, "CM", "7.2"),
        "responses.q6": question(false, "CM", "7.2"),
    }));

    let score = score_student(&normalize_responses(&doc));
    assert_eq!(score.outcome_percent(Outcome::Ku), 50.0);
    assert_eq!(score.outcome_percent(Outcome::Pce), 0.0);
    assert_eq!(score.outcome_percent(Outcome::Ps), 100.0);
    assert!((score.outcome_percent(Outcome::Cm) - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(score.overall.correct, 3);
    assert_eq!(score.overall.total, 6);
}

#[test]
fn mastery_level_boundaries() {
    assert_eq!(MasteryLevel::from_percent(100.0), MasteryLevel::Outstanding);
    assert_eq!(MasteryLevel::from_percent(85.0), MasteryLevel::Outstanding);
    assert_eq!(MasteryLevel::from_percent(84.99), MasteryLevel::Thorough);
    assert_eq!(MasteryLevel::from_percent(70.0), MasteryLevel::Thorough);
    assert_eq!(MasteryLevel::from_percent(69.99), MasteryLevel::Sound);
    assert_eq!(MasteryLevel::from_percent(55.0), MasteryLevel::Sound);
    assert_eq!(MasteryLevel::from_percent(40.0), MasteryLevel::Basic);
    assert_eq!(MasteryLevel::from_percent(39.99), MasteryLevel::Limited);
    assert_eq!(MasteryLevel::from_percent(0.0), MasteryLevel::Limited);
}

#[test]
fn grade_boundaries() {
    assert_eq!(letter_grade(90.0), "A");
    assert_eq!(letter_grade(89.9), "B");
    assert_eq!(letter_grade(75.0), "B");
    assert_eq!(letter_grade(74.9), "C");
    assert_eq!(letter_grade(60.0), "C");
    assert_eq!(letter_grade(59.9), "D");
    assert_eq!(letter_grade(45.0), "D");
    assert_eq!(letter_grade(44.9), "E");
}

#[test]
fn topics_are_grouped_named_and_sorted() {
    let doc = object(json!({
        "responses": {
            "q1": {"answer": "A", "correctAnswer": "A", "topicId": "8.2", "topicName": "Cells"},
            "q2": {"answer": "B", "correctAnswer": "A", "topicId": "8.2", "topicName": "Other name"},
            "q3": {"answer": "A", "correctAnswer": "A", "topic": "7.1"},
            "q4": {"answer": "A", "correctAnswer": "A"},
            "q5": {"answer": "A", "topicId": "9.9"}
        }
    }));

    let topics = aggregate_topics(&normalize_responses(&doc));
    assert_eq!(topics.len(), 2);

    assert_eq!(topics[0].topic_id, "7.1");
    assert_eq!(topics[0].topic_name, "7.1");
    assert_eq!(topics[0].percent, 100.0);
    assert_eq!(topics[0].level, MasteryLevel::Outstanding);

    assert_eq!(topics[1].topic_id, "8.2");
    assert_eq!(topics[1].topic_name, "Cells");
    assert_eq!((topics[1].correct, topics[1].total), (1, 2));
    assert_eq!(topics[1].level, MasteryLevel::Basic);
}

fn two_student_quiz() -> QuizData {
    QuizData::new(
        QUIZ,
        vec![
            scored_doc("uid-a", "ava@school.edu", 4, 5),
            scored_doc("uid-b", "Ben@School.edu", 3, 5),
        ],
        vec![
            roster("ava@school.edu", "Ava", "Nguyen", CLASS),
            roster("ben@school.edu", "Ben", "Adams", CLASS),
        ],
    )
}

#[test]
fn class_statistics_for_two_student_class() {
    let data = two_student_quiz();
    let mut scores = class_scores(&data, Some(CLASS));
    scores.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(scores, [60.0, 80.0]);

    let model = build_student_report(&data, "BEN@school.edu", Some(CLASS)).unwrap();
    let stats = model.stats.class_stats;
    assert_eq!(stats.count, 2);
    assert_eq!(stats.min, 60.0);
    assert_eq!(stats.max, 80.0);
    assert_eq!(stats.mean, 70.0);
    assert!((stats.std_dev - 200.0_f64.sqrt()).abs() < 1e-9);
    // (0 below + 0.5 * 1 equal) / 2
    assert_eq!(stats.percentile, 25.0);
    assert_eq!(stats.student_score, 60.0);

    let plot = model.stats.box_plot;
    assert_eq!((plot.q1, plot.median, plot.q3), (60.0, 70.0, 80.0));
    assert_eq!(plot.student, 60.0);
}

#[test]
fn class_filter_and_roster_join_exclude_other_students() {
    let data = QuizData::new(
        QUIZ,
        vec![
            scored_doc("a", "ava@school.edu", 4, 5),
            scored_doc("b", "ben@school.edu", 3, 5),
            scored_doc("c", "cy@school.edu", 5, 5),
            scored_doc("d", "unknown@school.edu", 0, 5),
        ],
        vec![
            roster("ava@school.edu", "Ava", "Nguyen", CLASS),
            roster("ben@school.edu", "Ben", "Adams", CLASS),
            roster("cy@school.edu", "Cy", "Brown", "7Sci1"),
        ],
    );

    assert_eq!(class_scores(&data, Some(CLASS)).len(), 2);
    assert_eq!(class_scores(&data, Some(" 7sci3 ")).len(), 2);
    assert_eq!(class_scores(&data, None).len(), 3);
}

#[test]
fn empty_distribution_still_reports_student_score() {
    let (stats, plot) = class_statistics(&[], 42.0);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.mean, 0.0);
    assert_eq!(stats.percentile, 0.0);
    assert_eq!(stats.student_score, 42.0);
    assert_eq!(plot.student, 42.0);
}

#[test]
fn missing_response_document_is_not_found() {
    let data = two_student_quiz();
    let err = build_student_report(&data, "nobody@school.edu", Some(CLASS)).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn report_model_derivations() {
    let doc = ResponseDocument::new(
        "uid-z",
        object(json!({
            "email": "zoe@school.edu",
            "quizId": QUIZ,
            "quizName": "Term 1 Science Check-in",
            "lastUpdated": {"seconds": 1_740_787_200, "nanoseconds": 0},
            "responses": {
                "q1": {"answer": "A", "correctAnswer": "A", "isCorrect": true, "outcome": "KU", "topic": "7.1", "topicName": "Working scientifically"},
                "q2": {"answer": "A", "correctAnswer": "A", "isCorrect": true, "outcome": "KU", "topic": "7.1", "topicName": "Working scientifically"},
                "q3": {"answer": "B", "correctAnswer": "A", "isCorrect": false, "outcome": "PS", "topic": "7.3", "topicName": "Forces"},
                "q4": {"answer": "B", "correctAnswer": "A", "isCorrect": false, "outcome": "PS", "topic": "7.2", "topicName": "Mixtures"},
                "q5": {"answer": "A", "correctAnswer": "A", "isCorrect": true, "outcome": "PS", "topic": "7.2", "topicName": "Mixtures"},
                "q6": {"answer": "C", "outcome": "CM", "topic": "7.4"}
            }
        })),
    );
    let data = QuizData::new(QUIZ, vec![doc], Vec::<RosterEntry>::new());

    let model = build_student_report(&data, "zoe@school.edu", None).unwrap();

    // Header falls back to the document and the literal "Student".
    assert_eq!(model.header.student_name, "Student");
    assert_eq!(model.header.class_name, "");
    assert_eq!(model.header.task_name, "Term 1 Science Check-in");
    assert_eq!(model.header.date_completed, "01/03/2025");
    assert_eq!(model.header.overall_percent, 60.0);
    assert_eq!(model.header.overall_grade, "C");

    assert_eq!(model.raw_marks.overall_raw.correct, 3);
    assert_eq!(model.raw_marks.overall_raw.total, 5);
    assert_eq!(model.outcomes.order, Outcome::ALL.to_vec());
    assert_eq!(model.outcomes.outcome_percentages[&Outcome::Ku], 100.0);

    // KU 100% is a strength; PS 33% is a weakness; PCE/CM have no scored questions.
    assert_eq!(model.strengths.strength_outcomes, [Outcome::Ku]);
    assert_eq!(model.strengths.strength_skills.len(), 1);
    assert_eq!(model.weaknesses.weak_outcomes, [Outcome::Ps]);
    assert_eq!(model.weaknesses.error_types.len(), 1);
    assert_eq!(model.advice.recommended_skills.len(), 1);

    let strong: Vec<_> = model.strengths.strength_topics.iter().map(|t| t.topic_id.as_str()).collect();
    assert_eq!(strong, ["7.1"]);

    // Weak topics: Mixtures 50% is not < 50, Forces 0% is.
    let priority: Vec<_> = model.advice.priority_topics.iter().map(|t| t.topic_name.as_str()).collect();
    assert_eq!(priority, ["Forces"]);

    assert!(model.summary_text.contains("60%"));
    assert!(model.summary_text.contains("Knowledge and Understanding"));
    assert!(model.summary_text.contains("Problem Solving"));
    assert!(model.summary_text.contains("Forces"));
}

#[test]
fn priority_topics_are_worst_first() {
    let doc = ResponseDocument::new(
        "uid-p",
        object(json!({
            "email": "pat@school.edu",
            "responses.q1": {"answer": "A", "correctAnswer": "A", "topic": "1", "topicName": "One"},
            "responses.q2": {"answer": "B", "correctAnswer": "A", "topic": "1", "topicName": "One"},
            "responses.q3": {"answer": "B", "correctAnswer": "A", "topic": "1", "topicName": "One"},
            "responses.q4": {"answer": "B", "correctAnswer": "A", "topic": "2", "topicName": "Two"},
            "responses.q5": {"answer": "B", "correctAnswer": "A", "topic": "3", "topicName": "Three"},
            "responses.q6": {"answer": "A", "correctAnswer": "A", "topic": "3", "topicName": "Three"},
            "responses.q7": {"answer": "B", "correctAnswer": "A", "topic": "3", "topicName": "Three"},
            "responses.q8": {"answer": "B", "correctAnswer": "A", "topic": "3", "topicName": "Three"}
        })),
    );
    let data = QuizData::new(QUIZ, vec![doc], vec![roster("pat@school.edu", "Pat", "Lee", CLASS)]);

    let model = build_student_report(&data, "pat@school.edu", None).unwrap();
    let priority: Vec<_> = model.advice.priority_topics.iter().map(|t| t.topic_name.as_str()).collect();
    assert_eq!(priority, ["Two", "Three", "One"]);
    assert_eq!(model.header.student_name, "Pat Lee");
    assert_eq!(model.header.class_name, CLASS);
    assert!(model.strengths.strength_outcomes.is_empty());
    assert!(model.summary_text.contains("No outcome area has reached the 70% benchmark"));
}

#[test]
fn report_model_serializes_with_contract_field_names() {
    let data = two_student_quiz();
    let model = build_student_report(&data, "ava@school.edu", Some(CLASS)).unwrap();
    let v = serde_json::to_value(&model).unwrap();

    for path in [
        "/header/studentName",
        "/header/className",
        "/header/taskName",
        "/header/dateCompleted",
        "/header/overallPercent",
        "/header/overallGrade",
        "/rawMarks/overallRaw",
        "/rawMarks/outcomeRaw/KU",
        "/outcomes/outcomePercentages/PCE",
        "/outcomes/order",
        "/stats/classStats",
        "/stats/boxPlot",
        "/topics",
        "/strengths/strengthOutcomes",
        "/strengths/strengthTopics",
        "/strengths/strengthSkills",
        "/weaknesses/weakOutcomes",
        "/weaknesses/weakTopics",
        "/weaknesses/errorTypes",
        "/advice/priorityTopics",
        "/advice/recommendedSkills",
        "/advice/personalisedNote",
        "/summaryText",
    ] {
        assert!(v.pointer(path).is_some(), "missing {}", path);
    }
    assert_eq!(v["outcomes"]["order"], json!(["KU", "PCE", "PS", "CM"]));
    assert_eq!(v["topics"][0]["level"], "Thorough");
}

#[test]
fn class_batch_skips_students_without_responses() {
    let data = QuizData::new(
        QUIZ,
        vec![
            scored_doc("1", "zed@school.edu", 5, 5),
            scored_doc("2", "amy@school.edu", 2, 5),
            scored_doc("3", "bo@school.edu", 3, 5),
        ],
        vec![
            roster("zed@school.edu", "Zed", "Adams", CLASS),
            roster("amy@school.edu", "Amy", "Carter", CLASS),
            roster("bo@school.edu", "Bo", "adams", CLASS),
        ],
    );
    let class = vec![
        roster("amy@school.edu", "Amy", "Carter", CLASS),
        roster("zed@school.edu", "Zed", "Adams", CLASS),
        roster("noah@school.edu", "Noah", "Baker", CLASS),
        roster("bo@school.edu", "Bo", "adams", CLASS),
        roster("ivy@school.edu", "Ivy", "Young", CLASS),
    ];

    let models = build_class_reports(&data, &class, CLASS).unwrap();
    let names: Vec<_> = models.iter().map(|m| m.header.student_name.as_str()).collect();
    assert_eq!(names, ["Bo adams", "Zed Adams", "Amy Carter"]);

    let mut doc = RecordedDocument::new();
    render_reports(&models, &mut doc);
    let pages = doc.page_texts();

    let report_starts: Vec<usize> = pages
        .iter()
        .enumerate()
        .filter(|(_, texts)| texts.first() == Some(&"Student Report"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(report_starts.len(), 3);
    assert_eq!(report_starts[0], 0);

    let summaries = pages
        .iter()
        .filter(|texts| texts.first() == Some(&"Summary"))
        .count();
    assert_eq!(summaries, 3);
}

#[test]
fn class_batch_with_no_reports_fails() {
    let data = two_student_quiz();
    let class = vec![roster("ghost@school.edu", "Ghost", "Casper", CLASS)];
    let err = build_class_reports(&data, &class, CLASS).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn rendered_sections_follow_fixed_order() {
    let data = two_student_quiz();
    let model = build_student_report(&data, "ava@school.edu", Some(CLASS)).unwrap();

    let mut doc = RecordedDocument::new();
    render_report(&model, &mut doc, RenderOptions::default());
    let pages = doc.page_texts();
    assert!(pages.len() >= 2);
    assert_eq!(pages[0][0], "Student Report");
    assert_eq!(pages.last().unwrap()[0], "Summary");

    let all: Vec<&str> = pages.iter().flatten().copied().collect();
    let position = |heading: &str| all.iter().position(|t| *t == heading).unwrap();
    let order = [
        "Raw Marks",
        "Outcome Breakdown",
        "Class Summary",
        "Topic Performance",
        "Strengths",
        "Areas for Improvement",
        "Study Advice",
        "Summary",
    ];
    for pair in order.windows(2) {
        assert!(position(pair[0]) < position(pair[1]), "{} after {}", pair[0], pair[1]);
    }

    // KU, PCE, PS, CM in that order within the breakdown.
    let ku = all.iter().position(|t| t.starts_with("KU (")).unwrap();
    let pce = all.iter().position(|t| t.starts_with("PCE (")).unwrap();
    let ps = all.iter().position(|t| t.starts_with("PS (")).unwrap();
    let cm = all.iter().position(|t| t.starts_with("CM (")).unwrap();
    assert!(ku < pce && pce < ps && ps < cm);
}

#[test]
fn box_plot_is_drawn_on_a_linear_scale() {
    use quiz_reports::reports::render::{BOX_PLOT_WIDTH, DrawOp, MARGIN};

    let data = two_student_quiz();
    let model = build_student_report(&data, "ben@school.edu", Some(CLASS)).unwrap();
    let mut doc = RecordedDocument::new();
    render_report(&model, &mut doc, RenderOptions::default());

    let ops: Vec<&DrawOp> = doc.pages.iter().flat_map(|p| p.ops.iter()).collect();
    let rect = ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Rect { x, width, .. } => Some((*x, *width)),
            _ => None,
        })
        .unwrap();
    // Q1 = 60, Q3 = 80
    assert!((rect.0 - (MARGIN + 0.6 * BOX_PLOT_WIDTH)).abs() < 1e-9);
    assert!((rect.1 - 0.2 * BOX_PLOT_WIDTH).abs() < 1e-9);

    let marker = ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Circle { x, .. } => Some(*x),
            _ => None,
        })
        .unwrap();
    assert!((marker - (MARGIN + 0.6 * BOX_PLOT_WIDTH)).abs() < 1e-9);
}

#[test]
fn export_lists_students_and_answers() {
    let data = two_student_quiz();
    let mut sheet = Sheet::default();
    let rows = export_responses(&data, Some(CLASS), &mut sheet).unwrap();

    assert_eq!(rows, 2);
    assert_eq!(sheet.headers[0], "Student Code");
    assert_eq!(sheet.headers.last().map(String::as_str), Some("q5"));
    // Adams before Nguyen
    assert_eq!(sheet.rows[0][2], Cell::Text("Adams".to_string()));
    assert_eq!(sheet.rows[0][7], Cell::Number(60.0));
    assert_eq!(sheet.rows[1][7], Cell::Number(80.0));

    let mut empty = Sheet::default();
    let err = export_responses(&data, Some("8Sci1"), &mut empty).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn non_ascii_email_joins_consistently() {
    let data = QuizData::new(
        QUIZ,
        vec![scored_doc("e", "ÉMILE@school.edu", 5, 5)],
        vec![roster("émile@school.edu", "Émile", "Roux", CLASS)],
    );

    assert_eq!(class_scores(&data, Some(CLASS)), [100.0]);
    let model = build_student_report(&data, "émile@school.edu", Some(CLASS)).unwrap();
    assert_eq!(model.header.student_name, "Émile Roux");
    assert_eq!(model.stats.class_stats.count, 1);

    let class = vec![roster("émile@school.edu", "Émile", "Roux", CLASS)];
    assert_eq!(build_class_reports(&data, &class, CLASS).unwrap().len(), 1);
}
