// src/reports/topics.rs

use std::collections::BTreeMap;

use crate::models::report::{MasteryLevel, Tally, TopicAggregate};
use crate::reports::normalize::ResponseMap;
use crate::reports::scoring::scored_set;

/// Groups the scored set by topic id, sorted by topic id.
///
/// Questions without any topic id contribute to no aggregate.
pub fn aggregate_topics(responses: &ResponseMap) -> Vec<TopicAggregate> {
    let mut by_topic: BTreeMap<String, (String, Tally)> = BTreeMap::new();

    for (_, response) in scored_set(responses) {
        let Some(topic_id) = response.topic_id.as_deref() else {
            continue;
        };
        let entry = by_topic.entry(topic_id.to_string()).or_insert_with(|| {
            let name = response
                .topic_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .or(Some(topic_id).filter(|t| !t.is_empty()))
                .unwrap_or("Topic");
            (name.to_string(), Tally::default())
        });
        entry.1.record(response.answered_correctly());
    }

    by_topic
        .into_iter()
        .map(|(topic_id, (topic_name, tally))| {
            let percent = tally.percent();
            TopicAggregate {
                topic_id,
                topic_name,
                correct: tally.correct,
                total: tally.total,
                percent,
                level: MasteryLevel::from_percent(percent),
            }
        })
        .collect()
}
