//! Per-topic solve counts.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::SolveEvent;

/// Bucket for events with no topic, or a blank one.
pub const UNTAGGED_TOPIC: &str = "untagged";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u32,
}

/// Count events per topic, busiest first, ties broken alphabetically.
pub fn topic_breakdown(events: &[SolveEvent]) -> Vec<TopicCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for event in events {
        let topic = event
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTAGGED_TOPIC);
        *counts.entry(topic).or_insert(0) += 1;
    }

    let mut topics: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, count)| TopicCount {
            topic: topic.to_string(),
            count,
        })
        .collect();
    topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    topics
}
