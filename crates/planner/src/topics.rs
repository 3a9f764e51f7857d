//! Topic allocation: bias the session toward the learner's weak topics.

use studyplan_core::{TopicId, UserProgress};

/// Share of the topic list reserved for weak topics.
const WEAK_TOPIC_SHARE: f64 = 0.7;

/// Order the assignment's topics for a session.
///
/// Without progress data (or with no weak topics) the list comes back
/// unchanged. Otherwise the first `ceil(0.7 * n)` weak topics lead, and the
/// remaining assignment topics follow in syllabus order until the result is
/// as long as the assignment's list.
pub fn select_topics_for_session(all_topics: &[TopicId], progress: Option<&UserProgress>) -> Vec<TopicId> {
    let Some(progress) = progress.filter(|p| !p.weak_topics.is_empty()) else {
        return all_topics.to_vec();
    };

    let weak_count = (all_topics.len() as f64 * WEAK_TOPIC_SHARE).ceil() as usize;
    let mut topics: Vec<TopicId> = progress.weak_topics.iter().take(weak_count).cloned().collect();

    let remaining = all_topics.len().saturating_sub(topics.len());
    let fill: Vec<TopicId> = all_topics
        .iter()
        .filter(|t| !topics.contains(t))
        .take(remaining)
        .cloned()
        .collect();
    topics.extend(fill);

    if topics.is_empty() {
        all_topics.to_vec()
    } else {
        topics
    }
}
