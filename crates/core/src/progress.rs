//! Learner progress snapshot and session position.
//!
//! Both are read-only inputs: the planner never writes mastery back, recording
//! outcomes after evaluation is the caller's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::assignment::TopicId;
use crate::error::{Error, Result};

/// Historical correct/total tally for one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicMastery {
    pub correct: u32,
    pub total: u32,
}

impl TopicMastery {
    pub fn new(correct: u32, total: u32) -> Self {
        Self { correct, total }
    }

    /// Fraction answered correctly. `None` when nothing has been recorded yet.
    pub fn correct_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(f64::from(self.correct) / f64::from(self.total))
    }
}

/// Per-learner mastery history supplied by the progress tracker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProgress {
    /// Weak topics, ranked worst-first
    #[serde(default, alias = "weakTopics")]
    pub weak_topics: Vec<TopicId>,

    #[serde(default, alias = "topicMastery")]
    pub topic_mastery: HashMap<TopicId, TopicMastery>,
}

impl UserProgress {
    /// Mastery for a topic, if any answers have been recorded for it.
    pub fn mastery(&self, topic: &TopicId) -> Option<&TopicMastery> {
        self.topic_mastery.get(topic).filter(|m| m.total > 0)
    }

    pub fn with_weak_topics(mut self, topics: impl IntoIterator<Item = impl Into<TopicId>>) -> Self {
        self.weak_topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mastery(mut self, topic: impl Into<TopicId>, correct: u32, total: u32) -> Self {
        self.topic_mastery
            .insert(topic.into(), TopicMastery::new(correct, total));
        self
    }
}

/// Zero-based position of a session within a multi-session plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub index: u32,
    pub total: u32,
}

impl SessionProgress {
    /// Requires `total >= 1` and `index < total`.
    pub fn new(index: u32, total: u32) -> Result<Self> {
        if total == 0 || index >= total {
            return Err(Error::InvalidSession { index, total });
        }
        Ok(Self { index, total })
    }

    /// `index / total`, always in `[0, 1)`.
    pub fn fraction(&self) -> f64 {
        f64::from(self.index) / f64::from(self.total)
    }
}
