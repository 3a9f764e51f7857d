//! Assignment domain types.
//!
//! An assignment is the assessment record (exam or quiz) owned by the
//! external persistence layer. The planner only ever reads it.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A topic identifier, as listed on the assignment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub String);

impl TopicId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TopicId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of assessment being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Exam,
    Quiz,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exam flavour. Absent or unrecognized subtypes resolve to [`ExamSubtype::Hybrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamSubtype {
    Theoretical,
    Practical,
    #[default]
    Hybrid,
}

impl ExamSubtype {
    pub const ALL: [ExamSubtype; 3] = [Self::Theoretical, Self::Practical, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theoretical => "theoretical",
            Self::Practical => "practical",
            Self::Hybrid => "hybrid",
        }
    }
}

impl FromStr for ExamSubtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "theory" and "practice" are the labels the web client stores.
        match s.trim().to_ascii_lowercase().as_str() {
            "theoretical" | "theory" => Ok(Self::Theoretical),
            "practical" | "practice" => Ok(Self::Practical),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown exam subtype: {other}")),
        }
    }
}

impl std::fmt::Display for ExamSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exam or quiz the learner is preparing for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Identifier assigned by the persistence layer
    #[serde(alias = "_id")]
    pub id: String,

    /// Exam or quiz
    #[serde(rename = "type")]
    pub kind: AssessmentKind,

    /// Exam flavour; ignored for quizzes
    #[serde(
        default,
        alias = "examSubtype",
        deserialize_with = "lenient_subtype",
        skip_serializing_if = "Option::is_none"
    )]
    pub exam_subtype: Option<ExamSubtype>,

    /// Topics covered, in syllabus order
    #[serde(default)]
    pub topics: Vec<TopicId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Assignment {
    /// Create a quiz assignment.
    pub fn quiz(id: impl Into<String>, topics: impl IntoIterator<Item = impl Into<TopicId>>) -> Self {
        Self {
            id: id.into(),
            kind: AssessmentKind::Quiz,
            exam_subtype: None,
            topics: topics.into_iter().map(Into::into).collect(),
            title: None,
        }
    }

    /// Create an exam assignment.
    pub fn exam(
        id: impl Into<String>,
        subtype: Option<ExamSubtype>,
        topics: impl IntoIterator<Item = impl Into<TopicId>>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: AssessmentKind::Exam,
            exam_subtype: subtype,
            topics: topics.into_iter().map(Into::into).collect(),
            title: None,
        }
    }
}

/// Unknown subtype strings become `None` instead of failing the whole record.
fn lenient_subtype<'de, D>(deserializer: D) -> Result<Option<ExamSubtype>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
