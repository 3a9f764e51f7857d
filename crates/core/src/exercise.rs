//! Exercise domain types: what gets generated, what the learner answers,
//! and how that answer was graded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assignment::{AssessmentKind, TopicId};
use crate::tier::{TemplateId, Tier};

/// Exercise difficulty on a 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(5);

    /// Clamp any integer into the 1–5 range.
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(1, 5) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn easier(self) -> Self {
        Self::clamped(i32::from(self.0) - 1)
    }

    pub fn harder(self) -> Self {
        Self::clamped(i32::from(self.0) + 1)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("difficulty must be between 1 and 5, got {value}"))
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The expected answer for locally gradable exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKey {
    /// Index into `ExercisePayload::options`
    Choice { index: usize },
    Boolean { value: bool },
    Text { value: String },
    /// `tolerance` is relative; `None` uses the grader's default
    Numeric {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tolerance: Option<f64>,
    },
    /// Learner grades themselves (flashcards)
    SelfReport,
}

/// Content attached to an exercise by the tier handler / content provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExercisePayload {
    /// Question text shown to the learner
    pub prompt: String,

    /// Answer options (multiple choice)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerKey>,

    /// Grading guidance for open-ended exercises
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,

    /// Provider-specific fields
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExercisePayload {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_answer(mut self, answer: AnswerKey) -> Self {
        self.answer = Some(answer);
        self
    }

    pub fn with_rubric(mut self, rubric: impl Into<String>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }
}

/// An exercise produced by a tier handler, before session annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExercise {
    #[serde(rename = "type")]
    pub template: TemplateId,
    pub tier: Tier,
    pub topic: TopicId,
    pub difficulty: Difficulty,
    pub assessment: AssessmentKind,
    #[serde(flatten)]
    pub payload: ExercisePayload,
}

/// The planner's output unit: a generated exercise tagged with the session it
/// belongs to. Ownership passes to the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub id: Uuid,
    pub assignment_id: String,
    pub session_index: u32,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub exercise: GeneratedExercise,
}

impl ExerciseSpec {
    pub fn new(exercise: GeneratedExercise, assignment_id: impl Into<String>, session_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            assignment_id: assignment_id.into(),
            session_index,
            generated_at: Utc::now(),
            exercise,
        }
    }

    pub fn template(&self) -> &TemplateId {
        &self.exercise.template
    }

    pub fn topic(&self) -> &TopicId {
        &self.exercise.topic
    }

    pub fn difficulty(&self) -> Difficulty {
        self.exercise.difficulty
    }
}

/// A learner's answer to an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserResponse {
    Choice { index: usize },
    Boolean {
        value: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        justification: Option<String>,
    },
    Text { text: String },
    Numeric { value: f64 },
    SelfReport { recalled: bool },
}

impl UserResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Choice { .. } => "choice",
            Self::Boolean { .. } => "boolean",
            Self::Text { .. } => "text",
            Self::Numeric { .. } => "numeric",
            Self::SelfReport { .. } => "self_report",
        }
    }
}

/// Outcome of grading one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub correct: bool,
    /// Score in `[0, 1]`
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    /// "local" or the provider name
    #[serde(default)]
    pub graded_by: String,
}

impl EvaluationResult {
    /// An all-or-nothing local grade.
    pub fn local(correct: bool, feedback: impl Into<String>) -> Self {
        Self {
            correct,
            score: if correct { 1.0 } else { 0.0 },
            feedback: feedback.into(),
            graded_by: "local".into(),
        }
    }

    /// Clamp the score into `[0, 1]`, mapping NaN to zero.
    pub fn normalized(mut self) -> Self {
        self.score = if self.score.is_nan() {
            0.0
        } else {
            self.score.clamp(0.0, 1.0)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_clamps() {
        assert_eq!(Difficulty::clamped(0), Difficulty::MIN);
        assert_eq!(Difficulty::clamped(9), Difficulty::MAX);
        assert_eq!(Difficulty::MIN.easier(), Difficulty::MIN);
        assert_eq!(Difficulty::MAX.harder(), Difficulty::MAX);
        assert_eq!(Difficulty::clamped(3).harder().value(), 4);
    }

    #[test]
    fn difficulty_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<Difficulty>("0").is_err());
        assert!(serde_json::from_str::<Difficulty>("6").is_err());
        assert_eq!(serde_json::from_str::<Difficulty>("2").unwrap().value(), 2);
    }

    #[test]
    fn spec_serializes_flat() {
        let exercise = GeneratedExercise {
            template: TemplateId::from("multiple_choice"),
            tier: Tier::Recall,
            topic: TopicId::from("limits"),
            difficulty: Difficulty::clamped(2),
            assessment: AssessmentKind::Quiz,
            payload: ExercisePayload::new("What is lim x->0 sin(x)/x?")
                .with_options(["0", "1", "infinity"])
                .with_answer(AnswerKey::Choice { index: 1 }),
        };
        let spec = ExerciseSpec::new(exercise, "a1", 0);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "multiple_choice");
        assert_eq!(json["assignment_id"], "a1");
        assert_eq!(json["difficulty"], 2);
        assert_eq!(json["answer"]["kind"], "choice");
        assert_eq!(json["prompt"], "What is lim x->0 sin(x)/x?");
    }

    #[test]
    fn response_tagging() {
        let r: UserResponse =
            serde_json::from_str(r#"{"kind": "boolean", "value": true, "justification": "because"}"#).unwrap();
        assert_eq!(r.kind(), "boolean");
        assert!(matches!(r, UserResponse::Boolean { value: true, justification: Some(ref j) } if j == "because"));
    }

    #[test]
    fn normalized_score() {
        let mut r = EvaluationResult::local(true, "");
        r.score = 1.7;
        assert_eq!(r.normalized().score, 1.0);
    }
}
