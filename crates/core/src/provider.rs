//! ContentProvider trait: the abstraction over exercise content backends.
//!
//! A provider knows how to write the content for a requested exercise and
//! how to grade an open-ended answer. The planner only ever borrows one; the
//! concrete transport (a language-model HTTP call, a local scaffold
//! generator) is invisible to the core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assignment::{AssessmentKind, TopicId};
use crate::error::ProviderError;
use crate::exercise::{Difficulty, EvaluationResult, ExercisePayload, GeneratedExercise, UserResponse};
use crate::tier::{TemplateId, Tier};

/// What the planner wants generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub template: TemplateId,
    pub tier: Tier,
    pub topic: TopicId,
    pub difficulty: Difficulty,
    pub assessment: AssessmentKind,
}

/// A learner answer to be graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub exercise: GeneratedExercise,
    pub response: UserResponse,
}

/// The core ContentProvider trait.
///
/// Timeouts and retries belong to implementations; the planner treats every
/// error returned here as an opaque per-item failure.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "local", "openai").
    fn name(&self) -> &str;

    /// Produce the content for one exercise.
    async fn generate(&self, request: GenerationRequest) -> std::result::Result<ExercisePayload, ProviderError>;

    /// Grade a learner response.
    ///
    /// Default implementation reports grading as unsupported.
    async fn evaluate(
        &self,
        _request: EvaluationRequest,
    ) -> std::result::Result<EvaluationResult, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            operation: "evaluate".into(),
        })
    }

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
