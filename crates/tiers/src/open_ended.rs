//! Tiers 2 and 3: open-ended understanding and application exercises.
//!
//! Both delegate content and grading to the provider; they differ in the
//! default rubric attached when the provider does not supply one.

use async_trait::async_trait;
use studyplan_core::{
    ContentProvider, Error, EvaluationRequest, EvaluationResult, ExercisePayload,
    GeneratedExercise, GenerationRequest, ProviderError, Result, Tier, UserResponse,
};
use tracing::debug;

use crate::TierHandler;

pub struct UnderstandingTier;

pub struct ApplicationTier;

#[async_trait]
impl TierHandler for UnderstandingTier {
    fn tier(&self) -> Tier {
        Tier::Understanding
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        provider: &dyn ContentProvider,
    ) -> Result<ExercisePayload> {
        let rubric = format!(
            "Accurate and complete in the learner's own words; uses the key terms of {} correctly.",
            request.topic
        );
        generate_open_ended(request, provider, rubric).await
    }

    async fn evaluate(
        &self,
        exercise: &GeneratedExercise,
        response: &UserResponse,
        provider: Option<&dyn ContentProvider>,
    ) -> Result<EvaluationResult> {
        evaluate_open_ended(exercise, response, provider).await
    }
}

#[async_trait]
impl TierHandler for ApplicationTier {
    fn tier(&self) -> Tier {
        Tier::Application
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        provider: &dyn ContentProvider,
    ) -> Result<ExercisePayload> {
        let rubric = format!(
            "Identifies which ideas from {} apply, applies them step by step, and reaches a justified conclusion.",
            request.topic
        );
        generate_open_ended(request, provider, rubric).await
    }

    async fn evaluate(
        &self,
        exercise: &GeneratedExercise,
        response: &UserResponse,
        provider: Option<&dyn ContentProvider>,
    ) -> Result<EvaluationResult> {
        evaluate_open_ended(exercise, response, provider).await
    }
}

async fn generate_open_ended(
    request: &GenerationRequest,
    provider: &dyn ContentProvider,
    default_rubric: String,
) -> Result<ExercisePayload> {
    let mut payload = provider.generate(request.clone()).await?;

    if payload.prompt.trim().is_empty() {
        return Err(ProviderError::InvalidPayload(format!("{}: empty prompt", request.template)).into());
    }
    if payload.rubric.is_none() {
        payload.rubric = Some(default_rubric);
    }

    Ok(payload)
}

async fn evaluate_open_ended(
    exercise: &GeneratedExercise,
    response: &UserResponse,
    provider: Option<&dyn ContentProvider>,
) -> Result<EvaluationResult> {
    let blank = match response {
        UserResponse::Text { text } => text.trim().is_empty(),
        UserResponse::Numeric { value } => !value.is_finite(),
        other => {
            return Err(Error::InvalidResponse {
                template: exercise.template.clone(),
                reason: format!("open-ended exercises take text or numeric answers, got {}", other.kind()),
            });
        }
    };

    // Nothing to send to a grader.
    if blank {
        return Ok(EvaluationResult::local(false, "No answer given"));
    }

    let provider = provider.ok_or_else(|| {
        ProviderError::NotConfigured(format!(
            "grading {} requires a content provider",
            exercise.template
        ))
    })?;

    let result = provider
        .evaluate(EvaluationRequest {
            exercise: exercise.clone(),
            response: response.clone(),
        })
        .await?
        .normalized();

    debug!(
        template = %exercise.template,
        provider = provider.name(),
        score = result.score,
        "Graded open-ended exercise"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use studyplan_core::{AssessmentKind, Difficulty, TemplateId, TopicId};

    fn request(template: &str, tier: Tier) -> GenerationRequest {
        GenerationRequest {
            template: TemplateId::from(template),
            tier,
            topic: TopicId::from("entropy"),
            difficulty: Difficulty::clamped(3),
            assessment: AssessmentKind::Exam,
        }
    }

    fn exercise(template: &str, tier: Tier) -> GeneratedExercise {
        GeneratedExercise {
            template: TemplateId::from(template),
            tier,
            topic: TopicId::from("entropy"),
            difficulty: Difficulty::clamped(3),
            assessment: AssessmentKind::Exam,
            payload: ExercisePayload::new("Explain entropy"),
        }
    }

    #[tokio::test]
    async fn default_rubric_is_attached() {
        let provider = ScriptedProvider::new(ExercisePayload::new("Explain entropy"));
        let payload = UnderstandingTier
            .generate(&request("short_answer_explain", Tier::Understanding), &provider)
            .await
            .unwrap();
        assert!(payload.rubric.unwrap().contains("entropy"));

        let payload = ApplicationTier
            .generate(&request("scenario_application", Tier::Application), &provider)
            .await
            .unwrap();
        assert!(payload.rubric.unwrap().contains("step by step"));
    }

    #[tokio::test]
    async fn provider_rubric_is_kept() {
        let provider = ScriptedProvider::new(ExercisePayload::new("Compare").with_rubric("custom"));
        let payload = UnderstandingTier
            .generate(&request("concept_comparison", Tier::Understanding), &provider)
            .await
            .unwrap();
        assert_eq!(payload.rubric.as_deref(), Some("custom"));
    }

    #[tokio::test]
    async fn empty_prompt_is_a_provider_failure() {
        let provider = ScriptedProvider::new(ExercisePayload::new("   "));
        let err = ApplicationTier
            .generate(&request("mini_problem_set", Tier::Application), &provider)
            .await
            .unwrap_err();
        assert!(err.is_provider_failure());
    }

    #[tokio::test]
    async fn evaluation_without_provider_fails() {
        let ex = exercise("short_answer_define", Tier::Understanding);
        let err = UnderstandingTier
            .evaluate(&ex, &UserResponse::Text { text: "disorder".into() }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn evaluation_normalizes_provider_score() {
        let provider = ScriptedProvider::new(ExercisePayload::new("x"));
        let ex = exercise("scenario_prediction", Tier::Application);
        let r = ApplicationTier
            .evaluate(&ex, &UserResponse::Text { text: "it heats up".into() }, Some(&provider))
            .await
            .unwrap();
        assert_eq!(r.score, 1.0);
        assert_eq!(provider.evaluate_calls(), 1);
    }

    #[tokio::test]
    async fn blank_answer_is_graded_locally() {
        let provider = ScriptedProvider::new(ExercisePayload::new("x"));
        let ex = exercise("short_answer_explain", Tier::Understanding);
        let r = UnderstandingTier
            .evaluate(&ex, &UserResponse::Text { text: "  ".into() }, Some(&provider))
            .await
            .unwrap();
        assert!(!r.correct);
        assert_eq!(provider.evaluate_calls(), 0);
    }

    #[tokio::test]
    async fn choice_response_is_rejected() {
        let ex = exercise("short_answer_explain", Tier::Understanding);
        let err = UnderstandingTier
            .evaluate(&ex, &UserResponse::Choice { index: 0 }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }
}
