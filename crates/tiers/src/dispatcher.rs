//! Template dispatcher: route generation and evaluation to the tier that
//! registers the template id.

use studyplan_core::{
    AssessmentKind, ContentProvider, Difficulty, Error, EvaluationResult, GeneratedExercise,
    GenerationRequest, Result, TemplateId, Tier, TopicId, UserResponse,
};
use tracing::debug;

use crate::TierHandler;
use crate::open_ended::{ApplicationTier, UnderstandingTier};
use crate::recall::RecallTier;

/// The handler owning a tier.
pub fn handler_for(tier: Tier) -> &'static dyn TierHandler {
    match tier {
        Tier::Recall => &RecallTier,
        Tier::Understanding => &UnderstandingTier,
        Tier::Application => &ApplicationTier,
    }
}

fn classify(template: &TemplateId) -> Result<Tier> {
    template
        .tier()
        .ok_or_else(|| Error::UnknownTemplate(template.clone()))
}

/// Generate one exercise of any tier.
pub async fn generate_exercise(
    template: &TemplateId,
    topic: &TopicId,
    difficulty: Difficulty,
    assessment: AssessmentKind,
    provider: &dyn ContentProvider,
) -> Result<GeneratedExercise> {
    let tier = classify(template)?;
    let request = GenerationRequest {
        template: template.clone(),
        tier,
        topic: topic.clone(),
        difficulty,
        assessment,
    };

    debug!(
        template = %template,
        tier = %tier,
        topic = %topic,
        difficulty = difficulty.value(),
        provider = provider.name(),
        "Dispatching exercise generation"
    );

    let payload = handler_for(tier).generate(&request, provider).await?;

    Ok(GeneratedExercise {
        template: request.template,
        tier,
        topic: request.topic,
        difficulty,
        assessment,
        payload,
    })
}

/// Evaluate a response to an exercise of any tier.
///
/// The owning tier is looked up from the template id, not from the
/// exercise's `tier` field, so a stale record cannot misroute grading.
pub async fn evaluate_exercise(
    exercise: &GeneratedExercise,
    response: &UserResponse,
    provider: Option<&dyn ContentProvider>,
) -> Result<EvaluationResult> {
    let tier = classify(&exercise.template)?;
    handler_for(tier).evaluate(exercise, response, provider).await
}
