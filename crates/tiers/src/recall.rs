//! Tier 1: basic recall.
//!
//! Content comes from the provider, but every payload must carry an answer
//! key the local grader understands, so evaluation never leaves the process.

use async_trait::async_trait;
use studyplan_core::{
    AnswerKey, ContentProvider, Error, EvaluationResult, ExercisePayload, GeneratedExercise,
    GenerationRequest, ProviderError, Result, Tier, UserResponse,
};
use tracing::debug;

use crate::TierHandler;

/// Relative tolerance for numerical answers when the key does not set one.
pub const DEFAULT_NUMERIC_TOLERANCE: f64 = 0.01;

pub struct RecallTier;

#[async_trait]
impl TierHandler for RecallTier {
    fn tier(&self) -> Tier {
        Tier::Recall
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        provider: &dyn ContentProvider,
    ) -> Result<ExercisePayload> {
        let payload = provider.generate(request.clone()).await?;
        Ok(check_answer_key(request.template.as_str(), payload)?)
    }

    async fn evaluate(
        &self,
        exercise: &GeneratedExercise,
        response: &UserResponse,
        _provider: Option<&dyn ContentProvider>,
    ) -> Result<EvaluationResult> {
        let result = grade(exercise, response)?;
        debug!(
            template = %exercise.template,
            correct = result.correct,
            "Graded recall exercise locally"
        );
        Ok(result)
    }
}

/// Make sure the payload can be graded locally for this template.
fn check_answer_key(
    template: &str,
    mut payload: ExercisePayload,
) -> std::result::Result<ExercisePayload, ProviderError> {
    let invalid = |reason: &str| ProviderError::InvalidPayload(format!("{template}: {reason}"));

    if payload.prompt.trim().is_empty() {
        return Err(invalid("empty prompt"));
    }

    if template == "flashcard" && payload.answer.is_none() {
        payload.answer = Some(AnswerKey::SelfReport);
    }

    match (template, &payload.answer) {
        ("multiple_choice", Some(AnswerKey::Choice { index })) => {
            if payload.options.len() < 2 {
                return Err(invalid("needs at least two options"));
            }
            if *index >= payload.options.len() {
                return Err(invalid("answer index out of range"));
            }
        }
        ("true_false_justify", Some(AnswerKey::Boolean { .. })) => {}
        ("fill_in_blank", Some(AnswerKey::Text { value })) if !value.trim().is_empty() => {}
        ("numerical_problem", Some(AnswerKey::Numeric { value, .. })) if value.is_finite() => {}
        ("flashcard", Some(AnswerKey::SelfReport | AnswerKey::Text { .. })) => {}
        (_, None) => return Err(invalid("missing answer key")),
        (_, Some(_)) => return Err(invalid("answer key does not match template")),
    }

    Ok(payload)
}

/// Grade a recall response against the exercise's answer key.
pub fn grade(exercise: &GeneratedExercise, response: &UserResponse) -> Result<EvaluationResult> {
    let mismatch = |reason: String| Error::InvalidResponse {
        template: exercise.template.clone(),
        reason,
    };

    let Some(key) = &exercise.payload.answer else {
        return Err(mismatch("exercise has no answer key".into()));
    };

    let result = match (key, response) {
        (AnswerKey::Choice { index: expected }, UserResponse::Choice { index }) => {
            let correct = index == expected;
            let answer = exercise
                .payload
                .options
                .get(*expected)
                .map(String::as_str)
                .unwrap_or("?");
            EvaluationResult::local(correct, feedback(correct, answer))
        }
        (AnswerKey::Boolean { value: expected }, UserResponse::Boolean { value, .. }) => {
            let correct = value == expected;
            EvaluationResult::local(correct, feedback(correct, &expected.to_string()))
        }
        (AnswerKey::Text { value: expected }, UserResponse::Text { text }) => {
            let correct = normalize(text) == normalize(expected);
            EvaluationResult::local(correct, feedback(correct, expected))
        }
        (AnswerKey::Numeric { value: expected, tolerance }, UserResponse::Numeric { value }) => {
            let correct = within_tolerance(*value, *expected, tolerance.unwrap_or(DEFAULT_NUMERIC_TOLERANCE));
            EvaluationResult::local(correct, feedback(correct, &expected.to_string()))
        }
        (AnswerKey::SelfReport | AnswerKey::Text { .. }, UserResponse::SelfReport { recalled }) => {
            let back = match key {
                AnswerKey::Text { value } => value.as_str(),
                _ => "",
            };
            let message = if *recalled {
                "Marked as recalled".to_string()
            } else if back.is_empty() {
                "Marked for another pass".to_string()
            } else {
                format!("Marked for another pass. Card answer: {back}")
            };
            EvaluationResult::local(*recalled, message)
        }
        (_, other) => {
            return Err(mismatch(format!(
                "a {} response does not fit this answer key",
                other.kind()
            )));
        }
    };

    Ok(result)
}

fn feedback(correct: bool, answer: &str) -> String {
    if correct {
        "Correct".into()
    } else {
        format!("Incorrect. Expected: {answer}")
    }
}

/// Lowercase and collapse whitespace.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn within_tolerance(actual: f64, expected: f64, relative: f64) -> bool {
    if !actual.is_finite() {
        return false;
    }
    if expected == 0.0 {
        return actual.abs() <= relative;
    }
    ((actual - expected) / expected).abs() <= relative
}
