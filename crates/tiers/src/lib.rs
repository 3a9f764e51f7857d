//! Tier handlers and the dispatcher that routes to them.
//!
//! Each [`Tier`] owns one handler implementing [`TierHandler`]. The
//! dispatcher looks up which tier registers a template id and forwards the
//! call; ids no tier claims fail with `Error::UnknownTemplate`.
//!
//! | Tier | Generation | Evaluation |
//! |------|------------|------------|
//! | Recall | provider, answer key checked locally | local, deterministic |
//! | Understanding | provider | provider required |
//! | Application | provider | provider required |

mod dispatcher;
mod open_ended;
pub mod recall;

pub use dispatcher::{evaluate_exercise, generate_exercise, handler_for};
pub use open_ended::{ApplicationTier, UnderstandingTier};
pub use recall::RecallTier;

use async_trait::async_trait;
use studyplan_core::{
    ContentProvider, EvaluationResult, ExercisePayload, GeneratedExercise, GenerationRequest,
    Result, Tier, UserResponse,
};

/// Generation and evaluation for one tier of templates.
#[async_trait]
pub trait TierHandler: Send + Sync {
    fn tier(&self) -> Tier;

    /// Produce the payload for a template this tier owns.
    async fn generate(
        &self,
        request: &GenerationRequest,
        provider: &dyn ContentProvider,
    ) -> Result<ExercisePayload>;

    /// Grade a response. Tiers that grade locally ignore `provider`.
    async fn evaluate(
        &self,
        exercise: &GeneratedExercise,
        response: &UserResponse,
        provider: Option<&dyn ContentProvider>,
    ) -> Result<EvaluationResult>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::Mutex;
    use studyplan_core::{
        AnswerKey, ContentProvider, EvaluationRequest, EvaluationResult, ExercisePayload,
        GenerationRequest, ProviderError,
    };

    /// Returns a fixed payload and grade, counting calls.
    pub struct ScriptedProvider {
        pub payload: ExercisePayload,
        pub generate_calls: Mutex<usize>,
        pub evaluate_calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        pub fn new(payload: ExercisePayload) -> Self {
            Self {
                payload,
                generate_calls: Mutex::new(0),
                evaluate_calls: Mutex::new(0),
            }
        }

        pub fn multiple_choice() -> Self {
            Self::new(
                ExercisePayload::new("Pick one")
                    .with_options(["a", "b", "c"])
                    .with_answer(AnswerKey::Choice { index: 2 }),
            )
        }

        pub fn generate_calls(&self) -> usize {
            *self.generate_calls.lock().unwrap()
        }

        pub fn evaluate_calls(&self) -> usize {
            *self.evaluate_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ContentProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _request: GenerationRequest) -> Result<ExercisePayload, ProviderError> {
            *self.generate_calls.lock().unwrap() += 1;
            Ok(self.payload.clone())
        }

        async fn evaluate(&self, _request: EvaluationRequest) -> Result<EvaluationResult, ProviderError> {
            *self.evaluate_calls.lock().unwrap() += 1;
            Ok(EvaluationResult {
                correct: true,
                score: 1.4,
                feedback: "Well argued".into(),
                graded_by: "scripted".into(),
            })
        }
    }
}
