//! Local content provider: deterministic, offline exercise scaffolds.
//!
//! Produces a prompt (and, for recall templates, an answer key) from the
//! template, topic, and difficulty alone. Useful for previews, tests, and as
//! the last link of a fallback chain. Numerical problems are simple rate
//! calculations whose numbers are derived from the topic and difficulty. It
//! cannot grade open-ended answers.

use async_trait::async_trait;
use studyplan_core::{
    AnswerKey, ContentProvider, Difficulty, ExercisePayload, GenerationRequest, ProviderError,
};
use tracing::trace;

#[derive(Debug, Default)]
pub struct LocalContentProvider;

impl LocalContentProvider {
    pub fn new() -> Self {
        Self
    }
}

/// How demanding the wording is at each difficulty level.
fn depth(difficulty: Difficulty) -> &'static str {
    match difficulty.value() {
        1 => "the basic idea of",
        2 => "the main points of",
        3 => "how the parts of",
        4 => "the subtleties of",
        _ => "the edge cases of",
    }
}

/// Start value, rate and step count for a numerical problem. Larger numbers
/// and more steps at higher difficulty.
fn quantities(topic: &str, difficulty: Difficulty) -> (i32, i32, i32) {
    let level = i32::from(difficulty.value());
    let seed = topic.bytes().fold(0i32, |acc, b| (acc * 31 + i32::from(b)) % 97);
    let start = 2 + seed % 10 * level;
    let rate = 1 + (seed / 10) % 5 + level;
    let steps = 2 + level;
    (start, rate, steps)
}

fn scaffold(request: &GenerationRequest) -> Option<ExercisePayload> {
    let topic = request.topic.as_str();
    let depth = depth(request.difficulty);

    let payload = match request.template.as_str() {
        "multiple_choice" => ExercisePayload::new(format!(
            "Which of the following best describes {depth} {topic}?"
        ))
        .with_options([
            format!("A correct statement about {topic}"),
            format!("A common misconception about {topic}"),
            format!("A statement about a related but different topic than {topic}"),
            "None of the above".to_string(),
        ])
        .with_answer(AnswerKey::Choice { index: 0 }),
        "true_false_justify" => ExercisePayload::new(format!(
            "True or false: {topic} can be explained without reference to its definition. Justify your answer."
        ))
        .with_answer(AnswerKey::Boolean { value: false }),
        "flashcard" => ExercisePayload::new(format!("Recall {depth} {topic}."))
            .with_answer(AnswerKey::SelfReport),
        "fill_in_blank" => ExercisePayload::new(format!(
            "Fill in the blank: before working with {depth} {topic}, state its precise ___."
        ))
        .with_answer(AnswerKey::Text {
            value: "definition".to_string(),
        }),
        "numerical_problem" => {
            let (start, rate, steps) = quantities(topic, request.difficulty);
            ExercisePayload::new(format!(
                "In a problem on {topic}, a quantity starts at {start} and increases by {rate} per step. \
                 What is its value after {steps} steps?"
            ))
            .with_answer(AnswerKey::Numeric {
                value: f64::from(start + rate * steps),
                tolerance: None,
            })
        }
        "short_answer_define" => ExercisePayload::new(format!("Define {topic} in your own words.")),
        "short_answer_explain" => ExercisePayload::new(format!("Explain {depth} {topic}.")),
        "short_answer_compare" => ExercisePayload::new(format!(
            "Compare {topic} with a closely related concept. Name one similarity and one difference."
        )),
        "one_sentence_definition" => {
            ExercisePayload::new(format!("Define {topic} in exactly one sentence."))
        }
        "problem_type_recognition" => ExercisePayload::new(format!(
            "Describe a problem that is solved using {topic}, and say how you recognize it."
        )),
        "concept_comparison" => ExercisePayload::new(format!(
            "Which concept is most often confused with {topic}? Explain how to tell them apart."
        )),
        "scenario_application" => ExercisePayload::new(format!(
            "Describe a realistic situation where {topic} applies, then apply it step by step."
        )),
        "scenario_prediction" => ExercisePayload::new(format!(
            "Given a situation governed by {topic}, predict what happens when one key quantity doubles. Justify."
        )),
        "error_identification" => ExercisePayload::new(format!(
            "A student's worked solution about {topic} contains a typical mistake. Write down the mistake you would look for first and how to fix it."
        )),
        "mini_problem_set" => ExercisePayload::new(format!(
            "Write and solve three short problems on {topic}, increasing in difficulty."
        )),
        _ => return None,
    };

    Some(payload)
}

#[async_trait]
impl ContentProvider for LocalContentProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<ExercisePayload, ProviderError> {
        trace!(template = %request.template, topic = %request.topic, "Building local scaffold");
        scaffold(&request).ok_or_else(|| ProviderError::Unsupported {
            provider: self.name().to_string(),
            operation: format!("generate {}", request.template),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan_core::{AssessmentKind, TemplateId, Tier, TopicId};

    fn request(template: &str, difficulty: i32) -> GenerationRequest {
        let template = TemplateId::from(template);
        GenerationRequest {
            tier: template.tier().unwrap_or(Tier::Recall),
            template,
            topic: TopicId::from("derivatives"),
            difficulty: Difficulty::clamped(difficulty),
            assessment: AssessmentKind::Quiz,
        }
    }

    #[tokio::test]
    async fn covers_every_template() {
        let provider = LocalContentProvider::new();
        for tier in Tier::ALL {
            for template in tier.templates() {
                let payload = provider.generate(request(template, 3)).await.unwrap();
                assert!(payload.prompt.contains("derivatives"), "{template}: {}", payload.prompt);
            }
        }
    }

    #[tokio::test]
    async fn numerical_problem_carries_its_answer() {
        let provider = LocalContentProvider::new();
        let easy = provider.generate(request("numerical_problem", 1)).await.unwrap();
        let hard = provider.generate(request("numerical_problem", 5)).await.unwrap();

        let (start, rate, steps) = quantities("derivatives", Difficulty::clamped(5));
        assert!(hard.prompt.contains(&format!("starts at {start}")));
        assert!(hard.prompt.contains(&format!("after {steps} steps")));
        assert_eq!(
            hard.answer,
            Some(AnswerKey::Numeric {
                value: f64::from(start + rate * steps),
                tolerance: None,
            })
        );
        assert_ne!(easy.prompt, hard.prompt);
        assert_eq!(provider.generate(request("numerical_problem", 5)).await.unwrap(), hard);
    }

    #[tokio::test]
    async fn fill_in_blank_names_the_topic_but_not_the_answer() {
        let provider = LocalContentProvider::new();
        let payload = provider.generate(request("fill_in_blank", 2)).await.unwrap();
        assert!(payload.prompt.contains("derivatives"));
        assert!(payload.prompt.contains("___"));
        let Some(AnswerKey::Text { value }) = payload.answer else {
            panic!("fill in the blank without a text key");
        };
        assert_eq!(value, "definition");
        assert!(!payload.prompt.contains(&value));
    }

    #[tokio::test]
    async fn unknown_template_is_unsupported() {
        let provider = LocalContentProvider::new();
        let err = provider.generate(request("essay", 3)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn deterministic_output() {
        let provider = LocalContentProvider::new();
        let a = provider.generate(request("multiple_choice", 2)).await.unwrap();
        let b = provider.generate(request("multiple_choice", 2)).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.answer, Some(AnswerKey::Choice { index: 0 }));
    }

    #[tokio::test]
    async fn difficulty_changes_wording() {
        let provider = LocalContentProvider::new();
        let easy = provider.generate(request("short_answer_explain", 1)).await.unwrap();
        let hard = provider.generate(request("short_answer_explain", 5)).await.unwrap();
        assert_ne!(easy.prompt, hard.prompt);
    }

    #[tokio::test]
    async fn cannot_grade() {
        let provider = LocalContentProvider::new();
        let payload = provider.generate(request("short_answer_define", 2)).await.unwrap();
        let exercise = studyplan_core::GeneratedExercise {
            template: TemplateId::from("short_answer_define"),
            tier: Tier::Understanding,
            topic: TopicId::from("derivatives"),
            difficulty: Difficulty::clamped(2),
            assessment: AssessmentKind::Quiz,
            payload,
        };
        let err = provider
            .evaluate(studyplan_core::EvaluationRequest {
                exercise,
                response: studyplan_core::UserResponse::Text { text: "rate of change".into() },
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported { .. }));
    }
}
