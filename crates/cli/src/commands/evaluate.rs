//! `studyplan evaluate`: grade a learner response.

use std::path::Path;
use studyplan_core::{Error, GeneratedExercise, ProviderError, UserResponse};
use studyplan_providers::build_from_config;
use studyplan_tiers::evaluate_exercise;

use super::input::{load_config, read_json};

pub async fn run(
    config_path: Option<&Path>,
    exercise_path: &Path,
    response_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    // Accepts a full session spec too; the session fields are ignored.
    let exercise: GeneratedExercise = read_json(exercise_path, "exercise")?;
    let response: UserResponse = read_json(response_path, "response")?;
    let provider = build_from_config(&config)?;

    match evaluate_exercise(&exercise, &response, Some(provider.as_ref())).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(Error::Provider(ProviderError::Unsupported { provider, .. })) => Err(format!(
            "The {provider} provider cannot grade {} exercises. Set provider.kind = \"openai\" and an API key to grade open-ended answers.",
            exercise.template
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}
