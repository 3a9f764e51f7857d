//! # studyplan Core
//!
//! Domain types, traits, and error definitions for the study-session planner.
//! This crate has **no framework dependencies**: it defines the domain model
//! (assignments, learner progress, tiers, exercises) and the content provider
//! seam that every other crate implements against.
//!
//! ## Layout
//!
//! - [`assignment`]: the read-only assessment record handed in by the caller
//! - [`progress`]: learner mastery snapshot and session position
//! - [`tier`]: the three exercise tiers and the template ids each one owns
//! - [`exercise`]: generated exercise specs, learner responses, grading results
//! - [`provider`]: the `ContentProvider` trait

pub mod assignment;
pub mod error;
pub mod exercise;
pub mod progress;
pub mod provider;
pub mod tier;

// Re-export key types at crate root for ergonomics
pub use assignment::{AssessmentKind, Assignment, ExamSubtype, TopicId};
pub use error::{Error, ProviderError, Result};
pub use exercise::{
    AnswerKey, Difficulty, EvaluationResult, ExercisePayload, ExerciseSpec, GeneratedExercise,
    UserResponse,
};
pub use progress::{SessionProgress, TopicMastery, UserProgress};
pub use provider::{ContentProvider, EvaluationRequest, GenerationRequest};
pub use tier::{TemplateId, Tier};
