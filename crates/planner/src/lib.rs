//! Session planning for studyplan.
//!
//! The selection steps are pure functions over the configuration table and
//! the learner snapshot:
//!
//! - [`selector`]: which exercise templates, drawn by weight without repeats
//! - [`topics`]: which topics, weak areas first
//! - [`difficulty`]: how hard, from session position and topic mastery
//!
//! [`SessionPlanner`] strings them together and drives generation through
//! the tier dispatcher, skipping exercises whose generation fails.

pub mod difficulty;
pub mod selector;
pub mod session;
pub mod topics;

pub use difficulty::calculate_difficulty;
pub use selector::{select_exercise_types, tier_distribution};
pub use session::{PlannedExercise, SessionPlan, SessionPlanner};
pub use topics::select_topics_for_session;
