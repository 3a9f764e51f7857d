//! Session assembly: plan a session, then generate each planned exercise.

use futures::stream::{self, StreamExt};
use rand::Rng;
use serde::Serialize;
use studyplan_config::{AppConfig, ConfigTable, PlannerSettings, TierDistribution};
use studyplan_core::{
    AssessmentKind, Assignment, ContentProvider, Difficulty, Error, ExerciseSpec, Result,
    SessionProgress, TemplateId, TopicId, UserProgress,
};
use studyplan_tiers::generate_exercise;
use tracing::{info, warn};

use crate::difficulty::calculate_difficulty;
use crate::selector::{select_exercise_types, tier_distribution};
use crate::topics::select_topics_for_session;

/// One slot of a session before any content exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedExercise {
    pub template: TemplateId,
    pub topic: TopicId,
    pub difficulty: Difficulty,
}

/// The selection outcome for one session, in round-robin order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPlan {
    pub assignment_id: String,
    pub assessment: AssessmentKind,
    pub session: SessionProgress,
    pub distribution: TierDistribution,
    pub items: Vec<PlannedExercise>,
}

/// Builds study sessions from the configuration table.
///
/// Holds no per-call state; the same planner can serve any number of
/// assignments and learners.
#[derive(Debug, Clone)]
pub struct SessionPlanner {
    table: ConfigTable,
    settings: PlannerSettings,
}

impl SessionPlanner {
    pub fn new(table: ConfigTable, settings: PlannerSettings) -> Self {
        Self { table, settings }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.assessments.clone(), config.planner.clone())
    }

    /// Choose templates, topics and difficulties for one session.
    ///
    /// Topics are assigned round-robin over the allocator's order, so with
    /// fewer topics than exercises every topic is reused evenly.
    pub fn plan_session<R: Rng + ?Sized>(
        &self,
        assignment: &Assignment,
        session_index: u32,
        progress: Option<&UserProgress>,
        rng: &mut R,
    ) -> Result<SessionPlan> {
        if assignment.topics.is_empty() {
            return Err(Error::EmptyAssignment(assignment.id.clone()));
        }

        let config = self.table.resolve(assignment);
        let session = SessionProgress::new(session_index, config.sessions_recommended)?;
        let templates =
            select_exercise_types(config, session, self.settings.tier_shift_selection, rng)?;
        let topics = select_topics_for_session(&assignment.topics, progress);

        let items = templates
            .into_iter()
            .enumerate()
            .map(|(i, template)| {
                let topic = topics[i % topics.len()].clone();
                let difficulty = calculate_difficulty(progress, &topic, session);
                PlannedExercise {
                    template,
                    topic,
                    difficulty,
                }
            })
            .collect();

        Ok(SessionPlan {
            assignment_id: assignment.id.clone(),
            assessment: assignment.kind,
            session,
            distribution: tier_distribution(config, session),
            items,
        })
    }

    /// Plan a session and generate its exercises through `provider`.
    ///
    /// Only whole-request problems (no topics, session index outside the
    /// configured plan, a malformed table entry) are errors. An exercise
    /// that fails to generate is logged and left out, so the result may be
    /// shorter than the plan, or empty.
    pub async fn generate_study_session<R: Rng + ?Sized>(
        &self,
        assignment: &Assignment,
        session_index: u32,
        progress: Option<&UserProgress>,
        provider: &dyn ContentProvider,
        rng: &mut R,
    ) -> Result<Vec<ExerciseSpec>> {
        let plan = self.plan_session(assignment, session_index, progress, rng)?;
        Ok(self.generate_plan(&plan, provider).await)
    }

    /// Generate every item of an existing plan, preserving plan order.
    pub async fn generate_plan(
        &self,
        plan: &SessionPlan,
        provider: &dyn ContentProvider,
    ) -> Vec<ExerciseSpec> {
        let concurrency = self.settings.generation_concurrency.max(1);

        let outcomes: Vec<_> = stream::iter(plan.items.iter())
            .map(|item| async move {
                let outcome = generate_exercise(
                    &item.template,
                    &item.topic,
                    item.difficulty,
                    plan.assessment,
                    provider,
                )
                .await;
                (item, outcome)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut specs = Vec::with_capacity(outcomes.len());
        for (item, outcome) in outcomes {
            match outcome {
                Ok(exercise) => {
                    specs.push(ExerciseSpec::new(exercise, &plan.assignment_id, plan.session.index))
                }
                Err(e) => warn!(
                    template = %item.template,
                    topic = %item.topic,
                    session_index = plan.session.index,
                    provider = provider.name(),
                    provider_failure = e.is_provider_failure(),
                    error = %e,
                    "Skipping exercise that failed to generate"
                ),
            }
        }

        info!(
            assignment_id = %plan.assignment_id,
            session_index = plan.session.index,
            total_sessions = plan.session.total,
            planned = plan.items.len(),
            generated = specs.len(),
            "Study session generated"
        );

        specs
    }
}
