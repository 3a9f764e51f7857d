//! `studyplan plan` and `studyplan preview`: build one study session.

use clap::Args;
use std::path::{Path, PathBuf};
use studyplan_core::{Assignment, UserProgress};
use studyplan_planner::{SessionPlan, SessionPlanner};
use studyplan_providers::build_from_config;
use tracing::info;

use super::input::{load_config, read_json, session_rng};

/// Inputs shared by `plan` and `preview`.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Assignment JSON ("-" for stdin)
    #[arg(short, long)]
    pub assignment: PathBuf,

    /// Learner progress JSON (weakTopics, topicMastery)
    #[arg(short, long)]
    pub progress: Option<PathBuf>,

    /// Zero-based session index
    #[arg(short, long, default_value_t = 0)]
    pub session: u32,

    /// Seed for reproducible template draws
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SessionArgs {
    fn load(&self) -> Result<(Assignment, Option<UserProgress>), String> {
        let assignment = read_json(&self.assignment, "assignment")?;
        let progress = self
            .progress
            .as_deref()
            .map(|path| read_json(path, "progress"))
            .transpose()?;
        Ok((assignment, progress))
    }
}

pub async fn run(config_path: Option<&Path>, args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let (assignment, progress) = args.load()?;
    let provider = build_from_config(&config)?;
    let planner = SessionPlanner::from_config(&config);

    info!(
        assignment_id = %assignment.id,
        session_index = args.session,
        provider = provider.name(),
        "Planning study session"
    );

    let specs = planner
        .generate_study_session(
            &assignment,
            args.session,
            progress.as_ref(),
            provider.as_ref(),
            &mut session_rng(args.seed),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&specs)?);
    Ok(())
}

pub fn preview(config_path: Option<&Path>, args: &SessionArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let (assignment, progress) = args.load()?;
    let planner = SessionPlanner::from_config(&config);

    let plan = planner.plan_session(
        &assignment,
        args.session,
        progress.as_ref(),
        &mut session_rng(args.seed),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}

fn render_plan(plan: &SessionPlan) -> String {
    let mut out = format!(
        "📚 Session {}/{} for {} ({})\n",
        plan.session.index + 1,
        plan.session.total,
        plan.assignment_id,
        plan.assessment
    );
    out.push_str(&format!(
        "   Tier mix: recall {:.2}, understanding {:.2}, application {:.2}\n\n",
        plan.distribution.tier1, plan.distribution.tier2, plan.distribution.tier3
    ));
    out.push_str(&format!(
        "   {:>2}  {:<26} {:<14} {:<24} {}\n",
        "#", "template", "tier", "topic", "difficulty"
    ));
    for (i, item) in plan.items.iter().enumerate() {
        let tier = item
            .template
            .tier()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".into());
        out.push_str(&format!(
            "   {:>2}  {:<26} {:<14} {:<24} {}\n",
            i + 1,
            item.template.as_str(),
            tier,
            item.topic.as_str(),
            item.difficulty
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan_config::{ConfigTable, PlannerSettings};

    #[test]
    fn render_lists_every_item() {
        let planner = SessionPlanner::new(ConfigTable::builtin(), PlannerSettings::default());
        let assignment = Assignment::quiz("q1", ["sets", "relations"]);
        let plan = planner
            .plan_session(&assignment, 1, None, &mut session_rng(Some(3)))
            .unwrap();

        let text = render_plan(&plan);
        assert!(text.starts_with("📚 Session 2/2 for q1 (quiz)"));
        assert_eq!(text.lines().count(), 3 + 1 + plan.items.len());
        for item in &plan.items {
            assert!(text.contains(item.template.as_str()));
        }
    }
}
