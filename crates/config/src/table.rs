//! The assessment configuration table.
//!
//! Maps an assessment type (and exam subtype) to how many sessions to plan,
//! how many exercises each session holds, the tier mix, and the relative
//! selection weight of every template. The built-in table can be overridden
//! entry by entry from `config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use studyplan_core::{AssessmentKind, Assignment, ExamSubtype, TemplateId, Tier};

use crate::ConfigError;

const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Share of each tier in a session. Values sum to 1.0 in a valid table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
}

impl TierDistribution {
    pub fn new(tier1: f64, tier2: f64, tier3: f64) -> Self {
        Self { tier1, tier2, tier3 }
    }

    pub fn share(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Recall => self.tier1,
            Tier::Understanding => self.tier2,
            Tier::Application => self.tier3,
        }
    }

    pub fn sum(&self) -> f64 {
        self.tier1 + self.tier2 + self.tier3
    }

    /// Shift mass between recall and application as the plan progresses.
    ///
    /// Early sessions (`< 0.3`) move 0.15 from tier 3 to tier 1, late sessions
    /// (`> 0.7`) move 0.10 from tier 1 to tier 3. Results are not clamped: a
    /// tier can go negative when its base share is smaller than the shift.
    pub fn adjusted_for(&self, progress: f64) -> Self {
        let mut adjusted = *self;
        if progress < 0.3 {
            adjusted.tier1 += 0.15;
            adjusted.tier3 -= 0.15;
        } else if progress > 0.7 {
            adjusted.tier1 -= 0.10;
            adjusted.tier3 += 0.10;
        }
        adjusted
    }
}

/// Planning parameters for one assessment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    pub sessions_recommended: u32,
    pub exercises_per_session: usize,
    pub distribution: TierDistribution,
    /// Relative weights, not probabilities
    pub template_weights: BTreeMap<TemplateId, f64>,
}

impl AssessmentConfig {
    fn new(
        sessions_recommended: u32,
        exercises_per_session: usize,
        distribution: TierDistribution,
        weights: &[(&str, f64)],
    ) -> Self {
        Self {
            sessions_recommended,
            exercises_per_session,
            distribution,
            template_weights: weights
                .iter()
                .map(|(id, w)| (TemplateId::from(*id), *w))
                .collect(),
        }
    }

    /// Check the invariants the planner relies on. `name` labels the entry in errors.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::ValidationError(format!("{name}: {reason}"));

        if self.sessions_recommended == 0 {
            return Err(invalid("sessions_recommended must be >= 1".into()));
        }
        if self.exercises_per_session == 0 {
            return Err(invalid("exercises_per_session must be >= 1".into()));
        }

        let d = &self.distribution;
        if [d.tier1, d.tier2, d.tier3]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(invalid("distribution values must be finite and >= 0".into()));
        }
        if (d.sum() - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(invalid(format!("distribution sums to {}, expected 1.0", d.sum())));
        }

        for (template, weight) in &self.template_weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(invalid(format!("weight for {template} must be > 0, got {weight}")));
            }
            if template.tier().is_none() {
                return Err(invalid(format!("template {template} is not registered to any tier")));
            }
        }

        if self.template_weights.len() < self.exercises_per_session {
            return Err(invalid(format!(
                "exercises_per_session ({}) exceeds the number of weighted templates ({})",
                self.exercises_per_session,
                self.template_weights.len()
            )));
        }

        Ok(())
    }
}

/// Per-subtype exam entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfigs {
    #[serde(default = "builtin_theoretical")]
    pub theoretical: AssessmentConfig,
    #[serde(default = "builtin_practical")]
    pub practical: AssessmentConfig,
    #[serde(default = "builtin_hybrid")]
    pub hybrid: AssessmentConfig,
}

impl Default for ExamConfigs {
    fn default() -> Self {
        Self {
            theoretical: builtin_theoretical(),
            practical: builtin_practical(),
            hybrid: builtin_hybrid(),
        }
    }
}

/// The full lookup table, keyed by `(assessment type, subtype)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigTable {
    #[serde(default = "builtin_quiz")]
    pub quiz: AssessmentConfig,
    #[serde(default)]
    pub exam: ExamConfigs,
}

impl ConfigTable {
    /// The table shipped with the planner.
    pub fn builtin() -> Self {
        Self {
            quiz: builtin_quiz(),
            exam: ExamConfigs::default(),
        }
    }

    /// Load a table from TOML, falling back to built-in entries for any
    /// entry the document leaves out.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let table: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<inline>".into(),
            reason: e.to_string(),
        })?;
        table.validate()?;
        Ok(table)
    }

    pub fn for_exam(&self, subtype: ExamSubtype) -> &AssessmentConfig {
        match subtype {
            ExamSubtype::Theoretical => &self.exam.theoretical,
            ExamSubtype::Practical => &self.exam.practical,
            ExamSubtype::Hybrid => &self.exam.hybrid,
        }
    }

    /// Resolve the entry for an assignment. Exams without a recognized
    /// subtype use the hybrid entry.
    pub fn resolve(&self, assignment: &Assignment) -> &AssessmentConfig {
        match assignment.kind {
            AssessmentKind::Quiz => &self.quiz,
            AssessmentKind::Exam => self.for_exam(assignment.exam_subtype.unwrap_or_default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quiz.validate("quiz")?;
        for subtype in ExamSubtype::ALL {
            self.for_exam(subtype).validate(&format!("exam.{subtype}"))?;
        }
        Ok(())
    }
}

impl Default for ConfigTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_theoretical() -> AssessmentConfig {
    AssessmentConfig::new(
        5,
        6,
        TierDistribution::new(0.40, 0.40, 0.20),
        &[
            ("multiple_choice", 0.25),
            ("true_false_justify", 0.15),
            ("flashcard", 0.15),
            ("fill_in_blank", 0.10),
            ("numerical_problem", 0.05),
            ("short_answer_define", 0.10),
            ("short_answer_explain", 0.10),
            ("one_sentence_definition", 0.10),
            ("scenario_application", 0.10),
            ("error_identification", 0.05),
        ],
    )
}

fn builtin_practical() -> AssessmentConfig {
    AssessmentConfig::new(
        5,
        6,
        TierDistribution::new(0.35, 0.35, 0.30),
        &[
            ("numerical_problem", 0.30),
            ("multiple_choice", 0.15),
            ("fill_in_blank", 0.05),
            ("problem_type_recognition", 0.15),
            ("short_answer_explain", 0.10),
            ("error_identification", 0.15),
            ("mini_problem_set", 0.10),
            ("scenario_prediction", 0.05),
        ],
    )
}

fn builtin_hybrid() -> AssessmentConfig {
    AssessmentConfig::new(
        5,
        6,
        TierDistribution::new(0.35, 0.35, 0.30),
        &[
            ("multiple_choice", 0.20),
            ("numerical_problem", 0.15),
            ("true_false_justify", 0.10),
            ("short_answer_define", 0.10),
            ("short_answer_explain", 0.10),
            ("short_answer_compare", 0.05),
            ("problem_type_recognition", 0.10),
            ("concept_comparison", 0.05),
            ("scenario_application", 0.10),
            ("error_identification", 0.10),
            ("mini_problem_set", 0.05),
        ],
    )
}

// Eight distinct templates: a quiz session draws eight without repeats.
fn builtin_quiz() -> AssessmentConfig {
    AssessmentConfig::new(
        2,
        8,
        TierDistribution::new(0.60, 0.30, 0.10),
        &[
            ("multiple_choice", 0.30),
            ("true_false_justify", 0.20),
            ("flashcard", 0.20),
            ("fill_in_blank", 0.10),
            ("one_sentence_definition", 0.15),
            ("short_answer_define", 0.05),
            ("problem_type_recognition", 0.05),
            ("mini_problem_set", 0.05),
        ],
    )
}
