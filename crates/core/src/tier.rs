//! Exercise tiers and the template ids each tier owns.
//!
//! The three tiers partition the template namespace: a template id belongs to
//! at most one tier. Configuration loading checks every weighted template
//! against [`Tier::classify`], so dispatch never sees an id claimed twice.

use serde::{Deserialize, Serialize};

/// An exercise archetype (multiple choice, scenario application, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tier that owns this template, if any.
    pub fn tier(&self) -> Option<Tier> {
        Tier::classify(self.as_str())
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for TemplateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const RECALL_TEMPLATES: &[&str] = &[
    "multiple_choice",
    "true_false_justify",
    "flashcard",
    "fill_in_blank",
    "numerical_problem",
];

const UNDERSTANDING_TEMPLATES: &[&str] = &[
    "short_answer_define",
    "short_answer_explain",
    "short_answer_compare",
    "one_sentence_definition",
    "problem_type_recognition",
    "concept_comparison",
];

const APPLICATION_TEMPLATES: &[&str] = &[
    "scenario_application",
    "scenario_prediction",
    "error_identification",
    "mini_problem_set",
];

/// Exercise complexity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Tier 1: basic recall, graded locally
    Recall,
    /// Tier 2: understanding, open-ended
    Understanding,
    /// Tier 3: application to new situations
    Application,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Self::Recall, Self::Understanding, Self::Application];

    /// Template ids registered to this tier.
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::Recall => RECALL_TEMPLATES,
            Self::Understanding => UNDERSTANDING_TEMPLATES,
            Self::Application => APPLICATION_TEMPLATES,
        }
    }

    pub fn owns(&self, template: &str) -> bool {
        self.templates().contains(&template)
    }

    /// Find the tier that owns `template`.
    pub fn classify(template: &str) -> Option<Tier> {
        Self::ALL.into_iter().find(|tier| tier.owns(template))
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recall => write!(f, "recall"),
            Self::Understanding => write!(f, "understanding"),
            Self::Application => write!(f, "application"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tiers_partition_the_namespace() {
        let mut seen = HashSet::new();
        for tier in Tier::ALL {
            for template in tier.templates() {
                assert!(seen.insert(*template), "{template} claimed twice");
            }
        }
    }

    #[test]
    fn classify_known_and_unknown() {
        assert_eq!(Tier::classify("flashcard"), Some(Tier::Recall));
        assert_eq!(Tier::classify("concept_comparison"), Some(Tier::Understanding));
        assert_eq!(TemplateId::from("mini_problem_set").tier(), Some(Tier::Application));
        assert_eq!(Tier::classify("crossword"), None);
    }
}
