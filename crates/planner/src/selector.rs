//! Weighted, duplicate-free selection of exercise templates.
//!
//! Each draw picks a template with probability proportional to its weight
//! among the templates not yet chosen, then removes it from the pool. The
//! draw always terminates after `exercises_per_session` steps.

use rand::Rng;
use studyplan_config::{AssessmentConfig, TierDistribution};
use studyplan_core::{Error, Result, SessionProgress, TemplateId};
use tracing::debug;

/// Floor for a tier share when reweighting, so no tier drops out entirely.
const MIN_TIER_SHARE: f64 = 0.01;

/// The tier mix for a session: the base distribution shifted toward recall
/// early in the plan and toward application late in the plan.
pub fn tier_distribution(config: &AssessmentConfig, session: SessionProgress) -> TierDistribution {
    config.distribution.adjusted_for(session.fraction())
}

/// Draw `config.exercises_per_session` distinct templates.
///
/// With `tier_shift` off, the adjusted tier distribution is computed and
/// logged but selection uses the raw template weights. With it on, each
/// weight is scaled by `adjusted[tier] / base[tier]`.
pub fn select_exercise_types<R: Rng + ?Sized>(
    config: &AssessmentConfig,
    session: SessionProgress,
    tier_shift: bool,
    rng: &mut R,
) -> Result<Vec<TemplateId>> {
    let count = config.exercises_per_session;
    let distribution = tier_distribution(config, session);

    debug!(
        session_index = session.index,
        total_sessions = session.total,
        tier1 = distribution.tier1,
        tier2 = distribution.tier2,
        tier3 = distribution.tier3,
        tier_shift,
        "Adjusted tier distribution"
    );

    if config.template_weights.len() < count {
        return Err(Error::config(format!(
            "exercises_per_session ({count}) exceeds the number of weighted templates ({})",
            config.template_weights.len()
        )));
    }

    let mut pool: Vec<(TemplateId, f64)> = config
        .template_weights
        .iter()
        .map(|(template, weight)| {
            let weight = if tier_shift {
                reweight(template, *weight, &config.distribution, &distribution)
            } else {
                *weight
            };
            (template.clone(), weight)
        })
        .collect();

    let mut selected = Vec::with_capacity(count);
    while selected.len() < count {
        let index = draw_index(&pool, rng)?;
        selected.push(pool.remove(index).0);
    }

    Ok(selected)
}

fn reweight(template: &TemplateId, weight: f64, base: &TierDistribution, adjusted: &TierDistribution) -> f64 {
    match template.tier() {
        Some(tier) => {
            weight * adjusted.share(tier).max(MIN_TIER_SHARE) / base.share(tier).max(MIN_TIER_SHARE)
        }
        None => weight,
    }
}

/// Pick an index with probability proportional to its weight.
fn draw_index<R: Rng + ?Sized>(pool: &[(TemplateId, f64)], rng: &mut R) -> Result<usize> {
    let cumulative: Vec<f64> = pool
        .iter()
        .scan(0.0, |acc, (_, weight)| {
            *acc += weight;
            Some(*acc)
        })
        .collect();

    let total = cumulative.last().copied().unwrap_or(0.0);
    if !(total.is_finite() && total > 0.0) {
        return Err(Error::config("template weights must sum to a positive number"));
    }

    let target = rng.random_range(0.0..total);
    Ok(cumulative
        .partition_point(|c| *c <= target)
        .min(pool.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use studyplan_config::ConfigTable;

    fn session(index: u32, total: u32) -> SessionProgress {
        SessionProgress::new(index, total).unwrap()
    }

    #[test]
    fn every_table_entry_yields_distinct_weighted_templates() {
        let table = ConfigTable::builtin();
        let entries = [
            &table.quiz,
            &table.exam.theoretical,
            &table.exam.practical,
            &table.exam.hybrid,
        ];
        let mut rng = StdRng::seed_from_u64(7);

        for config in entries {
            for index in 0..config.sessions_recommended {
                for tier_shift in [false, true] {
                    let picked = select_exercise_types(
                        config,
                        session(index, config.sessions_recommended),
                        tier_shift,
                        &mut rng,
                    )
                    .unwrap();
                    assert_eq!(picked.len(), config.exercises_per_session);
                    let distinct: HashSet<_> = picked.iter().collect();
                    assert_eq!(distinct.len(), picked.len());
                    assert!(picked.iter().all(|t| config.template_weights.contains_key(t)));
                }
            }
        }
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let config = ConfigTable::builtin().exam.hybrid;
        let a = select_exercise_types(&config, session(2, 5), false, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = select_exercise_types(&config, session(2, 5), false, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn early_distribution_shift() {
        let table = ConfigTable::builtin();
        let base = table.exam.theoretical.distribution;
        let early = tier_distribution(&table.exam.theoretical, session(0, 5));
        assert!((early.tier1 - (base.tier1 + 0.15)).abs() < 1e-9);
        assert!((early.tier3 - (base.tier3 - 0.15)).abs() < 1e-9);
        assert!((early.tier2 - base.tier2).abs() < 1e-9);

        let middle = tier_distribution(&table.exam.theoretical, session(2, 5));
        assert_eq!(middle, base);

        let late = tier_distribution(&table.exam.theoretical, session(4, 5));
        assert!((late.tier1 - (base.tier1 - 0.10)).abs() < 1e-9);
        assert!((late.tier3 - (base.tier3 + 0.10)).abs() < 1e-9);
    }

    #[test]
    fn too_many_exercises_is_a_configuration_error() {
        let mut config = ConfigTable::builtin().quiz;
        config.exercises_per_session = config.template_weights.len() + 1;
        let err = select_exercise_types(&config, session(0, 2), false, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    fn two_template_config(heavy: f64, light: f64) -> AssessmentConfig {
        let mut weights = BTreeMap::new();
        weights.insert(TemplateId::from("multiple_choice"), heavy);
        weights.insert(TemplateId::from("scenario_application"), light);
        AssessmentConfig {
            sessions_recommended: 5,
            exercises_per_session: 1,
            distribution: TierDistribution::new(0.5, 0.0, 0.5),
            template_weights: weights,
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let config = two_template_config(3.0, 1.0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut counts: HashMap<TemplateId, usize> = HashMap::new();
        for _ in 0..4000 {
            let picked = select_exercise_types(&config, session(2, 5), false, &mut rng).unwrap();
            *counts.entry(picked[0].clone()).or_default() += 1;
        }
        let heavy = counts[&TemplateId::from("multiple_choice")] as f64 / 4000.0;
        assert!((heavy - 0.75).abs() < 0.04, "heavy share was {heavy}");
    }

    #[test]
    fn tiny_weights_stay_selectable() {
        // Far below 1% of the total, but never zero probability
        let config = two_template_config(1.0, 0.004);
        let mut rng = StdRng::seed_from_u64(3);
        let hits = (0..20_000)
            .filter(|_| {
                select_exercise_types(&config, session(2, 5), false, &mut rng).unwrap()[0].as_str()
                    == "scenario_application"
            })
            .count();
        assert!(hits > 0);
    }

    #[test]
    fn tier_shift_favours_recall_early_and_application_late() {
        let config = two_template_config(1.0, 1.0);
        let share_of_recall = |index: u32, tier_shift: bool| {
            let mut rng = StdRng::seed_from_u64(5);
            let hits = (0..4000)
                .filter(|_| {
                    select_exercise_types(&config, session(index, 5), tier_shift, &mut rng).unwrap()[0]
                        .as_str()
                        == "multiple_choice"
                })
                .count();
            hits as f64 / 4000.0
        };

        let inert_early = share_of_recall(0, false);
        assert!((inert_early - 0.5).abs() < 0.04);

        // early: 0.65 vs 0.35 after the shift
        assert!(share_of_recall(0, true) > 0.6);
        // late: 0.40 vs 0.60
        assert!(share_of_recall(4, true) < 0.45);
    }
}
