//! `studyplan doctor`: diagnose configuration and provider health.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use studyplan_config::{AppConfig, ProviderKind};
use studyplan_core::Assignment;
use studyplan_planner::SessionPlanner;
use studyplan_providers::build_from_config;

use super::input::load_config;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 studyplan Doctor: System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let path = config_path.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path);
    if path.exists() {
        println!("  ✅ Config file found at {}", path.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `studyplan config init`)");
    }

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. Fix the config and re-run.");
            return Ok(());
        }
    };

    if config.provider.kind == ProviderKind::OpenAi && config.provider.api_key.is_none() {
        println!("  ⚠️  provider.kind = \"openai\" but no API key configured");
        issues += 1;
    }

    match build_from_config(&config) {
        Ok(provider) => {
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
                Ok(false) => {
                    println!("  ❌ Provider '{}' did not respond", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider '{}' health check failed: {e}", provider.name());
                    issues += 1;
                }
            }

            // A dry run that only touches selection, so it works offline
            let planner = SessionPlanner::from_config(&config);
            let probe = Assignment::quiz("doctor", ["probe"]);
            match planner.plan_session(&probe, 0, None, &mut StdRng::seed_from_u64(0)) {
                Ok(plan) => println!("  ✅ Quiz plan selects {} exercises", plan.items.len()),
                Err(e) => {
                    println!("  ❌ Quiz plan failed: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Provider could not be built: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
