//! `studyplan config`: configuration management commands.

use clap::Subcommand;
use std::path::{Path, PathBuf};
use studyplan_config::{AppConfig, ProviderKind};

use super::input::load_config;

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    /// Validate the configuration and summarize it
    Validate,
    /// Print the config file location
    Path,
    /// Write a default config file if none exists
    Init,
}

pub fn run(config_path: Option<&Path>, action: Option<ConfigAction>) -> Result<(), Box<dyn std::error::Error>> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(config_path),
        ConfigAction::Validate => validate(config_path),
        ConfigAction::Path => {
            println!("{}", resolve_path(config_path).display());
            Ok(())
        }
        ConfigAction::Init => init(config_path),
    }
}

fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    config_path.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path)
}

fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", config.to_toml()?);
    Ok(())
}

fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ Config parsed successfully");

    if config.provider.kind == ProviderKind::OpenAi && config.provider.api_key.is_none() {
        if config.provider.fallback_to_local {
            println!("   ⚠️  No API key set; the local generator will be used");
        } else {
            println!("   ⚠️  No API key set (set STUDYPLAN_API_KEY or OPENAI_API_KEY)");
        }
    }

    let table = &config.assessments;
    println!();
    println!("   Provider:     {}", config.provider.kind);
    println!("   Model:        {}", config.provider.model);
    println!("   Concurrency:  {}", config.planner.generation_concurrency);
    println!(
        "   Tier shift:   {}",
        if config.planner.tier_shift_selection { "reweights selection" } else { "reported only" }
    );
    println!(
        "   Quiz:         {} sessions x {} exercises",
        table.quiz.sessions_recommended, table.quiz.exercises_per_session
    );
    for subtype in studyplan_core::ExamSubtype::ALL {
        let entry = table.for_exam(subtype);
        println!(
            "   Exam {:<8} {} sessions x {} exercises",
            format!("{subtype}:"),
            entry.sessions_recommended,
            entry.exercises_per_session
        );
    }

    Ok(())
}

fn init(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_path(config_path);

    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete it and re-run init.");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Created config at: {}", path.display());
    Ok(())
}
