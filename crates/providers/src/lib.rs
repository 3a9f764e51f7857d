//! Content provider implementations for studyplan.
//!
//! All providers implement the `studyplan_core::ContentProvider` trait.
//! [`build_from_config`] picks and wires them according to `[provider]`.

pub mod fallback;
pub mod local;
pub mod openai_compat;

pub use fallback::FallbackContentProvider;
pub use local::LocalContentProvider;
pub use openai_compat::OpenAiCompatContentProvider;

use std::sync::Arc;
use std::time::Duration;
use studyplan_config::{AppConfig, ProviderKind};
use studyplan_core::{ContentProvider, ProviderError};
use tracing::{info, warn};

/// Build the content provider described by the configuration.
///
/// A remote provider without an API key is an error unless
/// `fallback_to_local` is set, in which case the local generator is used.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn ContentProvider>, ProviderError> {
    let settings = &config.provider;

    match settings.kind {
        ProviderKind::Local => Ok(Arc::new(LocalContentProvider::new())),
        ProviderKind::OpenAi => {
            let Some(api_key) = settings.api_key.as_deref() else {
                if settings.fallback_to_local {
                    warn!("No API key configured, using the local content provider");
                    return Ok(Arc::new(LocalContentProvider::new()));
                }
                return Err(ProviderError::NotConfigured(
                    "provider.kind = \"openai\" needs an API key (STUDYPLAN_API_KEY)".into(),
                ));
            };

            let timeout = Duration::from_secs(settings.timeout_secs);
            let remote: Arc<dyn ContentProvider> = Arc::new(
                OpenAiCompatContentProvider::new("openai", &settings.api_url, api_key, &settings.model)
                    .with_temperature(settings.temperature)
                    .with_timeout(timeout),
            );

            if !settings.fallback_to_local {
                return Ok(remote);
            }

            info!(model = %settings.model, "Using remote content provider with local fallback");
            Ok(Arc::new(
                FallbackContentProvider::new("openai+local")
                    .add(remote, timeout)
                    .add_default(Arc::new(LocalContentProvider::new())),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_local() {
        let provider = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn remote_without_key_falls_back() {
        let mut config = AppConfig::default();
        config.provider.kind = ProviderKind::OpenAi;
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "local");

        config.provider.fallback_to_local = false;
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn remote_with_key_builds_chain() {
        let mut config = AppConfig::default();
        config.provider.kind = ProviderKind::OpenAi;
        config.provider.api_key = Some("sk-test".into());
        assert_eq!(build_from_config(&config).unwrap().name(), "openai+local");

        config.provider.fallback_to_local = false;
        assert_eq!(build_from_config(&config).unwrap().name(), "openai");
    }
}
