use std::sync::Arc;

use agent_provider::RunProvider;
use agent_provider_mock::MockProvider;
use agent_provider_openai::{OpenAiProvider, OpenAiProviderConfig};

use crate::config::{ChatConfig, ProviderKind};

pub fn provider_from_config(config: &ChatConfig) -> Result<Arc<dyn RunProvider>, String> {
    match config.provider {
        ProviderKind::Mock => Ok(Arc::new(MockProvider::default())),
        ProviderKind::OpenAi => {
            let mut provider_config = OpenAiProviderConfig::new(
                config.api_key.clone().unwrap_or_default(),
                config.model.clone(),
            )
            .with_json_mode(config.json_mode);
            if let Some(base_url) = &config.base_url {
                provider_config = provider_config.with_base_url(base_url.clone());
            }
            if let Some(timeout) = config.timeout {
                provider_config = provider_config.with_timeout(timeout);
            }
            if let Some(temperature) = config.temperature {
                provider_config = provider_config.with_temperature(temperature);
            }

            let provider = OpenAiProvider::new(provider_config).map_err(|error| error.to_string())?;
            Ok(Arc::new(provider))
        }
    }
}
