//! OpenAI Chat Completions implementation of the shared `agent_provider` contract.
//!
//! This adapter turns a `RunRequest` into a completion request and reports the
//! reply as `RunEvent` lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use agent_provider::{
    ProviderInitError, ProviderProfile, RunEvent, RunMessage, RunProvider, RunRequest,
};
use openai_api::{ChatMessage, ChatRequest, OpenAiApiClient, OpenAiApiConfig, OpenAiApiError};

/// Stable provider identifier used for startup selection.
pub const OPENAI_PROVIDER_ID: &str = "openai";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Runtime configuration for the OpenAI provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub json_mode: bool,
    pub temperature: Option<f64>,
}

impl OpenAiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: None,
            json_mode: false,
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn into_api_config(self) -> OpenAiApiConfig {
        let mut config = OpenAiApiConfig::new(self.api_key);

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait CompletionClient: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, OpenAiApiError>;
}

#[derive(Debug)]
struct DefaultCompletionClient {
    client: OpenAiApiClient,
}

impl CompletionClient for DefaultCompletionClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, OpenAiApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                OpenAiApiError::JoinError(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.complete_text(request))
    }
}

/// `RunProvider` adapter backed by `openai_api` transport primitives.
pub struct OpenAiProvider {
    model: String,
    json_mode: bool,
    temperature: Option<f64>,
    client: Arc<dyn CompletionClient>,
}

impl OpenAiProvider {
    /// Creates a provider using real HTTP transport.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderInitError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderInitError::new(
                "OPENAI_API_KEY is required for the openai provider",
            ));
        }

        let model = sanitize_model(&config.model);
        let json_mode = config.json_mode;
        let temperature = config.temperature;
        let client = Arc::new(DefaultCompletionClient {
            client: OpenAiApiClient::new(config.into_api_config()).map_err(map_init_error)?,
        });

        Ok(Self {
            model,
            json_mode,
            temperature,
            client,
        })
    }

    fn build_request(&self, req: &RunRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(req.messages.len() + 1);
        if !req.instructions.trim().is_empty() {
            messages.push(ChatMessage::system(&req.instructions));
        }
        messages.extend(req.messages.iter().map(|message| match message {
            RunMessage::UserText { text } => ChatMessage::user(text),
            RunMessage::AssistantText { text } => ChatMessage::assistant(text),
        }));

        let request = ChatRequest::new(&self.model, messages).with_json_mode(self.json_mode);
        match self.temperature {
            Some(temperature) => request.with_temperature(temperature),
            None => request,
        }
    }

    #[cfg(test)]
    fn with_client_for_tests(model: &str, json_mode: bool, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            model: sanitize_model(model),
            json_mode,
            temperature: None,
            client,
        }
    }
}

impl RunProvider for OpenAiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: OPENAI_PROVIDER_ID.to_string(),
            model_id: self.model.clone(),
        }
    }

    fn run(&self, req: RunRequest, emit: &mut dyn FnMut(RunEvent)) -> Result<(), String> {
        let run_id = req.run_id;
        let request = self.build_request(&req);

        emit(RunEvent::Started { run_id });
        tracing::debug!(run_id, model = %self.model, messages = request.messages.len(), "sending chat completion");

        match self.client.complete(&request) {
            Ok(text) => {
                if !text.is_empty() {
                    emit(RunEvent::Chunk { run_id, text });
                }
                emit(RunEvent::Finished { run_id });
            }
            Err(error) => {
                tracing::error!(run_id, "chat completion failed: {error}");
                emit(RunEvent::Failed {
                    run_id,
                    error: format!("OpenAI request failed: {error}"),
                });
            }
        }

        Ok(())
    }
}

fn sanitize_model(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn map_init_error(error: OpenAiApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize openai provider: {error}"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use openai_api::ChatRole;

    use super::*;

    fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    struct FakeCompletionClient {
        observed: Mutex<Option<ChatRequest>>,
        outcome: Mutex<Option<Result<String, OpenAiApiError>>>,
    }

    impl FakeCompletionClient {
        fn success(text: &str) -> Arc<Self> {
            Arc::new(Self {
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(Ok(text.to_string()))),
            })
        }

        fn failure(error: OpenAiApiError) -> Arc<Self> {
            Arc::new(Self {
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(Err(error))),
            })
        }

        fn observed(&self) -> Option<ChatRequest> {
            lock_unpoisoned(&self.observed).clone()
        }
    }

    impl CompletionClient for FakeCompletionClient {
        fn complete(&self, request: &ChatRequest) -> Result<String, OpenAiApiError> {
            *lock_unpoisoned(&self.observed) = Some(request.clone());
            lock_unpoisoned(&self.outcome)
                .take()
                .unwrap_or(Err(OpenAiApiError::EmptyCompletion))
        }
    }

    fn run_events(provider: &OpenAiProvider) -> Vec<RunEvent> {
        let mut events = Vec::new();
        provider
            .run(
                RunRequest {
                    run_id: 9,
                    messages: vec![
                        RunMessage::UserText {
                            text: "Greet Jacob.".to_string(),
                        },
                        RunMessage::AssistantText {
                            text: "{\"response\":\"Hi\"}".to_string(),
                        },
                        RunMessage::UserText {
                            text: "hello".to_string(),
                        },
                    ],
                    instructions: "Ruleset: Persona".to_string(),
                },
                &mut |event| events.push(event),
            )
            .expect("run should not return provider-level failure");
        events
    }

    #[test]
    fn profile_reports_openai_provider_id_and_model() {
        let provider =
            OpenAiProvider::with_client_for_tests("gpt-4o-mini", false, FakeCompletionClient::success(""));
        let profile = provider.profile();
        assert_eq!(profile.provider_id, OPENAI_PROVIDER_ID);
        assert_eq!(profile.model_id, "gpt-4o-mini");
    }

    #[test]
    fn run_maps_history_to_chat_messages_with_system_first() {
        let client = FakeCompletionClient::success("{\"response\":\"Hey\",\"continue_chatting\":true}");
        let provider = OpenAiProvider::with_client_for_tests(
            "gpt-4o",
            true,
            Arc::clone(&client) as Arc<dyn CompletionClient>,
        );

        let events = run_events(&provider);

        let observed = client.observed().expect("request observed");
        let roles: Vec<ChatRole> = observed.messages.iter().map(|message| message.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(observed.messages[0].content, "Ruleset: Persona");
        assert!(observed.response_format.is_some());

        assert_eq!(
            events,
            vec![
                RunEvent::Started { run_id: 9 },
                RunEvent::Chunk {
                    run_id: 9,
                    text: "{\"response\":\"Hey\",\"continue_chatting\":true}".to_string(),
                },
                RunEvent::Finished { run_id: 9 },
            ]
        );
    }

    #[test]
    fn run_maps_transport_error_to_failed_terminal_event() {
        let provider = OpenAiProvider::with_client_for_tests(
            "gpt-4o",
            false,
            FakeCompletionClient::failure(OpenAiApiError::MissingApiKey),
        );

        let events = run_events(&provider);

        assert!(matches!(events.first(), Some(RunEvent::Started { run_id: 9 })));
        assert!(matches!(
            events.last(),
            Some(RunEvent::Failed { run_id: 9, error }) if error.contains("API key is required")
        ));
    }

    #[test]
    fn blank_model_defaults_to_safe_model() {
        let provider =
            OpenAiProvider::with_client_for_tests("  ", false, FakeCompletionClient::success(""));
        assert_eq!(provider.profile().model_id, DEFAULT_MODEL);
    }

    #[test]
    fn missing_api_key_is_an_init_error() {
        let error = OpenAiProvider::new(OpenAiProviderConfig::new(" ", "gpt-4o"))
            .err()
            .expect("blank key rejected");
        assert!(error.message().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn configured_temperature_reaches_the_request() {
        let request = RunRequest {
            run_id: 1,
            messages: vec![RunMessage::UserText {
                text: "hi".to_string(),
            }],
            instructions: String::new(),
        };

        let tuned = OpenAiProvider::new(OpenAiProviderConfig::new("sk-test", "gpt-4o").with_temperature(0.3))
            .expect("provider");
        let built = tuned.build_request(&request);
        assert_eq!(built.temperature, Some(0.3));
        assert_eq!(built.messages.len(), 1);

        let default = OpenAiProvider::new(OpenAiProviderConfig::new("sk-test", "gpt-4o"))
            .expect("provider");
        assert_eq!(default.build_request(&request).temperature, None);
    }

    #[test]
    fn real_provider_builds_with_key() {
        let provider = OpenAiProvider::new(
            OpenAiProviderConfig::new("sk-test", "")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(1))
                .with_json_mode(true),
        )
        .expect("provider");
        assert_eq!(provider.profile().model_id, DEFAULT_MODEL);
    }
}
