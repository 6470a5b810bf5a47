use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};

use crate::config::OpenAiApiConfig;
use crate::error::{parse_error_message, OpenAiApiError};
use crate::headers::build_headers;
use crate::payload::{ChatCompletion, ChatRequest};
use crate::retry::{is_retryable_http_error, retry_delay_ms, MAX_RETRIES};
use crate::url::normalize_chat_url;

#[derive(Debug)]
pub struct OpenAiApiClient {
    http: Client,
    config: OpenAiApiConfig,
}

impl OpenAiApiClient {
    pub fn new(config: OpenAiApiConfig) -> Result<Self, OpenAiApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(OpenAiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OpenAiApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, OpenAiApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config)? {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| OpenAiApiError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| OpenAiApiError::InvalidHeader(format!("invalid value for {key}")))?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, OpenAiApiError> {
        let headers = self.build_headers()?;
        let mut payload = request.clone();
        payload.stream = false;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    pub async fn send_with_retry(&self, request: &ChatRequest) -> Result<Response, OpenAiApiError> {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            match self.build_request(request)?.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    last_status = Some(status);
                    let body = response.text().await.unwrap_or_default();
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &body) {
                        let delay = retry_delay_ms(attempt);
                        tracing::warn!(
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retrying chat completion: {message}"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(OpenAiApiError::Status(status, message));
                }
                Err(error) => {
                    let message = error.to_string();
                    last_error = Some(message.clone());
                    if attempt < MAX_RETRIES {
                        let delay = retry_delay_ms(attempt);
                        tracing::warn!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retrying chat completion after transport error: {message}"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(OpenAiApiError::RetryExhausted {
                        status: last_status,
                        last_error,
                    });
                }
            }
        }

        Err(OpenAiApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Sends `request` and decodes the completion body.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, OpenAiApiError> {
        let response = self.send_with_retry(request).await?;
        let body = response.bytes().await?;
        let completion: ChatCompletion = serde_json::from_slice(&body)?;
        tracing::debug!(
            model = completion.model.as_deref().unwrap_or(&request.model),
            choices = completion.choices.len(),
            "chat completion received"
        );
        Ok(completion)
    }

    /// Sends `request` and returns the first choice's text.
    pub async fn complete_text(&self, request: &ChatRequest) -> Result<String, OpenAiApiError> {
        self.complete(request)
            .await?
            .first_content()
            .map(str::to_owned)
            .ok_or(OpenAiApiError::EmptyCompletion)
    }
}
