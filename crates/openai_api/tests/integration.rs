use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use openai_api::{ChatMessage, ChatRequest, OpenAiApiClient, OpenAiApiConfig, OpenAiApiError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

#[derive(Clone)]
struct ScriptedResponse {
    status: u16,
    body: String,
}

struct ScriptedServer {
    base_url: String,
    request_count: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let request_count = Arc::new(AtomicUsize::new(0));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let base_url = format!("http://{addr}/v1");

        let handle = tokio::spawn({
            let scripts = Arc::clone(&scripts);
            let request_count = Arc::clone(&request_count);

            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    let scripts = Arc::clone(&scripts);
                    let request_count = Arc::clone(&request_count);
                    tokio::spawn(async move {
                        serve_one(socket, scripts, request_count).await;
                    });
                }
            }
        });

        Self {
            base_url,
            request_count,
            handle,
        }
    }

    fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.handle.abort();
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: Arc<Vec<ScriptedResponse>>,
    request_count: Arc<AtomicUsize>,
) {
    if read_request(&mut socket).await.is_none() {
        return;
    }
    let index = request_count.fetch_add(1, Ordering::AcqRel);
    let Some(script) = scripts.get(index.min(scripts.len().saturating_sub(1))) else {
        return;
    };

    let response = format!(
        "HTTP/1.1 {} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        script.status,
        script.body.len(),
        script.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Reads headers plus a `content-length` body so the client sees a full exchange.
async fn read_request(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                return Some(buffer);
            }
        }
    }
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "model": "gpt-4o",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
    .to_string()
}

fn request() -> ChatRequest {
    ChatRequest::new("gpt-4o", vec![ChatMessage::user("hi")])
}

#[tokio::test]
async fn completion_returns_first_choice_text() {
    let server = ScriptedServer::new(vec![ScriptedResponse {
        status: 200,
        body: completion_body(r#"{"response":"Hi","continue_chatting":true}"#),
    }])
    .await;

    let client =
        OpenAiApiClient::new(OpenAiApiConfig::new("sk").with_base_url(&server.base_url))
            .expect("client");
    let text = client.complete_text(&request()).await.expect("completion");

    assert_eq!(text, r#"{"response":"Hi","continue_chatting":true}"#);
    assert_eq!(server.request_count(), 1);
    server.shutdown();
}

#[tokio::test]
async fn retryable_status_then_success() {
    let server = ScriptedServer::new(vec![
        ScriptedResponse {
            status: 503,
            body: r#"{"error":{"message":"overloaded"}}"#.to_string(),
        },
        ScriptedResponse {
            status: 200,
            body: completion_body("ok"),
        },
    ])
    .await;

    let client =
        OpenAiApiClient::new(OpenAiApiConfig::new("sk").with_base_url(&server.base_url))
            .expect("client");
    let text = timeout(Duration::from_secs(12), client.complete_text(&request()))
        .await
        .expect("retry path should be bounded")
        .expect("completion should eventually succeed");

    assert_eq!(text, "ok");
    assert_eq!(server.request_count(), 2);
    server.shutdown();
}

#[tokio::test]
async fn non_retryable_status_fails_explicitly() {
    let server = ScriptedServer::new(vec![ScriptedResponse {
        status: 401,
        body: r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#.to_string(),
    }])
    .await;

    let client =
        OpenAiApiClient::new(OpenAiApiConfig::new("sk").with_base_url(&server.base_url))
            .expect("client");
    let error = client
        .complete_text(&request())
        .await
        .expect_err("401 should fail");

    assert!(
        matches!(&error, OpenAiApiError::Status(code, message) if code.as_u16() == 401 && message == "bad key (invalid_api_key)")
    );
    assert_eq!(server.request_count(), 1);
    server.shutdown();
}

#[tokio::test]
async fn empty_choices_are_reported() {
    let server = ScriptedServer::new(vec![ScriptedResponse {
        status: 200,
        body: r#"{"choices":[]}"#.to_string(),
    }])
    .await;

    let client =
        OpenAiApiClient::new(OpenAiApiConfig::new("sk").with_base_url(&server.base_url))
            .expect("client");
    let error = client
        .complete_text(&request())
        .await
        .expect_err("no content");

    assert!(matches!(error, OpenAiApiError::EmptyCompletion));
    server.shutdown();
}
