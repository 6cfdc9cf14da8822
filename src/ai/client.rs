//! Chat-completion API client

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::context::build_context;
use super::prompts;
use crate::config::{AiConfig, LimitsConfig};
use crate::error::RequestError;
use crate::mail::EmailRecord;

/// Client for an OpenAI-compatible chat-completion endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl ChatClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    /// Answer `question` from the newest records, authenticated with `api_token`.
    pub async fn answer(
        &self,
        question: &str,
        records: &[EmailRecord],
        limits: &LimitsConfig,
        api_token: &str,
    ) -> Result<String, RequestError> {
        let context = build_context(records, limits);
        let user_content = prompts::question_with_context(&context, question);

        self.complete(prompts::EMAIL_ASSISTANT_SYSTEM, &user_content, api_token)
            .await
    }

    /// Send a single-turn, non-streaming completion request
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        api_token: &str,
    ) -> Result<String, RequestError> {
        if api_token.trim().is_empty() {
            return Err(RequestError::MissingToken);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!(
            "Sending chat request to {} ({} prompt chars)",
            self.endpoint,
            user_content.chars().count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_token.trim())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Status { status, body });
        }

        let text = response.text().await?;
        parse_reply(&text)
    }
}

/// Content of the first choice, or why it is missing.
fn parse_reply(text: &str) -> Result<String, RequestError> {
    let chat_response: ChatResponse =
        serde_json::from_str(text).map_err(|e| RequestError::Malformed(e.to_string()))?;

    chat_response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| RequestError::Malformed("response has no choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response on a local port and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then exactly Content-Length bytes of body
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8(request).unwrap()
        });

        (format!("http://{}/v1/chat/completions", addr), handle)
    }

    fn client_for(endpoint: String) -> ChatClient {
        ChatClient::new(&AiConfig {
            api_token: None,
            endpoint,
            model: "test-model".to_string(),
            temperature: 0.2,
        })
    }

    fn records() -> Vec<EmailRecord> {
        vec![EmailRecord {
            id: "1".to_string(),
            subject: "Invoice".to_string(),
            from: "billing@example.com".to_string(),
            date: "Mon, 1 Jan 2024 12:00:00 +0000".to_string(),
            body: "Your invoice total is 42 EUR.".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_answer_returns_first_choice_and_sends_context() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"It is 42 EUR."}},{"message":{"role":"assistant","content":"second"}}]}"#,
        )
        .await;

        let reply = client_for(endpoint)
            .answer("How much?", &records(), &LimitsConfig::default(), "secret-token")
            .await
            .unwrap();
        assert_eq!(reply, "It is 42 EUR.");

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(lower.contains("authorization: bearer secret-token"));

        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["stream"], false);
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], prompts::EMAIL_ASSISTANT_SYSTEM);
        assert_eq!(json["messages"][1]["role"], "user");

        let user = json["messages"][1]["content"].as_str().unwrap();
        assert!(user.starts_with("Here are the recent emails:\n\n--- Email 1 ---\n"));
        assert!(user.contains("Body: Your invoice total is 42 EUR."));
        assert!(user.ends_with("User Question: How much?\n"));
    }

    #[tokio::test]
    async fn test_server_error_is_request_error() {
        let (endpoint, server) =
            serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let err = client_for(endpoint)
            .answer("Anything?", &records(), &LimitsConfig::default(), "tok")
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            RequestError::Status { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert!(body.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let client = client_for("http://127.0.0.1:9/never".to_string());

        let err = client
            .answer("q", &records(), &LimitsConfig::default(), "  ")
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::MissingToken));
    }

    #[test]
    fn test_parse_reply_rejects_malformed_bodies() {
        assert!(matches!(
            parse_reply(r#"{"choices":[]}"#),
            Err(RequestError::Malformed(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"choices":[{"message":{}}]}"#),
            Err(RequestError::Malformed(_))
        ));
        assert!(matches!(parse_reply("not json"), Err(RequestError::Malformed(_))));
        assert_eq!(
            parse_reply(r#"{"choices":[{"message":{"content":"ok"}}]}"#).unwrap(),
            "ok"
        );
    }
}
