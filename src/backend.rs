use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use anyhow::Result;

#[derive(Serialize)]
struct ChatRequest {
    message: String,
}

/// Wire shape shared by both endpoints. A well-behaved server sets
/// exactly one of the two fields.
#[derive(Deserialize, Default)]
struct ChatPayload {
    reply: Option<String>,
    error: Option<String>,
}

/// A backend response decoded into an explicit variant instead of
/// branching on which JSON fields happen to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotOutcome {
    Reply(String),
    Error(String),
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the opening bot message. Called once at startup.
    pub async fn initialize(&self) -> Result<BotOutcome> {
        let url = format!("{}/initialize_chat", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(decode_payload(status.is_success(), &status_text(status), &body))
    }

    /// Send one user message and decode the bot's answer.
    pub async fn send(&self, message: &str) -> Result<BotOutcome> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(decode_payload(status.is_success(), &status_text(status), &body))
    }
}

/// The human-readable status text ("Internal Server Error"), with the
/// full status line as the fallback for codes without a canonical
/// reason.
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

/// Decode a settled HTTP exchange into a `BotOutcome`.
///
/// On success, `error` wins over `reply` when a payload carries both;
/// a payload carrying neither (or an unparseable body) still produces
/// an outcome so the transcript never silently swallows a turn.
/// On a non-success status, a structured `{error}` body is preferred
/// and the status text is the fallback.
fn decode_payload(ok: bool, status_text: &str, body: &str) -> BotOutcome {
    let payload = serde_json::from_str::<ChatPayload>(body);

    if ok {
        match payload {
            Ok(ChatPayload { error: Some(error), .. }) => BotOutcome::Error(error),
            Ok(ChatPayload { reply: Some(reply), .. }) => BotOutcome::Reply(reply),
            Ok(_) => BotOutcome::Error("empty response from server".to_string()),
            Err(_) => BotOutcome::Error("malformed response from server".to_string()),
        }
    } else {
        match payload {
            Ok(ChatPayload { error: Some(error), .. }) => BotOutcome::Error(error),
            _ => BotOutcome::Error(status_text.to_string()),
        }
    }
}
