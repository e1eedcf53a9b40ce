//! Thin proxy to the LLM chat-completions endpoint. The latest user message
//! is rewritten with the due-diligence preamble plus the caller-provided
//! context and file contents before forwarding.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::CONFIG;
use crate::error::DataroomError;
use crate::router::AppState;

const PROMPT_PREAMBLE: &str = "Prompt: You have already helped a user with due diligence \
on a company. Now, you are helping them chat over the results. The user has already \
provided some important context and you have provided some initial thoughts. Now, \
continue the conversation in a friendly, professional tone.";

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub data: ChatData,
}

#[derive(Debug, Deserialize)]
pub struct ChatData {
    pub messages: Vec<ChatMessage>,
    #[serde(default, rename = "additionalContext")]
    pub additional_context: String,
    #[serde(default, rename = "fileContents")]
    pub file_contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<Value>, DataroomError> {
    let Some(api_key) = CONFIG.openai_api_key.as_deref() else {
        return Err(DataroomError::ChatNotConfigured);
    };

    let mut messages = body.data.messages;
    let Some(latest) = messages.last_mut() else {
        return Err(DataroomError::BadRequest("No message provided".to_string()));
    };

    latest.content = format!(
        "{PROMPT_PREAMBLE}User Message: {}\nUser Provided Important Context: {}\nComplete File Contents: {}",
        latest.content, body.data.additional_context, body.data.file_contents
    );

    let url = CONFIG.openai_base_url.join("chat/completions")?;
    let response = state
        .http
        .post(url)
        .bearer_auth(api_key)
        .json(&json!({
            "model": CONFIG.chat_model,
            "messages": messages,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DataroomError::UpstreamStatus(
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
        ));
    }

    let payload: Value = response.json().await?;
    debug!("chat completion payload received");

    let message = payload
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or(DataroomError::UpstreamStatus(StatusCode::BAD_GATEWAY))?;

    Ok(Json(json!({ "message": message })))
}
