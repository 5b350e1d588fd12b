//! JSON chat gateway
//!
//! `POST /chat/{user_id}` with `{"text": "..."}` answers with the replies
//! produced for that message. Documents travel base64-encoded.

use crate::runtime::{AgentRuntime, OutgoingMessage};
use crate::state_machine::Form;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub messages: Vec<ChatMessage>,
}

/// One reply as seen by the chat client
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatMessage {
    Text {
        text: String,
        /// Main menu buttons to display under the message
        #[serde(skip_serializing_if = "Option::is_none")]
        menu: Option<Vec<String>>,
    },
    Document {
        filename: String,
        caption: String,
        content_base64: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        menu: Option<Vec<String>>,
    },
}

impl From<OutgoingMessage> for ChatMessage {
    fn from(message: OutgoingMessage) -> Self {
        let menu = message.show_menu().then(Form::menu_labels);
        match message {
            OutgoingMessage::Text { text, .. } => ChatMessage::Text { text, menu },
            OutgoingMessage::Document {
                filename,
                caption,
                content,
                ..
            } => ChatMessage::Document {
                filename,
                caption,
                content_base64: BASE64.encode(content),
                menu,
            },
        }
    }
}

/// Create the chat gateway router
pub fn create_router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/chat/:user_id", post(chat))
        .with_state(runtime)
}

async fn chat(
    State(runtime): State<Arc<AgentRuntime>>,
    Path(user_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    tracing::debug!(user_id = %user_id, "Chat message received");
    let messages = runtime
        .handle_message(&user_id, &req.text)
        .await
        .into_iter()
        .map(ChatMessage::from)
        .collect();
    Json(ChatResponse { messages })
}
