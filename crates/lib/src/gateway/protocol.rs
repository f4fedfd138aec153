//! Gateway wire types for the /api/chat relay.

use serde::{Deserialize, Serialize};

/// Request body: `{ "message": string }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Success body: `{ "reply": string|null }`. An absent reply means the
/// provider answered but carried no usable text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Failure body: `{ "error": string }`, sent with status 500.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatError {
    pub error: String,
}
