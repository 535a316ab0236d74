//! Defines the WebSocket message protocol between the coaching server and its clients.
//!
//! Every frame is a JSON object carrying a `type` tag and an optional
//! `timestamp`. The same envelope is used in both directions; only
//! `user_message` and `confirmation_response` are ever produced locally.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Selects which view the display panel renders.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    #[default]
    Welcome,
    Workout,
    Charts,
    ToolExecution,
    TrainingPlan,
    Dashboard,
    Loading,
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayType::Welcome => "welcome",
            DisplayType::Workout => "workout",
            DisplayType::Charts => "charts",
            DisplayType::ToolExecution => "tool_execution",
            DisplayType::TrainingPlan => "training_plan",
            DisplayType::Dashboard => "dashboard",
            DisplayType::Loading => "loading",
        };
        f.write_str(name)
    }
}

/// Counts reported once a training-plan upload has finished.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadSummary {
    pub success: u32,
    pub skipped: u32,
    pub failed: u32,
    pub total: u32,
}

/// The variant-specific body of a [`Message`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    /// Text typed by the athlete.
    UserMessage { content: String },
    /// A completed reply from the coach.
    AssistantMessage { content: String },
    /// The coach started running a tool.
    ToolCall {
        tool_name: String,
        #[serde(default)]
        tool_args: Value,
    },
    /// A tool finished, successfully or not.
    ToolResult {
        tool_name: String,
        #[serde(default)]
        result: Value,
        success: bool,
    },
    /// Switches the display panel to a new view. The payload replaces the
    /// previous one wholesale.
    DisplayUpdate {
        display_type: DisplayType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    /// The server needs a yes/no answer before it continues.
    ConfirmationRequest {
        confirmation_id: String,
        question: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<Value>,
    },
    /// The athlete's answer to a [`MessageKind::ConfirmationRequest`].
    ConfirmationResponse {
        confirmation_id: String,
        confirmed: bool,
    },
    /// A server-side failure, shown in the transcript only.
    Error { message: String },
    UploadProgress {
        current: u64,
        total: u64,
        workout_date: String,
    },
    UploadComplete { summary: UploadSummary },
    UploadError { error: String },
}

/// A single frame on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    #[serde(flatten)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// Wraps a body without a timestamp.
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            timestamp: None,
        }
    }

    /// Wraps a body stamped with the current UTC time in RFC 3339 form.
    pub fn stamped(kind: MessageKind) -> Self {
        Self {
            kind,
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    /// Parses a single text frame.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serializes the message into a text frame.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The wire tag of this message, for logging.
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            MessageKind::UserMessage { .. } => "user_message",
            MessageKind::AssistantMessage { .. } => "assistant_message",
            MessageKind::ToolCall { .. } => "tool_call",
            MessageKind::ToolResult { .. } => "tool_result",
            MessageKind::DisplayUpdate { .. } => "display_update",
            MessageKind::ConfirmationRequest { .. } => "confirmation_request",
            MessageKind::ConfirmationResponse { .. } => "confirmation_response",
            MessageKind::Error { .. } => "error",
            MessageKind::UploadProgress { .. } => "upload_progress",
            MessageKind::UploadComplete { .. } => "upload_complete",
            MessageKind::UploadError { .. } => "upload_error",
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(MessageKind::UserMessage {
            content: content.into(),
        })
    }

    pub fn confirmation_response(confirmation_id: impl Into<String>, confirmed: bool) -> Self {
        Self::stamped(MessageKind::ConfirmationResponse {
            confirmation_id: confirmation_id.into(),
            confirmed,
        })
    }
}

impl From<MessageKind> for Message {
    fn from(kind: MessageKind) -> Self {
        Self::new(kind)
    }
}
