//! Confirmation Handshake
//!
//! The server serializes confirmations, but nothing stops two requests from
//! coexisting in the log. Only the first unanswered one is surfaced.

use crate::protocol::{Message, MessageKind};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// A yes/no question the server is waiting on.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub id: String,
    pub question: String,
    pub context: Option<Value>,
}

/// Ids of every confirmation that already has a response in the log.
pub(crate) fn answered_ids(log: &[Message]) -> HashSet<&str> {
    log.iter()
        .filter_map(|msg| match &msg.kind {
            MessageKind::ConfirmationResponse {
                confirmation_id, ..
            } => Some(confirmation_id.as_str()),
            _ => None,
        })
        .collect()
}

/// Returns the first confirmation request without a matching response.
pub fn pending_confirmation(log: &[Message]) -> Option<PendingConfirmation> {
    let answered = answered_ids(log);
    log.iter().find_map(|msg| match &msg.kind {
        MessageKind::ConfirmationRequest {
            confirmation_id,
            question,
            context,
        } if !answered.contains(confirmation_id.as_str()) => Some(PendingConfirmation {
            id: confirmation_id.clone(),
            question: question.clone(),
            context: context.clone(),
        }),
        _ => None,
    })
}
