//! Chat Reducer
//!
//! Produces the transcript the athlete sees from the raw message log:
//!
//! 1. `display_update` entries never appear.
//! 2. A `tool_call` disappears as soon as a `tool_result` with the same tool
//!    name exists anywhere in the log. Matching is by name, so two concurrent
//!    calls to one tool cannot be told apart.
//! 3. A `confirmation_request` disappears once it has been answered.

use crate::confirmation::answered_ids;
use crate::protocol::{Message, MessageKind};
use std::collections::HashSet;

fn completed_tools(log: &[Message]) -> HashSet<&str> {
    log.iter()
        .filter_map(|msg| match &msg.kind {
            MessageKind::ToolResult { tool_name, .. } => Some(tool_name.as_str()),
            _ => None,
        })
        .collect()
}

/// Visible transcript entries paired with their index in the log.
pub fn visible_entries(log: &[Message]) -> Vec<(usize, &Message)> {
    let completed = completed_tools(log);
    let answered = answered_ids(log);

    log.iter()
        .enumerate()
        .filter(|(_, msg)| match &msg.kind {
            MessageKind::DisplayUpdate { .. } => false,
            MessageKind::ToolCall { tool_name, .. } => !completed.contains(tool_name.as_str()),
            MessageKind::ConfirmationRequest {
                confirmation_id, ..
            } => !answered.contains(confirmation_id.as_str()),
            _ => true,
        })
        .collect()
}

/// The filtered transcript, in log order.
pub fn transcript(log: &[Message]) -> Vec<&Message> {
    visible_entries(log).into_iter().map(|(_, msg)| msg).collect()
}

/// True while an assistant turn is expected next, i.e. the last visible
/// entry is a `user_message` or a still-running `tool_call`.
pub fn is_waiting_for_response(log: &[Message]) -> bool {
    matches!(
        visible_entries(log).last().map(|(_, msg)| &msg.kind),
        Some(MessageKind::UserMessage { .. } | MessageKind::ToolCall { .. })
    )
}
