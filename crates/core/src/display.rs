//! Display Reducer
//!
//! The display panel shows whatever the most recent `display_update` asked
//! for. The state is recomputed from the full log on each query rather than
//! maintained incrementally, so cost grows linearly with session length.

use crate::protocol::{DisplayType, Message, MessageKind};
use serde::Serialize;
use serde_json::Value;

/// The view currently selected for the display panel and its payload.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    pub view: DisplayType,
    pub data: Option<Value>,
}

impl DisplayState {
    /// Derives the display state from a message log.
    ///
    /// Returns the default `welcome` view with no payload until the first
    /// `display_update` arrives.
    pub fn from_log(log: &[Message]) -> Self {
        log.iter()
            .rev()
            .find_map(|msg| match &msg.kind {
                MessageKind::DisplayUpdate { display_type, data } => Some(Self {
                    view: *display_type,
                    data: data.clone(),
                }),
                _ => None,
            })
            .unwrap_or_default()
    }
}
