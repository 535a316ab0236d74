//! Derived view of the training-plan upload, driven by the `upload_*` messages.

use crate::protocol::{Message, MessageKind, UploadSummary};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    InProgress {
        current: u64,
        total: u64,
        workout_date: String,
    },
    Complete {
        summary: UploadSummary,
    },
    Failed {
        error: String,
    },
}

impl UploadStatus {
    /// Takes the most recent upload message in the log.
    pub fn from_log(log: &[Message]) -> Self {
        log.iter()
            .rev()
            .find_map(|msg| match &msg.kind {
                MessageKind::UploadProgress {
                    current,
                    total,
                    workout_date,
                } => Some(Self::InProgress {
                    current: *current,
                    total: *total,
                    workout_date: workout_date.clone(),
                }),
                MessageKind::UploadComplete { summary } => Some(Self::Complete { summary: *summary }),
                MessageKind::UploadError { error } => Some(Self::Failed {
                    error: error.clone(),
                }),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}
