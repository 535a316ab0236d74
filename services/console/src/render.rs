//! Turns successive [`ChatState`] snapshots into terminal lines.
//!
//! The session publishes whole snapshots, so [`Printer`] remembers what it
//! already showed and only emits what changed since the last call.

use serde_json::Value;
use train_r_core::{
    ChatState, ConnectionStatus, DisplayState, DisplayType, Message, MessageKind, UploadStatus,
};

/// Formats a transcript entry. Entries the console shows through other
/// channels (prompts, upload status, the display line) yield `None`.
pub fn render_entry(message: &Message) -> Option<String> {
    match &message.kind {
        MessageKind::UserMessage { content } => Some(format!("you: {}", content)),
        MessageKind::AssistantMessage { content } => Some(format!("coach: {}", content)),
        MessageKind::ToolCall { tool_name, tool_args } => Some(match tool_args {
            Value::Null => format!("[tool] running {}", tool_name),
            args => format!("[tool] running {} {}", tool_name, args),
        }),
        MessageKind::ToolResult {
            tool_name, success, ..
        } => Some(if *success {
            format!("[tool] {} finished", tool_name)
        } else {
            format!("[tool] {} failed", tool_name)
        }),
        MessageKind::ConfirmationResponse { confirmed, .. } => {
            Some(format!("you: {}", if *confirmed { "yes" } else { "no" }))
        }
        MessageKind::Error { message } => Some(format!("! server error: {}", message)),
        MessageKind::ConfirmationRequest { .. }
        | MessageKind::DisplayUpdate { .. }
        | MessageKind::UploadProgress { .. }
        | MessageKind::UploadComplete { .. }
        | MessageKind::UploadError { .. } => None,
    }
}

pub fn render_display(display: &DisplayState) -> String {
    let detail = display.data.as_ref().and_then(|data| match display.view {
        DisplayType::Workout => data.get("workout_name").and_then(Value::as_str),
        DisplayType::ToolExecution => data.get("tool").and_then(Value::as_str),
        _ => data.get("message").and_then(Value::as_str),
    });
    match detail {
        Some(detail) => format!("[display] {}: {}", display.view, detail),
        None => format!("[display] {}", display.view),
    }
}

pub fn render_upload(upload: &UploadStatus) -> Option<String> {
    match upload {
        UploadStatus::Idle => None,
        UploadStatus::InProgress {
            current,
            total,
            workout_date,
        } => Some(format!("[upload] {}/{} ({})", current, total, workout_date)),
        UploadStatus::Complete { summary } => Some(format!(
            "[upload] done: {} uploaded, {} skipped, {} failed of {}",
            summary.success, summary.skipped, summary.failed, summary.total
        )),
        UploadStatus::Failed { error } => Some(format!("[upload] failed: {}", error)),
    }
}

#[derive(Debug, Default)]
pub struct Printer {
    seen: usize,
    status: Option<ConnectionStatus>,
    error: Option<String>,
    display: Option<DisplayState>,
    upload: UploadStatus,
    pending: Option<String>,
    waiting: bool,
}

impl Printer {
    /// Returns the lines describing everything that changed since the
    /// previous snapshot.
    pub fn update(&mut self, state: &ChatState) -> Vec<String> {
        let mut lines = Vec::new();

        if self.status != Some(state.status()) {
            self.status = Some(state.status());
            lines.push(format!("* {}", state.status()));
        }

        if state.error() != self.error.as_deref() {
            self.error = state.error().map(str::to_owned);
            if let Some(error) = &self.error {
                lines.push(format!("! {}", error));
            }
        }

        lines.extend(
            state
                .visible_entries()
                .into_iter()
                .filter(|(index, _)| *index >= self.seen)
                .filter_map(|(_, message)| render_entry(message)),
        );
        self.seen = state.log().len();

        let display = state.display();
        if self.display.as_ref() != Some(&display) {
            lines.push(render_display(&display));
            self.display = Some(display);
        }

        let upload = state.upload_status();
        if upload != self.upload {
            lines.extend(render_upload(&upload));
            self.upload = upload;
        }

        let pending = state.pending_confirmation();
        let pending_id = pending.as_ref().map(|p| p.id.clone());
        if pending_id != self.pending {
            if let Some(pending) = pending {
                lines.push(format!("? {} [y/n]", pending.question));
            }
            self.pending = pending_id;
        }

        let waiting = state.is_waiting_for_response();
        if waiting && !self.waiting {
            lines.push("... coach is thinking".to_string());
        }
        self.waiting = waiting;

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use train_r_core::SocketEvent;

    fn frame(state: &mut ChatState, value: Value) {
        state.apply(SocketEvent::Frame(value.to_string()));
    }

    #[test]
    fn test_render_entry() {
        let call = Message::new(MessageKind::ToolCall {
            tool_name: "get_athlete_metrics".into(),
            tool_args: json!({"days": 42}),
        });
        assert_eq!(
            render_entry(&call).unwrap(),
            r#"[tool] running get_athlete_metrics {"days":42}"#
        );

        let failed = Message::new(MessageKind::ToolResult {
            tool_name: "upload_plan".into(),
            result: Value::Null,
            success: false,
        });
        assert_eq!(render_entry(&failed).unwrap(), "[tool] upload_plan failed");

        let progress = Message::new(MessageKind::UploadProgress {
            current: 1,
            total: 8,
            workout_date: "2024-06-03".into(),
        });
        assert_eq!(render_entry(&progress), None);
    }

    #[test]
    fn test_render_display() {
        let display = DisplayState {
            view: DisplayType::Workout,
            data: Some(json!({"workout_name": "Sweet Spot 3x15"})),
        };
        assert_eq!(render_display(&display), "[display] workout: Sweet Spot 3x15");
        assert_eq!(render_display(&DisplayState::default()), "[display] welcome");
    }

    #[test]
    fn test_printer_reports_only_changes() {
        let mut state = ChatState::new();
        let mut printer = Printer::default();

        assert_eq!(printer.update(&state), ["* connecting", "[display] welcome"]);
        assert!(printer.update(&state).is_empty());

        state.apply(SocketEvent::Opened);
        state.send_user_message("How is my form?").unwrap();
        assert_eq!(
            printer.update(&state),
            ["* connected", "you: How is my form?", "... coach is thinking"]
        );

        frame(
            &mut state,
            json!({"type": "display_update", "display_type": "charts", "data": {"message": "CTL trend"}}),
        );
        frame(
            &mut state,
            json!({"type": "assistant_message", "content": "Your CTL is climbing."}),
        );
        assert_eq!(
            printer.update(&state),
            ["coach: Your CTL is climbing.", "[display] charts: CTL trend"]
        );
        assert!(printer.update(&state).is_empty());
    }

    #[test]
    fn test_printer_confirmation_and_upload() {
        let mut state = ChatState::new();
        state.apply(SocketEvent::Opened);
        let mut printer = Printer::default();
        printer.update(&state);

        frame(
            &mut state,
            json!({"type": "confirmation_request", "confirmation_id": "c1", "question": "Upload 8 workouts?"}),
        );
        assert_eq!(printer.update(&state), ["? Upload 8 workouts? [y/n]"]);

        state.respond_to_confirmation("c1", true).unwrap();
        frame(
            &mut state,
            json!({"type": "upload_progress", "current": 1, "total": 8, "workout_date": "2024-06-03"}),
        );
        assert_eq!(printer.update(&state), ["you: yes", "[upload] 1/8 (2024-06-03)"]);

        frame(
            &mut state,
            json!({"type": "upload_complete", "summary": {"success": 7, "skipped": 1, "failed": 0, "total": 8}}),
        );
        assert_eq!(
            printer.update(&state),
            ["[upload] done: 7 uploaded, 1 skipped, 0 failed of 8"]
        );
    }

    #[test]
    fn test_printer_shows_connection_errors_once() {
        let mut state = ChatState::new();
        let mut printer = Printer::default();
        printer.update(&state);

        state.apply(SocketEvent::Errored);
        let lines = printer.update(&state);
        assert_eq!(lines[0], "* error");
        assert!(lines[1].starts_with("! "));

        state.apply(SocketEvent::Closed);
        assert_eq!(printer.update(&state), ["* disconnected"]);
    }
}
