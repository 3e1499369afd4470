//! Application event handling.
//!
//! Folds background task results back into the list and reports the outcome
//! in the status bar.

use crate::app::{App, AppEvent, UpdateKind};
use crate::list::ListError;

/// Handle an event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Loaded { generation, result } => {
            match app.list.apply_load(generation, result) {
                Ok(count) => {
                    app.loading = false;
                    app.clamp_selection();
                    app.sync_focus();
                    app.set_status(format!("Fetched {} todos", count));
                }
                Err(e) => {
                    if !e.is_stale() {
                        app.loading = false;
                    }
                    report(app, "fetch todos", e);
                }
            }
        }
        AppEvent::Created { title, result } => match app.list.apply_create(&title, result) {
            Ok(id) => {
                app.select_id(&id);
                app.set_status("Added todo");
            }
            Err(e) => report(app, "add todo", e),
        },
        AppEvent::Removed { ticket, result } => {
            app.finish_task(&ticket);
            match app.list.apply_remove(&ticket, result) {
                Ok(()) => {
                    app.clamp_selection();
                    app.sync_focus();
                    app.set_status("Deleted todo");
                }
                Err(e) => report(app, "delete todo", e),
            }
        }
        AppEvent::Updated {
            ticket,
            kind,
            result,
        } => {
            app.finish_task(&ticket);
            let outcome = match kind {
                UpdateKind::Toggle => app.list.apply_update(&ticket, result),
                UpdateKind::Commit => app.list.apply_commit(&ticket, result),
            };
            match (kind, outcome) {
                (UpdateKind::Toggle, Ok(())) => {}
                (UpdateKind::Commit, Ok(())) => {
                    app.sync_focus();
                    app.set_status("Saved");
                }
                (UpdateKind::Toggle, Err(e)) => report(app, "update todo", e),
                (UpdateKind::Commit, Err(e)) => report(app, "save title", e),
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_error(format!("Internal error in {} task", task));
        }
    }
}

/// Surface a failed operation. Stale responses are dropped silently.
fn report(app: &mut App, what: &str, err: ListError) {
    if err.is_stale() {
        return;
    }
    app.set_error(format!("Could not {}: {}", what, err));
}
