//! Input handling for the TUI.
//!
//! Keys are dispatched by focus: shortcuts while browsing the list, text
//! entry while the draft or edit row has focus.

use crate::app::{App, AppEvent, Focus};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::list::ListError;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{spawn_commit, spawn_create, spawn_load, spawn_remove, spawn_toggle};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Raw mode swallows SIGINT, so Ctrl+C is handled here in every mode.
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    match app.focus {
        Focus::List => handle_list_input(app, code, modifiers, event_tx),
        Focus::Draft | Focus::Edit => handle_text_input(app, code, modifiers, event_tx),
    }
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_list_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::List);

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::NavTop) => app.nav_top(),
        Some(KbAction::NavBottom) => app.nav_bottom(),
        Some(KbAction::Refresh) => {
            spawn_load(app, event_tx);
            app.set_status("Fetching todos...");
        }
        Some(KbAction::NewItem) => app.focus = Focus::Draft,
        Some(KbAction::ToggleCompleted) => {
            if let Some(id) = app.selected_item().map(|item| item.id.clone()) {
                if app.is_removing(&id) {
                    app.set_status("Already deleting this todo");
                } else if let Err(e) = spawn_toggle(app, event_tx) {
                    explain(app, e);
                }
            }
        }
        Some(KbAction::EditItem) => begin_edit_selected(app),
        Some(KbAction::DeleteItem) => {
            if app.selected_item().is_some() {
                if spawn_remove(app, event_tx) {
                    app.set_status("Deleting...");
                } else {
                    app.set_status("Already deleting this todo");
                }
            }
        }
        Some(KbAction::CycleTheme) => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        Some(KbAction::Submit) | Some(KbAction::Cancel) | None => {}
    }
    Ok(Action::Continue)
}

/// Put the selected item into edit mode.
///
/// If the edit cursor already sits on that item, focus returns to the staged
/// text instead of re-seeding it from the stored title.
fn begin_edit_selected(app: &mut App) {
    let Some((id, title)) = app
        .selected_item()
        .map(|item| (item.id.clone(), item.title.clone()))
    else {
        return;
    };

    if app.list.editing().is_editing_item(&id) {
        app.focus = Focus::Edit;
        return;
    }

    match app.list.begin_edit(id, title) {
        Ok(displaced) => {
            app.focus = Focus::Edit;
            if displaced.is_some() {
                app.set_status("Discarded unsaved edit");
            }
        }
        Err(e) => explain(app, e),
    }
}

fn handle_text_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Input);

    match (action, app.focus) {
        (Some(KbAction::Submit), Focus::Draft) => match spawn_create(app, event_tx) {
            Ok(()) => {
                app.focus = Focus::List;
                app.set_status("Adding...");
            }
            Err(e) => explain(app, e),
        },
        (Some(KbAction::Submit), Focus::Edit) => match spawn_commit(app, event_tx) {
            Ok(()) => app.set_status("Saving..."),
            Err(e) => {
                explain(app, e);
                app.sync_focus();
            }
        },
        (Some(KbAction::Cancel), Focus::Draft) => app.focus = Focus::List,
        (Some(KbAction::Cancel), Focus::Edit) => {
            app.list.cancel_edit();
            app.focus = Focus::List;
        }
        _ => edit_buffer(app, code, modifiers),
    }
    Ok(Action::Continue)
}

/// Apply a text-editing key to whichever buffer has focus.
fn edit_buffer(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let buffer = match app.focus {
        Focus::Draft => app.list.draft_title_mut(),
        Focus::Edit => match app.list.editing_title_mut() {
            Some(title) => title,
            None => return,
        },
        Focus::List => return,
    };

    match code {
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => buffer.clear(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => buffer.push(c),
        _ => {}
    }
}

/// Turn a locally rejected operation into a status message.
fn explain(app: &mut App, err: ListError) {
    match err {
        ListError::EmptyTitle => app.set_error("Title cannot be empty"),
        ListError::NotEditing => app.set_status("Nothing to save"),
        ListError::FeatureDisabled(feature) => {
            app.set_status(format!("{} is not available", capitalize(feature)))
        }
        other => app.set_error(other.to_string()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
