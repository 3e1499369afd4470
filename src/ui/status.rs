use crate::app::{App, Focus, StatusKind};
use crate::keybindings::Action;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, role): (Cow<'_, str>, &str) = match &app.status_message {
        Some((msg, StatusKind::Error, _)) => (Cow::Borrowed(msg.as_ref()), "status_error"),
        Some((msg, StatusKind::Info, _)) => (Cow::Borrowed(msg.as_ref()), "status_bar"),
        None => (Cow::Owned(hints(app)), "status_bar"),
    };

    f.render_widget(Paragraph::new(text).style(app.style(role)), area);
}

/// Key hints for the current focus, built from the live bindings so config
/// overrides show up.
fn hints(app: &App) -> String {
    let actions: &[(Action, &str)] = match app.focus {
        Focus::List => &[
            (Action::NewItem, "add"),
            (Action::ToggleCompleted, "toggle"),
            (Action::EditItem, "edit"),
            (Action::DeleteItem, "delete"),
            (Action::Refresh, "refresh"),
            (Action::ShowHelp, "help"),
            (Action::Quit, "quit"),
        ],
        Focus::Draft => &[(Action::Submit, "add"), (Action::Cancel, "back")],
        Focus::Edit => &[(Action::Submit, "save"), (Action::Cancel, "cancel")],
    };

    let features = app.list.features();
    actions
        .iter()
        .filter(|(action, _)| match action {
            Action::ToggleCompleted => features.completion,
            Action::EditItem => features.editing,
            _ => true,
        })
        .filter_map(|(action, label)| {
            app.keybindings
                .key_hint(*action)
                .map(|key| format!("[{}] {}", key, label))
        })
        .collect::<Vec<_>>()
        .join("  ")
}
