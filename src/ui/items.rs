use crate::api::Item;
use crate::app::{App, Focus};
use crate::util::{sanitize_title, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Width taken by the marker column ("[x] " or "• ").
const MARKER_WIDTH: usize = 4;

/// Render the item list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let border_style = if focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let title = format!(" Todos ({}) ", app.list.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, app.style("header")));

    if app.list.is_empty() {
        let text = if app.loading {
            "Loading..."
        } else {
            "No todos yet"
        };
        let empty = Paragraph::new(Span::styled(text, app.style("input_placeholder"))).block(block);
        f.render_widget(empty, area);
        return;
    }

    // Room left for the title after borders, marker and the pending mark
    let title_width = (area.width as usize).saturating_sub(2 + MARKER_WIDTH + 2);

    let rows: Vec<ListItem> = app
        .list
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| ListItem::new(item_line(app, item, i == app.selected, title_width)))
        .collect();

    let mut state = ListState::default().with_selected(Some(app.selected));
    let list = List::new(rows).block(block);
    f.render_stateful_widget(list, area, &mut state);
}

fn item_line<'a>(app: &'a App, item: &'a Item, selected: bool, width: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(3);

    if app.list.features().completion {
        let (mark, role) = if item.completed {
            ("[x] ", "checkbox_done")
        } else {
            ("[ ] ", "checkbox")
        };
        spans.push(Span::styled(mark, app.style(role)));
    } else {
        spans.push(Span::styled("  • ", app.style("checkbox")));
    }

    if let Some(staged) = app
        .list
        .editing()
        .title()
        .filter(|_| app.list.editing().is_editing_item(&item.id))
    {
        let cursor = if app.focus == Focus::Edit { "_" } else { "" };
        let text = format!("{}{}", sanitize_title(staged), cursor);
        spans.push(Span::styled(
            truncate_to_width(&text, width).into_owned(),
            app.style("input"),
        ));
        return Line::from(spans);
    }

    let role = if selected {
        "item_selected"
    } else if app.list.is_pending(&item.id) || app.is_removing(&item.id) {
        "item_pending"
    } else if item.completed {
        "item_completed"
    } else {
        "item_normal"
    };
    let title = sanitize_title(&item.title);
    spans.push(Span::styled(
        truncate_to_width(&title, width).into_owned(),
        app.style(role),
    ));

    if app.list.is_pending(&item.id) || app.is_removing(&item.id) {
        spans.push(Span::styled(" …", app.style("item_pending")));
    }

    Line::from(spans)
}

/// Render the "add todo" row under the list.
pub fn render_draft(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Draft;
    let border_style = if focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Add todo ", app.style("input_label")));

    let width = (area.width as usize).saturating_sub(4);
    let draft = app.list.draft_title();
    let line = if draft.is_empty() && !focused {
        let hint = match app.keybindings.key_hint(crate::keybindings::Action::NewItem) {
            Some(key) => format!("Press {} to add a todo", key),
            None => "Add a todo".to_string(),
        };
        Line::from(Span::styled(hint, app.style("input_placeholder")))
    } else {
        let cursor = if focused { "_" } else { "" };
        let text = format!("> {}{}", sanitize_title(draft), cursor);
        Line::from(Span::styled(
            tail_to_width(&text, width),
            app.style("input"),
        ))
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

/// Keep the end of `s` visible, where the typing happens.
fn tail_to_width(s: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut used = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    s[start..].to_string()
}
