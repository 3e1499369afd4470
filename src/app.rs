use crate::api::{ApiError, Item, ItemId, TodoClient};
use crate::keybindings::KeybindingRegistry;
use crate::list::{Features, ItemList, Ticket};
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a status message stays on screen.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// UI Enums
// ============================================================================

/// Where typed keys go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Browsing the list; keys are shortcuts
    List,
    /// Typing the title for a new item
    Draft,
    /// Typing into the edit row of the item under the edit cursor
    Edit,
}

/// Which store call an update response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Toggle,
    Commit,
}

impl UpdateKind {
    pub fn task_name(self) -> &'static str {
        match self {
            UpdateKind::Toggle => "toggle",
            UpdateKind::Commit => "commit_edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A list fetch finished.
    ///
    /// `generation` is the load generation handed out when the fetch was
    /// spawned; older generations are discarded by the list.
    Loaded {
        generation: u64,
        result: Result<Vec<Item>, ApiError>,
    },
    /// A create request finished. `title` is the text that was submitted.
    Created {
        title: String,
        result: Result<Item, ApiError>,
    },
    Removed {
        ticket: Ticket,
        result: Result<(), ApiError>,
    },
    /// A toggle or title commit finished.
    Updated {
        ticket: Ticket,
        kind: UpdateKind,
        result: Result<Item, ApiError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "load", "toggle")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: TodoClient,
    pub list: ItemList,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // UI State
    pub focus: Focus,
    pub selected: usize,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    /// True until the first list load settles, success or not
    pub loading: bool,

    /// Status message with expiry; Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, StatusKind, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    // Background tasks
    /// Current list fetch. Aborted when a new fetch starts.
    pub load_handle: Option<JoinHandle<()>>,
    /// In-flight toggle or commit per item, tagged with its generation.
    /// A newer update for the same item aborts the older one.
    pub update_handles: HashMap<ItemId, (u64, JoinHandle<()>)>,
    /// In-flight deletes. Never aborted by later actions on the item.
    pub remove_handles: HashMap<ItemId, (u64, JoinHandle<()>)>,
    pub create_handles: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(client: TodoClient, features: Features) -> Self {
        Self {
            client,
            list: ItemList::new(features),
            theme_variant: ThemeVariant::Dark,
            theme: StyleMap::from_palette(&ThemeVariant::Dark.palette()),
            keybindings: KeybindingRegistry::new(),
            focus: Focus::List,
            selected: 0,
            show_help: false,
            help_scroll_offset: 0,
            loading: true,
            status_message: None,
            needs_redraw: true,
            load_handle: None,
            update_handles: HashMap::new(),
            remove_handles: HashMap::new(),
            create_handles: Vec::new(),
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selected_item(&self) -> Option<&Item> {
        self.list.items().get(self.selected)
    }

    pub fn nav_down(&mut self) {
        if self.selected + 1 < self.list.len() {
            self.selected += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_top(&mut self) {
        self.selected = 0;
    }

    pub fn nav_bottom(&mut self) {
        self.selected = self.list.len().saturating_sub(1);
    }

    /// Keep the selection on a valid row after the list shrinks.
    pub fn clamp_selection(&mut self) {
        if self.selected >= self.list.len() {
            self.selected = self.list.len().saturating_sub(1);
        }
    }

    /// Move the selection onto `id` if it is listed.
    pub fn select_id(&mut self, id: &ItemId) {
        if let Some(index) = self.list.position(id) {
            self.selected = index;
        }
    }

    /// Leave the edit row if the edit cursor was released underneath it.
    pub fn sync_focus(&mut self) {
        if self.focus == Focus::Edit && !self.list.editing().is_editing() {
            self.focus = Focus::List;
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), StatusKind::Info, Instant::now()));
    }

    pub fn set_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), StatusKind::Error, Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Task Bookkeeping
    // ========================================================================

    /// Track a per-item update task, aborting the one it supersedes.
    pub fn track_update(&mut self, ticket: &Ticket, handle: JoinHandle<()>) {
        if let Some((_, previous)) = self
            .update_handles
            .insert(ticket.id.clone(), (ticket.generation, handle))
        {
            previous.abort();
            tracing::debug!(id = %ticket.id, "Aborted superseded update task");
        }
    }

    pub fn track_remove(&mut self, ticket: &Ticket, handle: JoinHandle<()>) {
        self.remove_handles
            .insert(ticket.id.clone(), (ticket.generation, handle));
    }

    pub fn track_create(&mut self, handle: JoinHandle<()>) {
        self.create_handles.retain(|h| !h.is_finished());
        self.create_handles.push(handle);
    }

    /// Forget the handle for a finished task, unless a newer one replaced it.
    pub fn finish_task(&mut self, ticket: &Ticket) {
        for handles in [&mut self.update_handles, &mut self.remove_handles] {
            if handles
                .get(&ticket.id)
                .is_some_and(|(generation, _)| *generation == ticket.generation)
            {
                handles.remove(&ticket.id);
            }
        }
    }

    pub fn is_removing(&self, id: &ItemId) -> bool {
        self.remove_handles.contains_key(id)
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort all in-flight store calls when the app goes away.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
        }
        for (_, (_, handle)) in self.update_handles.drain() {
            handle.abort();
        }
        for (_, (_, handle)) in self.remove_handles.drain() {
            handle.abort();
        }
        for handle in self.create_handles.drain(..) {
            handle.abort();
        }
        tracing::debug!("Aborted in-flight tasks on App drop");
    }
}
