use super::cursor::EditCursor;
use crate::api::{ApiError, Item, ItemId, ItemPatch, NewItem, TodoClient};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// Errors and Features
// ============================================================================

/// Reasons an operation on the list did not change it.
#[derive(Debug, Error)]
pub enum ListError {
    /// The store call failed; local state is untouched.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Create was asked for a blank title. Nothing was sent.
    #[error("Title cannot be empty")]
    EmptyTitle,
    /// Commit was asked for while no item is in edit mode.
    #[error("No item is being edited")]
    NotEditing,
    /// The operation belongs to a feature this list was built without.
    #[error("{0} is disabled")]
    FeatureDisabled(&'static str),
    /// A newer request for the same target superseded this response.
    #[error("Response superseded by a newer request")]
    Stale,
}

impl ListError {
    /// Stale responses are routine and should not be surfaced to the user.
    pub fn is_stale(&self) -> bool {
        matches!(self, ListError::Stale)
    }
}

/// Which optional capabilities the list exposes.
///
/// The minimal variant turns both off: items are title-only and can only be
/// added or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Features {
    pub completion: bool,
    pub editing: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            completion: true,
            editing: true,
        }
    }
}

impl Features {
    pub const MINIMAL: Features = Features {
        completion: false,
        editing: false,
    };
}

/// Receipt for an in-flight per-item request.
///
/// Hand it back to the matching `apply_*` method together with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: ItemId,
    pub generation: u64,
}

// ============================================================================
// Item List
// ============================================================================

/// Client-side cache of the remote list plus the local editing state.
///
/// Every mutating operation is split in two. `begin_*` validates locally and
/// returns what to send; `apply_*` folds the store's answer back in. Local
/// state changes only in `apply_*`, and only on success. The async methods
/// (`load_all`, `create`, ...) run both halves around a single store call.
#[derive(Debug, Default)]
pub struct ItemList {
    items: Vec<Item>,
    draft_title: String,
    cursor: EditCursor,
    features: Features,
    /// Monotonic source for every generation handed out below
    next_generation: u64,
    load_generation: u64,
    /// Latest generation issued per item; entries leave when settled
    latest: HashMap<ItemId, u64>,
    /// Completion value the newest in-flight toggle asks for, per item
    toggling: HashMap<ItemId, bool>,
    /// Generation stamped when a confirmed change was folded in locally.
    /// A load issued before that stamp must not overwrite the change.
    confirmed: HashMap<ItemId, u64>,
}

impl ItemList {
    pub fn new(features: Features) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a request for `id` is still awaiting its answer.
    pub fn is_pending(&self, id: &ItemId) -> bool {
        self.latest.contains_key(id)
    }

    /// Completion state `id` is heading to: the target of an in-flight
    /// toggle, or the stored value when none is pending.
    pub fn completed_target(&self, id: &ItemId) -> Option<bool> {
        self.toggling
            .get(id)
            .copied()
            .or_else(|| self.get(id).map(|item| item.completed))
    }

    // --- draft and edit buffers ---

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft_title = title.into();
    }

    pub fn draft_title_mut(&mut self) -> &mut String {
        &mut self.draft_title
    }

    pub fn editing(&self) -> &EditCursor {
        &self.cursor
    }

    pub fn editing_title(&self) -> Option<&str> {
        self.cursor.title()
    }

    /// Replace the staged title. Ignored while idle.
    pub fn set_editing_title(&mut self, title: impl Into<String>) {
        if let Some(staged) = self.cursor.title_mut() {
            *staged = title.into();
        }
    }

    pub fn editing_title_mut(&mut self) -> Option<&mut String> {
        self.cursor.title_mut()
    }

    // --- generations ---

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn issue(&mut self, id: &ItemId) -> Ticket {
        let generation = self.bump();
        self.latest.insert(id.clone(), generation);
        self.toggling.remove(id);
        Ticket {
            id: id.clone(),
            generation,
        }
    }

    /// Retire `ticket` if it is still the newest for its item.
    fn settle(&mut self, ticket: &Ticket) -> bool {
        if self.latest.get(&ticket.id) == Some(&ticket.generation) {
            self.latest.remove(&ticket.id);
            self.toggling.remove(&ticket.id);
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Record that a confirmed change for `id` was applied locally.
    fn confirm(&mut self, id: &ItemId) {
        let generation = self.bump();
        self.confirmed.insert(id.clone(), generation);
    }

    pub fn begin_load(&mut self) -> u64 {
        self.load_generation = self.bump();
        self.load_generation
    }

    /// Fold changes confirmed after the load was issued into its snapshot.
    ///
    /// Items changed or created since keep their local form, and items
    /// deleted since stay gone. Snapshot order wins for everything else;
    /// newer local items absent from the snapshot are appended in local order.
    fn merge_confirmed(&self, mut fetched: Vec<Item>) -> Vec<Item> {
        let since = self.load_generation;
        let newer: Vec<&ItemId> = self
            .confirmed
            .iter()
            .filter(|(_, generation)| **generation > since)
            .map(|(id, _)| id)
            .collect();
        if newer.is_empty() {
            return fetched;
        }

        fetched.retain(|item| !newer.contains(&&item.id) || self.get(&item.id).is_some());
        for slot in fetched.iter_mut() {
            if newer.contains(&&slot.id) {
                if let Some(local) = self.get(&slot.id) {
                    *slot = local.clone();
                }
            }
        }
        for local in &self.items {
            if newer.contains(&&local.id) && !fetched.iter().any(|f| f.id == local.id) {
                fetched.push(local.clone());
            }
        }
        tracing::debug!(kept = newer.len(), "Kept changes confirmed during list load");
        fetched
    }

    /// Replace the whole list with a fetched collection.
    ///
    /// Returns the new item count. An edit cursor whose item vanished is
    /// cancelled.
    pub fn apply_load(
        &mut self,
        generation: u64,
        result: Result<Vec<Item>, ApiError>,
    ) -> Result<usize, ListError> {
        if generation != self.load_generation {
            tracing::debug!(
                generation,
                latest = self.load_generation,
                "Discarding superseded list load"
            );
            return Err(ListError::Stale);
        }

        match result {
            Ok(items) => {
                self.items = self.merge_confirmed(items);
                let since = self.load_generation;
                self.confirmed.retain(|_, generation| *generation > since);
                if let Some(id) = self.cursor.id() {
                    if self.get(id).is_none() {
                        tracing::info!(id = %id, "Edited item no longer exists, leaving edit mode");
                        self.cursor.cancel();
                    }
                }
                tracing::info!(count = self.items.len(), "Loaded todo list");
                Ok(self.items.len())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch todos");
                Err(e.into())
            }
        }
    }

    pub async fn load_all(&mut self, client: &TodoClient) -> Result<usize, ListError> {
        let generation = self.begin_load();
        let result = client.list().await;
        self.apply_load(generation, result)
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Validate `title` and build the create body. Sends nothing.
    pub fn begin_create(&self, title: &str) -> Result<NewItem, ListError> {
        if title.trim().is_empty() {
            tracing::debug!("Ignoring create with empty title");
            return Err(ListError::EmptyTitle);
        }
        Ok(NewItem {
            title: title.to_string(),
            completed: self.features.completion.then_some(false),
        })
    }

    /// Append the created item and clear the draft.
    ///
    /// `submitted` is the title that was sent; the draft is cleared only if it
    /// still holds exactly that text, so typing done while the request was in
    /// flight survives.
    pub fn apply_create(
        &mut self,
        submitted: &str,
        result: Result<Item, ApiError>,
    ) -> Result<ItemId, ListError> {
        match result {
            Ok(item) => {
                let id = item.id.clone();
                match self.items.iter_mut().find(|existing| existing.id == id) {
                    Some(existing) => {
                        tracing::warn!(id = %id, "Store returned an id already in the list, replacing");
                        *existing = item;
                    }
                    None => self.items.push(item),
                }
                self.confirm(&id);
                if self.draft_title == submitted {
                    self.draft_title.clear();
                }
                tracing::info!(id = %id, "Added todo");
                Ok(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to add todo");
                Err(e.into())
            }
        }
    }

    pub async fn create(&mut self, client: &TodoClient, title: &str) -> Result<ItemId, ListError> {
        let body = self.begin_create(title)?;
        let result = client.create(&body).await;
        self.apply_create(&body.title, result)
    }

    /// Submit whatever is in the draft buffer.
    pub async fn submit_draft(&mut self, client: &TodoClient) -> Result<ItemId, ListError> {
        let title = self.draft_title.clone();
        self.create(client, &title).await
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Supersedes any update still in flight for `id`.
    pub fn begin_remove(&mut self, id: &ItemId) -> Ticket {
        self.issue(id)
    }

    /// Drop the item once the store confirms the delete.
    ///
    /// A confirmed delete always applies, even if a later request for the same
    /// id was issued meanwhile. The item is gone server-side either way.
    pub fn apply_remove(
        &mut self,
        ticket: &Ticket,
        result: Result<(), ApiError>,
    ) -> Result<(), ListError> {
        let current = self.settle(ticket);

        match result {
            Ok(()) => {
                self.items.retain(|item| item.id != ticket.id);
                self.latest.remove(&ticket.id);
                self.toggling.remove(&ticket.id);
                self.confirm(&ticket.id);
                if self.cursor.is_editing_item(&ticket.id) {
                    self.cursor.cancel();
                }
                tracing::info!(id = %ticket.id, "Deleted todo");
                Ok(())
            }
            Err(e) if !current => {
                tracing::warn!(id = %ticket.id, error = %e, "Delete failed after being superseded");
                Err(ListError::Stale)
            }
            Err(e) => {
                tracing::error!(id = %ticket.id, error = %e, "Failed to delete todo");
                Err(e.into())
            }
        }
    }

    pub async fn remove(&mut self, client: &TodoClient, id: &ItemId) -> Result<(), ListError> {
        let ticket = self.begin_remove(id);
        let result = client.delete(id).await;
        self.apply_remove(&ticket, result)
    }

    // ========================================================================
    // Update (toggle and commit share the response path)
    // ========================================================================

    /// Build a completion flip for `id` given the value currently shown.
    pub fn begin_toggle(
        &mut self,
        id: &ItemId,
        current: bool,
    ) -> Result<(Ticket, ItemPatch), ListError> {
        if !self.features.completion {
            return Err(ListError::FeatureDisabled("completion"));
        }
        let ticket = self.issue(id);
        self.toggling.insert(id.clone(), !current);
        Ok((ticket, ItemPatch::completed(!current)))
    }

    /// Adopt the store's representation of an updated item.
    pub fn apply_update(
        &mut self,
        ticket: &Ticket,
        result: Result<Item, ApiError>,
    ) -> Result<(), ListError> {
        if !self.settle(ticket) {
            tracing::debug!(
                id = %ticket.id,
                generation = ticket.generation,
                "Discarding superseded update"
            );
            return Err(ListError::Stale);
        }

        match result {
            Ok(item) => {
                match self.items.iter_mut().find(|existing| existing.id == ticket.id) {
                    Some(slot) => *slot = item,
                    None => {
                        tracing::debug!(id = %ticket.id, "Updated item is no longer listed")
                    }
                }
                self.confirm(&ticket.id);
                tracing::info!(id = %ticket.id, "Updated todo");
                Ok(())
            }
            Err(e) => {
                tracing::error!(id = %ticket.id, error = %e, "Failed to update todo");
                Err(e.into())
            }
        }
    }

    pub async fn toggle_completed(
        &mut self,
        client: &TodoClient,
        id: &ItemId,
        current: bool,
    ) -> Result<(), ListError> {
        let (ticket, patch) = self.begin_toggle(id, current)?;
        let result = client.update(id, &patch).await;
        self.apply_update(&ticket, result)
    }

    // ========================================================================
    // Edit
    // ========================================================================

    /// Put `id` into edit mode with `title` as the staged text.
    ///
    /// Editing another item moves the cursor and discards that item's draft;
    /// the displaced id is returned.
    pub fn begin_edit(
        &mut self,
        id: ItemId,
        title: impl Into<String>,
    ) -> Result<Option<ItemId>, ListError> {
        if !self.features.editing {
            return Err(ListError::FeatureDisabled("editing"));
        }
        let displaced = self.cursor.begin(id, title.into());
        if let Some(prev) = &displaced {
            tracing::info!(id = %prev, "Discarded unsaved edit");
        }
        Ok(displaced)
    }

    /// Leave edit mode without sending anything. Returns the id that was
    /// being edited.
    pub fn cancel_edit(&mut self) -> Option<ItemId> {
        self.cursor.cancel()
    }

    /// Build the title patch for the item under the cursor.
    pub fn begin_commit(&mut self) -> Result<(Ticket, ItemPatch), ListError> {
        let (id, title) = match &self.cursor {
            EditCursor::Idle => return Err(ListError::NotEditing),
            EditCursor::Editing { id, title } => (id.clone(), title.clone()),
        };
        Ok((self.issue(&id), ItemPatch::title(title)))
    }

    /// Adopt the saved item and leave edit mode.
    ///
    /// The cursor is released only if it still points at the committed item.
    /// On failure it stays engaged so the user can retry or cancel.
    pub fn apply_commit(
        &mut self,
        ticket: &Ticket,
        result: Result<Item, ApiError>,
    ) -> Result<(), ListError> {
        self.apply_update(ticket, result)?;
        if self.cursor.is_editing_item(&ticket.id) {
            self.cursor.cancel();
        }
        Ok(())
    }

    pub async fn commit_edit(&mut self, client: &TodoClient) -> Result<(), ListError> {
        let (ticket, patch) = self.begin_commit()?;
        let result = client.update(&ticket.id, &patch).await;
        self.apply_commit(&ticket, result)
    }
}
