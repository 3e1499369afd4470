use crate::api::ItemId;

/// Which item, if any, is in edit mode, plus its staged title.
///
/// The staged title is decoupled from the item's stored title until a commit
/// succeeds. At most one item can be edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditCursor {
    #[default]
    Idle,
    Editing { id: ItemId, title: String },
}

impl EditCursor {
    pub fn id(&self) -> Option<&ItemId> {
        match self {
            EditCursor::Idle => None,
            EditCursor::Editing { id, .. } => Some(id),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            EditCursor::Idle => None,
            EditCursor::Editing { title, .. } => Some(title),
        }
    }

    pub fn title_mut(&mut self) -> Option<&mut String> {
        match self {
            EditCursor::Idle => None,
            EditCursor::Editing { title, .. } => Some(title),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditCursor::Editing { .. })
    }

    pub fn is_editing_item(&self, item: &ItemId) -> bool {
        self.id() == Some(item)
    }

    /// Move the cursor onto `id`, replacing any staged draft.
    ///
    /// Returns the id whose unsaved edit was discarded, if the cursor was on a
    /// different item.
    pub(super) fn begin(&mut self, id: ItemId, title: String) -> Option<ItemId> {
        let displaced = match std::mem::take(self) {
            EditCursor::Editing { id: prev, .. } if prev != id => Some(prev),
            _ => None,
        };
        *self = EditCursor::Editing { id, title };
        displaced
    }

    /// Return to `Idle`, handing back the id that was being edited.
    pub(super) fn cancel(&mut self) -> Option<ItemId> {
        match std::mem::take(self) {
            EditCursor::Idle => None,
            EditCursor::Editing { id, .. } => Some(id),
        }
    }
}
