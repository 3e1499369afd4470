//! The item list controller.
//!
//! [`ItemList`] holds the local copy of the remote collection, the draft title
//! for the next item, and the single-item [`EditCursor`]. It never talks to the
//! network on its own except through the async convenience methods, which take
//! a [`TodoClient`](crate::api::TodoClient) by reference.
//!
//! # Reconciliation
//!
//! - Local state changes only after the store confirms a call.
//! - Each request gets a generation from one monotonic counter. Per-item
//!   responses apply only if they carry the newest generation for that item;
//!   list loads apply only if they carry the newest load generation.
//! - Toggle and title edits adopt the item the store sends back.

mod controller;
mod cursor;

pub use controller::{Features, ItemList, ListError, Ticket};
pub use cursor::EditCursor;
