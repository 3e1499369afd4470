//! Terminal client for a REST todo store.
//!
//! The [`list`] module holds the item list controller: an ordered local copy
//! of the server's items, the "add" draft, and the single edit cursor. It can
//! be driven directly against a [`api::TodoClient`] or through the split
//! begin/apply calls the [`ui`] event loop uses for background requests.

pub mod api;
pub mod app;
pub mod config;
pub mod keybindings;
pub mod list;
pub mod theme;
pub mod ui;
pub mod util;
