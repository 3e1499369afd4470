//! Typed client for the remote todo store.
//!
//! The store exposes one REST resource:
//!
//! | Operation  | Method | Path          |
//! |------------|--------|---------------|
//! | List all   | GET    | `/todos`      |
//! | Create     | POST   | `/todos`      |
//! | Delete     | DELETE | `/todos/{id}` |
//! | Update     | PATCH  | `/todos/{id}` |

mod client;
mod types;

pub use client::{ApiError, TodoClient, DEFAULT_TIMEOUT};
pub use types::{Item, ItemId, ItemPatch, NewItem};
