//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling for the list and the text fields
//! - `events` - Background task event processing
//! - `helpers` - Task spawning and panic capture
//! - `render` - Screen layout
//! - `items` - Item list and "add todo" row widgets
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod events;
mod help;
mod helpers;
mod input;
mod items;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
