//! Terminal User Interface.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Page fetch spawning and completion handling
//! - `render` - Layout, header, and overlay dispatch
//! - `headlines`, `detail`, `saved`, `help`, `status` - View widgets

mod detail;
mod events;
mod headlines;
mod help;
mod input;
mod loop_runner;
mod render;
mod saved;
mod status;

pub use loop_runner::{run, Action};
